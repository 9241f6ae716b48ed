use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{shop_body, TestApp};

#[tokio::test]
async fn test_admin_opens_shop() -> Result<()> {
    let app = TestApp::new();
    let (admin_id, token) = app.admin("owner@gmail.com").await?;

    let res = app
        .post(&format!("/api/v1/admins/{}/shops", admin_id), Some(&token), shop_body())
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let shop_id = res.id();
    assert_eq!(
        res.header("location"),
        Some(format!("/api/v1/shops/{}", shop_id).as_str())
    );
    assert_eq!(res.body["town_or_city"], "Glasgow");
    assert_eq!(res.body["number"], 8);

    let res = app.get(&format!("/api/v1/admins/{}", admin_id), None).await?;
    assert_eq!(res.body["shop_id"], shop_id.as_str());
    assert_eq!(res.body["shop"]["name"], "Some random shop");

    let res = app.get("/api/v1/shops", None).await?;
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_shop_validation_order() -> Result<()> {
    let app = TestApp::new();
    let (admin_id, token) = app.admin("owner@gmail.com").await?;
    let uri = format!("/api/v1/admins/{}/shops", admin_id);

    let cases = [
        ("name", "Required shop name"),
        ("description", "Required shop description"),
        ("postcode", "Required shop postcode"),
        ("number", "Required shop address number"),
        ("address_1", "Required shop address line 1"),
        ("town_or_city", "Required town or city"),
    ];

    for (field, message) in cases {
        let mut body = shop_body();
        if let Some(fields) = body.as_object_mut() {
            fields.remove(field);
        }
        let res = app.post(&uri, Some(&token), body).await?;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY, "{}", field);
        assert_eq!(res.error(), message);
    }

    Ok(())
}

#[tokio::test]
async fn test_students_cannot_open_shops() -> Result<()> {
    let app = TestApp::new();
    let (student_id, token) = app.student("student@gmail.com").await?;

    let res = app
        .post(&format!("/api/v1/admins/{}/shops", student_id), Some(&token), shop_body())
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized: This is not an admin token");

    Ok(())
}

#[tokio::test]
async fn test_only_the_shop_admin_edits_the_shop() -> Result<()> {
    let app = TestApp::new();
    let (owner, owner_token, shop_id) = app.shop_owner("owner@gmail.com").await?;
    let (rival, rival_token, _) = app.shop_owner("rival@gmail.com").await?;

    // Acting through someone else's admin path
    let res = app
        .put(
            &format!("/api/v1/admins/{}/shops/{}", owner, shop_id),
            Some(&rival_token),
            json!({ "name": "Taken over" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized");

    // Acting through their own path on a shop they do not run
    let res = app
        .put(
            &format!("/api/v1/admins/{}/shops/{}", rival, shop_id),
            Some(&rival_token),
            json!({ "name": "Taken over" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized: You are not the admin for this shop");

    let res = app
        .put(
            &format!("/api/v1/admins/{}/shops/{}", owner, shop_id),
            Some(&owner_token),
            json!({ "name": "Renamed" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Renamed");
    assert_eq!(res.body["postcode"], "G12 8BY");

    Ok(())
}

#[tokio::test]
async fn test_admin_runs_one_shop_at_a_time() -> Result<()> {
    let app = TestApp::new();
    let (owner, token, first) = app.shop_owner("owner@gmail.com").await?;
    let uri = format!("/api/v1/admins/{}/shops", owner);

    let res = app.post(&uri, Some(&token), shop_body()).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "This admin already runs a shop");

    let res = app.get("/api/v1/shops", None).await?;
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));

    // The first shop still goes with its only admin
    let res = app.delete(&format!("/api/v1/admins/{}", owner), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let res = app.get(&format!("/api/v1/shops/{}", first), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_admin_opens_new_shop_after_closing_old_one() -> Result<()> {
    let app = TestApp::new();
    let (owner, token, first) = app.shop_owner("owner@gmail.com").await?;

    let res = app
        .delete(&format!("/api/v1/admins/{}/shops/{}", owner, first), Some(&token))
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app
        .post(&format!("/api/v1/admins/{}/shops", owner), Some(&token), shop_body())
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_ne!(res.id(), first);

    Ok(())
}

#[tokio::test]
async fn test_deleting_shop_removes_products() -> Result<()> {
    let app = TestApp::new();
    let (owner, token, shop_id) = app.shop_owner("owner@gmail.com").await?;
    let product_id = app.product(&shop_id, &token, "1.20").await?;

    let res = app
        .delete(&format!("/api/v1/admins/{}/shops/{}", owner, shop_id), Some(&token))
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(res.header("entity"), Some(shop_id.as_str()));

    let res = app.get(&format!("/api/v1/shops/{}", shop_id), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.get(&format!("/api/v1/products/{}", product_id), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Product not found");

    let res = app.get(&format!("/api/v1/admins/{}", owner), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["shop_id"].is_null());

    Ok(())
}
