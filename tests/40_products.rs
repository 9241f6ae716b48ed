use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::TestApp;

#[tokio::test]
async fn test_shop_admin_adds_product() -> Result<()> {
    let app = TestApp::new();
    let (_, token, shop_id) = app.shop_owner("owner@gmail.com").await?;

    let res = app
        .post(
            &format!("/api/v1/shops/{}/products", shop_id),
            Some(&token),
            json!({ "name": "Americano", "price": "2.40", "shop_id": uuid::Uuid::new_v4() }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let product_id = res.id();
    assert_eq!(
        res.header("location"),
        Some(format!("/api/v1/products/{}", product_id).as_str())
    );
    // The owning shop always comes from the path
    assert_eq!(res.body["shop_id"], shop_id.as_str());
    assert_eq!(res.body["sold_by"]["id"], shop_id.as_str());
    assert_eq!(res.body["currency"], "GBP");

    let res = app.get(&format!("/api/v1/products/{}", product_id), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Americano");
    assert_eq!(res.body["price"], "2.40");

    let res = app.get(&format!("/api/v1/shops/{}/products", shop_id), None).await?;
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_product_validation() -> Result<()> {
    let app = TestApp::new();
    let (_, token, shop_id) = app.shop_owner("owner@gmail.com").await?;
    let uri = format!("/api/v1/shops/{}/products", shop_id);

    let cases = [
        (json!({ "price": "1.00" }), "Required product name"),
        (json!({ "name": "Tea" }), "Required product price"),
        (json!({ "name": "Tea", "price": "0" }), "Required product price"),
        (json!({ "name": "Tea", "price": "-1.00" }), "Product price must be positive"),
        (json!({ "name": "Tea", "price": "0.001" }), "Product price cannot have more than 2 decimal places"),
    ];

    for (body, message) in cases {
        let res = app.post(&uri, Some(&token), body).await?;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY, "{}", message);
        assert_eq!(res.error(), message);
    }

    Ok(())
}

#[tokio::test]
async fn test_only_the_shop_admin_adds_products() -> Result<()> {
    let app = TestApp::new();
    let (_, _, shop_id) = app.shop_owner("owner@gmail.com").await?;
    let (_, rival_token, _) = app.shop_owner("rival@gmail.com").await?;
    let (_, student_token) = app.student("student@gmail.com").await?;
    let uri = format!("/api/v1/shops/{}/products", shop_id);
    let body = json!({ "name": "Tea", "price": "1.00" });

    let res = app.post(&uri, Some(&rival_token), body.clone()).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized: You are not the admin for this shop");

    let res = app.post(&uri, Some(&student_token), body).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized: This is not an admin token");

    Ok(())
}

#[tokio::test]
async fn test_product_must_belong_to_path_shop() -> Result<()> {
    let app = TestApp::new();
    let (_, owner_token, shop_id) = app.shop_owner("owner@gmail.com").await?;
    let (_, rival_token, rival_shop) = app.shop_owner("rival@gmail.com").await?;
    let rival_product = app.product(&rival_shop, &rival_token, "3.00").await?;

    let res = app
        .put(
            &format!("/api/v1/shops/{}/products/{}", shop_id, rival_product),
            Some(&owner_token),
            json!({ "price": "0.01" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized: This product does not belong to the given shop");

    let res = app
        .delete(
            &format!("/api/v1/shops/{}/products/{}", shop_id, rival_product),
            Some(&owner_token),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get(&format!("/api/v1/products/{}", rival_product), None).await?;
    assert_eq!(res.body["price"], "3.00");

    Ok(())
}

#[tokio::test]
async fn test_update_and_delete_product() -> Result<()> {
    let app = TestApp::new();
    let (_, token, shop_id) = app.shop_owner("owner@gmail.com").await?;
    let product_id = app.product(&shop_id, &token, "2.00").await?;
    let uri = format!("/api/v1/shops/{}/products/{}", shop_id, product_id);

    let res = app.put(&uri, Some(&token), json!({ "is_in_sale": true, "discount": 10 })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["is_in_sale"], true);
    assert_eq!(res.body["discount"], 10);
    assert_eq!(res.body["name"], "Flat white");

    let res = app.delete(&uri, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(res.header("entity"), Some(product_id.as_str()));

    let res = app.get(&format!("/api/v1/products/{}", product_id), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_products_of_unknown_shop() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .get(&format!("/api/v1/shops/{}/products", uuid::Uuid::new_v4()), None)
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Shop not found");

    Ok(())
}
