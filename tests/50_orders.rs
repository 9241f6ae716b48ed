use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::TestApp;

struct Market {
    app: TestApp,
    shop_id: String,
    owner_token: String,
    products: Vec<String>,
    student_id: String,
    student_token: String,
}

async fn market() -> Result<Market> {
    let app = TestApp::new();
    let (_, owner_token, shop_id) = app.shop_owner("owner@gmail.com").await?;
    let products = vec![
        app.product(&shop_id, &owner_token, "3.50").await?,
        app.product(&shop_id, &owner_token, "1.25").await?,
    ];
    let (student_id, student_token) = app.student("student@gmail.com").await?;

    Ok(Market { app, shop_id, owner_token, products, student_id, student_token })
}

impl Market {
    fn items(&self) -> serde_json::Value {
        json!(self.products.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>())
    }

    async fn place(&self) -> Result<String> {
        let res = self
            .app
            .post(
                &format!("/api/v1/students/{}/orders", self.student_id),
                Some(&self.student_token),
                json!({ "shop_id": self.shop_id, "ordered_items": self.items() }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "order create: {}", res.body);
        Ok(res.id())
    }
}

#[tokio::test]
async fn test_student_places_order() -> Result<()> {
    let m = market().await?;

    let res = m
        .app
        .post(
            &format!("/api/v1/students/{}/orders", m.student_id),
            Some(&m.student_token),
            json!({ "shop_id": m.shop_id, "ordered_items": m.items() }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let order_id = res.id();
    assert_eq!(
        res.header("location"),
        Some(format!("/api/v1/orders/{}", order_id).as_str())
    );
    assert_eq!(res.body["total_price"], "4.75");
    assert_eq!(res.body["status"], "pending");
    assert_eq!(res.body["ordered_by"]["id"], m.student_id.as_str());
    assert_eq!(res.body["ordered_from"]["id"], m.shop_id.as_str());
    assert_eq!(res.body["ordered_items"].as_array().map(Vec::len), Some(2));
    assert_eq!(res.body["ordered_items"][0]["id"], m.products[0].as_str());

    let res = m
        .app
        .get(&format!("/api/v1/students/{}/orders", m.student_id), Some(&m.student_token))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_order_validation() -> Result<()> {
    let m = market().await?;
    let uri = format!("/api/v1/students/{}/orders", m.student_id);

    let res = m.app.post(&uri, Some(&m.student_token), json!({ "ordered_items": m.items() })).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Required shop");

    let res = m.app.post(&uri, Some(&m.student_token), json!({ "shop_id": m.shop_id })).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Required order items");

    let res = m
        .app
        .post(
            &uri,
            Some(&m.student_token),
            json!({ "shop_id": m.shop_id, "ordered_items": [{ "id": uuid::Uuid::new_v4() }] }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Product not found");

    Ok(())
}

#[tokio::test]
async fn test_items_must_come_from_the_ordered_shop() -> Result<()> {
    let m = market().await?;
    let (_, other_token, other_shop) = m.app.shop_owner("other@gmail.com").await?;
    let foreign = m.app.product(&other_shop, &other_token, "9.99").await?;

    let res = m
        .app
        .post(
            &format!("/api/v1/students/{}/orders", m.student_id),
            Some(&m.student_token),
            json!({ "shop_id": m.shop_id, "ordered_items": [{ "id": m.products[0] }, { "id": foreign }] }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Product is not sold by this shop");

    Ok(())
}

#[tokio::test]
async fn test_students_only_order_for_themselves() -> Result<()> {
    let m = market().await?;
    let (_, other_token) = m.app.student("other@gmail.com").await?;

    let res = m
        .app
        .post(
            &format!("/api/v1/students/{}/orders", m.student_id),
            Some(&other_token),
            json!({ "shop_id": m.shop_id, "ordered_items": m.items() }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized");

    let res = m
        .app
        .get(&format!("/api/v1/students/{}/orders", m.student_id), Some(&other_token))
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_order_readers() -> Result<()> {
    let m = market().await?;
    let order_id = m.place().await?;
    let uri = format!("/api/v1/orders/{}", order_id);
    let (_, other_student) = m.app.student("other@gmail.com").await?;
    let (_, other_admin, _) = m.app.shop_owner("other-owner@gmail.com").await?;

    let res = m.app.get(&uri, Some(&m.student_token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["id"], order_id.as_str());

    let res = m.app.get(&uri, Some(&m.owner_token)).await?;
    assert_eq!(res.status, StatusCode::OK);

    for token in [&other_student, &other_admin] {
        let res = m.app.get(&uri, Some(token)).await?;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.error(), "Unauthorized");
    }

    let res = m.app.get("/api/v1/orders", Some(&m.student_token)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized: This is not an admin token");

    let res = m.app.get("/api/v1/orders", Some(&other_admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));

    let res = m.app.get(&format!("/api/v1/shops/{}/orders", m.shop_id), Some(&other_admin)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized: You are not the admin for this shop");

    let res = m.app.get(&format!("/api/v1/shops/{}/orders", m.shop_id), Some(&m.owner_token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_shop_admin_moves_order_status() -> Result<()> {
    let m = market().await?;
    let order_id = m.place().await?;
    let uri = format!("/api/v1/shops/{}/orders/{}", m.shop_id, order_id);

    let res = m.app.put(&uri, Some(&m.owner_token), json!({})).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Required order status");

    let res = m.app.put(&uri, Some(&m.owner_token), json!({ "status": "paid", "total_price": "0.01" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "paid");
    assert_eq!(res.body["total_price"], "4.75");

    let res = m.app.delete(&uri, Some(&m.owner_token)).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(res.header("entity"), Some(order_id.as_str()));

    let res = m.app.get(&format!("/api/v1/orders/{}", order_id), Some(&m.student_token)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Order not found");

    Ok(())
}

#[tokio::test]
async fn test_order_must_belong_to_path_shop() -> Result<()> {
    let m = market().await?;
    let order_id = m.place().await?;
    let (_, other_token, other_shop) = m.app.shop_owner("other@gmail.com").await?;

    let res = m
        .app
        .put(
            &format!("/api/v1/shops/{}/orders/{}", other_shop, order_id),
            Some(&other_token),
            json!({ "status": "cancelled" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "Unauthorized: This order does not belong to the given shop");

    Ok(())
}

#[tokio::test]
async fn test_order_keeps_items_after_product_removed() -> Result<()> {
    let m = market().await?;
    let order_id = m.place().await?;

    let res = m
        .app
        .delete(
            &format!("/api/v1/shops/{}/products/{}", m.shop_id, m.products[0]),
            Some(&m.owner_token),
        )
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = m.app.get(&format!("/api/v1/orders/{}", order_id), Some(&m.student_token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["ordered_items"].as_array().map(Vec::len), Some(2));
    assert_eq!(res.body["total_price"], "4.75");

    Ok(())
}
