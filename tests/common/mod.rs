#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use stakeout_api::config::AppConfig;
use stakeout_api::database::{MemoryStore, Store};
use stakeout_api::server::{app, AppState};

pub const PASSWORD: &str = "password";
pub const UK_MOBILE: &str = "07547775660";

/// The full router over a store, driven in-process
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `{"error": ...}` message, or "" for non-error bodies
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    pub fn id(&self) -> String {
        self.body["id"].as_str().unwrap_or_default().to_string()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    /// Over a fresh in-memory store
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let state = AppState::new(AppConfig::testing(), store).expect("test hasher params are valid");
        let router = app(state.clone());
        Self { state, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("failed to read body")?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };

        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register a student and log them in. Returns (id, token).
    pub async fn student(&self, email: &str) -> Result<(String, String)> {
        let res = self
            .post(
                "/api/v1/students",
                None,
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "first_name": "Test",
                    "country": "GB",
                    "mobile_number": UK_MOBILE,
                }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "student create: {}", res.body);

        let token = self.login("/api/v1/login", email).await?;
        Ok((res.id(), token))
    }

    /// Register an admin and log them in. Returns (id, token).
    pub async fn admin(&self, email: &str) -> Result<(String, String)> {
        let res = self
            .post("/api/v1/admins", None, json!({ "email": email, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "admin create: {}", res.body);

        let token = self.login("/api/v1/admins/login", email).await?;
        Ok((res.id(), token))
    }

    pub async fn login(&self, uri: &str, email: &str) -> Result<String> {
        let res = self
            .post(uri, None, json!({ "email": email, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login: {}", res.body);
        Ok(res.body["token"].as_str().unwrap_or_default().to_string())
    }

    /// Open a shop for the admin. Returns the shop id.
    pub async fn shop(&self, admin_id: &str, token: &str) -> Result<String> {
        let res = self
            .post(&format!("/api/v1/admins/{}/shops", admin_id), Some(token), shop_body())
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "shop create: {}", res.body);
        Ok(res.id())
    }

    /// Add a product to the shop. Returns the product id.
    pub async fn product(&self, shop_id: &str, token: &str, price: &str) -> Result<String> {
        let res = self
            .post(
                &format!("/api/v1/shops/{}/products", shop_id),
                Some(token),
                json!({ "name": "Flat white", "price": price }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "product create: {}", res.body);
        Ok(res.id())
    }

    /// Put an admin on a shop straight through the store. Over HTTP an admin
    /// only gains a shop by opening it.
    pub async fn assign_shop(&self, admin_id: &str, shop_id: &str) -> Result<()> {
        let mut unit = self.state.store.begin().await?;
        let tables = unit.tables();
        let mut admin = tables
            .find_admin(admin_id.parse()?)
            .await?
            .context("admin does not exist")?;
        admin.shop_id = Some(shop_id.parse()?);
        tables.update_admin(&admin).await?;
        unit.commit().await?;
        Ok(())
    }

    /// An admin running a fresh shop. Returns (admin id, token, shop id).
    pub async fn shop_owner(&self, email: &str) -> Result<(String, String, String)> {
        let (admin_id, token) = self.admin(email).await?;
        let shop_id = self.shop(&admin_id, &token).await?;
        Ok((admin_id, token, shop_id))
    }
}

pub fn shop_body() -> Value {
    json!({
        "name": "Some random shop",
        "description": "Random shop for testing",
        "postcode": "G12 8BY",
        "number": 8,
        "address_1": "Amar Street",
        "town_or_city": "Glasgow",
    })
}
