use anyhow::Result;
use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use stakeout_api::auth::TokenService;
use stakeout_api::types::Role;

mod common;
use common::{TestApp, PASSWORD};

#[tokio::test]
async fn test_student_login_issues_usable_token() -> Result<()> {
    let app = TestApp::new();
    let (id, token) = app.student("student@gmail.com").await?;

    let claims = app.state.tokens.validate(&token)?;
    assert_eq!(claims.sub, id);
    assert_eq!(claims.role, Role::Student);

    let res = app
        .put(&format!("/api/v1/students/{}", id), Some(&token), json!({ "last_name": "Amar" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_admin_login_issues_admin_token() -> Result<()> {
    let app = TestApp::new();
    let (id, token) = app.admin("admin@gmail.com").await?;

    let claims = app.state.tokens.validate(&token)?;
    assert_eq!(claims.sub, id);
    assert_eq!(claims.role, Role::Admin);

    Ok(())
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() -> Result<()> {
    let app = TestApp::new();
    app.student("student@gmail.com").await?;

    let res = app
        .post("/api/v1/login", None, json!({ "email": "student@gmail.com", "password": "wrong" }))
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Incorrect email or password");

    let res = app
        .post("/api/v1/login", None, json!({ "email": "nobody@gmail.com", "password": PASSWORD }))
        .await?;
    assert_eq!(res.error(), "Incorrect email or password");

    // Students are not admins
    let res = app
        .post("/api/v1/admins/login", None, json!({ "email": "student@gmail.com", "password": PASSWORD }))
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Incorrect email or password");

    Ok(())
}

#[tokio::test]
async fn test_login_validation() -> Result<()> {
    let app = TestApp::new();

    let res = app.post("/api/v1/login", None, json!({ "password": PASSWORD })).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Required Email");

    let res = app.post("/api/v1/login", None, json!({ "email": "student@gmail.com" })).await?;
    assert_eq!(res.error(), "Required Password");

    let res = app
        .post("/api/v1/login", None, json!({ "email": "studentgmail.com", "password": PASSWORD }))
        .await?;
    assert_eq!(res.error(), "Invalid Email");

    Ok(())
}

#[tokio::test]
async fn test_token_problems() -> Result<()> {
    let app = TestApp::new();
    let (id, _) = app.student("student@gmail.com").await?;
    let uri = format!("/api/v1/students/{}", id);
    let body = json!({ "first_name": "Nope" });

    let res = app.put(&uri, None, body.clone()).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Missing auth token");

    let res = app.put(&uri, Some("garbage"), body.clone()).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "token contains an invalid number of segments");

    let foreign = TokenService::new("some-other-secret", Duration::hours(1)).issue(&id, Role::Student)?;
    let res = app.put(&uri, Some(&foreign), body.clone()).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "signature is invalid");

    let expired = app.state.tokens.issue_with_ttl(&id, Role::Student, Duration::hours(-2))?;
    let res = app.put(&uri, Some(&expired), body).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error(), "token is expired");

    Ok(())
}

#[tokio::test]
async fn test_token_checked_before_identifier() -> Result<()> {
    let app = TestApp::new();

    let res = app.delete("/api/v1/students/1234", None).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Missing auth token");

    let (_, token) = app.student("student@gmail.com").await?;
    let res = app.delete("/api/v1/students/1234", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.error(), "Invalid identifier: 1234");

    Ok(())
}

#[tokio::test]
async fn test_home_and_health() -> Result<()> {
    let app = TestApp::new();

    let res = app.get("/api/v1", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!("Welcome To This Awesome API"));

    let res = app.get("/api/v1/health", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");

    Ok(())
}
