mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn missing_or_forged_tokens_are_unauthorized() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/me", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing Authorization header");

    let (status, _) = app.get("/api/me", "not.a.jwt").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn new_identity_needs_onboarding() -> Result<()> {
    let app = TestApp::new();
    let token = app.token("user_new");

    let (status, body) = app.get("/api/me", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "needsOnboarding": true }));

    let (status, body) = app.get("/api/products", &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Onboarding required");
    Ok(())
}

#[tokio::test]
async fn onboarding_makes_caller_admin() -> Result<()> {
    let app = TestApp::new();
    let (token, org_id) = app.onboard_admin("user_1", "Acme Metals").await?;

    let (status, body) = app.get("/api/me", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["needsOnboarding"], false);
    assert_eq!(body["data"]["organizationRole"], "admin");
    assert_eq!(body["data"]["organizationId"], org_id.as_str());
    assert_eq!(body["data"]["isActive"], true);
    Ok(())
}

#[tokio::test]
async fn second_onboarding_conflicts() -> Result<()> {
    let app = TestApp::new();
    let (token, _) = app.onboard_admin("user_1", "Acme").await?;

    let (status, body) = app.post("/api/onboarding", &token, json!({ "organization": { "name": "Other" } })).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);
    Ok(())
}

#[tokio::test]
async fn onboarding_validates_organization() -> Result<()> {
    let app = TestApp::new();
    let token = app.token("user_1");

    let (status, body) = app.post("/api/onboarding", &token, json!({ "organization": { "website": "x" } })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fieldErrors"]["name"], "This field is required");
    Ok(())
}
