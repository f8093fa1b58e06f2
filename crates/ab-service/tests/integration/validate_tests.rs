//! E2E tests for token validation.

use ab_test_utils::*;
use reqwest::StatusCode;
use serde_json::json;

async fn validate(
    server: &TestBridgeServer,
    token: &str,
) -> Result<serde_json::Value, anyhow::Error> {
    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/validate", server.url()))
        .json(&json!({ "token": token }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(response.json().await?)
}

async fn login_token(server: &TestBridgeServer) -> Result<String, anyhow::Error> {
    let body: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/auth/login", server.url()))
        .json(&json!({"username": TEST_USER_ALICE, "password": TEST_ALICE_PASSWORD}))
        .send()
        .await?
        .json()
        .await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("login returned no token"))
}

#[tokio::test]
async fn test_validate_issued_token_is_valid() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let token = login_token(&server).await?;

    // Idempotent: repeated validation gives the same answer
    for _ in 0..3 {
        let body = validate(&server, &token).await?;
        assert_eq!(body, json!({"valid": true, "username": TEST_USER_ALICE}));
    }

    Ok(())
}

#[tokio::test]
async fn test_validate_expired_token_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let token = TestTokenBuilder::new().expired_seconds_ago(60).build();

    let body = validate(&server, &token).await?;

    assert_eq!(body, json!({"valid": false}));
    Ok(())
}

#[tokio::test]
async fn test_validate_foreign_secret_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .signed_with("some-other-secret-that-is-long-enough-0000")
        .build();

    let body = validate(&server, &token).await?;

    assert_eq!(body, json!({"valid": false}));
    Ok(())
}

#[tokio::test]
async fn test_validate_future_iat_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let now = chrono::Utc::now().timestamp();
    let token = TestTokenBuilder::new()
        .issued_at(now + 3600)
        .expires_at(now + 7200)
        .build();

    let body = validate(&server, &token).await?;

    assert_eq!(body["valid"], false);
    Ok(())
}

#[tokio::test]
async fn test_validate_garbage_and_missing_token() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;

    for token in ["", "garbage", "a.b.c"] {
        assert_eq!(validate(&server, token).await?, json!({"valid": false}));
    }

    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/validate", server.url()))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>().await?["valid"], false);

    Ok(())
}

/// `{"token": null}` gets the same answer as a bad token, not a 422.
#[tokio::test]
async fn test_validate_null_token_is_invalid() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestBridgeServer::spawn().await?;

    // Act
    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/validate", server.url()))
        .json(&json!({ "token": null }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<serde_json::Value>().await?,
        json!({"valid": false})
    );

    Ok(())
}

#[tokio::test]
async fn test_validate_oversized_token_is_invalid() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let token = format!("{}.{}.{}", "a".repeat(4000), "b".repeat(4000), "c".repeat(400));

    assert_eq!(validate(&server, &token).await?, json!({"valid": false}));
    Ok(())
}
