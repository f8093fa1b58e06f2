//! E2E tests for the bearer-protected current-user endpoint.

use ab_test_utils::*;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_me_with_valid_token_returns_user() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestBridgeServer::spawn().await?;
    let client = reqwest::Client::new();
    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", server.url()))
        .json(&json!({"username": TEST_USER_BOB, "password": TEST_BOB_PASSWORD}))
        .send()
        .await?
        .json()
        .await?;
    let token = login["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("login returned no token"))?;

    // Act
    let response = client
        .get(format!("{}/api/auth/me", server.url()))
        .bearer_auth(token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body,
        json!({"username": TEST_USER_BOB, "message": "User authenticated"})
    );

    Ok(())
}

#[tokio::test]
async fn test_me_without_header_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;

    let response = reqwest::get(format!("{}/api/auth/me", server.url())).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer error=\"invalid_token\"")
    );
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");

    Ok(())
}

#[tokio::test]
async fn test_me_with_non_bearer_scheme_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let token = TestTokenBuilder::new().build();

    let response = reqwest::Client::new()
        .get(format!("{}/api/auth/me", server.url()))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_me_with_expired_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let token = TestTokenBuilder::new().expired_seconds_ago(1).build();

    let response = reqwest::Client::new()
        .get(format!("{}/api/auth/me", server.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["error"]["message"],
        "The access token is invalid or expired"
    );

    Ok(())
}

/// The subject comes from the verified token, never from the request.
#[tokio::test]
async fn test_me_does_not_trust_tampered_subject() -> Result<(), anyhow::Error> {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let server = TestBridgeServer::spawn().await?;
    let token = TestTokenBuilder::new().for_user(TEST_USER_BOB).build();

    let mut parts = token.split('.');
    let (header, payload, signature) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s)) => (h, p, s),
        _ => anyhow::bail!("token is not three segments"),
    };
    let claims = String::from_utf8(URL_SAFE_NO_PAD.decode(payload)?)?;
    let forged_payload = URL_SAFE_NO_PAD.encode(claims.replace("\"bob\"", "\"admin\""));
    let forged = format!("{header}.{forged_payload}.{signature}");

    let response = reqwest::Client::new()
        .get(format!("{}/api/auth/me", server.url()))
        .bearer_auth(forged)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
