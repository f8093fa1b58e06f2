//! E2E tests for the login flow.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use ab_test_utils::*;
use reqwest::StatusCode;
use serde_json::json;

async fn login(
    server: &TestBridgeServer,
    body: serde_json::Value,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}/api/auth/login", server.url()))
        .json(&body)
        .send()
        .await?)
}

/// Correct directory password yields a signed token for that user.
#[tokio::test]
async fn test_login_valid_credentials_returns_token() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestBridgeServer::spawn().await?;

    // Act
    let response = login(
        &server,
        json!({"username": TEST_USER_ALICE, "password": TEST_ALICE_PASSWORD}),
    )
    .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["username"], TEST_USER_ALICE);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], TEST_TOKEN_LIFETIME_SECONDS);
    assert_eq!(body["message"], "Authentication successful");

    let token = body["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("token missing"))?
        .to_string();
    token
        .assert_valid_jwt()
        .assert_for_subject(TEST_USER_ALICE)
        .assert_lifetime(TEST_TOKEN_LIFETIME_SECONDS)
        .assert_expires_in(TEST_TOKEN_LIFETIME_SECONDS as u64);

    assert_eq!(server.directory().open_sessions(), 0);
    Ok(())
}

/// Wrong password, unknown user and directory outage look identical.
#[tokio::test]
async fn test_login_failures_return_same_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;

    let wrong_password = login(
        &server,
        json!({"username": TEST_USER_ALICE, "password": "not-it"}),
    )
    .await?;
    let unknown_user = login(
        &server,
        json!({"username": "mallory", "password": TEST_ALICE_PASSWORD}),
    )
    .await?;
    server.directory().set_unreachable(true);
    let directory_down = login(
        &server,
        json!({"username": TEST_USER_ALICE, "password": TEST_ALICE_PASSWORD}),
    )
    .await?;

    let mut bodies = Vec::new();
    for response in [wrong_password, unknown_user, directory_down] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(response.json::<serde_json::Value>().await?);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[1], bodies[2]);
    assert_eq!(bodies[0]["success"], false);
    assert_eq!(bodies[0]["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(bodies[0]["error"]["message"], "Invalid credentials");

    Ok(())
}

#[tokio::test]
async fn test_login_missing_fields_returns_400() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;

    for (body, message) in [
        (json!({"password": TEST_ALICE_PASSWORD}), "Username is required"),
        (json!({"username": "", "password": TEST_ALICE_PASSWORD}), "Username is required"),
        (json!({"username": TEST_USER_ALICE}), "Password is required"),
        (json!({"username": TEST_USER_ALICE, "password": ""}), "Password is required"),
    ] {
        let response = login(&server, body).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"]["message"], message);
    }

    // None of these reached the directory
    assert_eq!(server.directory().opened_sessions(), 0);
    Ok(())
}

/// A DN-injection attempt does not bind as the injected DN.
#[tokio::test]
async fn test_login_dn_injection_rejected() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    // Would resolve to alice's DN if the comma were not escaped
    server.directory().add_credential(
        "uid=x,uid=alice,ou=users,dc=example,dc=org",
        "injected",
    );

    let response = login(
        &server,
        json!({"username": "x,uid=alice", "password": "injected"}),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_login_concurrent_requests_each_release_session() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/auth/login", server.url());

    let mut handles = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            let (user, password) = if i % 2 == 0 {
                (TEST_USER_ALICE, TEST_ALICE_PASSWORD)
            } else {
                (TEST_USER_BOB, TEST_BOB_PASSWORD)
            };
            client
                .post(url)
                .json(&json!({"username": user, "password": password}))
                .send()
                .await
                .map(|r| r.status())
        }));
    }

    for handle in handles {
        assert_eq!(handle.await??, StatusCode::OK);
    }
    assert_eq!(server.directory().opened_sessions(), 10);
    assert_eq!(server.directory().open_sessions(), 0);

    Ok(())
}
