//! E2E tests for the directory diagnostic routes.

use ab_service::directory::DirectoryError;
use ab_test_utils::*;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_ldap_connection_reports_status() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let url = format!("{}/api/test/ldap-connection", server.url());

    let up: serde_json::Value = reqwest::get(&url).await?.json().await?;
    assert_eq!(
        up,
        json!({"connected": true, "message": "LDAP connection successful"})
    );

    server.directory().set_unreachable(true);
    let down: serde_json::Value = reqwest::get(&url).await?.json().await?;
    assert_eq!(
        down,
        json!({"connected": false, "message": "LDAP connection failed"})
    );

    Ok(())
}

/// bob, carol and dave all come back; absent attributes are null.
#[tokio::test]
async fn test_sync_users_returns_every_entry() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;

    let body: serde_json::Value = reqwest::get(format!("{}/api/test/sync-users", server.url()))
        .await?
        .json()
        .await?;

    assert_eq!(body["count"], 3);
    assert_eq!(
        body["users"],
        json!([
            {"username": "bob", "email": "bob@x.com", "fullName": "Bob Jones", "firstName": null, "lastName": null},
            {"username": "carol", "email": null, "fullName": "Carol Lee", "firstName": null, "lastName": null},
            {"username": "dave", "email": "dave@x.com", "fullName": null, "firstName": null, "lastName": null},
        ])
    );
    assert_eq!(server.directory().open_sessions(), 0);

    Ok(())
}

#[tokio::test]
async fn test_sync_users_failure_returns_empty() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server
        .directory()
        .set_search_error(Some(DirectoryError::Unavailable("connection reset".to_string())));

    let response = reqwest::get(format!("{}/api/test/sync-users", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"count": 0, "users": []}));

    Ok(())
}

#[tokio::test]
async fn test_authenticate_diagnostic_takes_json_body() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/test/authenticate", server.url());

    let ok: serde_json::Value = client
        .post(&url)
        .json(&json!({"username": TEST_USER_ALICE, "password": TEST_ALICE_PASSWORD}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ok, json!({"authenticated": true, "username": TEST_USER_ALICE}));

    let rejected: serde_json::Value = client
        .post(&url)
        .json(&json!({"username": TEST_USER_ALICE, "password": "wrong"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(rejected["authenticated"], false);

    Ok(())
}

#[tokio::test]
async fn test_diagnostics_disabled_returns_404() -> Result<(), anyhow::Error> {
    let mut config = test_config();
    config.diagnostics_enabled = false;
    let server = TestBridgeServer::spawn_with(config, test_directory()).await?;

    for path in ["/api/test/ldap-connection", "/api/test/sync-users"] {
        let response = reqwest::get(format!("{}{}", server.url(), path)).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }
    assert_eq!(server.directory().opened_sessions(), 0);

    Ok(())
}
