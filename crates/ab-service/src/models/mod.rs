use crate::directory::DirectoryRecord;
use common::secret::SecretString;
use serde::{Deserialize, Serialize};

/// A user record read from the directory.
///
/// Every field is optional: a missing attribute is `None`, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<&DirectoryRecord> for DirectoryEntry {
    fn from(record: &DirectoryRecord) -> Self {
        let attr = |name: &str| record.first(name).map(str::to_string);
        Self {
            username: attr("uid"),
            email: attr("mail"),
            full_name: attr("cn"),
            first_name: attr("givenName"),
            last_name: attr("sn"),
        }
    }
}

/// Login request body.
///
/// Both fields are optional at the wire level so a missing field is
/// reported as 400 rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub username: String,
    pub message: String,
}

/// Validation request. A missing or `null` token is answered as invalid,
/// not rejected.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Validation response. `username` is present only when `valid` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub username: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTestResponse {
    pub connected: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncUsersResponse {
    pub count: usize,
    pub users: Vec<DirectoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateTestResponse {
    pub authenticated: bool,
    pub username: String,
}
