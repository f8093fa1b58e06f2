//! Directory access layer.
//!
//! The directory is reached through two small traits so that the
//! authenticator can run against a real LDAP server ([`ldap::LdapConnector`])
//! or an in-memory fixture ([`mock::FakeDirectory`]).
//!
//! A [`DirectorySession`] is a single connection. It is never pooled or
//! shared: every authenticate/search/test operation opens one, uses it, and
//! closes it.

pub mod ldap;
pub mod mock;

use common::secret::SecretString;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// LDAP result code for a failed bind with a wrong password or unknown DN.
pub const LDAP_RC_INVALID_CREDENTIALS: u32 = 49;

/// Internal classification of a directory failure.
///
/// Never returned across the authenticator boundary; see [`AuthOutcome`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The server rejected the bind credentials (result code 49).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The server could not be reached, the connection dropped, or an
    /// operation timed out.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// The server answered with an unexpected result code or malformed data.
    #[error("directory protocol error: {0}")]
    Protocol(String),
}

/// Tagged result of a bind attempt.
///
/// Converted to a plain boolean at the public boundary so callers cannot
/// tell "bad password" from "directory down"; the tag is kept for logs and
/// metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    InvalidCredential,
    DirectoryUnavailable,
    ProtocolError,
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthOutcome::Success => "success",
            AuthOutcome::InvalidCredential => "invalid_credential",
            AuthOutcome::DirectoryUnavailable => "directory_unavailable",
            AuthOutcome::ProtocolError => "protocol_error",
        }
    }
}

impl From<&DirectoryError> for AuthOutcome {
    fn from(err: &DirectoryError) -> Self {
        match err {
            DirectoryError::InvalidCredentials => AuthOutcome::InvalidCredential,
            DirectoryError::Unavailable(_) => AuthOutcome::DirectoryUnavailable,
            DirectoryError::Protocol(_) => AuthOutcome::ProtocolError,
        }
    }
}

impl From<Result<(), DirectoryError>> for AuthOutcome {
    fn from(result: Result<(), DirectoryError>) -> Self {
        match result {
            Ok(()) => AuthOutcome::Success,
            Err(ref e) => AuthOutcome::from(e),
        }
    }
}

/// A raw entry returned by a directory search.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryRecord {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    /// Builder-style attribute insertion (mainly for fixtures).
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    /// First value of an attribute. Attribute names compare case-insensitively.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// DN is a directory locator and may name a person; only the attribute
/// names are printed.
impl fmt::Debug for DirectoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.attrs.keys().collect();
        names.sort();
        f.debug_struct("DirectoryRecord")
            .field("dn", &"[REDACTED]")
            .field("attrs", &names)
            .finish()
    }
}

/// Opens connections to the directory.
#[async_trait::async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Open a fresh, unauthenticated connection.
    async fn connect(&self) -> Result<Box<dyn DirectorySession>, DirectoryError>;
}

/// One live directory connection.
///
/// Implementations must release their transport on `Drop` as well as on
/// [`close`](DirectorySession::close), so a session abandoned on an error
/// path never leaks.
#[async_trait::async_trait]
pub trait DirectorySession: Send {
    /// Simple bind. Success means the directory accepted `password` for `dn`.
    async fn bind(&mut self, dn: &str, password: &SecretString) -> Result<(), DirectoryError>;

    /// Subtree search under `base` returning the requested attributes.
    ///
    /// A search that does not complete with a success result yields an
    /// error and no entries.
    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<DirectoryRecord>, DirectoryError>;

    /// Unbind and close the connection.
    async fn close(&mut self);
}
