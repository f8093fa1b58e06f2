//! Delegated authentication against the directory.
//!
//! A password is verified by binding to the directory as the user; this
//! service never compares or stores it. Every operation opens its own
//! session and releases it on every exit path.

use crate::config::DirectoryConfig;
use crate::directory::{AuthOutcome, DirectoryConnector, DirectoryError, DirectorySession};
use crate::models::DirectoryEntry;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_directory_operation;
use common::secret::{ExposeSecret, SecretString};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Longest username accepted before contacting the directory.
pub const MAX_USERNAME_BYTES: usize = 256;

/// Attributes requested by [`DirectoryAuthenticator::sync_users`].
pub const USER_ATTRIBUTES: [&str; 5] = ["uid", "cn", "mail", "givenName", "sn"];

pub struct DirectoryAuthenticator {
    connector: Arc<dyn DirectoryConnector>,
    base_dn: String,
    bind_dn: String,
    bind_password: SecretString,
    user_dn_template: String,
    user_filter: String,
}

impl DirectoryAuthenticator {
    pub fn new(connector: Arc<dyn DirectoryConnector>, config: &DirectoryConfig) -> Self {
        Self {
            connector,
            base_dn: config.base_dn.clone(),
            bind_dn: config.bind_dn.clone(),
            bind_password: config.bind_password.clone(),
            user_dn_template: config.user_dn_template.clone(),
            user_filter: config.user_filter.clone(),
        }
    }

    /// DN for `username`: the template with `{base_dn}` filled first, then
    /// `{username}` with the value escaped per RFC 4514.
    pub fn user_dn(&self, username: &str) -> String {
        self.user_dn_template
            .replace("{base_dn}", &self.base_dn)
            .replace("{username}", &ldap3::dn_escape(username))
    }

    /// Returns true iff the directory accepted the bind as this user.
    pub async fn authenticate(&self, username: &str, password: &SecretString) -> bool {
        self.authenticate_detailed(username, password)
            .await
            .is_success()
    }

    /// Same as [`authenticate`](Self::authenticate) but keeps the failure
    /// class for logging and metrics.
    #[instrument(skip_all, fields(user = %hash_for_correlation(username)))]
    pub async fn authenticate_detailed(
        &self,
        username: &str,
        password: &SecretString,
    ) -> AuthOutcome {
        let start = Instant::now();

        let outcome = if let Some(reason) = reject_before_bind(username, password) {
            tracing::debug!(target: "ab.service.directory", reason, "Credential rejected before bind");
            AuthOutcome::InvalidCredential
        } else {
            let dn = self.user_dn(username);
            let result = self
                .scoped(|mut session| async move {
                    let result = session.bind(&dn, password).await;
                    (session, result)
                })
                .await;

            if let Err(e) = &result {
                tracing::debug!(target: "ab.service.directory", error = %e, "User bind failed");
            }
            AuthOutcome::from(result)
        };

        tracing::info!(
            target: "ab.service.directory",
            outcome = outcome.as_str(),
            "Authentication attempt completed"
        );
        record_directory_operation("authenticate", outcome.as_str(), start.elapsed());

        outcome
    }

    /// Bind with the service identity. Diagnostic only.
    pub async fn test_connection(&self) -> bool {
        self.test_connection_detailed().await.is_success()
    }

    #[instrument(skip_all)]
    pub async fn test_connection_detailed(&self) -> AuthOutcome {
        let start = Instant::now();
        let bind_dn = self.bind_dn.as_str();
        let bind_password = &self.bind_password;

        let result = self
            .scoped(|mut session| async move {
                let result = session.bind(bind_dn, bind_password).await;
                (session, result)
            })
            .await;

        if let Err(e) = &result {
            tracing::warn!(target: "ab.service.directory", error = %e, "Directory connection test failed");
        }

        let outcome = AuthOutcome::from(result);
        record_directory_operation("test_connection", outcome.as_str(), start.elapsed());
        outcome
    }

    /// Read every person entry under the base DN.
    ///
    /// Any failure (connect, service bind, search) yields an empty list;
    /// partial results are never returned.
    #[instrument(skip_all)]
    pub async fn sync_users(&self) -> Vec<DirectoryEntry> {
        let start = Instant::now();
        let bind_dn = self.bind_dn.as_str();
        let bind_password = &self.bind_password;
        let base_dn = self.base_dn.as_str();
        let filter = self.user_filter.as_str();

        let result = self
            .scoped(|mut session| async move {
                let result = match session.bind(bind_dn, bind_password).await {
                    Ok(()) => session.search(base_dn, filter, &USER_ATTRIBUTES).await,
                    Err(e) => Err(e),
                };
                (session, result)
            })
            .await;

        let outcome = match &result {
            Ok(_) => AuthOutcome::Success,
            Err(e) => AuthOutcome::from(e),
        };
        record_directory_operation("sync_users", outcome.as_str(), start.elapsed());

        match result {
            Ok(records) => {
                tracing::info!(
                    target: "ab.service.directory",
                    count = records.len(),
                    "Directory user sync completed"
                );
                records.iter().map(DirectoryEntry::from).collect()
            }
            Err(e) => {
                tracing::warn!(target: "ab.service.directory", error = %e, "Directory user sync failed");
                Vec::new()
            }
        }
    }

    /// Open a session, run `op`, then close the session.
    ///
    /// `op` hands the session back with its result so the close happens
    /// here on every path. If `op` panics or the future is dropped, the
    /// session's own `Drop` releases the transport.
    async fn scoped<T, F, Fut>(&self, op: F) -> Result<T, DirectoryError>
    where
        F: FnOnce(Box<dyn DirectorySession>) -> Fut,
        Fut: Future<Output = (Box<dyn DirectorySession>, Result<T, DirectoryError>)>,
    {
        let session = self.connector.connect().await?;
        let (mut session, result) = op(session).await;
        session.close().await;
        result
    }
}

/// Inputs that must never reach a bind. An empty password would be an
/// anonymous bind, which most directories accept.
fn reject_before_bind(username: &str, password: &SecretString) -> Option<&'static str> {
    if username.is_empty() {
        Some("empty_username")
    } else if username.len() > MAX_USERNAME_BYTES {
        Some("username_too_long")
    } else if password.expose_secret().is_empty() {
        Some("empty_password")
    } else {
        None
    }
}
