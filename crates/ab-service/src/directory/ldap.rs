//! LDAP implementation of the directory traits, backed by `ldap3`.

use super::{
    DirectoryConnector, DirectoryError, DirectoryRecord, DirectorySession,
    LDAP_RC_INVALID_CREDENTIALS,
};
use crate::config::{DirectoryConfig, TransportSecurity};
use common::secret::{ExposeSecret, SecretString};
use ldap3::{LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};
use std::time::Duration;
use tracing::instrument;

/// Opens one `ldap3` connection per call, honoring the configured URL
/// (including its port), transport security and timeouts.
#[derive(Debug, Clone)]
pub struct LdapConnector {
    url: String,
    transport: TransportSecurity,
    tls_no_verify: bool,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

impl LdapConnector {
    pub fn new(config: &DirectoryConfig) -> Self {
        Self {
            url: config.url.clone(),
            transport: config.transport,
            tls_no_verify: config.tls_no_verify,
            connect_timeout: config.connect_timeout,
            operation_timeout: config.operation_timeout,
        }
    }

    fn settings(&self) -> LdapConnSettings {
        LdapConnSettings::new()
            .set_conn_timeout(self.connect_timeout)
            .set_starttls(self.transport == TransportSecurity::StartTls)
            .set_no_tls_verify(self.tls_no_verify)
    }
}

#[async_trait::async_trait]
impl DirectoryConnector for LdapConnector {
    #[instrument(skip_all, fields(transport = self.transport.as_str()))]
    async fn connect(&self) -> Result<Box<dyn DirectorySession>, DirectoryError> {
        let (conn, ldap) = LdapConnAsync::with_settings(self.settings(), &self.url)
            .await
            .map_err(|e| classify(&e))?;

        // The driver task ends once every `Ldap` handle is dropped, so the
        // socket lifetime is tied to the session below.
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::debug!(target: "ab.directory.ldap", error = %e, "LDAP connection driver exited with error");
            }
        });

        Ok(Box::new(LdapSession {
            ldap: Some(ldap),
            operation_timeout: self.operation_timeout,
        }))
    }
}

/// A single LDAP connection. Dropping it drops the `Ldap` handle, which
/// terminates the driver task and closes the socket.
struct LdapSession {
    ldap: Option<ldap3::Ldap>,
    operation_timeout: Duration,
}

impl LdapSession {
    fn handle(&mut self) -> Result<&mut ldap3::Ldap, DirectoryError> {
        self.ldap
            .as_mut()
            .ok_or_else(|| DirectoryError::Unavailable("session already closed".to_string()))
    }
}

#[async_trait::async_trait]
impl DirectorySession for LdapSession {
    async fn bind(&mut self, dn: &str, password: &SecretString) -> Result<(), DirectoryError> {
        let timeout = self.operation_timeout;
        let ldap = self.handle()?;

        ldap.with_timeout(timeout)
            .simple_bind(dn, password.expose_secret())
            .await
            .and_then(|result| result.success())
            .map(|_| ())
            .map_err(|e| classify(&e))
    }

    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        let timeout = self.operation_timeout;
        let ldap = self.handle()?;

        let (entries, _result) = ldap
            .with_timeout(timeout)
            .search(base, Scope::Subtree, filter, attrs.to_vec())
            .await
            .and_then(|result| result.success())
            .map_err(|e| classify(&e))?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let entry = SearchEntry::construct(entry);
                DirectoryRecord {
                    dn: entry.dn,
                    attrs: entry.attrs,
                }
            })
            .collect())
    }

    async fn close(&mut self) {
        if let Some(mut ldap) = self.ldap.take() {
            if let Err(e) = ldap.unbind().await {
                tracing::debug!(target: "ab.directory.ldap", error = %e, "LDAP unbind failed");
            }
        }
    }
}

/// Map an `ldap3` error onto the internal failure classes.
fn classify(err: &LdapError) -> DirectoryError {
    match err {
        LdapError::LdapResult { result } if result.rc == LDAP_RC_INVALID_CREDENTIALS => {
            DirectoryError::InvalidCredentials
        }
        LdapError::LdapResult { result } => {
            DirectoryError::Protocol(format!("result code {}: {}", result.rc, result.text))
        }
        LdapError::Io { .. } | LdapError::Timeout { .. } | LdapError::EndOfStream => {
            DirectoryError::Unavailable(err.to_string())
        }
        other => DirectoryError::Protocol(other.to_string()),
    }
}
