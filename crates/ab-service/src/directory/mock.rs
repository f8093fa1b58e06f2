//! In-memory directory for tests.
//!
//! `FakeDirectory` accepts binds for registered DNs, returns a fixed set of
//! entries from searches, and can be switched into failure modes. It counts
//! opened and released sessions so tests can assert that every code path
//! gives its connection back.

use super::{DirectoryConnector, DirectoryError, DirectoryRecord, DirectorySession};
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct FakeState {
    credentials: RwLock<HashMap<String, String>>,
    entries: RwLock<Vec<DirectoryRecord>>,
    unreachable: AtomicBool,
    search_error: RwLock<Option<DirectoryError>>,
    bind_error: RwLock<Option<DirectoryError>>,
    opened: AtomicUsize,
    released: AtomicUsize,
    binds: AtomicUsize,
    searches: AtomicUsize,
}

/// Fake directory connector. Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Arc<FakeState>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `password` for a bind as `dn`.
    pub fn with_credential(self, dn: &str, password: &str) -> Self {
        self.add_credential(dn, password);
        self
    }

    /// Add an entry returned by every search.
    pub fn with_entry(self, record: DirectoryRecord) -> Self {
        self.add_entry(record);
        self
    }

    pub fn add_credential(&self, dn: &str, password: &str) {
        if let Ok(mut creds) = self.state.credentials.write() {
            creds.insert(dn.to_string(), password.to_string());
        }
    }

    pub fn add_entry(&self, record: DirectoryRecord) {
        if let Ok(mut entries) = self.state.entries.write() {
            entries.push(record);
        }
    }

    /// Refuse every connection attempt.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Make searches fail with `error` (or succeed again with `None`).
    pub fn set_search_error(&self, error: Option<DirectoryError>) {
        if let Ok(mut slot) = self.state.search_error.write() {
            *slot = error;
        }
    }

    /// Make binds fail with `error` regardless of credentials.
    pub fn set_bind_error(&self, error: Option<DirectoryError>) {
        if let Ok(mut slot) = self.state.bind_error.write() {
            *slot = error;
        }
    }

    /// Sessions opened so far.
    pub fn opened_sessions(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Sessions released so far (closed or dropped).
    pub fn released_sessions(&self) -> usize {
        self.state.released.load(Ordering::SeqCst)
    }

    /// Sessions opened but not yet released.
    pub fn open_sessions(&self) -> usize {
        self.opened_sessions()
            .saturating_sub(self.released_sessions())
    }

    pub fn bind_attempts(&self) -> usize {
        self.state.binds.load(Ordering::SeqCst)
    }

    pub fn search_attempts(&self) -> usize {
        self.state.searches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DirectoryConnector for FakeDirectory {
    async fn connect(&self) -> Result<Box<dyn DirectorySession>, DirectoryError> {
        if self.state.unreachable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable(
                "connection refused".to_string(),
            ));
        }

        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            state: Arc::clone(&self.state),
            released: false,
        }))
    }
}

struct FakeSession {
    state: Arc<FakeState>,
    released: bool,
}

impl FakeSession {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.state.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ensure_open(&self) -> Result<(), DirectoryError> {
        if self.released {
            return Err(DirectoryError::Unavailable(
                "session already closed".to_string(),
            ));
        }
        Ok(())
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait::async_trait]
impl DirectorySession for FakeSession {
    async fn bind(&mut self, dn: &str, password: &SecretString) -> Result<(), DirectoryError> {
        self.ensure_open()?;
        self.state.binds.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self
            .state
            .bind_error
            .read()
            .ok()
            .and_then(|slot| slot.clone())
        {
            return Err(err);
        }

        let accepted = self
            .state
            .credentials
            .read()
            .ok()
            .and_then(|creds| creds.get(dn).cloned())
            .is_some_and(|expected| expected == password.expose_secret());

        if accepted {
            Ok(())
        } else {
            Err(DirectoryError::InvalidCredentials)
        }
    }

    async fn search(
        &mut self,
        _base: &str,
        _filter: &str,
        _attrs: &[&str],
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        self.ensure_open()?;
        self.state.searches.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self
            .state
            .search_error
            .read()
            .ok()
            .and_then(|slot| slot.clone())
        {
            return Err(err);
        }

        Ok(self
            .state
            .entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default())
    }

    async fn close(&mut self) {
        self.release();
    }
}
