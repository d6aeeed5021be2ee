use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use super::{Connector, RecordCursor, Session};
use crate::error::LookupError;
use crate::query::{LookupQuery, Record};

/// In-process record store.
///
/// Holds named collections of JSON records in insertion order and exposes a
/// few switches for exercising the connection manager: required credentials,
/// reachability, and revocation of every session issued so far.
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    credentials: RwLock<Option<(String, String)>>,
    reachable: AtomicBool,
    auth_epoch: AtomicU64,
    authentications: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            credentials: RwLock::new(None),
            reachable: AtomicBool::new(true),
            auth_epoch: AtomicU64::new(0),
            authentications: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, collection: &str, record: Record) -> Result<(), LookupError> {
        self.insert_many(collection, std::iter::once(record))
    }

    pub fn insert_many(
        &self,
        collection: &str,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<(), LookupError> {
        self.collections
            .write()
            .map_err(|_| LookupError::Query("poisoned lock".to_string()))?
            .entry(collection.to_string())
            .or_default()
            .extend(records);
        Ok(())
    }

    /// Only accept this username/password pair from now on. Until called,
    /// any credentials are accepted.
    pub fn require_credentials(&self, username: &str, password: &str) {
        if let Ok(mut guard) = self.credentials.write() {
            *guard = Some((username.to_string(), password.to_string()));
        }
    }

    /// Simulate the store going away (or coming back).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Invalidate the authentication of every session issued so far.
    pub fn revoke_sessions(&self) {
        self.auth_epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of successful authentications since the store was created.
    pub fn authentications(&self) -> usize {
        self.authentications.load(Ordering::SeqCst)
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<u64, LookupError> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(LookupError::Connection("store unreachable".to_string()));
        }

        let accepted = self
            .credentials
            .read()
            .map_err(|_| LookupError::Connection("poisoned lock".to_string()))?
            .as_ref()
            .map_or(true, |(user, pass)| user == username && pass == password);

        if !accepted {
            return Err(LookupError::Authentication(format!(
                "credentials rejected for user {username}"
            )));
        }

        self.authentications.fetch_add(1, Ordering::SeqCst);
        Ok(self.auth_epoch.load(Ordering::SeqCst))
    }

    fn current_epoch(&self) -> u64 {
        self.auth_epoch.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Connector over a shared [`InMemoryStore`].
pub struct InMemoryConnector {
    store: Arc<InMemoryStore>,
    username: String,
    password: String,
}

impl InMemoryConnector {
    pub fn new(store: Arc<InMemoryStore>, username: &str, password: &str) -> Self {
        Self {
            store,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }
}

impl Connector for InMemoryConnector {
    fn connect(&self) -> Result<Arc<dyn Session>, LookupError> {
        let epoch = self.store.authenticate(&self.username, &self.password)?;
        Ok(Arc::new(InMemorySession {
            store: Arc::clone(&self.store),
            epoch,
        }))
    }

    fn describe(&self) -> String {
        format!("memory://{}", self.username)
    }
}

struct InMemorySession {
    store: Arc<InMemoryStore>,
    epoch: u64,
}

impl Session for InMemorySession {
    fn is_authenticated(&self) -> bool {
        self.epoch == self.store.current_epoch()
    }

    fn find(&self, query: &LookupQuery) -> Result<RecordCursor<'_>, LookupError> {
        if !self.is_authenticated() {
            return Err(LookupError::Authentication(
                "session is no longer authenticated".to_string(),
            ));
        }

        let guard = self
            .store
            .collections
            .read()
            .map_err(|_| LookupError::Query("poisoned lock".to_string()))?;

        let matched: Vec<Record> = guard
            .get(query.collection())
            .map(|records| {
                records
                    .iter()
                    .filter(|record| query.filter().matches(record))
                    .take(query.cap())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(Box::new(matched.into_iter().map(Ok::<Record, LookupError>)))
    }
}
