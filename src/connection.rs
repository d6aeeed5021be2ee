//! Connection manager: the single cached session and its re-authentication.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::LookupError;
use crate::store::{Connector, Session};

/// A session handed out by [`ConnectionManager::fetch_session`], with whether
/// it was created by that call.
pub struct FetchedSession {
    pub session: Arc<dyn Session>,
    pub is_new: bool,
}

/// Owns at most one authenticated session and hands it out while it stays
/// valid.
///
/// The whole fetch-or-create sequence runs under one mutex, so concurrent
/// callers never race to open two replacement sessions and never observe a
/// half-replaced slot. The lock is released before the caller runs its query.
pub struct ConnectionManager {
    connector: Box<dyn Connector>,
    cached: Mutex<Option<Arc<dyn Session>>>,
}

impl ConnectionManager {
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached session if it still reports authenticated,
    /// otherwise discard it and open a new one.
    ///
    /// A failed attempt leaves the slot empty, so the next caller tries again.
    pub fn fetch_session(&self) -> Result<FetchedSession, LookupError> {
        let mut cached = self.slot();

        if let Some(session) = cached.as_ref() {
            if session.is_authenticated() {
                return Ok(FetchedSession {
                    session: Arc::clone(session),
                    is_new: false,
                });
            }
            debug!("cached session no longer authenticated, discarding");
        }
        *cached = None;

        let session = self.connector.connect().map_err(|err| {
            warn!(
                store = %self.connector.describe(),
                code = err.code(),
                error = %err,
                "failed to open database session"
            );
            err
        })?;

        info!(store = %self.connector.describe(), "opened new database session");
        *cached = Some(Arc::clone(&session));

        Ok(FetchedSession {
            session,
            is_new: true,
        })
    }

    pub fn has_session(&self) -> bool {
        self.slot().is_some()
    }

    // A panic while the slot was held (e.g. inside `connect`) poisons the
    // mutex. The slot is only a cache, so recover it empty.
    fn slot(&self) -> MutexGuard<'_, Option<Arc<dyn Session>>> {
        self.cached.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("session slot poisoned by a panic, discarding cached session");
            let mut cached = poisoned.into_inner();
            *cached = None;
            cached
        })
    }
}
