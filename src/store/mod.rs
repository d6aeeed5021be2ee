//! Record store seam.
//!
//! A [`Connector`] opens and authenticates new sessions; a [`Session`] runs
//! finds and reports whether it is still authenticated. The connection
//! manager only ever talks to these two traits, so the MongoDB backend and the
//! in-memory backend are interchangeable.

mod memory;
#[cfg(feature = "backend-mongo")]
mod mongo;

pub use memory::{InMemoryConnector, InMemoryStore};
#[cfg(feature = "backend-mongo")]
pub use mongo::MongoConnector;

use std::sync::Arc;

use crate::config::{BackendKind, StoreConfig};
use crate::error::LookupError;
use crate::query::{LookupQuery, Record};

/// Records yielded by a find, in store order. Dropping the cursor early stops
/// the store from producing more.
pub type RecordCursor<'a> = Box<dyn Iterator<Item = Result<Record, LookupError>> + Send + 'a>;

/// An open, authenticated handle to the record store.
pub trait Session: Send + Sync {
    /// Whether the session still holds a valid authentication. Must be cheap;
    /// it is checked on every fetch while the session lock is held.
    fn is_authenticated(&self) -> bool;

    /// Run `query` and return a cursor over the matching records. Backends
    /// may use `query.cap()` as a hint but callers still stop at the cap.
    fn find(&self, query: &LookupQuery) -> Result<RecordCursor<'_>, LookupError>;
}

/// Opens sessions against a configured store.
pub trait Connector: Send + Sync {
    /// Connect, select the database and authenticate.
    ///
    /// Rejected credentials are [`LookupError::Authentication`]; transport
    /// faults are [`LookupError::Connection`].
    fn connect(&self) -> Result<Arc<dyn Session>, LookupError>;

    /// Short description for logs (`mongo://host:port/db`).
    fn describe(&self) -> String;
}

impl StoreConfig {
    /// Build the connector selected by `backend`.
    pub fn build(&self) -> Result<Box<dyn Connector>, LookupError> {
        self.validate()?;
        match self.backend {
            BackendKind::Memory => Ok(Box::new(InMemoryConnector::new(
                Arc::new(InMemoryStore::new()),
                &self.username,
                &self.password,
            ))),
            BackendKind::Mongo => {
                #[cfg(feature = "backend-mongo")]
                {
                    Ok(Box::new(MongoConnector::new(self.clone())))
                }
                #[cfg(not(feature = "backend-mongo"))]
                {
                    Err(LookupError::Connection(
                        "mongo backend disabled at compile time".to_string(),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_builds_without_credentials() {
        let cfg = StoreConfig {
            backend: BackendKind::Memory,
            ..StoreConfig::default()
        };
        let connector = cfg.build().unwrap();
        assert!(connector.describe().starts_with("memory://"));
        assert!(connector.connect().unwrap().is_authenticated());
    }

    #[test]
    fn mongo_backend_refuses_incomplete_config() {
        let err = StoreConfig::default().build().err().unwrap();
        assert!(matches!(err, LookupError::Config(_)));
    }
}
