//! Ordnance Survey address and postcode lookups over a document store.
//!
//! This crate is the core behind the HTTP service in `crates/server`. It owns
//! the single cached database session and turns lookup parameters into
//! bounded queries:
//!
//! - [`ConnectionManager`] hands out an authenticated [`Session`], reusing
//!   the cached one while it stays authenticated and reporting whether a new
//!   one had to be opened.
//! - [`LookupGateway`] exposes the lookups (test, postcode, south-west
//!   postcode, bounding box, grid reference) and wraps results in a
//!   [`ResponseEnvelope`].
//! - [`store`] defines the backend seam, with a MongoDB backend (feature
//!   `backend-mongo`, on by default) and an in-memory one.
//!
//! Everything here is blocking. Async callers should run lookups on a
//! blocking thread.

pub mod config;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod gridref;
pub mod health;
pub mod query;
pub mod schema;
pub mod store;

pub use config::{BackendKind, ConfigError, DefaultCaps, LookupConfig, Operation, StoreConfig};
pub use connection::{ConnectionManager, FetchedSession};
pub use error::LookupError;
pub use gateway::{LookupGateway, ResponseEnvelope};
pub use gridref::OsGridRef;
pub use health::HealthReport;
pub use query::{Condition, Filter, FilterBuilder, LookupQuery, Record};
pub use schema::{CollectionSchema, SchemaTable};
#[cfg(feature = "backend-mongo")]
pub use store::MongoConnector;
pub use store::{Connector, InMemoryConnector, InMemoryStore, RecordCursor, Session};
