//! Lookup gateway: the four read-only lookups plus the grid-reference helper.
//!
//! Each operation sanitizes its parameters, builds a [`LookupQuery`] against
//! the configured collection table, runs it through the connection manager's
//! session and wraps the records in a [`ResponseEnvelope`].
//!
//! ```rust
//! use std::sync::Arc;
//! use ordnance::{ConnectionManager, InMemoryConnector, InMemoryStore, LookupConfig, LookupGateway};
//! use serde_json::json;
//!
//! let store = Arc::new(InMemoryStore::new());
//! store.insert("BLPU", json!({ "POSTCODE_LOCATOR": "EX4 4QJ" })).unwrap();
//!
//! let connector = InMemoryConnector::new(store, "reader", "secret");
//! let gateway = LookupGateway::new(
//!     ConnectionManager::new(Box::new(connector)),
//!     LookupConfig::default(),
//! );
//!
//! let first = gateway.find_by_postcode("EX4 4QJ", None).unwrap();
//! assert!(first.new_connection);
//! assert_eq!(first.size, 1);
//!
//! let second = gateway.find_by_postcode("EX4 4QJ", None).unwrap();
//! assert!(!second.new_connection);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{LookupConfig, Operation, StoreConfig};
use crate::connection::{ConnectionManager, FetchedSession};
use crate::error::LookupError;
use crate::gridref::OsGridRef;
use crate::query::{Filter, LookupQuery, Record};
use crate::schema::CollectionSchema;

// Upper bound on the up-front allocation for a result page; large caps grow
// the vector as records actually arrive.
const PREALLOC_LIMIT: usize = 256;

/// Response body for every lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Per-gateway sequence number, starting at 1. Not a stable identifier.
    pub response_id: u64,
    /// Whether the session used for this lookup was created by it.
    pub new_connection: bool,
    pub content: Vec<Record>,
    pub size: usize,
}

pub struct LookupGateway {
    connections: ConnectionManager,
    config: LookupConfig,
    responses: AtomicU64,
}

impl LookupGateway {
    pub fn new(connections: ConnectionManager, config: LookupConfig) -> Self {
        Self {
            connections,
            config,
            responses: AtomicU64::new(0),
        }
    }

    /// Validate both configs and build the gateway over the selected backend.
    /// No connection is opened until the first lookup.
    pub fn from_config(store: &StoreConfig, lookup: LookupConfig) -> Result<Self, LookupError> {
        lookup.validate()?;
        let connector = store.build()?;
        Ok(Self::new(ConnectionManager::new(connector), lookup))
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Unfiltered smoke-test lookup against the address collection.
    pub fn fetch_test_data(&self, max: Option<i64>) -> Result<ResponseEnvelope, LookupError> {
        let query = self.test_query(max);
        self.respond(Operation::Test, &query)
    }

    pub fn find_by_postcode(
        &self,
        postcode: &str,
        max: Option<i64>,
    ) -> Result<ResponseEnvelope, LookupError> {
        info!(postcode, "searching by postcode");
        let query = self.postcode_query(&self.config.address, Operation::Postcode, postcode, max);
        self.respond(Operation::Postcode, &query)
    }

    pub fn find_by_south_west_postcode(
        &self,
        postcode: &str,
        max: Option<i64>,
    ) -> Result<ResponseEnvelope, LookupError> {
        info!(postcode, "searching south-west collection by postcode");
        let query =
            self.postcode_query(&self.config.south_west, Operation::SouthWest, postcode, max);
        self.respond(Operation::SouthWest, &query)
    }

    pub fn find_by_location(
        &self,
        northing: f64,
        easting: f64,
        tolerance: Option<i64>,
        max: Option<i64>,
    ) -> Result<ResponseEnvelope, LookupError> {
        let query = self.location_query(northing, easting, tolerance, max);
        info!(
            northing,
            easting,
            tolerance = self.config.resolve_tolerance(tolerance),
            "searching by location"
        );
        self.respond(Operation::Location, &query)
    }

    /// Location lookup centred on a lettered OS grid reference.
    pub fn find_by_grid_ref(
        &self,
        gridref: &str,
        tolerance: Option<i64>,
        max: Option<i64>,
    ) -> Result<ResponseEnvelope, LookupError> {
        let point = OsGridRef::parse(gridref)?;
        self.find_by_location(
            f64::from(point.northing),
            f64::from(point.easting),
            tolerance,
            max,
        )
    }

    pub fn test_query(&self, max: Option<i64>) -> LookupQuery {
        LookupQuery::new(
            self.config.address.collection.as_str(),
            Filter::all(),
            self.config.default_caps.resolve(Operation::Test, max),
        )
    }

    pub fn postcode_query(
        &self,
        schema: &CollectionSchema,
        operation: Operation,
        postcode: &str,
        max: Option<i64>,
    ) -> LookupQuery {
        LookupQuery::new(
            schema.collection.as_str(),
            Filter::builder()
                .equals(schema.postcode_field.as_str(), postcode)
                .build(),
            self.config.default_caps.resolve(operation, max),
        )
    }

    /// Bounding box `[easting ± t] × [northing ± t]`, both ends inclusive.
    pub fn location_query(
        &self,
        northing: f64,
        easting: f64,
        tolerance: Option<i64>,
        max: Option<i64>,
    ) -> LookupQuery {
        let schema = self.config.location_schema();
        let tolerance = self.config.resolve_tolerance(tolerance) as f64;

        LookupQuery::new(
            schema.collection.as_str(),
            Filter::builder()
                .around(schema.easting_field.as_str(), easting, tolerance)
                .around(schema.northing_field.as_str(), northing, tolerance)
                .build(),
            self.config.default_caps.resolve(Operation::Location, max),
        )
    }

    /// Run `query` on a session from the connection manager, draining at most
    /// `query.cap()` records in store order.
    ///
    /// Returns the records and whether the session was created for this call.
    /// Any failure fails the whole lookup; partial pages are never returned.
    pub fn run_query(&self, query: &LookupQuery) -> Result<(Vec<Record>, bool), LookupError> {
        let FetchedSession { session, is_new } = self.connections.fetch_session()?;

        let mut records = Vec::with_capacity(query.cap().min(PREALLOC_LIMIT));
        for record in session.find(query)?.take(query.cap()) {
            records.push(record?);
        }

        Ok((records, is_new))
    }

    fn respond(
        &self,
        operation: Operation,
        query: &LookupQuery,
    ) -> Result<ResponseEnvelope, LookupError> {
        let started = Instant::now();
        let (content, new_connection) = self.run_query(query).map_err(|err| {
            warn!(
                operation = operation.as_str(),
                collection = query.collection(),
                code = err.code(),
                error = %err,
                "lookup failed"
            );
            err
        })?;

        let envelope = ResponseEnvelope {
            response_id: self.responses.fetch_add(1, Ordering::Relaxed) + 1,
            new_connection,
            size: content.len(),
            content,
        };

        info!(
            operation = operation.as_str(),
            collection = query.collection(),
            cap = query.cap(),
            size = envelope.size,
            new_connection,
            elapsed_micros = started.elapsed().as_micros() as u64,
            "lookup complete"
        );

        Ok(envelope)
    }
}
