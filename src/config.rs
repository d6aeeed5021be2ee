//! Configuration for the record store connection and the lookup defaults.
//!
//! Both types deserialize from any `serde` format with every field optional,
//! so a partial file merged with environment overrides is enough. Call
//! [`StoreConfig::validate`] and [`LookupConfig::validate`] once at startup.
//!
//! ```rust
//! use ordnance::{LookupConfig, StoreConfig};
//!
//! let store = StoreConfig {
//!     host: "localhost".into(),
//!     db: "ordnance".into(),
//!     username: "reader".into(),
//!     password: "secret".into(),
//!     ..StoreConfig::default()
//! };
//! assert!(store.validate().is_ok());
//! assert!(LookupConfig::default().validate().is_ok());
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{CollectionSchema, SchemaTable};

/// Configuration validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A field the selected backend needs is empty.
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// Which record store implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Mongo,
    /// Empty in-process store; for local runs and tests.
    Memory,
}

/// Connection parameters for the record store.
///
/// The core treats these as opaque: they are handed to the backend when a new
/// session has to be opened and are never inspected otherwise.
#[derive(Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub host: String,

    #[serde(default = "default_store_port")]
    pub port: u16,

    /// Database selected after connecting; also the authentication source.
    #[serde(default)]
    pub db: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_server_selection_timeout_secs")]
    pub server_selection_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            host: String::new(),
            port: default_store_port(),
            db: String::new(),
            username: String::new(),
            password: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            server_selection_timeout_secs: default_server_selection_timeout_secs(),
        }
    }
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field(
                "server_selection_timeout_secs",
                &self.server_selection_timeout_secs,
            )
            .finish()
    }
}

impl StoreConfig {
    /// Check the fields the selected backend depends on.
    ///
    /// The mongo backend needs a host, database, username and password; the
    /// in-memory backend accepts anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == BackendKind::Memory {
            return Ok(());
        }

        for (name, value) in [
            ("store.host", &self.host),
            ("store.db", &self.db),
            ("store.username", &self.username),
            ("store.password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(name));
            }
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.port",
                reason: "port must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.server_selection_timeout_secs)
    }
}

/// The lookup operations exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Test,
    Postcode,
    SouthWest,
    Location,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Test => "test",
            Operation::Postcode => "postcode",
            Operation::SouthWest => "south_west",
            Operation::Location => "location",
        }
    }
}

/// Result cap applied when a request omits `max` or sends a non-positive one.
///
/// Kept per operation rather than as one constant; every entry defaults to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DefaultCaps {
    #[serde(default = "default_cap")]
    pub test: usize,
    #[serde(default = "default_cap")]
    pub postcode: usize,
    #[serde(default = "default_cap")]
    pub south_west: usize,
    #[serde(default = "default_cap")]
    pub location: usize,
}

impl Default for DefaultCaps {
    fn default() -> Self {
        Self {
            test: default_cap(),
            postcode: default_cap(),
            south_west: default_cap(),
            location: default_cap(),
        }
    }
}

impl DefaultCaps {
    pub fn for_operation(&self, operation: Operation) -> usize {
        match operation {
            Operation::Test => self.test,
            Operation::Postcode => self.postcode,
            Operation::SouthWest => self.south_west,
            Operation::Location => self.location,
        }
    }

    /// Effective cap for a request: the requested `max` when positive,
    /// otherwise the operation default.
    pub fn resolve(&self, operation: Operation, requested: Option<i64>) -> usize {
        match requested {
            Some(max) if max > 0 => usize::try_from(max).unwrap_or(usize::MAX),
            _ => self.for_operation(operation),
        }
    }
}

/// Lookup defaults and the collection tables queries are built against.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LookupConfig {
    #[serde(default)]
    pub default_caps: DefaultCaps,

    /// Bounding-box half width used when `tolerance` is absent or negative.
    #[serde(default = "default_tolerance")]
    pub default_tolerance: i64,

    #[serde(default = "CollectionSchema::address")]
    pub address: CollectionSchema,

    #[serde(default = "CollectionSchema::south_west")]
    pub south_west: CollectionSchema,

    /// Table the coordinate lookups run against.
    #[serde(default)]
    pub location_table: SchemaTable,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            default_caps: DefaultCaps::default(),
            default_tolerance: default_tolerance(),
            address: CollectionSchema::address(),
            south_west: CollectionSchema::south_west(),
            location_table: SchemaTable::default(),
        }
    }
}

impl LookupConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for operation in [
            Operation::Test,
            Operation::Postcode,
            Operation::SouthWest,
            Operation::Location,
        ] {
            if self.default_caps.for_operation(operation) == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "lookup.default_caps",
                    reason: format!("default cap for {} must be positive", operation.as_str()),
                });
            }
        }

        if self.default_tolerance < 0 {
            return Err(ConfigError::InvalidValue {
                field: "lookup.default_tolerance",
                reason: format!("{} is negative", self.default_tolerance),
            });
        }

        for (table, schema) in [
            ("lookup.address", &self.address),
            ("lookup.south_west", &self.south_west),
        ] {
            if let Some(field) = schema.first_blank() {
                return Err(ConfigError::InvalidValue {
                    field: table,
                    reason: format!("{field} must not be empty"),
                });
            }
        }

        Ok(())
    }

    /// Effective tolerance: the requested one when non-negative, otherwise
    /// the default. A negative request is replaced, not clamped to zero.
    pub fn resolve_tolerance(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(tolerance) if tolerance >= 0 => tolerance,
            _ => self.default_tolerance,
        }
    }

    pub fn schema(&self, table: SchemaTable) -> &CollectionSchema {
        match table {
            SchemaTable::Address => &self.address,
            SchemaTable::SouthWest => &self.south_west,
        }
    }

    pub fn location_schema(&self) -> &CollectionSchema {
        self.schema(self.location_table)
    }
}

fn default_store_port() -> u16 {
    27017
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_server_selection_timeout_secs() -> u64 {
    5
}

fn default_cap() -> usize {
    10
}

fn default_tolerance() -> i64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mongo_config() -> StoreConfig {
        StoreConfig {
            host: "db.internal".into(),
            db: "ordnance".into(),
            username: "reader".into(),
            password: "hunter2".into(),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_default_store_config() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.port, 27017);
        assert_eq!(cfg.backend, BackendKind::Mongo);
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn mongo_backend_requires_credentials() {
        assert!(mongo_config().validate().is_ok());

        let mut cfg = mongo_config();
        cfg.password.clear();
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::MissingField("store.password"))
        );

        let mut cfg = mongo_config();
        cfg.host = "   ".into();
        assert_eq!(cfg.validate(), Err(ConfigError::MissingField("store.host")));
    }

    #[test]
    fn memory_backend_skips_credential_checks() {
        let cfg = StoreConfig {
            backend: BackendKind::Memory,
            ..StoreConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_password() {
        let rendered = format!("{:?}", mongo_config());
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn caps_fall_back_for_absent_zero_and_negative() {
        let caps = DefaultCaps::default();
        assert_eq!(caps.resolve(Operation::Postcode, None), 10);
        assert_eq!(caps.resolve(Operation::Postcode, Some(0)), 10);
        assert_eq!(caps.resolve(Operation::Postcode, Some(-4)), 10);
        assert_eq!(caps.resolve(Operation::Postcode, Some(3)), 3);
    }

    #[test]
    fn caps_are_per_operation() {
        let caps = DefaultCaps {
            test: 25,
            ..DefaultCaps::default()
        };
        assert_eq!(caps.resolve(Operation::Test, None), 25);
        assert_eq!(caps.resolve(Operation::Location, None), 10);
    }

    #[test]
    fn negative_tolerance_is_replaced_not_clamped() {
        let cfg = LookupConfig::default();
        assert_eq!(cfg.resolve_tolerance(None), 10);
        assert_eq!(cfg.resolve_tolerance(Some(-1)), 10);
        assert_eq!(cfg.resolve_tolerance(Some(0)), 0);
        assert_eq!(cfg.resolve_tolerance(Some(250)), 250);
    }

    #[test]
    fn lookup_validation_rejects_zero_cap() {
        let cfg = LookupConfig {
            default_caps: DefaultCaps {
                south_west: 0,
                ..DefaultCaps::default()
            },
            ..LookupConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue {
                field: "lookup.default_caps",
                ..
            })
        ));
    }

    #[test]
    fn partial_lookup_config_deserializes() {
        let cfg: LookupConfig = serde_json::from_str(
            r#"{ "default_caps": { "test": 25 }, "location_table": "south_west" }"#,
        )
        .unwrap();

        assert_eq!(cfg.default_caps.test, 25);
        assert_eq!(cfg.default_caps.postcode, 10);
        assert_eq!(cfg.location_schema().collection, "southwest");
        assert_eq!(cfg.default_tolerance, 10);
    }
}
