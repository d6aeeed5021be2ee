//! Error types produced by the lookup core.
//!
//! | Error | Category | Description |
//! |-------|----------|-------------|
//! | [`Authentication`](LookupError::Authentication) | Store | Credentials rejected by the record store |
//! | [`Connection`](LookupError::Connection) | Store | Transport failure reaching the record store |
//! | [`Query`](LookupError::Query) | Store | Failure while running or draining a find |
//! | [`InvalidGridRef`](LookupError::InvalidGridRef) | Validation | Grid reference could not be parsed |
//! | [`Config`](LookupError::Config) | Startup | Store or lookup configuration rejected |
//!
//! None of these are retried by the core. Parameter sanitization (`max`,
//! `tolerance`) never produces an error; bad values fall back to defaults.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while acquiring a session or running a lookup.
///
/// # Example
///
/// ```rust
/// use ordnance::LookupError;
///
/// let err = LookupError::Authentication("bad password".to_string());
/// assert!(err.is_store_error());
/// assert!(!err.is_client_error());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LookupError {
    /// The record store rejected the configured credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The record store could not be reached (network, DNS, timeout).
    #[error("database connection failed: {0}")]
    Connection(String),

    /// The store accepted the session but failed executing the find.
    #[error("query failed: {0}")]
    Query(String),

    /// A grid reference path parameter was not a valid OS grid reference.
    #[error("invalid grid reference: {0}")]
    InvalidGridRef(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LookupError {
    /// True when the caller supplied something unusable.
    pub fn is_client_error(&self) -> bool {
        matches!(self, LookupError::InvalidGridRef(_))
    }

    /// True when the failure came from the record store itself.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            LookupError::Authentication(_) | LookupError::Connection(_) | LookupError::Query(_)
        )
    }

    /// Short machine-readable code, used in logs and error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            LookupError::Authentication(_) => "AUTH_FAILED",
            LookupError::Connection(_) => "CONNECTION_FAILED",
            LookupError::Query(_) => "QUERY_FAILED",
            LookupError::InvalidGridRef(_) => "INVALID_GRID_REF",
            LookupError::Config(_) => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_not_client_errors() {
        for err in [
            LookupError::Authentication("x".into()),
            LookupError::Connection("x".into()),
            LookupError::Query("x".into()),
        ] {
            assert!(err.is_store_error());
            assert!(!err.is_client_error());
        }
    }

    #[test]
    fn grid_ref_error_is_client_error() {
        let err = LookupError::InvalidGridRef("ZZ".into());
        assert!(err.is_client_error());
        assert_eq!(err.code(), "INVALID_GRID_REF");
        assert_eq!(err.to_string(), "invalid grid reference: ZZ");
    }
}
