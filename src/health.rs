//! Store health probe.
//!
//! Runs its own connect and authenticate cycle through a connector and drops
//! the session straight away. It never borrows or refreshes the gateway's
//! cached session, so a probe cannot mask or cause a reconnect there.

use serde::Serialize;
use tracing::warn;

use crate::error::LookupError;
use crate::store::Connector;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthReport {
    Healthy,
    Unhealthy { reason: String },
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthReport::Healthy)
    }
}

pub fn check(connector: &dyn Connector) -> HealthReport {
    match connector.connect() {
        Ok(_) => HealthReport::Healthy,
        Err(err) => {
            warn!(store = %connector.describe(), error = %err, "store health check failed");
            let reason = match err {
                LookupError::Authentication(_) => "Authentication failed".to_string(),
                other => format!("Connection failed: {other}"),
            };
            HealthReport::Unhealthy { reason }
        }
    }
}
