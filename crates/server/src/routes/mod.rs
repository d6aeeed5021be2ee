//! API route handlers
//!
//! - `health`: liveness, readiness (store probe) and metrics
//! - `ordnance`: postcode and location lookups

pub mod health;
pub mod ordnance;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Ordnance Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/ordnance/test",
            "/ordnance/postcode/{postcode}",
            "/ordnance/sw/{postcode}",
            "/ordnance/location/uk/{northing}/{easting}",
            "/ordnance/location/gridref/{gridref}",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
