//! Lookup endpoints under `/ordnance`.
//!
//! The core is blocking, so every lookup runs on tokio's blocking pool. The
//! handlers only extract parameters; `max` and `tolerance` sanitization
//! happens in the gateway.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Path, Query, State};
use axum::Json;
use ordnance::{LookupError, LookupGateway, ResponseEnvelope};
use serde::Deserialize;
use std::sync::Arc;

/// Query string accepted by the postcode and test lookups
#[derive(Debug, Default, Deserialize)]
pub struct MaxParams {
    pub max: Option<i64>,
}

/// Query string accepted by the location lookups
#[derive(Debug, Default, Deserialize)]
pub struct LocationParams {
    pub tolerance: Option<i64>,
    pub max: Option<i64>,
}

/// `GET /ordnance/test`
pub async fn fetch_test_data(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<MaxParams>,
) -> ServerResult<Json<ResponseEnvelope>> {
    let envelope = run_lookup(&state, move |gateway| gateway.fetch_test_data(params.max)).await?;
    Ok(Json(envelope))
}

/// `GET /ordnance/postcode/{postcode}`
pub async fn find_by_postcode(
    State(state): State<Arc<ServerState>>,
    Path(postcode): Path<String>,
    Query(params): Query<MaxParams>,
) -> ServerResult<Json<ResponseEnvelope>> {
    let envelope = run_lookup(&state, move |gateway| {
        gateway.find_by_postcode(&postcode, params.max)
    })
    .await?;
    Ok(Json(envelope))
}

/// `GET /ordnance/sw/{postcode}`
pub async fn find_by_south_west_postcode(
    State(state): State<Arc<ServerState>>,
    Path(postcode): Path<String>,
    Query(params): Query<MaxParams>,
) -> ServerResult<Json<ResponseEnvelope>> {
    let envelope = run_lookup(&state, move |gateway| {
        gateway.find_by_south_west_postcode(&postcode, params.max)
    })
    .await?;
    Ok(Json(envelope))
}

/// `GET /ordnance/location/uk/{northing}/{easting}`
pub async fn find_by_location(
    State(state): State<Arc<ServerState>>,
    Path((northing, easting)): Path<(f64, f64)>,
    Query(params): Query<LocationParams>,
) -> ServerResult<Json<ResponseEnvelope>> {
    if !northing.is_finite() || !easting.is_finite() {
        return Err(ServerError::BadRequest(
            "northing and easting must be finite numbers".to_string(),
        ));
    }

    let envelope = run_lookup(&state, move |gateway| {
        gateway.find_by_location(northing, easting, params.tolerance, params.max)
    })
    .await?;
    Ok(Json(envelope))
}

/// `GET /ordnance/location/gridref/{gridref}`
pub async fn find_by_grid_ref(
    State(state): State<Arc<ServerState>>,
    Path(gridref): Path<String>,
    Query(params): Query<LocationParams>,
) -> ServerResult<Json<ResponseEnvelope>> {
    let envelope = run_lookup(&state, move |gateway| {
        gateway.find_by_grid_ref(&gridref, params.tolerance, params.max)
    })
    .await?;
    Ok(Json(envelope))
}

async fn run_lookup<F>(state: &ServerState, lookup: F) -> ServerResult<ResponseEnvelope>
where
    F: FnOnce(&LookupGateway) -> Result<ResponseEnvelope, LookupError> + Send + 'static,
{
    let gateway = Arc::clone(&state.gateway);
    let envelope = tokio::task::spawn_blocking(move || lookup(&gateway)).await??;
    Ok(envelope)
}
