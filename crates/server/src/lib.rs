//! Ordnance Server - HTTP REST API for Ordnance Survey address lookups
//!
//! This crate exposes the `ordnance` lookup core over HTTP. It supports:
//!
//! - **Postcode lookups**: address records by `POSTCODE_LOCATOR`, plus the
//!   South West regional collection with its nested field layout
//! - **Location lookups**: records inside a square around an easting/northing
//!   pair or an OS grid reference
//! - **Health & Metrics**: liveness/readiness probes and Prometheus metrics
//!
//! Every lookup answers with the same envelope:
//!
//! ```json
//! { "responseId": 1, "newConnection": true, "content": [ ... ], "size": 3 }
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (authenticates against the store)
//! - `GET /metrics` - Prometheus metrics
//! - `GET /ordnance/test?max=` - First records of the address collection
//! - `GET /ordnance/postcode/{postcode}?max=` - Address records for a postcode
//! - `GET /ordnance/sw/{postcode}?max=` - South West records for a postcode
//! - `GET /ordnance/location/uk/{northing}/{easting}?tolerance=&max=` - Records near a point
//! - `GET /ordnance/location/gridref/{gridref}?tolerance=&max=` - Records near a grid reference

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
