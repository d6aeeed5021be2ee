use crate::config::ServerConfig;
use crate::error::ServerResult;
use metrics_exporter_prometheus::PrometheusHandle;
use ordnance::{Connector, LookupGateway};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Lookup gateway (owns the cached database session)
    pub gateway: Arc<LookupGateway>,

    /// Connector used only by the readiness probe, never by lookups
    pub health_connector: Arc<dyn Connector>,

    /// Prometheus handle when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state from configuration. No database connection is
    /// opened until the first request.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let gateway = LookupGateway::from_config(&config.store, config.lookup.clone())?;
        let health_connector = config.store.build()?;

        Ok(Self::with_parts(config, gateway, health_connector))
    }

    /// Assemble state from prebuilt parts; used by tests to share one store
    /// between the gateway and the readiness probe.
    pub fn with_parts(
        config: ServerConfig,
        gateway: LookupGateway,
        health_connector: Box<dyn Connector>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            health_connector: Arc::from(health_connector),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
