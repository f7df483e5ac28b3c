//! HTTP gateway in front of an inference server's Prometheus endpoint
//!
//! Exposes the upstream metrics in two forms: a cleaned exposition
//! passthrough at `/metrics` and the converted OTLP JSON document at
//! `/metrics/otel`. Each request is served by one fetch-then-transform pass
//! with no state shared across requests.

use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use common::config::{Configuration, ResourceConfig};

pub mod endpoints;
pub mod upstream;

use upstream::{HttpMetricsSource, MetricsSource};

/// Shared state handed to the route handlers
#[derive(Clone)]
pub struct GatewayState {
    /// Upstream exposition endpoint
    pub source: Arc<dyn MetricsSource>,
    /// Resource identity stamped onto converted documents
    pub resource: ResourceConfig,
}

impl GatewayState {
    /// Build production state from configuration
    pub fn from_config(config: &Configuration) -> anyhow::Result<Self> {
        Ok(Self {
            source: Arc::new(HttpMetricsSource::new(&config.upstream)?),
            resource: config.resource.clone(),
        })
    }
}

/// Create the gateway router with all routes configured
pub fn create_router(state: GatewayState) -> Router {
    Router::new()
        .route("/metrics/otel", get(endpoints::otel_metrics))
        .route("/metrics", get(endpoints::cleaned_metrics))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
