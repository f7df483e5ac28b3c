//! HTTP handlers for the two metrics surfaces
//!
//! `GET /metrics/otel` serves the converted OTLP JSON document,
//! `GET /metrics` serves the sanitized Prometheus passthrough. Both fetch
//! the upstream endpoint per request; on fetch failure an error response is
//! produced and the converter is never invoked.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::convert::{convert, otlp::MetricsDocument, sanitize_exposition};

use crate::upstream::UpstreamError;
use crate::GatewayState;

/// Fetch-failure error for the OTLP endpoint, rendered as
/// `500 application/json {"error": "..."}`
#[derive(Debug)]
pub struct OtelEndpointError(UpstreamError);

impl IntoResponse for OtelEndpointError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": format!("Failed to fetch metrics: {}", self.0),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// GET /metrics/otel
///
/// Converts the upstream exposition text into the OTLP JSON metrics envelope.
pub async fn otel_metrics(
    State(state): State<GatewayState>,
) -> Result<Json<MetricsDocument>, OtelEndpointError> {
    let body = state.source.fetch().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch upstream metrics");
        OtelEndpointError(e)
    })?;

    let document = convert(&body, &state.resource);
    Ok(Json(document))
}

/// GET /metrics
///
/// Sanitized passthrough of the upstream exposition text (colon-to-underscore
/// on metric names only, no model conversion). Failures are reported as a
/// comment-style error line so scrapers see valid exposition syntax.
pub async fn cleaned_metrics(State(state): State<GatewayState>) -> Response {
    match state.source.fetch().await {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain")],
            sanitize_exposition(&body),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch upstream metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                format!("# Error fetching metrics: {e}"),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::MockMetricsSource;
    use axum::body::Body;
    use axum::http::Request;
    use common::config::ResourceConfig;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(source: MockMetricsSource) -> axum::Router {
        crate::create_router(GatewayState {
            source: Arc::new(source),
            resource: ResourceConfig::default(),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_otel_endpoint_success() {
        let mut source = MockMetricsSource::new();
        source.expect_fetch().returning(|| {
            Ok("# HELP req_total Total requests\n# TYPE req_total counter\nreq_total{method=\"GET\"} 42\n".to_string())
        });

        let response = app(source)
            .oneshot(Request::builder().uri("/metrics/otel").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let json = body_json(response).await;
        let metric = &json["resourceMetrics"][0]["scopeMetrics"][0]["metrics"][0];
        assert_eq!(metric["name"], "req_total");
        assert_eq!(metric["sum"]["isMonotonic"], true);
        assert_eq!(metric["sum"]["dataPoints"][0]["asDouble"], 42.0);
    }

    #[tokio::test]
    async fn test_otel_endpoint_upstream_status_failure() {
        let mut source = MockMetricsSource::new();
        source
            .expect_fetch()
            .returning(|| Err(UpstreamError::Status(503)));

        let response = app(source)
            .oneshot(Request::builder().uri("/metrics/otel").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to fetch metrics: HTTP 503");
    }

    #[tokio::test]
    async fn test_otel_endpoint_empty_upstream_body() {
        let mut source = MockMetricsSource::new();
        source.expect_fetch().returning(|| Ok(String::new()));

        let response = app(source)
            .oneshot(Request::builder().uri("/metrics/otel").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        // Well-formed envelope with an empty metrics list, not an error
        assert_eq!(
            json["resourceMetrics"][0]["scopeMetrics"][0]["metrics"]
                .as_array()
                .unwrap()
                .len(),
            0
        );
    }

    #[tokio::test]
    async fn test_cleaned_metrics_passthrough() {
        let mut source = MockMetricsSource::new();
        source
            .expect_fetch()
            .returning(|| Ok("vllm:num_requests_running 3\n".to_string()));

        let response = app(source)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"vllm_num_requests_running 3\n");
    }

    #[tokio::test]
    async fn test_cleaned_metrics_failure_is_comment_line() {
        let mut source = MockMetricsSource::new();
        source
            .expect_fetch()
            .returning(|| Err(UpstreamError::Transport("connection refused".to_string())));

        let response = app(source)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"# Error fetching metrics: connection refused");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app(MockMetricsSource::new())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
