//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the lookup handler
//! - Wire up middleware (tracing, timeout, request ID, panic capture)
//! - Front-door checks: version query, method, required parameters
//! - Hand lookups to the pipeline and render the result
//! - Bind server to listener with graceful shutdown

use std::any::Any;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, Query, State},
    http::{Method, Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RelayConfig, ReleaseConfig};
use crate::error::{ErrorEnvelope, RelayError};
use crate::http::request::LookupQuery;
use crate::http::response::{envelope_response, error_response, json_response, VersionInfo};
use crate::lookup::RequestPipeline;
use crate::observability::DiagnosticLogger;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,
    pub logger: Arc<DiagnosticLogger>,
    pub release: ReleaseConfig,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server around an existing pipeline.
    pub fn new(
        config: RelayConfig,
        pipeline: Arc<RequestPipeline>,
        logger: Arc<DiagnosticLogger>,
    ) -> Self {
        let state = AppState {
            pipeline,
            logger,
            release: config.release.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// There is no CORS layer: every method, `OPTIONS` included, reaches the
    /// handler, and the CORS header is set on each JSON response.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let panic_logger = state.logger.clone();

        Router::new()
            .route("/", any(lookup_handler))
            .route("/{*path}", any(lookup_handler))
            .with_state(state)
            .layer(CatchPanicLayer::custom(
                move |err: Box<dyn Any + Send + 'static>| panic_response(&panic_logger, err),
            ))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run until `shutdown` resolves.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Single entry point: version query or profile lookup.
async fn lookup_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let params = match Query::<HashMap<String, String>>::try_from_uri(request.uri()) {
        Ok(Query(params)) => params,
        Err(e) => {
            let err = RelayError::Unexpected(format!("invalid query string: {}", e));
            state
                .logger
                .log_data("main logic exception", &json!({ "error": err.to_string() }));
            return error_response(err, Some(state.release.version.as_str()));
        }
    };

    state.logger.log_data(
        "new request",
        &json!({
            "method": method.as_str(),
            "params": params,
            "ip": client_ip,
        }),
    );

    let query = LookupQuery::from_params(&params);

    if query.wants_version() {
        return json_response(StatusCode::OK, &VersionInfo::from(&state.release));
    }

    let front_door = if method != Method::GET {
        Err(RelayError::UnsupportedMethod {
            method: method.to_string(),
        })
    } else {
        query
            .steamid
            .as_deref()
            .ok_or(RelayError::MissingParameter("steamid"))
    };

    let raw_id = match front_door {
        Ok(raw_id) => raw_id,
        Err(err) => {
            let status = err.status_code();
            let envelope = err.into_envelope().with_version(&state.release.version);
            state.logger.log_data("main logic exception", &envelope);
            return envelope_response(status, &envelope);
        }
    };

    let proxy = query.proxy_config();
    match state.pipeline.lookup(raw_id, &proxy).await {
        Ok(profile) => json_response(StatusCode::OK, &profile),
        Err(err) => {
            tracing::info!(kind = err.kind(), error = %err, "Lookup failed");
            error_response(err, None)
        }
    }
}

/// Turn a handler panic into the generic exception envelope.
fn panic_response(logger: &DiagnosticLogger, err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    let err = RelayError::Unexpected(detail.clone());
    tracing::error!(error = %err, "Handler panicked");
    logger.log_data(&err.to_string(), &json!({ "exception": detail }));

    let envelope: ErrorEnvelope = err.into();
    envelope_response(StatusCode::INTERNAL_SERVER_ERROR, &envelope)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::SystemClock;

    #[test]
    fn test_panic_response_logs_detail() {
        let logger = DiagnosticLogger::in_memory(Arc::new(SystemClock));
        let response = panic_response(&logger, Box::new("boom"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let events = logger.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "request exception: boom");
    }
}
