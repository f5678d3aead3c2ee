// src/server/mod.rs
// =============================================================================
// The HTTP service.
//
// One endpoint, POST /check-links, used by the web form. Each request runs
// its own check; the only thing requests share is the read-only checker
// (HTTP client, settings and restricted domains).
//
// Submodules:
// - handlers: the endpoint itself
// - dto: request/response JSON shapes
// - error: error -> { "error": "..." } responses
// =============================================================================

pub mod dto;
mod error;
mod handlers;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::checker::BatchChecker;
use crate::cli::ServeArgs;

use handlers::check_links_handler;

#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<BatchChecker>,
}

/// Builds the router with CORS for `allowed_origins`.
///
/// A `*` entry allows every origin; the other entries are then ignored.
///
/// # Errors
///
/// Returns an error if an origin is not a valid header value.
pub fn app_router(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(allow_origin(allowed_origins)?)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/check-links", post(check_links_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

// AllowOrigin::list panics on a wildcard, so it never gets one
fn allow_origin(allowed_origins: &[String]) -> Result<AllowOrigin> {
    if allowed_origins.iter().any(|origin| origin.trim() == "*") {
        tracing::warn!("CORS allows any origin");
        return Ok(AllowOrigin::any());
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .with_context(|| format!("Invalid allowed origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AllowOrigin::list(origins))
}

/// Runs the HTTP server until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the address cannot be
/// bound or the server fails while running.
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = args.checker.to_config();
    config.validate().context("Invalid checker configuration")?;

    tracing::info!(
        restricted = ?config.domain_policy().domains(),
        mode = ?config.domain_match,
        concurrency = config.concurrency,
        "link checker ready"
    );

    let checker = BatchChecker::new(config).context("Failed to create link checker")?;
    let state = AppState {
        checker: Arc::new(checker),
    };

    let app = app_router(state, &args.allowed_origins)?;

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("LISTEN must be in format 'host:port', got '{}'", args.listen))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
