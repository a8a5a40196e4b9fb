//! Todo list backend: JSON over HTTP on top of SQLite.
//!
//! # Overview
//! Requests flow transport (`api`) → service (`service`) → gateway (`repo`)
//! → SQLite (`db`). Every response body is an `envelope::Envelope`.
//!
//! # Design
//! - `AppState` is immutable and cheap to clone: the database path and the
//!   startup `Config`. Nothing mutable is shared between requests.
//! - Each request opens its own connection and transaction (see
//!   `Database::with_transaction`).

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod api;
pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::Config;
pub use db::Database;
pub use envelope::Envelope;
pub use error::ApiError;
pub use model::{Todo, TodoId};

pub const API_PREFIX: &str = "/api/v1";

/// Paths the browser-client fallback must never answer.
const RESERVED_PREFIXES: &[&str] = &["api/", "health", "assets/"];

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    fn spa_index(&self) -> Option<PathBuf> {
        let index = self.config.static_dir.as_ref()?.join("index.html");
        index.is_file().then_some(index)
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, api::routes());

    if let Some(static_dir) = &state.config.static_dir {
        let assets = static_dir.join("assets");
        if assets.is_dir() {
            router = router.nest_service("/assets", ServeDir::new(assets));
        }
    }

    router
        .fallback(fallback)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `app` on `listener` until ctrl-c.
pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, environment = %state.config.environment, "listening");
    }
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn health() -> Json<Envelope<Health>> {
    Json(Envelope::success(Health { ok: true }))
}

/// Unmatched paths: the browser client's `index.html` when one is configured
/// and the path is not reserved, otherwise a 404 envelope.
async fn fallback(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path().trim_start_matches('/');
    let reserved = RESERVED_PREFIXES.iter().any(|prefix| path.starts_with(prefix));

    if !reserved {
        if let Some(index) = state.spa_index() {
            return match ServeFile::new(index).oneshot(request).await {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            };
        }
    }
    ApiError::NotFound("Not Found".to_string()).into_response()
}

pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
