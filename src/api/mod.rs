//! Read-only REST API over the monitor state
//!
//! This is the data feed for dashboards. Handlers only ever read from
//! [`SharedState`](crate::state::SharedState); they never take part in the
//! scheduler's write path.
//!
//! ## Endpoints
//!
//! - `GET /api/v1/health` - Whether the daemon has started ticking
//! - `GET /api/v1/status` - Target, start time and current snapshot
//! - `GET /api/v1/history` - Measurement history (oldest first)
//! - `GET /api/v1/hiccups` - Detected hiccups (oldest first)
//! - `GET /api/v1/snapshot` - All of the above in one consistent read
//! - `GET /api/v1/stats` - Tick and hiccup counters

#[cfg(feature = "api")]
pub mod routes;
#[cfg(feature = "api")]
pub mod state;
#[cfg(feature = "api")]
pub mod types;

#[cfg(feature = "api")]
pub use state::ApiState;
#[cfg(feature = "api")]
pub use types::{HealthResponse, HiccupsResponse, HistoryResponse, StatusResponse};

#[cfg(feature = "api")]
use axum::{Router, routing::get};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::info;

use crate::{config::HttpConfig, util};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:3000")
    pub bind_addr: SocketAddr,

    /// Enable CORS for dashboards served from elsewhere
    pub enable_cors: bool,

    /// Directory with static assets served at `/`
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(util::get_default_addr(), util::get_default_port()),
            enable_cors: true,
            static_dir: None,
        }
    }
}

impl ApiConfig {
    /// Build the API configuration, environment variables take precedence
    /// over the config file.
    pub fn from_http_config(http: &HttpConfig) -> Self {
        let addr: IpAddr = util::get_addr()
            .or(http.addr)
            .unwrap_or_else(util::get_default_addr);
        let port = util::get_port()
            .or(http.port)
            .unwrap_or_else(util::get_default_port);

        Self {
            bind_addr: SocketAddr::new(addr, port),
            enable_cors: true,
            static_dir: http.static_dir.clone(),
        }
    }
}

/// Build the router with all routes and layers
#[cfg(feature = "api")]
pub fn router(config: &ApiConfig, state: ApiState) -> Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let mut app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/status", get(routes::status::get_status))
        .route("/api/v1/history", get(routes::status::get_history))
        .route("/api/v1/hiccups", get(routes::status::get_hiccups))
        .route("/api/v1/snapshot", get(routes::status::get_snapshot))
        .route("/api/v1/stats", get(routes::stats::get_stats))
        .with_state(state);

    if let Some(dir) = &config.static_dir {
        use tower_http::services::ServeDir;

        if dir.exists() {
            info!("serving static files from {}", dir.display());
            app = app.fallback_service(ServeDir::new(dir));
        } else {
            info!("static directory {} not found, skipping", dir.display());
        }
    }

    app = app.layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
#[cfg(feature = "api")]
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    use anyhow::Context;

    info!("starting API server on {}", config.bind_addr);

    let app = router(&config, state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
