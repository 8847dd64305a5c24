use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use folio_core::config::{Addressing, FolioConfig};
use folio_core::error::{FolioError, Result};
use folio_core::resolver::ReportResolver;

use super::handlers;
use super::tracing::{RequestState, REQUEST_ID_HEADER};

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Interface to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Static asset directory served for unmatched paths.
    pub public_dir: PathBuf,
    /// Which report addressing scheme to mount.
    pub addressing: Addressing,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from(&FolioConfig::default())
    }
}

impl From<&FolioConfig> for GatewayConfig {
    fn from(config: &FolioConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            public_dir: config.server.public_dir.clone(),
            addressing: config.server.addressing,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// State shared by the report handlers.
#[derive(Debug)]
pub struct GatewayState {
    pub resolver: ReportResolver,
}

/// Gateway HTTP server.
pub struct GatewayServer {
    config: GatewayConfig,
    state: Arc<GatewayState>,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(config: GatewayConfig, resolver: ReportResolver) -> Self {
        Self {
            config,
            state: Arc::new(GatewayState { resolver }),
        }
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let reports = match self.config.addressing {
            Addressing::Name => Router::new()
                .route("/api/reports", get(handlers::list_reports))
                .route("/api/reports/{app_name}", get(handlers::report_html))
                .route("/api/reports/{app_name}/csv", get(handlers::report_csv)),
            Addressing::Filename => {
                Router::new().route("/report/{*filename}", get(handlers::report_file))
            }
        };

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers(Any);

        Router::new()
            .route("/health", get(health_handler))
            .merge(reports.with_state(self.state.clone()))
            .fallback_service(ServeDir::new(&self.config.public_dir))
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(request_log_middleware))
                    .layer(cors),
            )
    }

    /// Get the socket address to bind to.
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| {
                FolioError::Config(format!(
                    "Invalid listen address {}:{}: {}",
                    self.config.host, self.config.port, e
                ))
            })
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| FolioError::Startup(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!("Web server started on port {}", self.config.port);
        tracing::info!(
            "Watching for reports in: {}",
            self.state.resolver.data_dir().display()
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

/// Health check handler.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Logs every request outcome and tags the response with its request ID.
async fn request_log_middleware(
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let request_id = req
        .headers()
        .get(HeaderName::from_static(REQUEST_ID_HEADER))
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let state = request_id
        .map(RequestState::with_request_id)
        .unwrap_or_default();

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(state.clone());

    let mut response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = state.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(request_id = %state.request_id, elapsed_ms, "{} {} {}", method, path, status.as_u16());
    } else {
        tracing::info!(request_id = %state.request_id, elapsed_ms, "{} {} {}", method, path, status.as_u16());
    }

    if let Ok(val) = HeaderValue::from_str(&state.request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), val);
    }

    response
}
