use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use folio_core::config::FolioConfig;
use folio_core::error::{FolioError, Result};
use folio_core::resolver::ReportResolver;
use folio_runtime::gateway::{GatewayConfig, GatewayServer};
use folio_runtime::logging::init_logging;

/// The report server runtime.
pub struct Folio {
    config: FolioConfig,
    shutdown: CancellationToken,
}

impl Folio {
    pub fn builder() -> FolioBuilder {
        FolioBuilder::new()
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    /// Install logging, then serve until Ctrl-C or `shutdown`.
    pub async fn run(self) -> Result<()> {
        if let Some(path) = init_logging(&self.config.logging)? {
            tracing::info!("Logging to {}", path.display());
        }
        self.serve().await
    }

    /// Serve without touching the global subscriber.
    pub async fn serve(self) -> Result<()> {
        let resolver = ReportResolver::from_config(&self.config.reports);
        let server = GatewayServer::new(GatewayConfig::from(&self.config), resolver);

        let token = self.shutdown.clone();
        let shutdown = async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received shutdown signal");
                }
                _ = token.cancelled() => {
                    tracing::info!("Received shutdown notification");
                }
            }
        };

        server.run(shutdown).await?;
        tracing::info!("Web server stopped");
        Ok(())
    }

    /// Request shutdown.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Builder for `Folio`.
#[derive(Default)]
pub struct FolioBuilder {
    config: Option<FolioConfig>,
    data_dir: Option<PathBuf>,
}

impl FolioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: FolioConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the report root directory.
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Folio> {
        let mut config = self
            .config
            .ok_or_else(|| FolioError::Config("Configuration is required".into()))?;

        if let Some(dir) = self.data_dir {
            config.reports.data_dir = dir;
        }
        if config.reports.data_dir.as_os_str().is_empty() {
            return Err(FolioError::Config("Report data directory is empty".into()));
        }

        Ok(Folio {
            config,
            shutdown: CancellationToken::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> FolioConfig {
        let mut config = FolioConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config.reports.data_dir = dir.path().to_path_buf();
        config.logging.file_enabled = false;
        config
    }

    #[test]
    fn test_build_requires_config() {
        let result = Folio::builder().build();
        assert!(matches!(result, Err(FolioError::Config(_))));
    }

    #[test]
    fn test_build_data_dir_override() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::builder()
            .config(test_config(&dir))
            .data_dir("/srv/reports")
            .build()
            .unwrap();
        assert_eq!(folio.config().reports.data_dir, PathBuf::from("/srv/reports"));
    }

    #[test]
    fn test_build_rejects_empty_data_dir() {
        let dir = TempDir::new().unwrap();
        let result = Folio::builder()
            .config(test_config(&dir))
            .data_dir("")
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::builder().config(test_config(&dir)).build().unwrap();

        folio.shutdown();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), folio.serve()).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_serve_bind_failure() {
        let dir = TempDir::new().unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = test_config(&dir);
        config.server.port = listener.local_addr().unwrap().port();

        let folio = Folio::builder().config(config).build().unwrap();
        let result = folio.serve().await;
        assert!(matches!(result, Err(FolioError::Startup(_))));
    }
}
