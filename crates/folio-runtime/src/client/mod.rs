//! Table viewer client: fetches reports from a Folio server and keeps a
//! `ViewState` fresh.

mod session;

pub use session::{RefreshTimer, ViewerSession};

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use reqwest::StatusCode;

use folio_core::config::ViewerConfig;
use folio_core::error::{FolioError, Result};
use folio_core::report::ReportSummary;
use folio_core::viewer::DescriptionMap;

/// Boxed future returned by `ReportSource`.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Where the viewer gets report fragments and descriptions from.
pub trait ReportSource: Send + Sync + 'static {
    /// Fetch a report's HTML fragment.
    fn fetch_report<'a>(&'a self, app_name: &'a str) -> SourceFuture<'a, String>;

    /// Fetch the description map.
    fn fetch_descriptions(&self) -> SourceFuture<'_, DescriptionMap>;
}

/// HTTP client for the report API.
///
/// Talks to the `/api/reports` routes, so the server must use `name`
/// addressing. Against a `filename` server every call fails with an
/// `Http` error saying so.
#[derive(Debug, Clone)]
pub struct ReportClient {
    http: reqwest::Client,
    base_url: String,
    descriptions_path: String,
}

impl ReportClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    /// Use a preconfigured `reqwest` client.
    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            descriptions_path: "data/desc.json".to_string(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut client = Self::new(config.server_url.clone());
        client.descriptions_path = config.descriptions_path.clone();
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET /api/reports`
    pub async fn list_reports(&self) -> Result<Vec<ReportSummary>> {
        let resp = self.get("/api/reports", "report list").await?;
        resp.json()
            .await
            .map_err(|e| FolioError::Http(format!("Invalid report list: {}", e)))
    }

    /// `GET /api/reports/{app_name}`
    pub async fn report_html(&self, app_name: &str) -> Result<String> {
        let resp = self
            .get(&format!("/api/reports/{}", app_name), app_name)
            .await?;
        resp.text().await.map_err(http_error)
    }

    /// `GET /api/reports/{app_name}/csv`
    pub async fn report_csv(&self, app_name: &str) -> Result<Vec<u8>> {
        let resp = self
            .get(&format!("/api/reports/{}/csv", app_name), app_name)
            .await?;
        Ok(resp.bytes().await.map_err(http_error)?.to_vec())
    }

    /// Download a report's CSV into `dest`, or `<app_name>_report.csv` in the
    /// current directory. Returns the written path.
    pub async fn download_csv(&self, app_name: &str, dest: Option<&Path>) -> Result<PathBuf> {
        let bytes = self.report_csv(app_name).await?;
        let path = dest
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(folio_core::report::csv_download_name(app_name)));
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!("Downloaded {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Fetch the description map.
    pub async fn descriptions(&self) -> Result<DescriptionMap> {
        let resp = self
            .get(&self.descriptions_path, "descriptions")
            .await?;
        let text = resp.text().await.map_err(http_error)?;
        DescriptionMap::from_json(&text)
    }

    async fn get(&self, path: &str, what: &str) -> Result<reqwest::Response> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(http_error)?;

        match resp.status() {
            s if s.is_success() => Ok(resp),
            StatusCode::NOT_FOUND => {
                let body = resp.text().await.unwrap_or_default();
                if is_api_error(&body) {
                    Err(FolioError::NotFound(what.to_string()))
                } else {
                    Err(FolioError::Http(format!(
                        "{} is not served by {}; the server may be using filename addressing",
                        path, self.base_url
                    )))
                }
            }
            StatusCode::BAD_REQUEST => Err(FolioError::InvalidInput(what.to_string())),
            s => Err(FolioError::Http(format!("{} returned {}", path, s))),
        }
    }
}

impl ReportSource for ReportClient {
    fn fetch_report<'a>(&'a self, app_name: &'a str) -> SourceFuture<'a, String> {
        Box::pin(self.report_html(app_name))
    }

    fn fetch_descriptions(&self) -> SourceFuture<'_, DescriptionMap> {
        Box::pin(self.descriptions())
    }
}

/// Whether a response body is the API's `{"error": ...}` JSON rather than a
/// bare 404 for an unmounted route.
fn is_api_error(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .map(|v| v.get("error").is_some())
        .unwrap_or(false)
}

fn http_error(e: reqwest::Error) -> FolioError {
    FolioError::Http(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayConfig, GatewayServer};
    use folio_core::config::Addressing;
    use folio_core::resolver::ReportResolver;
    use tempfile::TempDir;

    #[test]
    fn test_url_joining() {
        let client = ReportClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.url("/api/reports"),
            "http://localhost:3000/api/reports"
        );
        assert_eq!(
            client.url("data/desc.json"),
            "http://localhost:3000/data/desc.json"
        );
    }

    #[test]
    fn test_from_config() {
        let config = ViewerConfig {
            server_url: "http://reports:8080".to_string(),
            descriptions_path: "meta/desc.json".to_string(),
            ..Default::default()
        };
        let client = ReportClient::from_config(&config);
        assert_eq!(client.url(&client.descriptions_path), "http://reports:8080/meta/desc.json");
    }

    async fn spawn_server(data: &Path, public: &Path) -> ReportClient {
        spawn_server_with(data, public, Addressing::Name).await
    }

    async fn spawn_server_with(data: &Path, public: &Path, addressing: Addressing) -> ReportClient {
        let config = GatewayConfig {
            public_dir: public.to_path_buf(),
            addressing,
            ..Default::default()
        };
        let router = GatewayServer::new(config, ReportResolver::new(data, "app")).router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        ReportClient::with_http(format!("http://{}", addr), http)
    }

    fn fixture() -> (TempDir, TempDir) {
        let data = TempDir::new().unwrap();
        std::fs::create_dir_all(data.path().join("appOpen")).unwrap();
        std::fs::write(data.path().join("appOpen/open.html"), "<table></table>").unwrap();
        std::fs::write(data.path().join("appOpen/open.csv"), "a,b\n1,2\n").unwrap();

        let public = TempDir::new().unwrap();
        std::fs::create_dir_all(public.path().join("data")).unwrap();
        std::fs::write(
            public.path().join("data/desc.json"),
            r#"{"appOpen": "Open tickets"}"#,
        )
        .unwrap();
        (data, public)
    }

    #[tokio::test]
    async fn test_client_against_gateway() {
        let (data, public) = fixture();
        let client = spawn_server(data.path(), public.path()).await;

        let reports = client.list_reports().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].display_name, "Open");

        let html = client.report_html("appOpen").await.unwrap();
        assert_eq!(html, "<table></table>");

        let descriptions = client.descriptions().await.unwrap();
        assert_eq!(descriptions.describe("appOpen"), Some("Open tickets"));
    }

    #[tokio::test]
    async fn test_client_not_found() {
        let (data, public) = fixture();
        let client = spawn_server(data.path(), public.path()).await;

        let err = client.report_html("appMissing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_client_against_filename_server() {
        let (data, public) = fixture();
        let client = spawn_server_with(data.path(), public.path(), Addressing::Filename).await;

        let err = client.list_reports().await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("filename addressing"));

        let err = client.report_html("appOpen").await.unwrap_err();
        assert!(err.to_string().contains("filename addressing"));
    }

    #[test]
    fn test_is_api_error() {
        assert!(is_api_error(r#"{"error":"Report not found"}"#));
        assert!(!is_api_error(""));
        assert!(!is_api_error("<h1>Not Found</h1>"));
    }

    #[tokio::test]
    async fn test_download_csv() {
        let (data, public) = fixture();
        let client = spawn_server(data.path(), public.path()).await;
        let out = TempDir::new().unwrap();
        let dest = out.path().join("open.csv");

        let path = client.download_csv("appOpen", Some(dest.as_path())).await.unwrap();
        assert_eq!(path, dest);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "a,b\n1,2\n");
    }
}
