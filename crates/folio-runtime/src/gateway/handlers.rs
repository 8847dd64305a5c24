use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use folio_core::error::FolioError;
use folio_core::report::{csv_download_name, ReportSummary};

use super::response::ApiError;
use super::server::GatewayState;

/// Content type chosen from a served file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Csv,
    Text,
}

impl ContentKind {
    pub fn from_path(path: impl AsRef<FsPath>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("html") => Self::Html,
            Some("csv") => Self::Csv,
            _ => Self::Text,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }
}

/// `GET /api/reports`
pub async fn list_reports(
    State(state): State<Arc<GatewayState>>,
) -> Result<Json<Vec<ReportSummary>>, ApiError> {
    let reports = state
        .resolver
        .list_reports()
        .await
        .map_err(|e| ApiError::from_error("GET /api/reports", e, "Failed to fetch reports"))?;

    Ok(Json(reports.iter().map(|r| r.summary()).collect()))
}

/// `GET /api/reports/{app_name}`
pub async fn report_html(
    State(state): State<Arc<GatewayState>>,
    Path(app_name): Path<String>,
) -> Result<Html<String>, ApiError> {
    match state.resolver.get_report_html(&app_name).await {
        Ok(html) => {
            tracing::info!("Served HTML report: {}", app_name);
            Ok(Html(html))
        }
        Err(FolioError::NotFound(_)) => {
            tracing::info!("Report not found: {}", app_name);
            Err(ApiError::not_found("Report not found"))
        }
        Err(e) => Err(ApiError::from_error(
            "GET /api/reports/{appName}",
            e,
            "Failed to fetch report",
        )),
    }
}

/// `GET /api/reports/{app_name}/csv`
pub async fn report_csv(
    State(state): State<Arc<GatewayState>>,
    Path(app_name): Path<String>,
) -> Result<Response, ApiError> {
    match state.resolver.get_report_csv(&app_name).await {
        Ok(csv) => {
            tracing::info!("Served CSV download: {}", app_name);
            Ok(file_response(ContentKind::Csv, &csv_download_name(&app_name), csv.into_bytes()))
        }
        Err(FolioError::NotFound(_)) => {
            tracing::info!("CSV file not found for: {}", app_name);
            Err(ApiError::not_found("CSV file not found"))
        }
        Err(e) => Err(ApiError::from_error(
            "GET /api/reports/{appName}/csv",
            e,
            "Failed to download CSV",
        )),
    }
}

/// `GET /report/{*filename}`
pub async fn report_file(
    State(state): State<Arc<GatewayState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = match state.resolver.resolve_by_filename(&filename).await {
        Ok(path) => path,
        Err(FolioError::InvalidInput(reason)) => {
            tracing::warn!("Rejected file request '{}': {}", filename, reason);
            return Err(ApiError::bad_request("Invalid file name"));
        }
        Err(FolioError::NotFound(_)) => {
            tracing::info!("File not found: {}", filename);
            return Err(ApiError::not_found("File not found"));
        }
        Err(e) => return Err(ApiError::from_error("GET /report/{filename}", e, "Failed to read file")),
    };

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::from_error("GET /report/{filename}", e.into(), "Failed to read file"))?;

    tracing::info!("Served file: {}", path.display());
    Ok(file_response(ContentKind::from_path(&path), &filename, bytes))
}

fn file_response(kind: ContentKind, filename: &str, body: Vec<u8>) -> Response {
    match kind {
        ContentKind::Csv => (
            [
                (header::CONTENT_TYPE, kind.mime().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            body,
        )
            .into_response(),
        _ => ([(header::CONTENT_TYPE, kind.mime())], body).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind() {
        assert_eq!(ContentKind::from_path("a/report.html"), ContentKind::Html);
        assert_eq!(ContentKind::from_path("report.csv"), ContentKind::Csv);
        assert_eq!(ContentKind::from_path("notes.txt"), ContentKind::Text);
        assert_eq!(ContentKind::from_path("README"), ContentKind::Text);
    }

    #[test]
    fn test_csv_response_headers() {
        let resp = file_response(ContentKind::Csv, "appOpen_report.csv", b"a,b".to_vec());
        let headers = resp.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"appOpen_report.csv\""
        );
    }

    #[test]
    fn test_text_response_has_no_disposition() {
        let resp = file_response(ContentKind::Text, "notes.txt", b"hi".to_vec());
        assert!(resp.headers().get(header::CONTENT_DISPOSITION).is_none());
    }
}
