use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A discovered report: one directory holding an HTML view and an optional CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Directory name, unique under the data root.
    pub app_name: String,
    /// Human-facing name derived from `app_name`.
    pub display_name: String,
    /// The report's HTML file.
    pub html_path: PathBuf,
    /// The report's CSV sibling, if any.
    pub csv_path: Option<PathBuf>,
}

impl Report {
    /// The listing entry sent to clients.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            app_name: self.app_name.clone(),
            display_name: self.display_name.clone(),
        }
    }

    /// File name suggested for CSV downloads.
    pub fn csv_download_name(&self) -> String {
        csv_download_name(&self.app_name)
    }
}

/// Report listing entry as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub app_name: String,
    pub display_name: String,
}

/// Strip `prefix` from `app_name` when present and something remains.
///
/// `display_name("appTimeSinceLastTimeEntry", "app")` is `"TimeSinceLastTimeEntry"`,
/// while `display_name("app", "app")` stays `"app"`.
pub fn display_name(app_name: &str, prefix: &str) -> String {
    match app_name.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() && !rest.is_empty() => rest.to_string(),
        _ => app_name.to_string(),
    }
}

/// `<appName>_report.csv`
pub fn csv_download_name(app_name: &str) -> String {
    format!("{}_report.csv", app_name)
}
