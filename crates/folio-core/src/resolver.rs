//! Report discovery over the data root.
//!
//! Every call re-reads the filesystem; nothing is cached between requests,
//! so a report appears or disappears as soon as its directory does.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::config::ReportsConfig;
use crate::error::{FolioError, Result};
use crate::report::{display_name, Report};

const HTML_EXTENSION: &str = ".html";
const CSV_EXTENSION: &str = ".csv";

/// Resolves report names and file names to paths under the data root.
#[derive(Debug, Clone)]
pub struct ReportResolver {
    data_dir: PathBuf,
    display_prefix: String,
}

impl ReportResolver {
    /// Create a resolver over `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>, display_prefix: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            display_prefix: display_prefix.into(),
        }
    }

    /// Create a resolver from the reports configuration section.
    pub fn from_config(config: &ReportsConfig) -> Self {
        Self::new(config.data_dir.clone(), config.display_prefix.clone())
    }

    /// The data root.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Scan the data root and return every discoverable report, ordered by name.
    ///
    /// A missing data root yields an empty list.
    pub async fn list_reports(&self) -> Result<Vec<Report>> {
        let Some(dirs) = self.report_dirs().await? else {
            tracing::info!("Data directory not found: {}", self.data_dir.display());
            return Ok(Vec::new());
        };

        let mut reports = Vec::new();
        for (app_name, dir) in dirs {
            let files = match scan_report_dir(&dir).await {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!("Skipping unreadable report directory {}: {}", dir.display(), e);
                    continue;
                }
            };

            if let Some(html_path) = files.html {
                reports.push(Report {
                    display_name: display_name(&app_name, &self.display_prefix),
                    app_name,
                    html_path,
                    csv_path: files.csv,
                });
            }
        }

        tracing::info!("Discovered {} available reports", reports.len());
        Ok(reports)
    }

    /// Find a report by its directory name.
    pub async fn find_report(&self, app_name: &str) -> Result<Report> {
        self.list_reports()
            .await?
            .into_iter()
            .find(|r| r.app_name == app_name)
            .ok_or_else(|| FolioError::NotFound(format!("report '{}'", app_name)))
    }

    /// Read a report's HTML file.
    pub async fn get_report_html(&self, app_name: &str) -> Result<String> {
        let report = self.find_report(app_name).await?;
        read_lossy(&report.html_path).await
    }

    /// Read a report's CSV file. Fails with `NotFound` when the report has none.
    pub async fn get_report_csv(&self, app_name: &str) -> Result<String> {
        let report = self.find_report(app_name).await?;
        let csv_path = report
            .csv_path
            .ok_or_else(|| FolioError::NotFound(format!("CSV file for '{}'", app_name)))?;
        read_lossy(&csv_path).await
    }

    /// Locate a file by exact name in any report directory.
    ///
    /// Names containing `..`, path separators or NUL are rejected before
    /// the filesystem is touched. Directories are scanned in name order and
    /// the first regular file wins.
    pub async fn resolve_by_filename(&self, filename: &str) -> Result<PathBuf> {
        validate_filename(filename)?;

        let Some(dirs) = self.report_dirs().await? else {
            return Err(FolioError::NotFound(format!("file '{}'", filename)));
        };

        for (_, dir) in dirs {
            let candidate = dir.join(filename);
            match fs::metadata(&candidate).await {
                Ok(meta) if meta.is_file() => return Ok(candidate),
                _ => continue,
            }
        }

        Err(FolioError::NotFound(format!("file '{}'", filename)))
    }

    /// Immediate subdirectories of the data root as `(name, path)`, sorted by
    /// name; `None` when the root does not exist.
    async fn report_dirs(&self) -> Result<Option<Vec<(String, PathBuf)>>> {
        let mut entries = match fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_dir = fs::metadata(&path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                dirs.push((name.to_string(), path));
            }
        }

        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Some(dirs))
    }
}

#[derive(Debug, Default)]
struct ReportFiles {
    html: Option<PathBuf>,
    csv: Option<PathBuf>,
}

/// First `.html` and first `.csv` file (by name) in a report directory.
async fn scan_report_dir(dir: &Path) -> Result<ReportFiles> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_file = fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();

    let pick = |ext: &str| {
        names
            .iter()
            .find(|name| name.ends_with(ext))
            .map(|name| dir.join(name))
    };

    Ok(ReportFiles {
        html: pick(HTML_EXTENSION),
        csv: pick(CSV_EXTENSION),
    })
}

/// Read a text file, replacing invalid UTF-8 sequences.
async fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).await?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("{} is not valid UTF-8, decoding lossily", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}

fn validate_filename(filename: &str) -> Result<()> {
    if filename.contains("..") {
        return Err(FolioError::InvalidInput(
            "file name must not contain '..'".to_string(),
        ));
    }
    if filename.is_empty() || filename.contains(['/', '\\', '\0']) {
        return Err(FolioError::InvalidInput(format!(
            "invalid file name '{}'",
            filename
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "appOpenTickets/open.html", "<table></table>");
        write(dir.path(), "appOpenTickets/open.csv", "a,b\n1,2\n");
        write(dir.path(), "appTimeEntries/time.html", "<p>time</p>");
        write(dir.path(), "Scratch/notes.txt", "not a report");
        std::fs::create_dir_all(dir.path().join("Empty")).unwrap();
        write(dir.path(), "stray.html", "top-level files are ignored");
        dir
    }

    #[tokio::test]
    async fn test_list_reports_includes_only_dirs_with_html() {
        let dir = fixture();
        let resolver = ReportResolver::new(dir.path(), "app");

        let reports = resolver.list_reports().await.unwrap();
        let names: Vec<_> = reports.iter().map(|r| r.app_name.as_str()).collect();
        assert_eq!(names, vec!["appOpenTickets", "appTimeEntries"]);

        assert_eq!(reports[0].display_name, "OpenTickets");
        assert!(reports[0].csv_path.is_some());
        assert!(reports[1].csv_path.is_none());
    }

    #[tokio::test]
    async fn test_list_reports_missing_root_is_empty() {
        let resolver = ReportResolver::new("/definitely/not/a/data/root", "app");
        let reports = resolver.list_reports().await.unwrap();
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_list_reports_reflects_removal() {
        let dir = fixture();
        let resolver = ReportResolver::new(dir.path(), "app");
        assert_eq!(resolver.list_reports().await.unwrap().len(), 2);

        std::fs::remove_file(dir.path().join("appTimeEntries/time.html")).unwrap();
        assert_eq!(resolver.list_reports().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_first_html_by_name_is_chosen() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "appMulti/b.html", "b");
        write(dir.path(), "appMulti/a.html", "a");
        let resolver = ReportResolver::new(dir.path(), "app");

        assert_eq!(resolver.get_report_html("appMulti").await.unwrap(), "a");
    }

    #[tokio::test]
    async fn test_get_report_html_and_csv() {
        let dir = fixture();
        let resolver = ReportResolver::new(dir.path(), "app");

        let html = resolver.get_report_html("appOpenTickets").await.unwrap();
        assert_eq!(html, "<table></table>");
        let csv = resolver.get_report_csv("appOpenTickets").await.unwrap();
        assert!(csv.starts_with("a,b"));
    }

    #[tokio::test]
    async fn test_non_utf8_report_is_served_lossily() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("appLatin")).unwrap();
        // Windows-1252 "Café" followed by a table
        std::fs::write(
            dir.path().join("appLatin/latin.html"),
            b"<p>Caf\xe9</p><table></table>",
        )
        .unwrap();
        std::fs::write(dir.path().join("appLatin/latin.csv"), b"name\nCaf\xe9\n").unwrap();
        let resolver = ReportResolver::new(dir.path(), "app");

        let html = resolver.get_report_html("appLatin").await.unwrap();
        assert_eq!(html, "<p>Caf\u{FFFD}</p><table></table>");
        let csv = resolver.get_report_csv("appLatin").await.unwrap();
        assert_eq!(csv, "name\nCaf\u{FFFD}\n");
    }

    #[tokio::test]
    async fn test_unknown_report_is_not_found() {
        let dir = fixture();
        let resolver = ReportResolver::new(dir.path(), "app");

        let err = resolver.get_report_html("appMissing").await.unwrap_err();
        assert!(err.is_not_found());
        let err = resolver.get_report_csv("appMissing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_csv_missing_is_not_found() {
        let dir = fixture();
        let resolver = ReportResolver::new(dir.path(), "app");

        let err = resolver.get_report_csv("appTimeEntries").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolve_by_filename() {
        let dir = fixture();
        let resolver = ReportResolver::new(dir.path(), "app");

        let path = resolver.resolve_by_filename("time.html").await.unwrap();
        assert_eq!(path, dir.path().join("appTimeEntries/time.html"));

        let path = resolver.resolve_by_filename("notes.txt").await.unwrap();
        assert!(path.ends_with("Scratch/notes.txt"));
    }

    #[tokio::test]
    async fn test_resolve_by_filename_rejects_traversal() {
        let dir = fixture();
        let resolver = ReportResolver::new(dir.path(), "app");

        let err = resolver
            .resolve_by_filename("../../etc/passwd")
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::InvalidInput(_)));

        let err = resolver.resolve_by_filename("..").await.unwrap_err();
        assert!(matches!(err, FolioError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_resolve_by_filename_skips_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/report.html")).unwrap();
        write(dir.path(), "b/report.html", "real");
        let resolver = ReportResolver::new(dir.path(), "app");

        let path = resolver.resolve_by_filename("report.html").await.unwrap();
        assert_eq!(path, dir.path().join("b/report.html"));
    }

    #[tokio::test]
    async fn test_resolve_by_filename_not_found() {
        let dir = fixture();
        let resolver = ReportResolver::new(dir.path(), "app");

        let err = resolver.resolve_by_filename("nope.html").await.unwrap_err();
        assert!(err.is_not_found());

        let missing = ReportResolver::new(dir.path().join("missing"), "app");
        let err = missing.resolve_by_filename("time.html").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
