mod logging;
mod viewer;

pub use logging::LoggingConfig;
pub use viewer::{ViewerConfig, TICKET_ID_PLACEHOLDER};

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Root configuration for Folio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Report discovery configuration.
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Log sink configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Table viewer client configuration.
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl FolioConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FolioError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content);

        toml::from_str(&content)
            .map_err(|e| FolioError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply `PORT`, `FOLIO_DATA_DIR` and `FOLIO_LOG_DIR` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| FolioError::Config(format!("Invalid PORT value: {}", port)))?;
        }
        if let Some(dir) = lookup("FOLIO_DATA_DIR") {
            self.reports.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FOLIO_LOG_DIR") {
            self.logging.dir = PathBuf::from(dir);
        }
        Ok(())
    }
}

/// How reports are addressed over HTTP. A deployment mounts exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Addressing {
    /// `/api/reports/{appName}` by logical report name.
    #[default]
    Name,
    /// `/report/{filename}` by raw file name.
    Filename,
}

impl std::str::FromStr for Addressing {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "filename" => Ok(Self::Filename),
            other => Err(FolioError::Config(format!(
                "Unknown addressing mode '{}', expected 'name' or 'filename'",
                other
            ))),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static assets served at the root.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Report addressing scheme.
    #[serde(default)]
    pub addressing: Addressing,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
            addressing: Addressing::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Report discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Root directory holding one subdirectory per report.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Prefix stripped from directory names to build display names.
    #[serde(default = "default_display_prefix")]
    pub display_prefix: String,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            display_prefix: default_display_prefix(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/mnt/cwm-data")
}

fn default_display_prefix() -> String {
    "app".to_string()
}

static ENV_VAR: Lazy<regex_lite::Regex> = Lazy::new(|| {
    regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern")
});

/// Substitute environment variables in the format ${VAR_NAME}.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    for cap in ENV_VAR.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = FolioConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.addressing, Addressing::Name);
        assert_eq!(config.reports.data_dir, PathBuf::from("/mnt/cwm-data"));
        assert_eq!(config.logging.dir, PathBuf::from("/mnt/cwm-logs"));
        assert_eq!(config.viewer.refresh_interval_secs, 300);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = FolioConfig::parse_toml("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.reports.display_prefix, "app");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [server]
            port = 8081
            public_dir = "static"
            addressing = "filename"

            [reports]
            data_dir = "/srv/reports"
            display_prefix = "rpt"

            [logging]
            dir = "/var/log/folio"
            level = "debug"
            file_enabled = false

            [viewer]
            refresh_interval_secs = 60
            ticket_column = "Ticket"
        "#;

        let config = FolioConfig::parse_toml(toml).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.addressing, Addressing::Filename);
        assert_eq!(config.reports.data_dir, PathBuf::from("/srv/reports"));
        assert_eq!(config.reports.display_prefix, "rpt");
        assert!(!config.logging.file_enabled);
        assert_eq!(config.viewer.refresh_interval_secs, 60);
        assert_eq!(config.viewer.ticket_column, "Ticket");
        assert_eq!(config.viewer.board_keyword, "board");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = FolioConfig::parse_toml("[server]\nport = \"not a number\"");
        assert!(matches!(result, Err(FolioError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [("PORT", "4000"), ("FOLIO_DATA_DIR", "/tmp/data")]
            .into_iter()
            .collect();
        let mut config = FolioConfig::default();
        config
            .apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.reports.data_dir, PathBuf::from("/tmp/data"));
        assert_eq!(config.logging.dir, PathBuf::from("/mnt/cwm-logs"));
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = FolioConfig::default();
        let result = config.apply_overrides_from(|k| (k == "PORT").then(|| "abc".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_addressing_from_str() {
        assert_eq!("name".parse::<Addressing>().unwrap(), Addressing::Name);
        assert_eq!(
            "FILENAME".parse::<Addressing>().unwrap(),
            Addressing::Filename
        );
        assert!("path".parse::<Addressing>().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = FolioConfig::load_or_default("/definitely/not/here.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
