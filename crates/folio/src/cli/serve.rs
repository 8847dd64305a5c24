use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use folio::Folio;
use folio_core::config::{Addressing, FolioConfig};

/// Run the report server.
#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "folio.toml")]
    pub config: String,

    /// Port to listen on (overrides config and PORT).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Report root directory (overrides config).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Report addressing: `name` or `filename`.
    #[arg(long)]
    pub addressing: Option<Addressing>,

    /// Log to stdout only.
    #[arg(long)]
    pub no_log_file: bool,
}

impl ServeCommand {
    /// Build the effective configuration: file, then environment, then flags.
    pub fn load_config(&self) -> Result<FolioConfig> {
        let mut config = FolioConfig::load_or_default(&self.config)?;
        config.apply_env_overrides()?;

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.data_dir {
            config.reports.data_dir = dir.clone();
        }
        if let Some(addressing) = self.addressing {
            config.server.addressing = addressing;
        }
        if self.no_log_file {
            config.logging.file_enabled = false;
        }
        Ok(config)
    }

    /// Execute the serve command.
    pub async fn execute(self) -> Result<()> {
        let config = self.load_config()?;

        println!();
        println!(
            "  {} v{}",
            style("Folio").bold().cyan(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "  Listening on {}",
            style(format!("http://{}:{}", config.server.host, config.server.port)).cyan()
        );
        println!(
            "  Reports from {}",
            style(config.reports.data_dir.display()).cyan()
        );
        println!();

        let folio = Folio::builder().config(config).build()?;
        folio.run().await?;

        Ok(())
    }
}
