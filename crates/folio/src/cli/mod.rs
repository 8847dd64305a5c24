mod download;
mod list;
mod serve;
mod view;

pub use download::DownloadCommand;
pub use list::ListCommand;
pub use serve::ServeCommand;
pub use view::ViewCommand;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use folio_core::config::{FolioConfig, ViewerConfig};
use folio_runtime::client::ReportClient;

/// Folio - report server and table viewer
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the report server.
    Serve(ServeCommand),

    /// List reports available on a server.
    List(ListCommand),

    /// Fetch a report and show it as a table.
    View(ViewCommand),

    /// Download a report's CSV export.
    Download(DownloadCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(cmd) => cmd.execute().await,
            Commands::List(cmd) => cmd.execute().await,
            Commands::View(cmd) => cmd.execute().await,
            Commands::Download(cmd) => cmd.execute().await,
        }
    }
}

/// Options shared by commands that talk to a running server.
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "folio.toml")]
    pub config: String,

    /// Server base URL (overrides config).
    #[arg(long)]
    pub server: Option<String>,
}

impl ClientArgs {
    pub fn viewer_config(&self) -> Result<ViewerConfig> {
        let mut viewer = FolioConfig::load_or_default(&self.config)?.viewer;
        if let Some(server) = &self.server {
            viewer.server_url = server.clone();
        }
        Ok(viewer)
    }

    pub fn client(&self) -> Result<ReportClient> {
        Ok(ReportClient::from_config(&self.viewer_config()?))
    }
}

/// Warnings and errors to stderr for client commands.
fn init_client_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .with_writer(std::io::stderr)
        .try_init();
}
