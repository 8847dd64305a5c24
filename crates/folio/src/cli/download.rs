use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use super::{init_client_tracing, ClientArgs};

/// Download a report's CSV export.
#[derive(Parser, Debug)]
pub struct DownloadCommand {
    /// Report to download (e.g. appOpenTickets).
    pub app_name: String,

    /// Destination file (defaults to `<appName>_report.csv`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub client: ClientArgs,
}

impl DownloadCommand {
    /// Execute the download command.
    pub async fn execute(self) -> Result<()> {
        init_client_tracing();

        let client = self.client.client()?;
        let path = client
            .download_csv(&self.app_name, self.output.as_deref())
            .await?;

        println!("Saved {}", style(path.display()).green());
        Ok(())
    }
}
