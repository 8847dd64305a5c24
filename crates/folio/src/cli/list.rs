use anyhow::Result;
use clap::Parser;
use console::style;

use super::{init_client_tracing, ClientArgs};

/// List reports available on a server.
#[derive(Parser, Debug)]
pub struct ListCommand {
    #[command(flatten)]
    pub client: ClientArgs,
}

impl ListCommand {
    /// Execute the list command.
    pub async fn execute(self) -> Result<()> {
        init_client_tracing();

        let client = self.client.client()?;
        let reports = client.list_reports().await?;

        if reports.is_empty() {
            println!("No reports available at {}", client.base_url());
            return Ok(());
        }

        let width = reports.iter().map(|r| r.app_name.len()).max().unwrap_or(0);
        for report in &reports {
            let name = format!("{:width$}", report.app_name, width = width);
            println!("  {}  {}", style(name).bold(), report.display_name);
        }
        Ok(())
    }
}
