use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::{measure_text_width, pad_str, style, Alignment};

use folio_core::table::{SortDirection, TableView};
use folio_core::viewer::{ViewState, ViewStatus, ViewerOptions};
use folio_runtime::client::ViewerSession;

use super::{init_client_tracing, ClientArgs};

/// Fetch a report and show it as a table.
#[derive(Parser, Debug)]
pub struct ViewCommand {
    /// Report to show (e.g. appOpenTickets).
    pub app_name: String,

    /// Only show rows for this board. Repeat to select several.
    #[arg(long = "board")]
    pub boards: Vec<String>,

    /// Sort by this column. Naming a column twice sorts it descending.
    #[arg(long)]
    pub sort: Vec<String>,

    /// Print the rendered HTML fragment instead of a text table.
    #[arg(long)]
    pub html: bool,

    /// Keep running and reprint on every refresh.
    #[arg(short, long)]
    pub watch: bool,

    #[command(flatten)]
    pub client: ClientArgs,
}

impl ViewCommand {
    /// Execute the view command.
    pub async fn execute(self) -> Result<()> {
        init_client_tracing();

        let viewer = self.client.viewer_config()?;
        let client = self.client.client()?;
        let refresh = Duration::from_secs(viewer.refresh_interval_secs.max(1));

        let mut session = ViewerSession::new(client, ViewerOptions::from(&viewer), refresh);
        session.select(&self.app_name).await;
        let output = session.with_state(|view| self.apply_and_render(view)).await;
        println!("{}", output);

        if !self.watch {
            return Ok(());
        }

        let mut loads = session.subscribe();
        loads.borrow_and_update();
        loop {
            tokio::select! {
                changed = loads.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let output = session.with_state(|view| self.render(view)).await;
                    println!("{}", style(format!("-- refreshed {} --", self.app_name)).dim());
                    println!("{}", output);
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        session.stop();
        Ok(())
    }

    /// Apply the requested board selection and sorts, then render.
    fn apply_and_render(&self, view: &mut ViewState) -> String {
        if !self.boards.is_empty() {
            view.select_boards(&self.boards);
        }
        for column in &self.sort {
            if view.click_header_named(column).is_none() {
                tracing::warn!("No column named '{}'", column);
            }
        }
        self.render(view)
    }

    fn render(&self, view: &ViewState) -> String {
        if self.html {
            return view.render();
        }

        let mut out = String::new();
        if let Some(description) = view.description() {
            out.push_str(&format!("{}\n\n", style(description).italic()));
        }
        match (view.status(), view.table()) {
            (ViewStatus::Failed(message), _) => out.push_str(&style(message).red().to_string()),
            (_, Some(table)) => {
                let text = text_table(table);
                let mut lines = Vec::with_capacity(text.body.len() + 1);
                if let Some(header) = text.header {
                    lines.push(style(header).bold().to_string());
                }
                lines.extend(text.body);
                out.push_str(&lines.join("\n"));
            }
            (_, None) => out.push_str(&view.render()),
        }
        out
    }
}

/// Plain-text rendering of the visible rows.
#[derive(Debug)]
struct TextTable {
    /// `None` when the table has no header row.
    header: Option<String>,
    body: Vec<String>,
}

fn text_table(table: &TableView) -> TextTable {
    let columns = table.column_count();
    let sorted = table.sorted_column();
    let headers: Vec<String> = table
        .headers()
        .into_iter()
        .enumerate()
        .map(|(i, header)| match sorted {
            Some((column, SortDirection::Asc)) if column == i => format!("{} ^", header),
            Some((column, SortDirection::Desc)) if column == i => format!("{} v", header),
            _ => header.to_string(),
        })
        .collect();

    let rows: Vec<Vec<&str>> = table
        .visible_rows()
        .map(|row| (0..columns).map(|i| row.text(i)).collect())
        .collect();

    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            rows.iter()
                .map(|row| measure_text_width(row[i]))
                .chain(headers.get(i).map(|h| measure_text_width(h)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad_str(cell, *width, Alignment::Left, None).into_owned())
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header = (!headers.is_empty()).then(|| {
        line((0..columns).map(|i| headers.get(i).map_or("", String::as_str)).collect())
    });
    TextTable {
        header,
        body: rows.into_iter().map(line).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "<table>\
        <thead><tr><th>TicketID</th><th>Service Board</th><th>Age</th></tr></thead>\
        <tbody>\
        <tr><td>101</td><td>Help Desk</td><td>10</td></tr>\
        <tr><td>102</td><td>Projects</td><td>2</td></tr>\
        <tr><td>103</td><td>Help Desk</td><td>9</td></tr>\
        </tbody></table>";

    fn command(boards: &[&str], sort: &[&str]) -> ViewCommand {
        ViewCommand {
            app_name: "appOpen".into(),
            boards: boards.iter().map(|s| s.to_string()).collect(),
            sort: sort.iter().map(|s| s.to_string()).collect(),
            html: false,
            watch: false,
            client: ClientArgs {
                config: "folio.toml".into(),
                server: None,
            },
        }
    }

    fn loaded() -> ViewState {
        let mut view = ViewState::default();
        view.load("appOpen", REPORT);
        view
    }

    #[test]
    fn test_text_table_alignment() {
        let view = loaded();
        let text = text_table(view.table().unwrap());
        assert_eq!(text.header.as_deref(), Some("TicketID  Service Board  Age"));
        assert_eq!(text.body[0], "101       Help Desk      10");
        assert_eq!(text.body.len(), 3);
    }

    #[test]
    fn test_text_table_without_header_row() {
        let mut view = ViewState::default();
        view.load(
            "appBare",
            "<table><tr><td>1</td><td>Help Desk</td></tr><tr><td>22</td><td>Projects</td></tr></table>",
        );

        let text = text_table(view.table().unwrap());
        assert!(text.header.is_none());
        assert_eq!(text.body, vec!["1   Help Desk", "22  Projects"]);

        let out = command(&[], &[]).render(&view);
        assert_eq!(out, "1   Help Desk\n22  Projects");
    }

    #[test]
    fn test_board_and_sort_applied() {
        let mut view = loaded();
        let cmd = command(&["Help Desk"], &["Age"]);
        cmd.apply_and_render(&mut view);

        let text = text_table(view.table().unwrap());
        assert_eq!(text.header.as_deref(), Some("TicketID  Service Board  Age ^"));
        assert!(text.body[0].starts_with("103"));
        assert!(text.body[1].starts_with("101"));
        assert_eq!(text.body.len(), 2);
    }

    #[test]
    fn test_repeated_sort_is_descending() {
        let mut view = loaded();
        command(&[], &["Age", "Age"]).apply_and_render(&mut view);

        let text = text_table(view.table().unwrap());
        assert!(text.header.unwrap().ends_with("Age v"));
        assert!(text.body[0].starts_with("101"));
    }

    #[test]
    fn test_html_output_links_tickets() {
        let mut view = loaded();
        let mut cmd = command(&[], &[]);
        cmd.html = true;

        let html = cmd.apply_and_render(&mut view);
        assert!(html.contains("class=\"report-table\""));
        assert!(html.contains("recid=101"));
    }

    #[test]
    fn test_failed_view_shows_message() {
        let mut view = ViewState::default();
        view.fail("appOpen", "Failed to load appOpen report");
        let out = command(&[], &[]).render(&view);
        assert!(out.contains("Failed to load appOpen report"));
    }
}
