use serde::{Deserialize, Serialize};

/// Placeholder replaced by the ticket id in `ticket_url_template`.
pub const TICKET_ID_PLACEHOLDER: &str = "{id}";

/// Table viewer client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Base URL of the report server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Auto-refresh period in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Header text identifying the ticket id column (exact match).
    #[serde(default = "default_ticket_column")]
    pub ticket_column: String,

    /// Ticket tracker URL; `{id}` is replaced by the cell text.
    #[serde(default = "default_ticket_url_template")]
    pub ticket_url_template: String,

    /// Substring identifying the board column (case-insensitive).
    #[serde(default = "default_board_keyword")]
    pub board_keyword: String,

    /// Path of the description map relative to the server URL.
    #[serde(default = "default_descriptions_path")]
    pub descriptions_path: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            refresh_interval_secs: default_refresh_interval(),
            ticket_column: default_ticket_column(),
            ticket_url_template: default_ticket_url_template(),
            board_keyword: default_board_keyword(),
            descriptions_path: default_descriptions_path(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_refresh_interval() -> u64 {
    300 // 5 minutes
}

fn default_ticket_column() -> String {
    "TicketID".to_string()
}

fn default_ticket_url_template() -> String {
    "https://connect.savantcts.com/v4_6_release/ConnectWise.aspx?locale=en_US&routeTo=ServiceFV&recid={id}"
        .to_string()
}

fn default_board_keyword() -> String {
    "board".to_string()
}

fn default_descriptions_path() -> String {
    "data/desc.json".to_string()
}
