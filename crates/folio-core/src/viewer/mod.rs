//! Per-session state of the table viewer.
//!
//! `ViewState` walks `Empty -> Loaded -> (filtered | sorted)* -> Loaded`:
//! every load replaces the cached table, then re-attaches ticket links, the
//! board filter and the active sort. Missing board or ticket columns are
//! silent no-ops.

mod description;
mod filter;
mod sort;

pub use description::DescriptionMap;
pub use filter::{BoardFilter, FilterState};
pub use sort::SortState;

use crate::config::{ViewerConfig, TICKET_ID_PLACEHOLDER};
use crate::report::csv_download_name;
use crate::table::{html_escape, TableView};

/// Column recognition and link settings for the viewer.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub board_keyword: String,
    pub ticket_column: String,
    pub ticket_url_template: String,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for ViewerOptions {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            board_keyword: config.board_keyword.clone(),
            ticket_column: config.ticket_column.clone(),
            ticket_url_template: config.ticket_url_template.clone(),
        }
    }
}

/// Lifecycle of the viewport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewStatus {
    #[default]
    Empty,
    Loaded,
    Failed(String),
}

/// Everything the viewer knows about the currently displayed report.
#[derive(Debug, Clone)]
pub struct ViewState {
    options: ViewerOptions,
    app_name: Option<String>,
    status: ViewStatus,
    fragment: String,
    table: Option<TableView>,
    board: BoardFilter,
    filter: FilterState,
    sort: Option<SortState>,
    description: Option<String>,
}

impl ViewState {
    pub fn new(options: ViewerOptions) -> Self {
        Self {
            options,
            app_name: None,
            status: ViewStatus::Empty,
            fragment: String::new(),
            table: None,
            board: BoardFilter::Disabled,
            filter: FilterState::default(),
            sort: None,
            description: None,
        }
    }

    /// Replace the viewport with a freshly fetched report fragment.
    ///
    /// Reloading the same report keeps the board selection and sort; loading
    /// a different report starts from an unfiltered, unsorted table.
    pub fn load(&mut self, app_name: &str, html: &str) {
        self.switch_to(app_name);
        self.fragment = html.to_string();
        self.table = TableView::parse(html);
        self.status = ViewStatus::Loaded;

        self.link_tickets();
        self.populate_board_filter();
        self.apply_filter();

        if let (Some(table), Some(sort)) = (self.table.as_mut(), self.sort) {
            if !table.sort_by_column(sort.column, sort.direction) {
                self.sort = None;
            }
        }
    }

    /// Show an error in place of the report.
    pub fn fail(&mut self, app_name: &str, message: impl Into<String>) {
        self.switch_to(app_name);
        self.status = ViewStatus::Failed(message.into());
        self.fragment.clear();
        self.table = None;
        self.board = BoardFilter::Disabled;
    }

    /// Handle a click on a column header. Returns the new sort state, or
    /// `None` when there is no table or no such column.
    pub fn click_header(&mut self, column: usize) -> Option<SortState> {
        let table = self.table.as_mut()?;
        let next = SortState::after_click(self.sort, column);
        if table.sort_by_column(next.column, next.direction) {
            self.sort = Some(next);
            Some(next)
        } else {
            None
        }
    }

    /// Click the header whose text equals `name`.
    pub fn click_header_named(&mut self, name: &str) -> Option<SortState> {
        let column = self.table.as_ref()?.column_named(name)?;
        self.click_header(column)
    }

    /// Replace the board selection and re-apply it.
    pub fn select_boards<I, S>(&mut self, boards: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = FilterState::from_boards(boards);
        self.apply_filter();
    }

    /// Show every row again.
    pub fn clear_filter(&mut self) {
        self.select_boards(std::iter::empty::<String>());
    }

    pub fn set_description(&mut self, descriptions: &DescriptionMap) {
        self.description = self
            .app_name
            .as_deref()
            .and_then(|app| descriptions.describe(app))
            .map(String::from);
    }

    /// Ticket tracker URL for a ticket id.
    pub fn ticket_url(&self, ticket_id: &str) -> String {
        ticket_url(&self.options.ticket_url_template, ticket_id)
    }

    /// API path serving the current report's CSV.
    pub fn csv_endpoint(&self) -> Option<String> {
        self.app_name
            .as_deref()
            .map(|app| format!("/api/reports/{}/csv", app))
    }

    /// Suggested file name for the current report's CSV.
    pub fn csv_file_name(&self) -> Option<String> {
        self.app_name.as_deref().map(csv_download_name)
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn table(&self) -> Option<&TableView> {
        self.table.as_ref()
    }

    pub fn board_filter(&self) -> &BoardFilter {
        &self.board
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// HTML for the viewport in the current state.
    pub fn render(&self) -> String {
        match &self.status {
            ViewStatus::Empty => String::new(),
            ViewStatus::Failed(message) => format!(
                "<div class=\"empty-state\"><div class=\"empty-state-title\">Error</div>\
                 <div class=\"empty-state-message\">{}</div></div>",
                html_escape(message)
            ),
            ViewStatus::Loaded => match &self.table {
                Some(table) => table.to_html(),
                None => self.fragment.clone(),
            },
        }
    }

    /// Make `app_name` current. A different report starts unfiltered and
    /// unsorted.
    fn switch_to(&mut self, app_name: &str) {
        if self.app_name.as_deref() != Some(app_name) {
            self.filter = FilterState::default();
            self.sort = None;
            self.description = None;
            self.app_name = Some(app_name.to_string());
        }
    }

    fn link_tickets(&mut self) {
        let template = self.options.ticket_url_template.clone();
        if let Some(table) = self.table.as_mut() {
            if let Some(column) = table.column_named(&self.options.ticket_column) {
                let linked = table.link_column(column, |id| ticket_url(&template, id));
                tracing::debug!("Linked {} ticket cells", linked);
            }
        }
    }

    fn populate_board_filter(&mut self) {
        self.board = match self.table.as_ref() {
            Some(table) => match table.column_containing(&self.options.board_keyword) {
                Some(column) => {
                    let mut options: Vec<String> = table
                        .column_values(column)
                        .into_iter()
                        .map(String::from)
                        .collect();
                    options.sort();
                    options.dedup();
                    BoardFilter::Enabled { column, options }
                }
                None => BoardFilter::Disabled,
            },
            None => BoardFilter::Disabled,
        };
    }

    fn apply_filter(&mut self) {
        let Some(table) = self.table.as_mut() else {
            return;
        };
        match self.board.column() {
            Some(column) => {
                let filter = &self.filter;
                table.set_visibility(|row| filter.admits(row.text(column)));
            }
            None => table.set_visibility(|_| true),
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewerOptions::default())
    }
}

fn ticket_url(template: &str, ticket_id: &str) -> String {
    template.replace(TICKET_ID_PLACEHOLDER, ticket_id)
}
