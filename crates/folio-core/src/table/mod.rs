//! In-memory model of a report table.
//!
//! A `TableView` is parsed once per load from the report's HTML fragment and
//! then mutated in place by sorting, filtering and ticket linking, mirroring
//! what a browser would do to the live DOM. `to_html` renders it back.

mod compare;
mod html;

pub use compare::{compare_cells, natural_cmp, CompareMode};
pub(crate) use html::escape as html_escape;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use self::html::{escape, extract_table, text_content, RawCell};

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// CSS class marking the sorted header.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Asc => "sorted-asc",
            Self::Desc => "sorted-desc",
        }
    }
}

/// One table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Inner markup as rendered.
    pub html: String,
    /// Trimmed text content, used for comparisons and filtering.
    pub text: String,
    /// Whether the cell was a `<th>`.
    pub header: bool,
    /// Hyperlink target once the cell has been linked.
    pub link: Option<String>,
}

impl Cell {
    fn from_raw(raw: RawCell) -> Self {
        Self {
            text: text_content(&raw.html),
            html: raw.html,
            header: raw.header,
            link: None,
        }
    }
}

/// One body row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub hidden: bool,
}

impl Row {
    /// Text of the cell at `column`, or `""` when the row is short.
    pub fn text(&self, column: usize) -> &str {
        self.cells.get(column).map(|c| c.text.as_str()).unwrap_or("")
    }
}

/// A parsed report table and the fragment surrounding it.
#[derive(Debug, Clone)]
pub struct TableView {
    before: String,
    after: String,
    attrs: String,
    headers: Vec<Cell>,
    rows: Vec<Row>,
    sorted: Option<(usize, SortDirection)>,
}

impl TableView {
    /// Parse the first `<table>` in `fragment`. `None` if there is no table.
    pub fn parse(fragment: &str) -> Option<Self> {
        let raw = extract_table(fragment)?;

        Some(Self {
            before: raw.before,
            after: raw.after,
            attrs: raw.attrs,
            headers: raw.header.into_iter().map(Cell::from_raw).collect(),
            rows: raw
                .body
                .into_iter()
                .map(|cells| Row {
                    cells: cells.into_iter().map(Cell::from_raw).collect(),
                    hidden: false,
                })
                .collect(),
            sorted: None,
        })
    }

    /// Header texts in column order.
    pub fn headers(&self) -> Vec<&str> {
        self.headers.iter().map(|h| h.text.as_str()).collect()
    }

    /// Body rows in display order, hidden ones included.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows not hidden by the filter.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| !r.hidden)
    }

    /// The column currently carrying a sort indicator.
    pub fn sorted_column(&self) -> Option<(usize, SortDirection)> {
        self.sorted
    }

    /// Index of the header whose text equals `name` exactly.
    pub fn column_named(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.text == name)
    }

    /// Index of the last header containing `keyword`, ignoring case.
    pub fn column_containing(&self, keyword: &str) -> Option<usize> {
        let keyword = keyword.to_lowercase();
        self.headers
            .iter()
            .rposition(|h| h.text.to_lowercase().contains(&keyword))
    }

    /// Texts of one column, in row order.
    pub fn column_values(&self, column: usize) -> Vec<&str> {
        self.rows.iter().map(|r| r.text(column)).collect()
    }

    /// Stable-sort the body rows by `column`. Returns `false` when the column
    /// does not exist, leaving the table untouched.
    pub fn sort_by_column(&mut self, column: usize, direction: SortDirection) -> bool {
        if column >= self.column_count() {
            return false;
        }

        let mode = CompareMode::for_column(self.rows.iter().map(|r| r.text(column)));
        self.rows.sort_by(|a, b| {
            let ord = mode.compare(a.text(column), b.text(column));
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        self.sorted = Some((column, direction));
        true
    }

    /// Set each row's visibility from `visible`.
    pub fn set_visibility<F>(&mut self, visible: F)
    where
        F: Fn(&Row) -> bool,
    {
        for row in &mut self.rows {
            row.hidden = !visible(row);
        }
    }

    /// Turn every body cell of `column` into a link built by `url_for` from
    /// the cell text. Cells already linked are left alone.
    pub fn link_column<F>(&mut self, column: usize, url_for: F) -> usize
    where
        F: Fn(&str) -> String,
    {
        let mut linked = 0;
        for row in &mut self.rows {
            if let Some(cell) = row.cells.get_mut(column) {
                if cell.link.is_none() {
                    cell.link = Some(url_for(&cell.text));
                    linked += 1;
                }
            }
        }
        linked
    }

    /// Number of columns: the header count or the widest row, whichever is
    /// larger.
    pub fn column_count(&self) -> usize {
        let widest_row = self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        self.headers.len().max(widest_row)
    }

    /// Render the fragment back to HTML with the table in its current state.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(self.before.len() + self.after.len() + 256);
        out.push_str(&self.before);
        let _ = write!(out, "<table{} class=\"report-table\">", self.attrs);

        if !self.headers.is_empty() {
            out.push_str("<thead><tr>");
            for (i, header) in self.headers.iter().enumerate() {
                let class = match self.sorted {
                    Some((col, dir)) if col == i => format!("sortable {}", dir.css_class()),
                    _ => "sortable".to_string(),
                };
                let _ = write!(out, "<th class=\"{}\">{}</th>", class, header.html);
            }
            out.push_str("</tr></thead>");
        }

        out.push_str("<tbody>");
        for row in &self.rows {
            out.push_str(if row.hidden {
                "<tr class=\"hidden\">"
            } else {
                "<tr>"
            });
            for cell in &row.cells {
                let tag = if cell.header { "th" } else { "td" };
                match &cell.link {
                    Some(url) => {
                        let _ = write!(
                            out,
                            "<{tag}><a href=\"{}\" target=\"_blank\">{}</a></{tag}>",
                            escape(url),
                            escape(&cell.text)
                        );
                    }
                    None => {
                        let _ = write!(out, "<{tag}>{}</{tag}>", cell.html);
                    }
                }
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
        out.push_str(&self.after);
        out
    }
}
