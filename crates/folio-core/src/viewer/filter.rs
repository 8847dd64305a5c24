use std::collections::BTreeSet;

/// Selected board names. Empty means every row is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    boards: BTreeSet<String>,
}

impl FilterState {
    /// Build a selection; empty names (the "all" option) are ignored.
    pub fn from_boards<I, S>(boards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            boards: boards
                .into_iter()
                .map(Into::into)
                .filter(|b: &String| !b.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn boards(&self) -> impl Iterator<Item = &str> {
        self.boards.iter().map(String::as_str)
    }

    /// Whether a row with this board value is visible.
    pub fn admits(&self, board: &str) -> bool {
        self.boards.is_empty() || self.boards.contains(board)
    }
}

/// State of the board filter control for the loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BoardFilter {
    /// No board column; the control is disabled.
    #[default]
    Disabled,
    /// Board column at `column` with its sorted distinct values.
    Enabled { column: usize, options: Vec<String> },
}

impl BoardFilter {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    /// Selectable board names, without the implicit "all" option.
    pub fn options(&self) -> &[String] {
        match self {
            Self::Disabled => &[],
            Self::Enabled { options, .. } => options,
        }
    }

    pub fn column(&self) -> Option<usize> {
        match self {
            Self::Disabled => None,
            Self::Enabled { column, .. } => Some(*column),
        }
    }
}
