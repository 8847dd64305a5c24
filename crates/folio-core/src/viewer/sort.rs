use crate::table::SortDirection;

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

impl SortState {
    /// State after a click on `column`: flips when it is already the sorted
    /// column, otherwise starts ascending.
    pub fn after_click(current: Option<SortState>, column: usize) -> SortState {
        match current {
            Some(state) if state.column == column => SortState {
                column,
                direction: state.direction.toggled(),
            },
            _ => SortState {
                column,
                direction: SortDirection::Asc,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_click_ascends() {
        let state = SortState::after_click(None, 2);
        assert_eq!(state.column, 2);
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn test_same_column_toggles() {
        let first = SortState::after_click(None, 1);
        let second = SortState::after_click(Some(first), 1);
        let third = SortState::after_click(Some(second), 1);
        assert_eq!(second.direction, SortDirection::Desc);
        assert_eq!(third.direction, SortDirection::Asc);
    }

    #[test]
    fn test_new_column_resets() {
        let desc = SortState {
            column: 0,
            direction: SortDirection::Desc,
        };
        let state = SortState::after_click(Some(desc), 3);
        assert_eq!(state.direction, SortDirection::Asc);
    }
}
