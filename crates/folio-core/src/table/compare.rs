use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// How one column's cells are ordered.
///
/// The mode is chosen once per column so that every sort uses a single
/// total order: numeric when every non-blank cell parses as a finite
/// number, otherwise a case-insensitive natural comparison where digit
/// runs compare by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    Numeric,
    Natural,
}

impl CompareMode {
    /// Pick the mode for a column from its cell texts.
    pub fn for_column<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut any_number = false;
        for value in values {
            if value.trim().is_empty() {
                continue;
            }
            if parse_number(value).is_none() {
                return Self::Natural;
            }
            any_number = true;
        }
        if any_number {
            Self::Numeric
        } else {
            Self::Natural
        }
    }

    /// Compare two cells of a column in this mode. Blank cells sort after
    /// numbers in numeric mode.
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Numeric => match (parse_number(a), parse_number(b)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Natural => natural_cmp(a, b),
        }
    }
}

/// Compare two cell texts in isolation: numeric when both parse, otherwise
/// natural. Use `CompareMode` to sort a whole column.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    CompareMode::for_column([a, b]).compare(a, b)
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Case-insensitive comparison treating runs of ASCII digits as numbers,
/// so `"Item 9" < "Item 10"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let ord = cmp_digit_runs(&take_digits(&mut a), &take_digits(&mut b));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                let ord = ca.cmp(&cb);
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
