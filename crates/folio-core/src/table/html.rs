//! Minimal HTML table extraction for generated report fragments.
//!
//! Reports are emitted by a table writer, so the markup is regular: one
//! `<table>` with closed `<tr>`, `<th>` and `<td>` elements. This is not a
//! general HTML parser; nested tables are not supported.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<table\b([^>]*)>(.*?)</table\s*>").expect("valid table pattern")
});
static THEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<thead\b[^>]*>(.*?)</thead\s*>").expect("valid thead pattern")
});
static TBODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<tbody\b[^>]*>(.*?)</tbody\s*>").expect("valid tbody pattern")
});
static ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("valid row pattern"));
static CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(th|td)\b[^>]*>(.*?)</t[hd]\s*>").expect("valid cell pattern")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));
static CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s*\bclass\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid class pattern")
});
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity"));

/// A raw cell as found in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawCell {
    pub header: bool,
    pub html: String,
}

/// The first table of a fragment, split into its parts.
#[derive(Debug, Clone)]
pub(crate) struct RawTable {
    pub before: String,
    pub after: String,
    /// `<table>` attributes with any `class` attribute removed.
    pub attrs: String,
    pub header: Vec<RawCell>,
    pub body: Vec<Vec<RawCell>>,
}

/// Split out the first `<table>` in `fragment`, if any.
pub(crate) fn extract_table(fragment: &str) -> Option<RawTable> {
    let caps = TABLE.captures(fragment)?;
    let whole = caps.get(0)?;
    let attrs = CLASS_ATTR.replace_all(&caps[1], "").into_owned();
    let inner = &caps[2];

    let (header, body) = match THEAD.captures(inner) {
        Some(head) => {
            let header = rows(&head[1]).into_iter().next().unwrap_or_default();
            let body_src: String = if TBODY.is_match(inner) {
                TBODY
                    .captures_iter(inner)
                    .map(|c| c[1].to_string())
                    .collect()
            } else {
                THEAD.replace(inner, "").into_owned()
            };
            (header, rows(&body_src))
        }
        None => {
            let mut all = rows(inner);
            let first_is_header =
                !all.is_empty() && !all[0].is_empty() && all[0].iter().all(|c| c.header);
            let header = if first_is_header {
                all.remove(0)
            } else {
                Vec::new()
            };
            (header, all)
        }
    };

    Some(RawTable {
        before: fragment[..whole.start()].to_string(),
        after: fragment[whole.end()..].to_string(),
        attrs,
        header,
        body,
    })
}

fn rows(src: &str) -> Vec<Vec<RawCell>> {
    ROW.captures_iter(src)
        .map(|row| {
            CELL.captures_iter(&row[1])
                .map(|cell| RawCell {
                    header: cell[1].eq_ignore_ascii_case("th"),
                    html: cell[2].to_string(),
                })
                .collect()
        })
        .collect()
}

/// Visible text of a cell's inner HTML: tags stripped, entities decoded, trimmed.
pub(crate) fn text_content(html: &str) -> String {
    let stripped = TAG.replace_all(html, "");
    decode_entities(&stripped).trim().to_string()
}

pub(crate) fn decode_entities(s: &str) -> String {
    ENTITY
        .replace_all(s, |caps: &regex_lite::Captures<'_>| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Escape text for use in element content or a quoted attribute.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
