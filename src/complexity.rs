use std::sync::LazyLock;

use regex::Regex;

const MAX_SIMPLE_HEADER_CELLS: usize = 10;

static SPAN_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<[a-z][^>]*\s(?:rowspan|colspan)\b").expect("hardcoded span regex is valid")
});
static TABLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b([^>]*)>").expect("hardcoded table regex is valid"));
static BORDER_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bborder\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("hardcoded border regex is valid")
});
static STYLE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bstyle\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("hardcoded style regex is valid")
});
static THEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<thead\b[^>]*>(.*?)</thead>").expect("hardcoded thead regex is valid")
});
static ROW_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<tr\b").expect("hardcoded row regex is valid"));
static HEADER_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<th\b").expect("hardcoded header cell regex is valid"));

fn attribute<'a>(pattern: &Regex, attributes: &'a str) -> Option<&'a str> {
    let capture = pattern.captures(attributes)?;
    (1..=3)
        .find_map(|group| capture.get(group))
        .map(|value| value.as_str())
}

/// No border attribute (or `border="0"`), and no style that draws one.
fn is_borderless(html_table: &str) -> bool {
    let attributes = TABLE_TAG_RE
        .captures(html_table)
        .and_then(|capture| capture.get(1))
        .map_or("", |value| value.as_str());

    let border = attribute(&BORDER_ATTR_RE, attributes);
    let style = attribute(&STYLE_ATTR_RE, attributes).unwrap_or("");
    matches!(border, None | Some("0")) && (!style.contains("border") || style.contains("none"))
}

fn has_multi_row_header(html_table: &str) -> bool {
    THEAD_RE
        .captures(html_table)
        .and_then(|capture| capture.get(1))
        .is_some_and(|thead| ROW_TAG_RE.find_iter(thead.as_str()).count() > 1)
}

/// Whether a table is worth the cost of OCR and grid reconstruction.
pub fn is_complex_table(html_table: &str) -> bool {
    SPAN_ATTR_RE.is_match(html_table)
        || is_borderless(html_table)
        || has_multi_row_header(html_table)
        || HEADER_CELL_RE.find_iter(html_table).count() > MAX_SIMPLE_HEADER_CELLS
}
