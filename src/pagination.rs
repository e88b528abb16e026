use std::sync::LazyLock;

use regex::Regex;

use crate::models::PAGE_BREAK_MARKER;

static PAGE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PageBreak(\d{5})").expect("hardcoded page regex is valid"));

/// Sequenced id of a numbered page break, e.g. `PageBreak00003`.
pub(crate) static PAGE_BREAK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PageBreak\d{5}").expect("hardcoded page regex is valid"));

#[must_use]
pub fn numbered_page_break(number: usize) -> String {
    format!("<!-- PageBreak{number:05} -->")
}

#[must_use]
pub fn number_page_breaks(content: &str) -> String {
    let mut numbered = String::with_capacity(content.len());
    let mut pieces = content.split(PAGE_BREAK_MARKER);
    if let Some(first) = pieces.next() {
        numbered.push_str(first);
    }
    for (index, piece) in pieces.enumerate() {
        numbered.push_str(&numbered_page_break(index + 1));
        numbered.push_str(piece);
    }
    numbered
}

fn page_number(capture: &regex::Captures<'_>) -> Option<u32> {
    capture.get(1)?.as_str().parse().ok()
}

/// Moves the running page counter past the last page break in the chunk.
/// The counter never goes backwards.
#[must_use]
pub fn advance(chunk_text: &str, current_page: u32) -> u32 {
    let last = PAGE_NUMBER_RE
        .captures_iter(chunk_text)
        .last()
        .and_then(|capture| page_number(&capture));
    match last {
        Some(number) if number >= current_page => number + 1,
        _ => current_page,
    }
}

/// Page a chunk is attributed to.
///
/// A break in the first half of the chunk means most of the text follows it,
/// so the chunk belongs to the next page; otherwise it belongs to the page
/// the break ends.
#[must_use]
pub fn page_for(chunk_text: &str, current_page: u32) -> u32 {
    let Some(capture) = PAGE_NUMBER_RE.captures(chunk_text) else {
        return current_page;
    };
    let (Some(found), Some(number)) = (capture.get(0), page_number(&capture)) else {
        return current_page;
    };

    let position = chunk_text[..found.start()].chars().count();
    let length = chunk_text.chars().count();
    if position * 2 < length {
        number + 1
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::{advance, number_page_breaks, page_for};

    #[test]
    fn numbers_breaks_in_document_order() {
        let content = "a<!-- PageBreak -->b<!-- PageBreak -->c";
        assert_eq!(
            number_page_breaks(content),
            "a<!-- PageBreak00001 -->b<!-- PageBreak00002 -->c"
        );
        assert_eq!(number_page_breaks("no breaks"), "no breaks");
    }

    #[test]
    fn advance_uses_last_break_and_never_regresses() {
        let chunk = "x <!-- PageBreak00002 --> y <!-- PageBreak00003 -->";
        assert_eq!(advance(chunk, 1), 4);
        assert_eq!(advance(chunk, 3), 4);
        assert_eq!(advance(chunk, 7), 7);
        assert_eq!(advance("no break", 5), 5);
    }

    #[test]
    fn early_break_belongs_to_the_next_page() {
        let chunk = format!("PageBreak00002{}", "x".repeat(40));
        assert_eq!(page_for(&chunk, 1), 3);
    }

    #[test]
    fn late_break_belongs_to_the_page_it_ends() {
        let chunk = format!("{}PageBreak00002", "x".repeat(40));
        assert_eq!(page_for(&chunk, 1), 2);
    }

    #[test]
    fn break_at_exact_midpoint_is_not_advanced() {
        // 14 chars before the marker, 14 chars of marker: position / len == 0.5
        let chunk = format!("{}PageBreak00004", "y".repeat(14));
        assert_eq!(page_for(&chunk, 2), 4);
    }

    #[test]
    fn chunk_without_break_inherits_current_page() {
        assert_eq!(page_for("plain", 6), 6);
    }
}
