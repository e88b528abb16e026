use tracing::{info, warn};

use crate::pagination::PAGE_BREAK_ID_RE;
use crate::token::TokenEstimator;

const MAX_TRUNCATION_STEP: usize = 100;
const STEP_GROWTH_INTERVAL: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation {
    pub text: String,
    /// Page-break ids that could not be kept because the marker alone
    /// exceeds the budget.
    pub dropped_page_breaks: Vec<String>,
}

fn pop_chars(text: &mut String, count: usize) {
    for _ in 0..count {
        if text.pop().is_none() {
            break;
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shrinks `text` until it fits `max_tokens`, keeping its page-break markers.
///
/// Whitespace is collapsed first. Characters are then dropped from the end,
/// the step doubling every few rounds up to a cap. Any page-break marker
/// lost on the way is appended again after trimming enough text to make room.
pub fn truncate_to_budget(
    text: &str,
    max_tokens: usize,
    estimator: &dyn TokenEstimator,
) -> Truncation {
    let mut text = collapse_whitespace(text);
    let page_breaks = PAGE_BREAK_ID_RE
        .find_iter(&text)
        .map(|found| found.as_str().to_string())
        .collect::<Vec<_>>();

    if estimator.estimate(&text) > max_tokens {
        info!(max_tokens, "token limit reached, truncating chunk");
        let mut step = 1;
        let mut iteration = 0;
        while !text.is_empty() && estimator.estimate(&text) > max_tokens {
            pop_chars(&mut text, step);
            iteration += 1;
            if iteration % STEP_GROWTH_INTERVAL == 0 {
                step = (step * 2).min(MAX_TRUNCATION_STEP);
            }
        }
    }

    let mut missing = page_breaks
        .into_iter()
        .filter(|id| !text.contains(id.as_str()))
        .collect::<Vec<_>>();
    missing.dedup();

    let mut dropped_page_breaks = Vec::new();
    let suffix = loop {
        let suffix = missing
            .iter()
            .map(|id| format!(" <!-- {id} -->"))
            .collect::<String>();
        if missing.is_empty() || estimator.estimate(&suffix) <= max_tokens {
            break suffix;
        }
        let dropped = missing.remove(0);
        warn!(page_break = %dropped, max_tokens, "page break marker does not fit the chunk budget");
        dropped_page_breaks.push(dropped);
    };

    if !suffix.is_empty() {
        while estimator.estimate(&format!("{text}{suffix}")) > max_tokens {
            if text.pop().is_none() {
                break;
            }
        }
        text.push_str(&suffix);
    }

    Truncation {
        text,
        dropped_page_breaks,
    }
}
