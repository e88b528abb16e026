use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, info};

use crate::error::ChunkError;
use crate::models::{LayoutTable, TableMappingItem};

static HTML_TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<table>.*?</table>").expect("hardcoded table regex is valid"));

pub fn extract_html_tables(content: &str) -> Vec<&str> {
    HTML_TABLE_RE
        .find_iter(content)
        .map(|found| found.as_str())
        .collect()
}

/// Pairs HTML tables with the layout service's table list by position.
///
/// Both lists must have the same length. A mismatch means the ordinal pairing
/// cannot be trusted, so it fails the document instead of guessing.
pub fn map_tables(
    document: &str,
    content: &str,
    tables: Option<&[LayoutTable]>,
) -> Result<Vec<TableMappingItem>, ChunkError> {
    let Some(tables) = tables else {
        return Ok(Vec::new());
    };

    let html_tables = extract_html_tables(content);
    info!(
        document,
        html_tables = html_tables.len(),
        supplied_tables = tables.len(),
        "detected HTML tables in document content"
    );

    if html_tables.len() != tables.len() {
        error!(
            document,
            html_tables = html_tables.len(),
            supplied_tables = tables.len(),
            "HTML table count does not match supplied table entries"
        );
        return Err(ChunkError::TableCountMismatch {
            document: document.to_string(),
            html_tables: html_tables.len(),
            supplied_tables: tables.len(),
        });
    }

    Ok(html_tables
        .into_iter()
        .zip(tables)
        .enumerate()
        .map(|(index, (html, table))| TableMappingItem::new(table, html, index))
        .collect())
}
