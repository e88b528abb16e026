#![allow(dead_code)]

use std::path::Path;

use doc_chunker::{LayoutDocument, LayoutTable, ServiceError, TableOcr};
use table_grid::{OcrTable, TableCell};

pub const REVENUE_HTML: &str =
    "<table><tr><th colspan=\"2\">Revenue</th></tr><tr><td>10</td><td>12</td></tr></table>";

/// OCR service that always reads the same two-column revenue table.
pub struct RevenueOcr;

impl TableOcr for RevenueOcr {
    fn analyze_table_image(&self, _image: &[u8]) -> Result<OcrTable, ServiceError> {
        Ok(OcrTable {
            rows: None,
            cols: None,
            cells: vec![
                TableCell::header(0, 0, "Revenue").with_span(1, 2),
                TableCell::new(1, 0, "10"),
                TableCell::new(1, 1, "12"),
            ],
            confidence: Some(0.95),
        })
    }
}

pub fn layout_table(name: &str, url: &str) -> LayoutTable {
    LayoutTable {
        name: name.to_string(),
        url: url.to_string(),
        bounding_regions: Vec::new(),
    }
}

pub fn document(content: &str, tables: Option<Vec<LayoutTable>>) -> LayoutDocument {
    LayoutDocument {
        content: content.to_string(),
        tables,
    }
}

pub fn write_layout_fixture(path: &Path, payload: &serde_json::Value) -> std::io::Result<()> {
    let bytes = serde_json::to_vec_pretty(payload).map_err(std::io::Error::other)?;
    std::fs::write(path, bytes)
}
