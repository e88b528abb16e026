use serde::{Deserialize, Serialize};

pub type Grid = Vec<Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum CellRole {
    Header,
    #[default]
    Data,
}

impl From<String> for CellRole {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("header") {
            Self::Header
        } else {
            Self::Data
        }
    }
}

impl From<CellRole> for String {
    fn from(role: CellRole) -> Self {
        match role {
            CellRole::Header => "header".to_string(),
            CellRole::Data => "data".to_string(),
        }
    }
}

/// One cell as reported by the OCR service. Indices are signed because the
/// service is not trusted to stay inside the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub row: i64,
    #[serde(default)]
    pub col: i64,
    #[serde(default = "default_span")]
    pub rowspan: i64,
    #[serde(default = "default_span")]
    pub colspan: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub role: CellRole,
}

fn default_span() -> i64 {
    1
}

impl TableCell {
    #[must_use]
    pub fn new(row: i64, col: i64, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            rowspan: 1,
            colspan: 1,
            text: text.into(),
            role: CellRole::Data,
        }
    }

    #[must_use]
    pub fn header(row: i64, col: i64, text: impl Into<String>) -> Self {
        Self {
            role: CellRole::Header,
            ..Self::new(row, col, text)
        }
    }

    #[must_use]
    pub fn with_span(mut self, rowspan: i64, colspan: i64) -> Self {
        self.rowspan = rowspan;
        self.colspan = colspan;
        self
    }

    pub(crate) fn row_span(&self) -> i64 {
        self.rowspan.max(1)
    }

    pub(crate) fn col_span(&self) -> i64 {
        self.colspan.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OcrTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<usize>,
    #[serde(default)]
    pub cells: Vec<TableCell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TableSchema {
    pub columns: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedGrid {
    pub grid: Grid,
    pub header_rows: Vec<usize>,
}

impl ReconstructedGrid {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    #[must_use]
    pub fn col_count(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::{CellRole, OcrTable};

    #[test]
    fn deserializes_ocr_payload_with_defaults() {
        let payload = r#"{
            "cells": [
                {"row": 0, "col": 0, "colspan": 2, "text": "Revenue", "role": "Header"},
                {"row": 1, "col": 1, "text": "10"}
            ],
            "confidence": 0.91
        }"#;
        let ocr: OcrTable = serde_json::from_str(payload).expect("payload should parse");
        assert_eq!(ocr.rows, None);
        assert_eq!(ocr.cells[0].role, CellRole::Header);
        assert_eq!(ocr.cells[0].rowspan, 1);
        assert_eq!(ocr.cells[0].colspan, 2);
        assert_eq!(ocr.cells[1].role, CellRole::Data);
        assert_eq!(ocr.confidence, Some(0.91));
    }

    #[test]
    fn unknown_roles_are_data() {
        assert_eq!(CellRole::from("caption".to_string()), CellRole::Data);
        assert_eq!(String::from(CellRole::Header), "header");
    }
}
