use std::path::Path;

use serde_json::{Value, json};

pub fn cell(row: i64, col: i64, text: &str, role: &str) -> Value {
    json!({ "row": row, "col": col, "text": text, "role": role })
}

pub fn spanning_cell(row: i64, col: i64, rowspan: i64, colspan: i64, text: &str) -> Value {
    json!({
        "row": row,
        "col": col,
        "rowspan": rowspan,
        "colspan": colspan,
        "text": text,
        "role": "header",
    })
}

pub fn revenue_table() -> Value {
    json!({
        "cells": [
            spanning_cell(0, 0, 2, 1, "Region"),
            spanning_cell(0, 1, 1, 2, "Revenue"),
            cell(1, 1, "Q1", "header"),
            cell(1, 2, "Q2", "header"),
            cell(2, 0, "North", "data"),
            cell(2, 1, "1,200", "data"),
            cell(2, 2, "1,350", "data"),
            cell(3, 0, "South", "data"),
            cell(3, 1, "800", "data"),
            cell(3, 2, "950", "data"),
        ],
        "confidence": 0.93,
    })
}

pub fn write_ocr_fixture(path: &Path, payload: &Value) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_vec_pretty(payload)?)?;
    Ok(())
}
