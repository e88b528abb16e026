use std::ops::Range;

use crate::error::TableError;
use crate::header::detect_header_rows;
use crate::model::{CellRole, OcrTable, ReconstructedGrid, TableCell};
use crate::warning::{GridWarning, WarningCode};

pub const MAX_GRID_CELLS: usize = 1_000_000;

fn span_end(start: i64, span: i64) -> usize {
    usize::try_from(start.saturating_add(span)).unwrap_or(0)
}

/// Explicit dimensions win unless one of them is missing or zero, in which
/// case both are widened to cover every cell's span.
fn table_dimensions(ocr: &OcrTable) -> Result<(usize, usize), TableError> {
    let rows = ocr.rows.unwrap_or(0);
    let cols = ocr.cols.unwrap_or(0);
    let (rows, cols) = if rows > 0 && cols > 0 {
        (rows, cols)
    } else {
        let (max_row, max_col) = ocr.cells.iter().fold((0, 0), |(rows, cols), cell| {
            (
                rows.max(span_end(cell.row, cell.row_span())),
                cols.max(span_end(cell.col, cell.col_span())),
            )
        });
        (rows.max(max_row), cols.max(max_col))
    };

    match rows.checked_mul(cols) {
        Some(cells) if cells <= MAX_GRID_CELLS => Ok((rows, cols)),
        _ => Err(TableError::GridTooLarge {
            rows,
            cols,
            limit: MAX_GRID_CELLS,
        }),
    }
}

fn clip(start: i64, span: i64, bound: usize) -> Option<Range<usize>> {
    let bound = i64::try_from(bound).unwrap_or(i64::MAX);
    let low = start.max(0);
    let high = start.saturating_add(span).min(bound);
    if low >= high {
        return None;
    }
    Some(usize::try_from(low).ok()?..usize::try_from(high).ok()?)
}

fn place_cell(
    cell: &TableCell,
    grid: &mut [Vec<String>],
    header_mask: &mut [Vec<bool>],
    warnings: &mut Vec<GridWarning>,
) {
    let rows = grid.len();
    let cols = grid.first().map_or(0, Vec::len);
    let row_span = cell.row_span();
    let col_span = cell.col_span();

    let (Some(row_range), Some(col_range)) = (
        clip(cell.row, row_span, rows),
        clip(cell.col, col_span, cols),
    ) else {
        warnings.push(
            GridWarning::new(
                WarningCode::CellOutOfBounds,
                format!("cell lies outside the {rows}x{cols} grid and was dropped"),
            )
            .at(cell.row, cell.col),
        );
        return;
    };

    let fits = |range: &Range<usize>, span: i64| usize::try_from(span) == Ok(range.len());
    if !fits(&row_range, row_span) || !fits(&col_range, col_span) {
        warnings.push(
            GridWarning::new(
                WarningCode::CellClipped,
                format!("cell span {row_span}x{col_span} was clipped to the {rows}x{cols} grid"),
            )
            .at(cell.row, cell.col),
        );
    }

    let text = cell.text.trim();
    let is_header = cell.role == CellRole::Header;
    for row in row_range {
        for col in col_range.clone() {
            grid[row][col] = text.to_string();
            header_mask[row][col] = is_header;
        }
    }
}

/// Expands spanning cells into a dense grid. Cells are written in input
/// order, so a later cell overwrites any position an earlier one claimed.
pub fn reconstruct_grid(
    ocr: &OcrTable,
) -> Result<(ReconstructedGrid, Vec<GridWarning>), TableError> {
    let (rows, cols) = table_dimensions(ocr)?;
    let mut grid = vec![vec![String::new(); cols]; rows];
    let mut header_mask = vec![vec![false; cols]; rows];
    let mut warnings = Vec::new();

    for cell in &ocr.cells {
        place_cell(cell, &mut grid, &mut header_mask, &mut warnings);
    }

    let header_rows = detect_header_rows(&header_mask, &mut warnings);
    Ok((ReconstructedGrid { grid, header_rows }, warnings))
}
