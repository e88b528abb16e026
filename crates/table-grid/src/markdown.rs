use crate::model::Grid;

fn escape_cell(value: &str) -> String {
    value
        .trim()
        .replace('|', "\\|")
        .replace(|ch| ch == '\r' || ch == '\n', " ")
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str(&format!(" {cell:<width$} |"));
    }
    line
}

pub(crate) fn header_row_index(grid: &Grid, header_rows: &[usize]) -> usize {
    header_rows
        .last()
        .copied()
        .filter(|&index| index < grid.len())
        .unwrap_or(0)
}

/// Renders the grid as a pipe table. Only the last header row becomes the
/// markdown header; rows above it are dropped from the rendering.
#[must_use]
pub fn render_markdown(grid: &Grid, header_rows: &[usize]) -> String {
    let cols = grid.first().map_or(0, Vec::len);
    if cols == 0 {
        return String::new();
    }

    let header_index = header_row_index(grid, header_rows);
    let rows = grid[header_index..]
        .iter()
        .map(|row| row.iter().map(|cell| escape_cell(cell)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = vec![3_usize; cols];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("|");

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(&rows[0], &widths));
    lines.push(format!("|{separator}|"));
    lines.extend(rows[1..].iter().map(|row| format_row(row, &widths)));
    lines.join("\n")
}
