use crate::model::Grid;
use crate::warning::{GridWarning, WarningCode};

/// A row is a header row when at least half of its positions are owned by
/// header-role cells.
fn is_header_row(mask: &[bool]) -> bool {
    if mask.is_empty() {
        return false;
    }

    let header_cells = mask.iter().filter(|is_header| **is_header).count();
    header_cells * 2 >= mask.len()
}

pub(crate) fn detect_header_rows(
    header_mask: &[Vec<bool>],
    warnings: &mut Vec<GridWarning>,
) -> Vec<usize> {
    let header_rows = header_mask
        .iter()
        .enumerate()
        .filter(|(_, mask)| is_header_row(mask))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    if header_rows.is_empty() && !header_mask.is_empty() {
        warnings.push(GridWarning::new(
            WarningCode::HeaderRowFallback,
            "no row is mostly header cells; using the first row as header",
        ));
        return vec![0];
    }

    header_rows
}

/// Per column, the non-empty header labels found across `header_rows`,
/// top to bottom.
#[must_use]
pub fn build_header_hierarchy(grid: &Grid, header_rows: &[usize]) -> Vec<Vec<String>> {
    let cols = grid.first().map_or(0, Vec::len);
    (0..cols)
        .map(|col| {
            header_rows
                .iter()
                .filter_map(|&row| grid.get(row).and_then(|cells| cells.get(col)))
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect()
        })
        .collect()
}
