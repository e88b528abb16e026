mod csv_out;
mod error;
mod grid;
mod header;
mod markdown;
mod model;
mod schema;
mod warning;

pub use csv_out::render_csv;
pub use error::TableError;
pub use grid::{MAX_GRID_CELLS, reconstruct_grid};
pub use header::build_header_hierarchy;
pub use markdown::render_markdown;
pub use model::{
    CellRole, ColumnSchema, ColumnType, Grid, OcrTable, ReconstructedGrid, TableCell, TableSchema,
};
pub use schema::infer_schema;
pub use warning::{GridWarning, WarningCode as GridWarningCode};

#[derive(Debug, Clone, PartialEq)]
pub struct TableUnderstanding {
    pub grid: Grid,
    pub header_rows: Vec<usize>,
    pub header_hierarchy: Vec<Vec<String>>,
    pub markdown: String,
    pub csv: String,
    pub schema: TableSchema,
    pub quality_confidence: f64,
    pub warnings: Vec<GridWarning>,
}

pub fn understand(ocr: &OcrTable) -> Result<TableUnderstanding, TableError> {
    let (reconstructed, warnings) = reconstruct_grid(ocr)?;
    let ReconstructedGrid { grid, header_rows } = reconstructed;

    let header_hierarchy = build_header_hierarchy(&grid, &header_rows);
    let markdown = render_markdown(&grid, &header_rows);
    let csv = render_csv(&grid)?;
    let schema = infer_schema(&grid, &header_rows);

    tracing::debug!(
        rows = grid.len(),
        header_rows = header_rows.len(),
        warnings = warnings.len(),
        "reconstructed table grid"
    );

    Ok(TableUnderstanding {
        grid,
        header_rows,
        header_hierarchy,
        markdown,
        csv,
        schema,
        quality_confidence: ocr.confidence.unwrap_or(0.0),
        warnings,
    })
}

pub fn understand_json(payload: &[u8]) -> Result<TableUnderstanding, TableError> {
    let ocr = serde_json::from_slice::<OcrTable>(payload)?;
    understand(&ocr)
}
