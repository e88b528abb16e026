use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid utf-8 csv output: {0}")]
    CsvEncoding(#[from] std::string::FromUtf8Error),

    #[error("table of {rows}x{cols} cells exceeds the {limit} cell limit")]
    GridTooLarge {
        rows: usize,
        cols: usize,
        limit: usize,
    },

    #[error("invalid OCR payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}
