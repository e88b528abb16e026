use thiserror::Error;

use crate::collaborators::ServiceError;

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error(
        "document '{document}': found {html_tables} HTML table(s) in content but {supplied_tables} table entries were supplied"
    )]
    TableCountMismatch {
        document: String,
        html_tables: usize,
        supplied_tables: usize,
    },

    #[error("document '{document}': chunk {chunk_id} has {unresolved} unresolved table marker(s)")]
    UnresolvedMarkers {
        document: String,
        chunk_id: usize,
        unresolved: usize,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("table rendering failed: {0}")]
    Table(#[from] table_grid::TableError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ChunkError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedInput(_) | Self::InvalidUrl { .. } => "unsupported_input",
            Self::TableCountMismatch { .. } | Self::UnresolvedMarkers { .. } => {
                "structural_mismatch"
            }
            Self::Service(error) if error.is_transient() => "transient_service_error",
            Self::Service(_) => "service_error",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Table(_) | Self::Json(_) => "internal_error",
        }
    }

    /// Fatal structural errors abort the whole document; nothing about them
    /// improves on retry.
    pub fn is_structural(&self) -> bool {
        self.code() == "structural_mismatch"
    }
}
