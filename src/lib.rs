pub mod assembler;
pub mod collaborators;
pub mod complexity;
pub mod config;
pub mod error;
pub mod markers;
pub mod models;
pub mod pagination;
pub mod pipeline;
pub mod segmenter;
pub mod storage;
pub mod table_mapper;
pub mod token;
pub mod truncate;
pub mod understanding;
pub mod warning;

pub use assembler::{TableLookup, assemble};
pub use collaborators::{RetryPolicy, Retrying, ServiceError, Storage, Summarizer, TableOcr};
pub use config::{ChunkingConfig, PipelineConfig, TableUnderstandingConfig};
pub use error::ChunkError;
pub use models::{Chunk, LayoutDocument, LayoutTable, TableArtifacts, TableMappingItem};
pub use pipeline::{ChunkReport, DocumentChunker, ensure_supported};
pub use storage::DirStorage;
pub use token::{HeuristicTokenEstimator, TokenEstimator};
pub use understanding::{TableUnderstandingOrchestrator, table_id_from_url};
pub use warning::{PipelineWarning, WarningCode};
