#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningCode {
    MarkerNotEmbedded,
    EnrichmentFailed,
    SummaryUnavailable,
    GridClipped,
    PageBreakDropped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineWarning {
    pub code: WarningCode,
    pub message: String,
    pub table_index: Option<usize>,
    pub chunk_id: Option<usize>,
}

impl PipelineWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            table_index: None,
            chunk_id: None,
        }
    }

    #[must_use]
    pub fn with_table_index(mut self, table_index: usize) -> Self {
        self.table_index = Some(table_index);
        self
    }

    #[must_use]
    pub fn with_chunk_id(mut self, chunk_id: usize) -> Self {
        self.chunk_id = Some(chunk_id);
        self
    }
}
