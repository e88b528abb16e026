use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;

use crate::assembler::{TableLookup, assemble};
use crate::collaborators::{Storage, Summarizer, TableOcr};
use crate::config::PipelineConfig;
use crate::error::ChunkError;
use crate::markers::embed;
use crate::models::{Chunk, LayoutDocument, TableMappingItem};
use crate::pagination::{advance, number_page_breaks, page_for};
use crate::segmenter::ChunkSegmenter;
use crate::table_mapper::map_tables;
use crate::token::{HeuristicTokenEstimator, TokenEstimator};
use crate::understanding::TableUnderstandingOrchestrator;
use crate::warning::{PipelineWarning, WarningCode};

pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["pdf", "png", "jpeg", "jpg", "bmp", "tiff", "docx", "pptx"];

fn document_file_name(document_url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(document_url) {
        let segment = parsed.path_segments()?.next_back()?;
        return urlencoding::decode(segment)
            .ok()
            .map(|name| name.into_owned())
            .filter(|name| !name.is_empty());
    }
    Path::new(document_url)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

pub fn ensure_supported(document_url: &str) -> Result<(), ChunkError> {
    let extension = document_file_name(document_url).and_then(|name| {
        Path::new(&name)
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
    });
    match extension {
        Some(extension) if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) => Ok(()),
        Some(extension) => Err(ChunkError::UnsupportedInput(format!(
            "'{document_url}': extension '{extension}' is not supported"
        ))),
        None => Err(ChunkError::UnsupportedInput(format!(
            "'{document_url}' has no file extension"
        ))),
    }
}

fn html_table_dump(mapping: &[TableMappingItem]) -> String {
    mapping
        .iter()
        .enumerate()
        .map(|(index, item)| format!("TABLE {}:\n{}\n\n\n", index + 1, item.html_table_content))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkReport {
    pub chunks: Vec<Chunk>,
    pub skipped_chunks: usize,
    pub warnings: Vec<PipelineWarning>,
}

pub struct DocumentChunker<'a> {
    config: PipelineConfig,
    storage: Option<&'a dyn Storage>,
    ocr: Option<&'a dyn TableOcr>,
    summarizer: Option<&'a dyn Summarizer>,
    estimator: &'a dyn TokenEstimator,
}

impl<'a> DocumentChunker<'a> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            storage: None,
            ocr: None,
            summarizer: None,
            estimator: &HeuristicTokenEstimator,
        }
    }

    #[must_use]
    pub fn with_storage(mut self, storage: &'a dyn Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn with_ocr(mut self, ocr: &'a dyn TableOcr) -> Self {
        self.ocr = Some(ocr);
        self
    }

    #[must_use]
    pub fn with_summarizer(mut self, summarizer: &'a dyn Summarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    #[must_use]
    pub fn with_estimator(mut self, estimator: &'a dyn TokenEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn chunk_document(
        &self,
        document_url: &str,
        document: &LayoutDocument,
    ) -> Result<ChunkReport, ChunkError> {
        ensure_supported(document_url)?;
        let mut report = ChunkReport::default();

        let mapping = map_tables(document_url, &document.content, document.tables.as_deref())?;
        let mapping = self.enrich(document_url, mapping, &mut report.warnings);
        let content = embed(&document.content, &mapping, &mut report.warnings);
        self.dump_html_tables(document_url, &mapping)?;

        let lookup = TableLookup::from_mapping(&mapping);
        let numbered = number_page_breaks(&content);
        let segments =
            ChunkSegmenter::new(self.config.chunking.max_chunk_tokens, self.estimator).split(&numbered);

        let mut current_page = 1;
        for segment in segments {
            current_page = advance(&segment.content, current_page);
            let page = page_for(&segment.content, current_page);

            let discard = self.config.chunking.discard_below_min
                && segment.token_count < self.config.chunking.min_chunk_tokens;
            let chunk_id = (!discard).then(|| report.chunks.len() + 1);
            for page_break in &segment.dropped_page_breaks {
                let warning = PipelineWarning::new(
                    WarningCode::PageBreakDropped,
                    format!("{page_break} did not fit the chunk budget"),
                );
                report.warnings.push(match chunk_id {
                    Some(chunk_id) => warning.with_chunk_id(chunk_id),
                    None => warning,
                });
            }

            let Some(chunk_id) = chunk_id else {
                debug!(
                    document = document_url,
                    token_count = segment.token_count,
                    min_chunk_tokens = self.config.chunking.min_chunk_tokens,
                    "skipping chunk below minimum size"
                );
                report.skipped_chunks += 1;
                continue;
            };
            report.chunks.push(assemble(
                chunk_id,
                &segment.content,
                page,
                segment.headers,
                &lookup,
                document_url,
            )?);
        }

        info!(document = document_url, chunks = report.chunks.len(), "chunk(s) created");
        if report.skipped_chunks > 0 {
            info!(
                document = document_url,
                skipped = report.skipped_chunks,
                "chunk(s) skipped"
            );
        }
        Ok(report)
    }

    fn enrich(
        &self,
        document_url: &str,
        mapping: Vec<TableMappingItem>,
        warnings: &mut Vec<PipelineWarning>,
    ) -> Vec<TableMappingItem> {
        if mapping.is_empty() || !self.config.tables.is_enabled() {
            return mapping;
        }
        let (Some(storage), Some(ocr)) = (self.storage, self.ocr) else {
            warn!(
                document = document_url,
                "table understanding is enabled but no storage or OCR service is configured"
            );
            return mapping;
        };

        let mut orchestrator = TableUnderstandingOrchestrator::new(storage, ocr, self.config.tables);
        if let Some(summarizer) = self.summarizer {
            orchestrator = orchestrator.with_summarizer(summarizer);
        }
        let (mapping, enrichment_warnings) = orchestrator.enrich(document_url, mapping);
        warnings.extend(enrichment_warnings);
        mapping
    }

    fn dump_html_tables(
        &self,
        document_url: &str,
        mapping: &[TableMappingItem],
    ) -> Result<(), ChunkError> {
        if !self.config.dump_html_tables || mapping.is_empty() {
            return Ok(());
        }
        let Some(storage) = self.storage else {
            debug!(document = document_url, "no storage configured, skipping HTML table dump");
            return Ok(());
        };

        let stem = document_file_name(document_url)
            .and_then(|name| {
                Path::new(&name)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "document".to_string());
        let url = storage.upload(&format!("{stem}.txt"), html_table_dump(mapping).as_bytes())?;
        info!(document = document_url, url = %url, "uploaded HTML table dump");
        Ok(())
    }
}
