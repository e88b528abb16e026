use std::path::Path;

use serde::Serialize;
use table_grid::{GridWarningCode, OcrTable};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::collaborators::{Storage, Summarizer, TableOcr};
use crate::complexity::is_complex_table;
use crate::config::TableUnderstandingConfig;
use crate::error::ChunkError;
use crate::models::{TableArtifacts, TableMappingItem};
use crate::warning::{PipelineWarning, WarningCode};

const SUMMARY_MAX_TOKENS: u32 = 800;

#[derive(Debug, Serialize)]
struct SemanticArtifact<'a> {
    header_hierarchy: &'a [Vec<String>],
    summary: &'a str,
}

/// Stable table identifier: the decoded file stem of the table image URL.
pub fn table_id_from_url(url: &str) -> Result<String, ChunkError> {
    let parsed = Url::parse(url).map_err(|source| ChunkError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    let file_name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let decoded = urlencoding::decode(file_name)
        .map_err(|error| ChunkError::UnsupportedInput(format!("table URL '{url}': {error}")))?;

    Path::new(decoded.as_ref())
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ChunkError::UnsupportedInput(format!("table URL '{url}' has no file name")))
}

fn summary_prompt(markdown: &str) -> String {
    format!(
        "You are a data analyst. Summarize the following table, highlighting header hierarchies, \
         key columns, units and implicit relationships. Answer with clear, concise bullets.\n\n{markdown}"
    )
}

pub struct TableUnderstandingOrchestrator<'a> {
    storage: &'a dyn Storage,
    ocr: &'a dyn TableOcr,
    summarizer: Option<&'a dyn Summarizer>,
    config: TableUnderstandingConfig,
}

impl<'a> TableUnderstandingOrchestrator<'a> {
    pub fn new(
        storage: &'a dyn Storage,
        ocr: &'a dyn TableOcr,
        config: TableUnderstandingConfig,
    ) -> Self {
        Self {
            storage,
            ocr,
            summarizer: None,
            config,
        }
    }

    #[must_use]
    pub fn with_summarizer(mut self, summarizer: &'a dyn Summarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Enriches every complex table in `mapping`.
    ///
    /// Simple tables pass through untouched. A table whose enrichment fails
    /// is kept exactly as it came in and reported as a warning.
    pub fn enrich(
        &self,
        document: &str,
        mapping: Vec<TableMappingItem>,
    ) -> (Vec<TableMappingItem>, Vec<PipelineWarning>) {
        let mut warnings = Vec::new();
        if !self.config.is_enabled() {
            return (mapping, warnings);
        }

        let mut enriched = Vec::with_capacity(mapping.len());
        for item in mapping {
            if !is_complex_table(&item.html_table_content) {
                debug!(document, table_index = item.table_index, "table is simple, skipping");
                enriched.push(item);
                continue;
            }

            info!(
                document,
                table_index = item.table_index,
                name = %item.name,
                "understanding complex table"
            );
            match self.understand_table(&item, &mut warnings) {
                Ok(understood) => enriched.push(understood),
                Err(failure) => {
                    error!(
                        document,
                        table_index = item.table_index,
                        name = %item.name,
                        error = %failure,
                        "table understanding failed"
                    );
                    warnings.push(
                        PipelineWarning::new(
                            WarningCode::EnrichmentFailed,
                            format!("understanding failed for table '{}': {failure}", item.name),
                        )
                        .with_table_index(item.table_index),
                    );
                    enriched.push(item);
                }
            }
        }
        (enriched, warnings)
    }

    fn understand_table(
        &self,
        item: &TableMappingItem,
        warnings: &mut Vec<PipelineWarning>,
    ) -> Result<TableMappingItem, ChunkError> {
        let image = self.storage.download(&item.url)?;
        let ocr = self.ocr.analyze_table_image(&image)?;
        let understood = table_grid::understand(&ocr)?;
        let table_id = table_id_from_url(&item.url)?;

        let mut table_warnings = Vec::new();
        for grid_warning in &understood.warnings {
            if grid_warning.code == GridWarningCode::HeaderRowFallback {
                debug!(table_id = %table_id, message = %grid_warning.message, "header row fallback");
                continue;
            }
            table_warnings.push(
                PipelineWarning::new(WarningCode::GridClipped, grid_warning.message.clone())
                    .with_table_index(item.table_index),
            );
        }

        let summary = self.summarize(&understood.markdown, item.table_index, &mut table_warnings);
        let artifacts = self.publish(&table_id, &ocr, &understood, &summary)?;

        warnings.extend(table_warnings);
        let mut enriched = item.clone();
        enriched.table_id = Some(table_id);
        enriched.artifacts = Some(artifacts);
        enriched.normalized_md = Some(understood.markdown);
        enriched.header_hierarchy = Some(understood.header_hierarchy);
        enriched.quality_confidence = Some(understood.quality_confidence);
        Ok(enriched)
    }

    fn summarize(
        &self,
        markdown: &str,
        table_index: usize,
        warnings: &mut Vec<PipelineWarning>,
    ) -> String {
        let Some(summarizer) = self.summarizer else {
            return String::new();
        };
        if markdown.is_empty() {
            return String::new();
        }

        match summarizer.complete(&summary_prompt(markdown), SUMMARY_MAX_TOKENS) {
            Ok(summary) => summary,
            Err(failure) => {
                warn!(table_index, error = %failure, "table summary unavailable");
                warnings.push(
                    PipelineWarning::new(WarningCode::SummaryUnavailable, failure.to_string())
                        .with_table_index(table_index),
                );
                String::new()
            }
        }
    }

    fn publish(
        &self,
        table_id: &str,
        ocr: &OcrTable,
        understood: &table_grid::TableUnderstanding,
        summary: &str,
    ) -> Result<TableArtifacts, ChunkError> {
        let semantic = SemanticArtifact {
            header_hierarchy: &understood.header_hierarchy,
            summary,
        };

        let artifacts = TableArtifacts {
            json_url: self.upload(format!("{table_id}.ocr.json"), &serde_json::to_vec(ocr)?)?,
            csv_url: self.upload(format!("{table_id}.csv"), understood.csv.as_bytes())?,
            md_url: self.upload(format!("{table_id}.md"), understood.markdown.as_bytes())?,
            schema_url: self.upload(
                format!("{table_id}.schema.json"),
                &serde_json::to_vec(&understood.schema)?,
            )?,
            semantic_url: self.upload(
                format!("{table_id}.semantic.json"),
                &serde_json::to_vec(&semantic)?,
            )?,
        };
        info!(table_id, "published table artifacts");
        Ok(artifacts)
    }

    fn upload(&self, name: String, bytes: &[u8]) -> Result<String, ChunkError> {
        Ok(self.storage.upload(&name, bytes)?)
    }
}
