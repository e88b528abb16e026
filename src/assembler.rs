use std::collections::HashMap;

use tracing::error;

use crate::error::ChunkError;
use crate::markers::{marker_urls, restore};
use crate::models::{Chunk, TableArtifacts, TableMappingItem};

#[derive(Debug, Clone, PartialEq, Default)]
struct TableMeta {
    table_id: Option<String>,
    header_hierarchy: Vec<Vec<String>>,
}

/// Per-document lookups from table image URL to everything a chunk needs.
/// Built once and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct TableLookup {
    content: HashMap<String, String>,
    artifacts: HashMap<String, TableArtifacts>,
    meta: HashMap<String, TableMeta>,
}

impl TableLookup {
    pub fn from_mapping(mapping: &[TableMappingItem]) -> Self {
        let mut lookup = Self::default();
        for item in mapping {
            let content = item
                .normalized_md
                .as_deref()
                .filter(|markdown| !markdown.is_empty())
                .unwrap_or(&item.html_table_content);
            lookup.content.insert(item.url.clone(), content.to_string());

            if let Some(artifacts) = &item.artifacts {
                lookup.artifacts.insert(item.url.clone(), artifacts.clone());
            }
            lookup.meta.insert(
                item.url.clone(),
                TableMeta {
                    table_id: item.table_id.clone(),
                    header_hierarchy: item.header_hierarchy.clone().unwrap_or_default(),
                },
            );
        }
        lookup
    }

    fn related_files(&self, urls: &[&str]) -> Vec<String> {
        urls.iter()
            .filter_map(|url| self.artifacts.get(*url))
            .flat_map(|artifacts| artifacts.urls())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn table_semantics(&self, urls: &[&str]) -> (Vec<String>, Vec<Vec<Vec<String>>>) {
        let mut table_ids = Vec::new();
        let mut hierarchies = Vec::new();
        for meta in urls.iter().filter_map(|url| self.meta.get(*url)) {
            if let Some(table_id) = meta.table_id.as_ref().filter(|id| !id.is_empty()) {
                table_ids.push(table_id.clone());
            }
            if !meta.header_hierarchy.is_empty() {
                hierarchies.push(meta.header_hierarchy.clone());
            }
        }
        (table_ids, hierarchies)
    }
}

pub fn assemble(
    chunk_id: usize,
    raw_text: &str,
    page: u32,
    headers: Vec<String>,
    lookup: &TableLookup,
    document: &str,
) -> Result<Chunk, ChunkError> {
    let urls = marker_urls(raw_text);
    let content = restore(raw_text, &lookup.content).map_err(|unresolved| {
        error!(
            document,
            chunk_id,
            unresolved = unresolved.urls.len(),
            "table markers left unresolved in chunk"
        );
        ChunkError::UnresolvedMarkers {
            document: document.to_string(),
            chunk_id,
            unresolved: unresolved.urls.len(),
        }
    })?;
    let (table_ids, table_header_hierarchies) = lookup.table_semantics(&urls);

    Ok(Chunk {
        chunk_id,
        content,
        page,
        headers,
        related_images: urls.iter().map(|url| (*url).to_string()).collect(),
        related_files: lookup.related_files(&urls),
        table_ids,
        table_header_hierarchies,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{TableLookup, assemble};
    use crate::error::ChunkError;
    use crate::models::{LayoutTable, TableArtifacts, TableMappingItem};

    fn mapping() -> Vec<TableMappingItem> {
        let plain = TableMappingItem::new(
            &LayoutTable {
                name: "t0".to_string(),
                url: "https://x/t0.png".to_string(),
                bounding_regions: Vec::new(),
            },
            "<table><tr><td>0</td></tr></table>",
            0,
        );
        let mut enriched = TableMappingItem::new(
            &LayoutTable {
                name: "t1".to_string(),
                url: "https://x/t1.png".to_string(),
                bounding_regions: Vec::new(),
            },
            "<table><tr><td>1</td></tr></table>",
            1,
        );
        enriched.table_id = Some("t1".to_string());
        enriched.normalized_md = Some("| A |\n|---|\n| 1 |".to_string());
        enriched.header_hierarchy = Some(vec![vec!["A".to_string()]]);
        enriched.artifacts = Some(TableArtifacts {
            json_url: "mem://t1.ocr.json".to_string(),
            csv_url: "mem://t1.csv".to_string(),
            md_url: "mem://t1.md".to_string(),
            schema_url: "mem://t1.schema.json".to_string(),
            semantic_url: "mem://t1.semantic.json".to_string(),
        });
        vec![plain, enriched]
    }

    #[test]
    fn prefers_normalized_markdown_and_collects_artifacts() {
        let lookup = TableLookup::from_mapping(&mapping());
        let chunk = assemble(
            3,
            "a [TABLE_IMAGE_URL:https://x/t0.png] b [TABLE_IMAGE_URL:https://x/t1.png]",
            2,
            vec!["Intro".to_string()],
            &lookup,
            "report.pdf",
        )
        .expect("all markers resolve");

        assert_eq!(
            chunk.content,
            "a <table><tr><td>0</td></tr></table> b | A |\n|---|\n| 1 |"
        );
        assert_eq!(chunk.related_images, vec!["https://x/t0.png", "https://x/t1.png"]);
        assert_eq!(chunk.related_files.len(), 5);
        assert_eq!(chunk.related_files[1], "mem://t1.csv");
        assert_eq!(chunk.table_ids, vec!["t1"]);
        assert_eq!(chunk.table_header_hierarchies, vec![vec![vec!["A".to_string()]]]);
        assert_eq!(chunk.page, 2);
    }

    #[test]
    fn chunk_without_markers_has_no_table_metadata() {
        let lookup = TableLookup::from_mapping(&mapping());
        let chunk = assemble(1, "plain text", 1, Vec::new(), &lookup, "report.pdf")
            .expect("no markers to resolve");
        assert_eq!(chunk.content, "plain text");
        assert!(chunk.related_images.is_empty());
        assert!(chunk.related_files.is_empty());
        assert!(chunk.table_ids.is_empty());
    }

    #[test]
    fn unknown_marker_is_a_structural_error() {
        let lookup = TableLookup::from_mapping(&mapping());
        let error = assemble(
            4,
            "[TABLE_IMAGE_URL:https://x/unknown.png]",
            1,
            Vec::new(),
            &lookup,
            "report.pdf",
        )
        .expect_err("marker cannot resolve");
        assert!(matches!(
            error,
            ChunkError::UnresolvedMarkers {
                chunk_id: 4,
                unresolved: 1,
                ..
            }
        ));
    }
}
