use serde::{Deserialize, Serialize};

pub const PAGE_BREAK_MARKER: &str = "<!-- PageBreak -->";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    #[serde(default)]
    pub content: String,
    /// `None` when the service reported no table list at all; an empty list
    /// still has to agree with the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<LayoutTable>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTable {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounding_regions: Vec<BoundingRegion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    pub page_number: u32,
    #[serde(default)]
    pub polygon: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableArtifacts {
    pub json_url: String,
    pub csv_url: String,
    pub md_url: String,
    pub schema_url: String,
    pub semantic_url: String,
}

impl TableArtifacts {
    pub fn urls(&self) -> [&str; 5] {
        [
            self.json_url.as_str(),
            self.csv_url.as_str(),
            self.md_url.as_str(),
            self.schema_url.as_str(),
            self.semantic_url.as_str(),
        ]
    }
}

/// One HTML table from the content paired with the layout service's entry
/// at the same ordinal position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableMappingItem {
    pub name: String,
    pub url: String,
    pub html_table_content: String,
    pub table_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<TableArtifacts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_hierarchy: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_confidence: Option<f64>,
}

impl TableMappingItem {
    #[must_use]
    pub fn new(table: &LayoutTable, html_table_content: &str, table_index: usize) -> Self {
        Self {
            name: table.name.clone(),
            url: table.url.clone(),
            html_table_content: html_table_content.to_string(),
            table_index,
            table_id: None,
            artifacts: None,
            normalized_md: None,
            header_hierarchy: None,
            quality_confidence: None,
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.artifacts.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub chunk_id: usize,
    pub content: String,
    pub page: u32,
    pub headers: Vec<String>,
    #[serde(rename = "relatedImages")]
    pub related_images: Vec<String>,
    #[serde(rename = "relatedFiles")]
    pub related_files: Vec<String>,
    #[serde(rename = "tableIds")]
    pub table_ids: Vec<String>,
    #[serde(
        rename = "tableHeaderHierarchies",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub table_header_hierarchies: Vec<Vec<Vec<String>>>,
}
