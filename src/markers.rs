use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{info, warn};

use crate::models::TableMappingItem;
use crate::warning::{PipelineWarning, WarningCode};

static TABLE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[TABLE_IMAGE_URL:([^\]]+)\]").expect("hardcoded marker regex is valid")
});

#[must_use]
pub fn table_marker(url: &str) -> String {
    format!("[TABLE_IMAGE_URL:{url}]")
}

pub fn marker_urls(text: &str) -> Vec<&str> {
    TABLE_MARKER_RE
        .captures_iter(text)
        .filter_map(|capture| capture.get(1))
        .map(|url| url.as_str())
        .collect()
}

/// Replaces each mapped HTML table with its marker.
///
/// Tables are processed from the last index to the first and only the first
/// remaining occurrence of each fragment is replaced. A fragment that can no
/// longer be found is left in place and reported.
pub fn embed(
    content: &str,
    mapping: &[TableMappingItem],
    warnings: &mut Vec<PipelineWarning>,
) -> String {
    let mut marked = content.to_string();
    for item in mapping.iter().rev() {
        let Some(start) = marked.find(&item.html_table_content) else {
            warn!(
                table_index = item.table_index,
                name = %item.name,
                "could not find HTML table in content for marker replacement"
            );
            warnings.push(
                PipelineWarning::new(
                    WarningCode::MarkerNotEmbedded,
                    format!("HTML table '{}' was not found in the content", item.name),
                )
                .with_table_index(item.table_index),
            );
            continue;
        };

        let end = start + item.html_table_content.len();
        marked.replace_range(start..end, &table_marker(&item.url));
        info!(
            table_index = item.table_index,
            name = %item.name,
            "replaced HTML table with marker"
        );
    }
    marked
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedMarkers {
    pub urls: Vec<String>,
}

/// Swaps markers in a chunk back for table content.
///
/// A chunk without markers is returned as-is. Every marker must resolve;
/// otherwise the unresolved URLs are returned.
pub fn restore(
    chunk_text: &str,
    url_to_content: &HashMap<String, String>,
) -> Result<String, UnresolvedMarkers> {
    let urls = marker_urls(chunk_text);
    match urls.as_slice() {
        [] => Ok(chunk_text.to_string()),
        [url] => url_to_content
            .get(*url)
            .map(|content| chunk_text.replace(&table_marker(url), content))
            .ok_or_else(|| UnresolvedMarkers {
                urls: vec![(*url).to_string()],
            }),
        _ => {
            let mut unresolved = Vec::new();
            let restored = TABLE_MARKER_RE.replace_all(chunk_text, |capture: &Captures| {
                let url = &capture[1];
                if let Some(content) = url_to_content.get(url) {
                    content.clone()
                } else {
                    unresolved.push(url.to_string());
                    capture[0].to_string()
                }
            });
            if unresolved.is_empty() {
                Ok(restored.into_owned())
            } else {
                Err(UnresolvedMarkers { urls: unresolved })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{embed, marker_urls, restore, table_marker};
    use crate::models::{LayoutTable, TableMappingItem};
    use crate::table_mapper::map_tables;
    use crate::warning::WarningCode;

    const TABLE: &str = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>";

    fn layout_table(name: &str) -> LayoutTable {
        LayoutTable {
            name: name.to_string(),
            url: format!("https://x/{name}.png"),
            bounding_regions: Vec::new(),
        }
    }

    fn content_map(mapping: &[TableMappingItem]) -> HashMap<String, String> {
        mapping
            .iter()
            .map(|item| (item.url.clone(), item.html_table_content.clone()))
            .collect()
    }

    #[test]
    fn single_table_round_trip() {
        let tables = vec![layout_table("t1")];
        let mapping = map_tables("doc.pdf", TABLE, Some(&tables)).expect("counts match");
        let mut warnings = Vec::new();

        let marked = embed(TABLE, &mapping, &mut warnings);
        assert_eq!(marked, "[TABLE_IMAGE_URL:https://x/t1.png]");
        assert!(warnings.is_empty());

        let mut contents = HashMap::new();
        contents.insert("https://x/t1.png".to_string(), TABLE.to_string());
        assert_eq!(restore(&marked, &contents).expect("marker resolves"), TABLE);
    }

    #[test]
    fn embed_restore_embed_is_stable() {
        let content = format!(
            "# Intro\n{TABLE}\nmiddle\n<table><tr><td>x</td></tr></table>\nend"
        );
        let tables = vec![layout_table("t1"), layout_table("t2")];
        let mapping = map_tables("doc.pdf", &content, Some(&tables)).expect("counts match");
        let mut warnings = Vec::new();

        let marked = embed(&content, &mapping, &mut warnings);
        assert_eq!(
            marker_urls(&marked),
            vec!["https://x/t1.png", "https://x/t2.png"]
        );

        let restored = restore(&marked, &content_map(&mapping)).expect("markers resolve");
        assert_eq!(restored, content);
        assert_eq!(embed(&restored, &mapping, &mut warnings), marked);
    }

    #[test]
    fn duplicate_fragments_each_get_their_own_marker() {
        let content = format!("{TABLE} and again {TABLE}");
        let tables = vec![layout_table("t1"), layout_table("t2")];
        let mapping = map_tables("doc.pdf", &content, Some(&tables)).expect("counts match");
        let mut warnings = Vec::new();

        let marked = embed(&content, &mapping, &mut warnings);
        assert_eq!(
            marked,
            "[TABLE_IMAGE_URL:https://x/t2.png] and again [TABLE_IMAGE_URL:https://x/t1.png]"
        );
    }

    #[test]
    fn missing_fragment_is_skipped_with_warning() {
        let mut item = TableMappingItem::new(&layout_table("t1"), "<table>gone</table>", 0);
        item.table_index = 4;
        let mut warnings = Vec::new();

        let marked = embed("no tables here", &[item], &mut warnings);
        assert_eq!(marked, "no tables here");
        assert_eq!(warnings[0].code, WarningCode::MarkerNotEmbedded);
        assert_eq!(warnings[0].table_index, Some(4));
    }

    #[test]
    fn unresolved_single_marker_fails() {
        let text = format!("before {} after", table_marker("https://x/missing.png"));
        let error = restore(&text, &HashMap::new()).expect_err("marker cannot resolve");
        assert_eq!(error.urls, vec!["https://x/missing.png"]);
    }

    #[test]
    fn multiple_markers_fail_when_any_is_unresolved() {
        let text = format!(
            "{} and {}",
            table_marker("https://x/a.png"),
            table_marker("https://x/b.png")
        );
        let mut contents = HashMap::new();
        contents.insert("https://x/a.png".to_string(), "A$1".to_string());

        let error = restore(&text, &contents).expect_err("second marker cannot resolve");
        assert_eq!(error.urls, vec!["https://x/b.png"]);

        contents.insert("https://x/b.png".to_string(), "B".to_string());
        assert_eq!(restore(&text, &contents).expect("markers resolve"), "A$1 and B");
    }

    #[test]
    fn chunk_without_markers_is_unchanged() {
        assert_eq!(
            restore("plain text", &HashMap::new()).expect("nothing to resolve"),
            "plain text"
        );
    }
}
