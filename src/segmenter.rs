use std::collections::BTreeMap;

use tracing::info;

use crate::token::TokenEstimator;
use crate::truncate::truncate_to_budget;

const MAX_HEADER_LEVEL: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub content: String,
    /// Active header titles, outermost level first.
    pub headers: Vec<String>,
    pub token_count: usize,
    pub dropped_page_breaks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    content: String,
    headers: BTreeMap<usize, String>,
}

fn parse_header(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&ch| ch == '#').count();
    if level == 0 || level > MAX_HEADER_LEVEL {
        return None;
    }

    let rest = &line[level..];
    if rest.is_empty() || rest.starts_with(' ') {
        Some((level, rest.trim()))
    } else {
        None
    }
}

fn clean_line(line: &str) -> String {
    line.trim().chars().filter(|ch| !ch.is_control()).collect()
}

#[derive(Default)]
struct SectionBuilder {
    sections: Vec<Section>,
    lines: Vec<String>,
}

impl SectionBuilder {
    fn flush(&mut self, headers: &BTreeMap<usize, String>) {
        if self.lines.is_empty() {
            return;
        }
        self.sections.push(Section {
            content: self.lines.join("\n"),
            headers: headers.clone(),
        });
        self.lines.clear();
    }
}

/// Splits on header lines, keeping each header with the text it introduces.
/// Blank lines end a paragraph; fenced code blocks are never split.
fn split_sections(text: &str) -> Vec<Section> {
    let mut builder = SectionBuilder::default();
    let mut active = BTreeMap::<usize, String>::new();
    let mut current = BTreeMap::<usize, String>::new();
    let mut fence: Option<&str> = None;

    for raw_line in text.lines() {
        let line = clean_line(raw_line);

        fence = match fence {
            None if line.starts_with("```") && line.matches("```").count() == 1 => Some("```"),
            None if line.starts_with("~~~") => Some("~~~"),
            Some(open) if line.starts_with(open) => None,
            other => other,
        };
        if fence.is_some() {
            builder.lines.push(line);
            continue;
        }

        if let Some((level, title)) = parse_header(&line) {
            active.retain(|&open_level, _| open_level < level);
            active.insert(level, title.to_string());
            builder.flush(&current);
            builder.lines.push(line);
        } else if !line.is_empty() {
            builder.lines.push(line);
        } else {
            builder.flush(&current);
        }
        current.clone_from(&active);
    }
    builder.flush(&current);

    aggregate(builder.sections)
}

fn ends_with_header_line(content: &str) -> bool {
    content
        .rsplit('\n')
        .next()
        .is_some_and(|line| line.starts_with('#'))
}

/// Joins consecutive sections under the same headers. A section that is only
/// a header absorbs the deeper section that follows it.
fn aggregate(sections: Vec<Section>) -> Vec<Section> {
    let mut aggregated: Vec<Section> = Vec::new();
    for section in sections {
        if let Some(last) = aggregated.last_mut() {
            if last.headers == section.headers {
                last.content.push_str("  \n");
                last.content.push_str(&section.content);
                continue;
            }
            if last.headers.len() < section.headers.len() && ends_with_header_line(&last.content) {
                last.content.push_str("  \n");
                last.content.push_str(&section.content);
                last.headers = section.headers;
                continue;
            }
        }
        aggregated.push(section);
    }
    aggregated
}

pub struct ChunkSegmenter<'a> {
    max_tokens: usize,
    estimator: &'a dyn TokenEstimator,
}

impl<'a> ChunkSegmenter<'a> {
    pub fn new(max_tokens: usize, estimator: &'a dyn TokenEstimator) -> Self {
        Self {
            max_tokens,
            estimator,
        }
    }

    pub fn split(&self, text: &str) -> Vec<Segment> {
        split_sections(text)
            .into_iter()
            .map(|section| {
                let size = self.estimator.estimate(&section.content);
                let (content, dropped_page_breaks) = if size > self.max_tokens {
                    info!(
                        size,
                        max_tokens = self.max_tokens,
                        "truncating chunk to fit the token budget"
                    );
                    let truncation =
                        truncate_to_budget(&section.content, self.max_tokens, self.estimator);
                    (truncation.text, truncation.dropped_page_breaks)
                } else {
                    (section.content, Vec::new())
                };

                Segment {
                    token_count: self.estimator.estimate(&content),
                    content,
                    headers: section.headers.into_values().collect(),
                    dropped_page_breaks,
                }
            })
            .collect()
    }
}
