use crate::error::ChunkError;

pub const DEFAULT_MAX_CHUNK_TOKENS: usize = 2048;
pub const DEFAULT_MIN_CHUNK_TOKENS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub max_chunk_tokens: usize,
    pub min_chunk_tokens: usize,
    /// Drop segments smaller than `min_chunk_tokens` instead of emitting them.
    pub discard_below_min: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: DEFAULT_MAX_CHUNK_TOKENS,
            min_chunk_tokens: DEFAULT_MIN_CHUNK_TOKENS,
            discard_below_min: false,
        }
    }
}

/// Switches for the OCR + understanding pass over complex tables. Both must
/// be on for the pass to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableUnderstandingConfig {
    pub ocr_enabled: bool,
    pub understanding_enabled: bool,
}

impl TableUnderstandingConfig {
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            ocr_enabled: true,
            understanding_enabled: true,
        }
    }

    pub fn is_enabled(self) -> bool {
        self.ocr_enabled && self.understanding_enabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub chunking: ChunkingConfig,
    pub tables: TableUnderstandingConfig,
    pub dump_html_tables: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            tables: TableUnderstandingConfig::default(),
            dump_html_tables: true,
        }
    }
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    value.map_or(default, |value| value.trim().eq_ignore_ascii_case("true"))
}

fn parse_count(key: &str, value: Option<String>, default: usize) -> Result<usize, ChunkError> {
    let Some(value) = value else {
        return Ok(default);
    };
    value
        .trim()
        .parse::<usize>()
        .map_err(|error| ChunkError::InvalidConfig(format!("{key}='{value}': {error}")))
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ChunkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChunkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let chunking = ChunkingConfig {
            max_chunk_tokens: parse_count(
                "NUM_TOKENS",
                lookup("NUM_TOKENS"),
                defaults.chunking.max_chunk_tokens,
            )?,
            min_chunk_tokens: parse_count(
                "MIN_CHUNK_SIZE",
                lookup("MIN_CHUNK_SIZE"),
                defaults.chunking.min_chunk_tokens,
            )?,
            discard_below_min: parse_flag(lookup("DISCARD_SMALL_CHUNKS"), false),
        };
        if chunking.max_chunk_tokens == 0 {
            return Err(ChunkError::InvalidConfig(
                "NUM_TOKENS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            chunking,
            tables: TableUnderstandingConfig {
                ocr_enabled: parse_flag(lookup("ENABLE_PIXTRAL_OCR"), false),
                understanding_enabled: parse_flag(lookup("ENABLE_CONTENT_UNDERSTANDING"), false),
            },
            dump_html_tables: parse_flag(lookup("DUMP_HTML_TABLES"), defaults.dump_html_tables),
        })
    }
}
