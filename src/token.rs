pub trait TokenEstimator {
    fn estimate(&self, text: &str) -> usize;
}

/// Script-aware character heuristic; no tokenizer model required.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenEstimator;

impl TokenEstimator for HeuristicTokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        if text.is_ascii() {
            return text.len() / 4;
        }

        let mut char_count = 0;
        let mut cjk_count = 0;
        let mut arabic_count = 0;
        for ch in text.chars() {
            char_count += 1;
            if is_cjk_char(ch) {
                cjk_count += 1;
            } else if is_arabic_char(ch) {
                arabic_count += 1;
            }
        }

        if cjk_count > 0 {
            cjk_count / 2 + (char_count - cjk_count) / 4
        } else if arabic_count > char_count / 2 {
            char_count / 5
        } else {
            char_count / 4
        }
    }
}

fn is_cjk_char(ch: char) -> bool {
    matches!(
        u32::from(ch),
        0x4E00..=0x9FFF | 0x3040..=0x309F | 0x30A0..=0x30FF | 0xAC00..=0xD7AF
    )
}

fn is_arabic_char(ch: char) -> bool {
    matches!(
        u32::from(ch),
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF
    )
}
