//! Splitting model output into caption variants and comparing captions.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::error::GenerationError;

/// Captions requested per generation.
pub const VARIANTS_PER_REQUEST: usize = 3;

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());

/// "Caption 1:", "**Caption 2**", "3.", "1)" at the start of a block.
static LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\*\*)?\s*(?:caption\s*#?\d+|\d{1,2}[.)])\s*[:.\-]?\s*(?:\*\*)?\s*").unwrap()
});

/// Split raw model output into at most three caption texts.
///
/// Blocks are separated by blank lines. Numbering labels are stripped and
/// empty or `[placeholder]` blocks are dropped.
pub fn parse_variants(text: &str) -> Result<Vec<String>, GenerationError> {
    let variants: Vec<String> = BLANK_LINE
        .split(text)
        .map(|block| LABEL.replace(block.trim(), "").trim().to_string())
        .filter(|block| !block.is_empty())
        .filter(|block| !(block.starts_with('[') && block.ends_with(']')))
        .take(VARIANTS_PER_REQUEST)
        .collect();

    if variants.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(variants)
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Word-overlap similarity: shared distinct words over the larger word set.
///
/// Returns 0.0 when either text has no words.
pub fn similarity(a: &str, b: &str) -> f32 {
    let (a, b) = (word_set(a), word_set(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    shared as f32 / a.len().max(b.len()) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_paragraphs() {
        let text = "First caption here.\n\nSecond caption here.\n\nThird caption here.";
        assert_eq!(
            parse_variants(text).unwrap(),
            vec!["First caption here.", "Second caption here.", "Third caption here."]
        );
    }

    #[test]
    fn test_parse_strips_labels() {
        let text = "**Caption 1:** Fresh bread daily.\n\nCaption 2: Come say hi.\n\n3. Weekend cakes.";
        assert_eq!(
            parse_variants(text).unwrap(),
            vec!["Fresh bread daily.", "Come say hi.", "Weekend cakes."]
        );
    }

    #[test]
    fn test_parse_keeps_leading_year() {
        let text = "2024. What a year for sourdough.\n\n1998) The year Rosie opened.\n\n2. Weekend cakes.";
        assert_eq!(
            parse_variants(text).unwrap(),
            vec![
                "2024. What a year for sourdough.",
                "1998) The year Rosie opened.",
                "Weekend cakes."
            ]
        );
    }

    #[test]
    fn test_parse_label_on_own_line() {
        let text = "**Caption 1**\nFresh bread daily.\n \nCaption 2\nCome say hi.";
        assert_eq!(
            parse_variants(text).unwrap(),
            vec!["Fresh bread daily.", "Come say hi."]
        );
    }

    #[test]
    fn test_parse_drops_placeholders_and_extras() {
        let text = "[First caption without emojis/hashtags]\n\nOne.\n\nTwo.\n\nThree.\n\nFour.";
        assert_eq!(parse_variants(text).unwrap(), vec!["One.", "Two.", "Three."]);
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(matches!(parse_variants("  \n\n  "), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("the quick brown fox", "The quick brown fox"), 1.0);
        assert_eq!(similarity("a b c d", "a b x y"), 0.5);
        // Divides by the larger set
        assert_eq!(similarity("a b", "a b c d"), 0.5);
        assert_eq!(similarity("", "a"), 0.0);
    }
}
