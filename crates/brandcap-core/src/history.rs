//! Captions marked as used during this session.
//!
//! Lives only as long as the process. Captions are keyed by a BLAKE3 hash
//! of their trimmed, lowercased text, and near-duplicates are caught by
//! word-overlap similarity.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashMap;

use crate::captions::similarity;

/// A caption the user has marked as used.
#[derive(Debug, Clone, Serialize)]
pub struct UsedCaption {
    pub text: String,
    pub business: String,
    pub usage_count: u32,
    pub used_at: DateTime<Local>,
}

/// In-memory record of used captions.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: HashMap<String, UsedCaption>,
    threshold: f32,
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(0.8)
    }
}

/// Hash identifying a caption regardless of case and surrounding whitespace.
pub fn caption_hash(text: &str) -> String {
    blake3::hash(text.trim().to_lowercase().as_bytes())
        .to_hex()
        .to_string()
}

impl SessionHistory {
    /// `threshold` is the similarity at which two captions count as duplicates.
    pub fn new(threshold: f32) -> Self {
        Self {
            entries: HashMap::new(),
            threshold,
        }
    }

    /// Record a caption as used. Returns how many times it has been used.
    pub fn mark_used(&mut self, text: &str, business: &str) -> u32 {
        let entry = self
            .entries
            .entry(caption_hash(text))
            .or_insert_with(|| UsedCaption {
                text: text.trim().to_string(),
                business: business.to_string(),
                usage_count: 0,
                used_at: Local::now(),
            });
        entry.usage_count += 1;
        entry.used_at = Local::now();
        if !business.is_empty() {
            entry.business = business.to_string();
        }
        entry.usage_count
    }

    /// Forget a caption. Returns whether it was recorded.
    pub fn unmark(&mut self, text: &str) -> bool {
        self.entries.remove(&caption_hash(text)).is_some()
    }

    /// The recorded caption this text duplicates, if any.
    pub fn find_duplicate(&self, text: &str) -> Option<&UsedCaption> {
        if let Some(exact) = self.entries.get(&caption_hash(text)) {
            return Some(exact);
        }
        self.entries
            .values()
            .find(|used| similarity(text, &used.text) >= self.threshold)
    }

    pub fn is_duplicate(&self, text: &str) -> bool {
        self.find_duplicate(text).is_some()
    }

    /// Used captions, most recent first.
    pub fn entries(&self) -> Vec<&UsedCaption> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|a, b| b.used_at.cmp(&a.used_at));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTION: &str = "Fresh sourdough every morning, baked with love by our small team.";

    #[test]
    fn test_hash_ignores_case_and_whitespace() {
        assert_eq!(caption_hash("  Hello World "), caption_hash("hello world"));
        assert_ne!(caption_hash("hello"), caption_hash("hello!"));
    }

    #[test]
    fn test_mark_and_detect_exact() {
        let mut history = SessionHistory::default();
        assert!(!history.is_duplicate(CAPTION));
        assert_eq!(history.mark_used(CAPTION, "Rosie's"), 1);
        assert_eq!(history.mark_used(&CAPTION.to_uppercase(), ""), 2);
        assert_eq!(history.len(), 1);
        assert!(history.is_duplicate(CAPTION));
        assert_eq!(history.find_duplicate(CAPTION).unwrap().business, "Rosie's");
    }

    #[test]
    fn test_near_duplicate_detected() {
        let mut history = SessionHistory::new(0.8);
        history.mark_used(CAPTION, "");
        // One word changed out of eleven
        let tweaked = "Fresh sourdough every morning, baked with care by our small team.";
        assert!(history.is_duplicate(tweaked));
        assert!(!history.is_duplicate("Visit our new cafe for coffee and cake this weekend."));
    }

    #[test]
    fn test_unmark() {
        let mut history = SessionHistory::default();
        history.mark_used(CAPTION, "");
        assert!(history.unmark(&format!("  {CAPTION}  ")));
        assert!(!history.unmark(CAPTION));
        assert!(history.is_empty());
    }

    #[test]
    fn test_entries_most_recent_first() {
        let mut history = SessionHistory::default();
        history.mark_used("first caption", "");
        std::thread::sleep(std::time::Duration::from_millis(5));
        history.mark_used("second caption", "");
        let entries = history.entries();
        assert_eq!(entries[0].text, "second caption");
    }
}
