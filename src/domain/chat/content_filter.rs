//! Content filter policies applied to inbound chat text.
//!
//! Filters are total: any input yields some output, never an error.
//! Every policy must be idempotent, `filter(filter(x)) == filter(x)`.

use regex::{Regex, RegexBuilder};

/// Pluggable redaction policy.
pub trait ContentFilter: Send + Sync {
    /// Returns `content` with disallowed material redacted.
    fn filter(&self, content: &str) -> String;
}

/// Passes content through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFilter;

impl ContentFilter for NoopFilter {
    fn filter(&self, content: &str) -> String {
        content.to_string()
    }
}

/// Character used to mask redacted words.
pub const REDACTION_CHAR: char = '*';

/// Masks every case-insensitive occurrence of a configured word with
/// [`REDACTION_CHAR`], one mask per character.
///
/// Words containing the mask character are ignored so that masking can
/// never produce a new match.
#[derive(Debug, Clone)]
pub struct WordListFilter {
    pattern: Option<Regex>,
}

impl WordListFilter {
    /// Builds a filter for `words`. Blank entries are skipped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty() && !w.contains(REDACTION_CHAR))
            .collect();
        // Longest first so overlapping words redact the widest span.
        words.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        words.dedup();

        if words.is_empty() {
            return Self { pattern: None };
        }

        let alternation = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = match RegexBuilder::new(&alternation).case_insensitive(true).build() {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::error!("Sensitive word list rejected, filtering disabled: {}", e);
                None
            }
        };

        Self { pattern }
    }

    /// True when no word is configured.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }
}

impl ContentFilter for WordListFilter {
    fn filter(&self, content: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern
                .replace_all(content, |caps: &regex::Captures<'_>| {
                    REDACTION_CHAR.to_string().repeat(caps[0].chars().count())
                })
                .into_owned(),
            None => content.to_string(),
        }
    }
}
