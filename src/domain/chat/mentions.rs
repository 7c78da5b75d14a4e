//! `@handle` mention extraction.

use once_cell::sync::Lazy;
use regex::Regex;

/// `@` followed by 2 to 20 characters that are neither whitespace nor `@`.
static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[^\s@]{2,20}").expect("mention pattern is valid"));

/// Minimum handle length after the `@`.
const MIN_HANDLE_CHARS: usize = 2;

/// Sentence punctuation stripped from the end of a raw match, so that
/// `"@carol,"` mentions `@carol`.
fn is_trailing_punctuation(c: char) -> bool {
    (c.is_ascii_punctuation() && c != '_' && c != '-')
        || matches!(c, '，' | '。' | '！' | '？' | '、' | '；' | '：' | '…')
}

/// Returns every mention in `content`, left to right, duplicates kept.
///
/// Handles are not checked against the roster.
pub fn extract_mentions(content: &str) -> Vec<String> {
    MENTION_PATTERN
        .find_iter(content)
        .filter_map(|m| {
            // The match always starts with the single-byte `@`.
            let handle = m.as_str()[1..].trim_end_matches(is_trailing_punctuation);
            (handle.chars().count() >= MIN_HANDLE_CHARS).then(|| format!("@{handle}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_mentions_and_skips_single_character_handles() {
        assert_eq!(
            extract_mentions("hello @bob and @carol, ignore @x"),
            vec!["@bob", "@carol"]
        );
    }

    #[test]
    fn keeps_duplicates_in_order() {
        assert_eq!(
            extract_mentions("@bob @alice @bob"),
            vec!["@bob", "@alice", "@bob"]
        );
    }

    #[test]
    fn adjacent_mentions_split_at_at_sign() {
        assert_eq!(extract_mentions("@bob@carol"), vec!["@bob", "@carol"]);
    }

    #[test]
    fn long_handles_are_cut_at_twenty_characters() {
        let content = format!("@{}", "a".repeat(25));
        assert_eq!(extract_mentions(&content), vec![format!("@{}", "a".repeat(20))]);
    }

    #[test]
    fn punctuation_inside_handle_is_kept() {
        assert_eq!(extract_mentions("ping @a.b_c-d!"), vec!["@a.b_c-d"]);
    }

    #[test]
    fn handle_reduced_below_minimum_is_dropped() {
        assert!(extract_mentions("@a!!").is_empty());
    }

    #[test]
    fn multibyte_handles_are_supported() {
        assert_eq!(extract_mentions("你好 @小明。"), vec!["@小明"]);
    }

    #[test]
    fn content_without_mentions_yields_nothing() {
        assert!(extract_mentions("").is_empty());
        assert!(extract_mentions("mail me at example dot com @ noon").is_empty());
    }

    proptest! {
        #[test]
        fn extraction_is_stable_on_its_own_output(content in "\\PC{0,80}") {
            for mention in extract_mentions(&content) {
                prop_assert_eq!(extract_mentions(&mention), vec![mention.clone()]);
            }
        }
    }
}
