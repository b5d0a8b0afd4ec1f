//! Snippet extraction for search results
//!
//! A snippet is a window of roughly thirty words of a page's visible
//! text around the first word matching a query lemma, with every
//! matched word inside the window wrapped in `<b>` markers. Matching is
//! by lemma, so any surface form of a query term is highlighted.

use crate::morphology::Morphology;
use std::collections::HashSet;

/// Words kept before the first matched word
const WORDS_BEFORE: usize = 14;
/// Words kept after the first matched word
const WORDS_AFTER: usize = 15;
/// Window size when no word matches and the snippet falls back to the
/// start of the text
const FALLBACK_WORDS: usize = WORDS_BEFORE + 1 + WORDS_AFTER;

const HIGHLIGHT_PREFIX: &str = "<b>";
const HIGHLIGHT_POSTFIX: &str = "</b>";

/// Builds the highlighted snippet for one result page
///
/// `matched_lemmas` are the query lemmas that survived stop-word
/// exclusion. When none of them occurs in the text, the snippet is the
/// unhighlighted start of the text.
pub(crate) fn build_snippet(
    morphology: &Morphology,
    text: &str,
    matched_lemmas: &HashSet<String>,
) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }

    let is_match = |word: &str| -> bool {
        morphology
            .normalize_word(word)
            .map(|lemma| matched_lemmas.contains(&lemma))
            .unwrap_or(false)
    };

    let anchor = words.iter().position(|word| is_match(word));

    let (start, end, highlight) = match anchor {
        Some(index) => {
            let start = index.saturating_sub(WORDS_BEFORE);
            let end = (index + WORDS_AFTER + 1).min(words.len());
            (start, end, true)
        }
        None => (0, FALLBACK_WORDS.min(words.len()), false),
    };

    let mut parts = Vec::with_capacity(end - start);
    for word in &words[start..end] {
        if highlight && is_match(word) {
            parts.push(format!(
                "{}{}{}",
                HIGHLIGHT_PREFIX, word, HIGHLIGHT_POSTFIX
            ));
        } else {
            parts.push((*word).to_string());
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn morphology() -> Morphology {
        Morphology::new().unwrap()
    }

    fn lemma_set(morphology: &Morphology, words: &[&str]) -> HashSet<String> {
        words
            .iter()
            .filter_map(|word| morphology.normalize_word(word))
            .collect()
    }

    #[test]
    fn test_snippet_highlights_matched_word() {
        let m = morphology();
        let matched = lemma_set(&m, &["marble"]);
        let snippet = build_snippet(&m, "heavy marble statue", &matched);
        assert_eq!(snippet, "heavy <b>marble</b> statue");
    }

    #[test]
    fn test_snippet_highlights_inflected_form() {
        let m = morphology();
        let matched = lemma_set(&m, &["statue"]);
        let snippet = build_snippet(&m, "three statues stand here", &matched);
        assert!(snippet.contains("<b>statues</b>"));
    }

    #[test]
    fn test_snippet_window_is_bounded() {
        let m = morphology();
        let matched = lemma_set(&m, &["marble"]);

        let mut words: Vec<String> = (0..60).map(|i| format!("filler{:02}", i)).collect();
        words[40] = "marble".to_string();
        let text = words.join(" ");

        let snippet = build_snippet(&m, &text, &matched);
        let snippet_words: Vec<&str> = snippet.split_whitespace().collect();

        assert_eq!(snippet_words.len(), WORDS_BEFORE + 1 + WORDS_AFTER);
        assert_eq!(snippet_words[WORDS_BEFORE], "<b>marble</b>");
        assert_eq!(snippet_words[0], "filler26");
    }

    #[test]
    fn test_snippet_highlights_every_occurrence_in_window() {
        let m = morphology();
        let matched = lemma_set(&m, &["marble"]);
        let snippet = build_snippet(&m, "marble against marble", &matched);
        assert_eq!(snippet, "<b>marble</b> against <b>marble</b>");
    }

    #[test]
    fn test_snippet_falls_back_to_text_start() {
        let m = morphology();
        let matched = lemma_set(&m, &["absent"]);

        let words: Vec<String> = (0..50).map(|i| format!("filler{:02}", i)).collect();
        let snippet = build_snippet(&m, &words.join(" "), &matched);
        let snippet_words: Vec<&str> = snippet.split_whitespace().collect();

        assert_eq!(snippet_words.len(), FALLBACK_WORDS);
        assert_eq!(snippet_words[0], "filler00");
        assert!(!snippet.contains("<b>"));
    }

    #[test]
    fn test_snippet_of_empty_text() {
        let m = morphology();
        let matched = lemma_set(&m, &["marble"]);
        assert_eq!(build_snippet(&m, "", &matched), "");
    }

    #[test]
    fn test_snippet_keeps_punctuation_of_matched_word() {
        let m = morphology();
        let matched = lemma_set(&m, &["marble"]);
        let snippet = build_snippet(&m, "carved from marble, it stands", &matched);
        assert!(snippet.contains("<b>marble,</b>"));
    }

    #[test]
    fn test_window_near_text_start() {
        let m = morphology();
        let matched = lemma_set(&m, &["marble"]);
        let snippet = build_snippet(&m, "marble first then more words", &matched);
        assert!(snippet.starts_with("<b>marble</b>"));
    }
}
