//! Lemmatization pipeline for Russian and English text
//!
//! Reduces raw page text to the lemma counts the index stores and the
//! lemma sequences the search engine matches on:
//!
//! - Lowercases and strips residual markup before tokenizing
//! - Keeps Cyrillic and Latin letters, treating everything else as a
//!   separator
//! - Drops tokens shorter than three letters, tokens mixing alphabets,
//!   and closed-class words (conjunctions, prepositions, particles,
//!   pronouns, interjections)
//! - Maps each surviving token to its lemma with a Snowball stemmer for
//!   the token's language

mod language;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub use language::Language;

/// Shortest token the index keeps, in letters
const MIN_TOKEN_LEN: usize = 3;

/// Errors raised while building the lemmatizer
#[derive(Debug, Error)]
pub enum MorphologyError {
    #[error("Failed to compile markup pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Bilingual lemmatizer shared by the indexing and search paths
///
/// Construction loads both stemmers and the closed-class word lists; a
/// failure here is fatal for the process, so callers build one instance
/// at startup and share it behind an `Arc`.
pub struct Morphology {
    tag_pattern: Regex,
    russian_stemmer: Stemmer,
    english_stemmer: Stemmer,
    russian_closed_class: HashSet<&'static str>,
    english_closed_class: HashSet<&'static str>,
}

impl Morphology {
    /// Creates a lemmatizer with both language analyzers loaded
    pub fn new() -> Result<Self, MorphologyError> {
        Ok(Self {
            tag_pattern: Regex::new(r"<[^>]*>")?,
            russian_stemmer: Stemmer::create(Algorithm::Russian),
            english_stemmer: Stemmer::create(Algorithm::English),
            russian_closed_class: language::RUSSIAN_CLOSED_CLASS.iter().copied().collect(),
            english_closed_class: language::ENGLISH_CLOSED_CLASS.iter().copied().collect(),
        })
    }

    /// Collects lemma occurrence counts for a page text
    ///
    /// This is the indexing entry point: every lemma maps to the number
    /// of times its surface forms appear in the text.
    pub fn lemma_counts(&self, text: &str) -> HashMap<String, i64> {
        let mut counts = HashMap::new();
        for token in self.tokens(text) {
            if let Some(lemma) = self.normalize_token(&token) {
                *counts.entry(lemma).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Lemmatizes a text into an ordered sequence, duplicates kept
    ///
    /// Used for query terms, where the caller decides how to treat
    /// repeats.
    pub fn lemma_sequence(&self, text: &str) -> Vec<String> {
        self.tokens(text)
            .iter()
            .filter_map(|token| self.normalize_token(token))
            .collect()
    }

    /// Lemmatizes a single display word, punctuation and all
    ///
    /// Returns `None` when nothing indexable remains, e.g. for
    /// closed-class words or bare punctuation. Snippet highlighting uses
    /// this to decide whether a word of page text matches a query lemma.
    pub fn normalize_word(&self, word: &str) -> Option<String> {
        self.tokens(word)
            .iter()
            .find_map(|token| self.normalize_token(token))
    }

    /// Splits a text into lowercase letters-only tokens
    fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let without_tags = self.tag_pattern.replace_all(&lowered, " ");
        let letters_only: String = without_tags
            .chars()
            .map(|c| {
                if language::is_cyrillic_letter(c) || c.is_ascii_alphabetic() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        letters_only
            .split_whitespace()
            .map(|token| token.to_string())
            .collect()
    }

    /// Maps one clean token to its lemma, or `None` if it is dropped
    fn normalize_token(&self, token: &str) -> Option<String> {
        if token.chars().count() < MIN_TOKEN_LEN {
            return None;
        }

        let (stemmer, closed_class) = match language::classify(token)? {
            Language::Russian => (&self.russian_stemmer, &self.russian_closed_class),
            Language::English => (&self.english_stemmer, &self.english_closed_class),
        };

        if closed_class.contains(token) {
            return None;
        }

        let lemma = stemmer.stem(token);
        if lemma.is_empty() {
            None
        } else {
            Some(lemma.into_owned())
        }
    }
}
