//! Ranked search over the lemma index
//!
//! This module answers queries against whatever the crawler has stored
//! so far:
//! - Query lemmatization and site-specific stop-word exclusion
//! - Rarest-first boolean AND intersection of posting sets
//! - Relative relevance ranking with offset/limit pagination
//! - Title and highlighted snippet extraction per result

mod engine;
mod snippet;

pub use engine::{SearchEngine, SearchOutcome, SearchResult};
