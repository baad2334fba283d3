//! Core engine: platform-agnostic ranking of catalog entries.

pub mod search;

pub use search::{debug_score, filter, score_entries, MatchKind, ScoredEntry};
