//! Ranking of catalog entries against a typed query.
//!
//! Each application is scored in tiers, first match wins:
//! name substring, exec substring, name subsequence, exec subsequence.
//! Positions and lengths count chars, not bytes.

use std::cmp::Ordering;
use std::fmt;

use crate::platform::Application;

const NAME_SUBSTRING_BASE: i64 = 2000;
const EXEC_SUBSTRING_BASE: i64 = 1500;
const NAME_FUZZY_BASE: i64 = 1000;
const EXEC_FUZZY_BASE: i64 = 800;

/// Which tier produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    NameSubstring,
    ExecSubstring,
    NameFuzzy,
    ExecFuzzy,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::NameSubstring => "name-substring",
            MatchKind::ExecSubstring => "exec-substring",
            MatchKind::NameFuzzy => "name-fuzzy",
            MatchKind::ExecFuzzy => "exec-fuzzy",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An application paired with its score for one query.
#[derive(Debug, Clone, Copy)]
pub struct ScoredEntry<'a> {
    pub app: &'a Application,
    pub score: i64,
    pub kind: MatchKind,
}

/// Char index of the first occurrence of `needle` in `haystack`.
fn char_find(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte_idx| haystack[..byte_idx].chars().count())
}

/// Score `candidate` as a subsequence match of `query`.
///
/// Both inputs are expected lowercased. `None` when either is empty or not
/// every query char is matched in order.
pub fn subsequence_score(query: &str, candidate: &str) -> Option<i64> {
    let query: Vec<char> = query.chars().collect();
    if query.is_empty() || candidate.is_empty() {
        return None;
    }

    let mut matched = 0;
    let mut points: i64 = 0;
    let mut last_match: i64 = -1;
    let mut candidate_len: i64 = 0;

    for (idx, c) in candidate.chars().enumerate() {
        candidate_len += 1;
        if matched == query.len() || c != query[matched] {
            continue;
        }

        let idx = idx as i64;
        points += 5;
        if last_match == idx - 1 {
            points += 10;
        }
        if matched == 0 {
            points += (15 - idx * 2).max(0);
        }
        last_match = idx;
        matched += 1;
    }

    (matched == query.len()).then_some(points - candidate_len)
}

/// Score one application against an already trimmed, lowercased query.
pub fn score_application(app: &Application, query: &str) -> Option<(MatchKind, i64)> {
    let name = app.name.to_lowercase();
    let exec = app.exec.to_lowercase();
    let len = |s: &str| s.chars().count() as i64;

    let (kind, score) = if let Some(idx) = char_find(&name, query) {
        (
            MatchKind::NameSubstring,
            NAME_SUBSTRING_BASE - 20 * idx as i64 - len(&name),
        )
    } else if let Some(idx) = char_find(&exec, query) {
        (
            MatchKind::ExecSubstring,
            EXEC_SUBSTRING_BASE - 20 * idx as i64 - len(&exec),
        )
    } else if let Some(points) = subsequence_score(query, &name) {
        (MatchKind::NameFuzzy, NAME_FUZZY_BASE + points)
    } else if let Some(points) = subsequence_score(query, &exec) {
        (MatchKind::ExecFuzzy, EXEC_FUZZY_BASE + points)
    } else {
        return None;
    };

    Some((kind, score))
}

fn rank(a: &ScoredEntry<'_>, b: &ScoredEntry<'_>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.app.name.to_lowercase().cmp(&b.app.name.to_lowercase()))
        .then_with(|| a.app.name.cmp(&b.app.name))
}

fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Every application with a positive score, best first.
pub fn score_entries<'a>(apps: &'a [Application], query: &str) -> Vec<ScoredEntry<'a>> {
    let Some(query) = normalize_query(query) else {
        return Vec::new();
    };

    let mut entries: Vec<ScoredEntry<'a>> = apps
        .iter()
        .filter_map(|app| {
            score_application(app, &query)
                .filter(|(_, score)| *score > 0)
                .map(|(kind, score)| ScoredEntry { app, score, kind })
        })
        .collect();

    entries.sort_by(rank);
    entries
}

/// Applications matching `query`, ranked. A blank query matches nothing.
pub fn filter(apps: &[Application], query: &str) -> Vec<Application> {
    score_entries(apps, query)
        .into_iter()
        .map(|entry| entry.app.clone())
        .collect()
}

/// How `app` scores for `query`, for diagnostics.
pub fn debug_score(app: &Application, query: &str) -> Option<(MatchKind, i64)> {
    let query = normalize_query(query)?;
    score_application(app, &query)
}
