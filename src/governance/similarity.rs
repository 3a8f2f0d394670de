//! Word-set similarity between artifact descriptions.
//!
//! Deliberately order-insensitive and duplicate-insensitive: both sides are
//! reduced to sets of normalized words and scored by Jaccard overlap. Good
//! enough to catch "Send Slack Alert" vs "Slack Disk Alert" without any
//! embedding machinery.

use crate::governance::phase::Phase;
use crate::governance::registry::GovernanceDoc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Minimum score for a stored artifact to count as a match.
pub const SIMILARITY_FLOOR: u32 = 30;

/// Score at or above which create advisories recommend cloning.
pub const STRONG_MATCH: u32 = 70;

fn word_set(text: &str) -> BTreeSet<String> {
    // Punctuation is deleted in place, not turned into a token boundary:
    // "Send-Slack_Alert" normalizes to the single word "sendslackalert".
    let normalized: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    normalized
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(|w| w.to_string())
        .collect()
}

/// Jaccard similarity over word sets, as an integer percentage in `[0,100]`.
/// Either side empty (after normalization and short-token filtering) scores 0.
pub fn similarity(a: &str, b: &str) -> u32 {
    let words_a = word_set(a);
    let words_b = word_set(b);

    if words_a.is_empty() || words_b.is_empty() {
        return 0;
    }

    let intersection = words_a.intersection(&words_b).count() as f64;
    let union = words_a.union(&words_b).count() as f64;

    (100.0 * intersection / union).round() as u32
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SimilarMatch {
    pub id: String,
    pub name: String,
    pub phase: Phase,
    pub similarity: u32,
}

/// Rank stored artifacts against a candidate text.
///
/// Returns matches scoring at least [`SIMILARITY_FLOOR`], sorted descending
/// by score. Ties keep store iteration order, i.e. lexicographic artifact id
/// (the document map is a `BTreeMap`).
pub fn find_similar(query: &str, doc: &GovernanceDoc) -> Vec<SimilarMatch> {
    let mut matches: Vec<SimilarMatch> = doc
        .artifacts
        .iter()
        .filter_map(|(id, record)| {
            let score = similarity(query, &record.search_text());
            (score >= SIMILARITY_FLOOR).then(|| SimilarMatch {
                id: id.clone(),
                name: record.name.clone(),
                phase: record.phase,
                similarity: score,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.similarity.cmp(&a.similarity));
    matches
}
