//! # String Similarity
//!
//! Character-level similarity scores in `[0, 1]`.

use similar::TextDiff;

use crate::types::{SDHashMap, hash_map_new};

/// Which similarity the fuzzy matcher ranks candidates by.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SimilarityKind {
    /// Longest-common-subsequence ratio: `2 * matched / (|a| + |b|)` over an
    /// optimal character alignment.
    #[default]
    Lcs,

    /// Order-free upper bound: `2 * |multiset(a) & multiset(b)| / (|a| + |b|)`.
    QuickRatio,
}

impl SimilarityKind {
    /// Score two strings.
    pub fn score(
        self,
        a: &str,
        b: &str,
    ) -> f64 {
        match self {
            SimilarityKind::Lcs => lcs_ratio(a, b),
            SimilarityKind::QuickRatio => quick_ratio(a, b),
        }
    }
}

/// The longest-common-subsequence ratio of two strings.
///
/// Symmetric; `1.0` for two empty strings.
pub fn lcs_ratio(
    a: &str,
    b: &str,
) -> f64 {
    TextDiff::from_chars(a, b).ratio() as f64
}

/// The multiset character-overlap ratio of two strings.
///
/// Symmetric; `1.0` for two empty strings.
pub fn quick_ratio(
    a: &str,
    b: &str,
) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut avail: SDHashMap<char, usize> = hash_map_new();
    for c in b.chars() {
        *avail.entry(c).or_default() += 1;
    }
    let mut matches = 0;
    for c in a.chars() {
        if let Some(n) = avail.get_mut(&c)
            && *n > 0
        {
            *n -= 1;
            matches += 1;
        }
    }
    2.0 * matches as f64 / total as f64
}

/// The share of `cell` characters that occur anywhere in `text`.
///
/// `None` for an empty cell.
pub fn char_overlap(
    cell: &str,
    text: &str,
) -> Option<f64> {
    let len = cell.chars().count();
    if len == 0 {
        return None;
    }
    let found = cell.chars().filter(|&c| text.contains(c)).count();
    Some(found as f64 / len as f64)
}
