//! # Fuzzy Value Matching
//!
//! * [`ValueMatcher`] - grounds predicted values in table cells.
//! * [`MatchOptions`] - thresholds, similarity choice, and domain rewrites.
//! * [`similarity`] - the string similarities ranked by.

pub mod match_options;
pub mod similarity;
pub mod value_matcher;

pub use match_options::MatchOptions;
pub use similarity::{SimilarityKind, char_overlap, lcs_ratio, quick_ratio};
pub use value_matcher::{MatchStrategy, ValueMatch, ValueMatcher};
