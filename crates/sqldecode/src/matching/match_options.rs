//! # Value Matcher Options

use crate::{matching::SimilarityKind, query::CondOp};

/// Default acceptance threshold for the designated-column search.
pub const DEFAULT_COLUMN_ACCEPT: f64 = 0.3;

/// Default acceptance threshold for the all-columns search.
pub const DEFAULT_WIDEN_ACCEPT: f64 = 0.5;

/// Default bound (exclusive, in chars) on cells the overlap search considers.
pub const DEFAULT_MAX_OVERLAP_CELL_LEN: usize = 20;

/// The fixed domain rewrites applied to the question before the
/// all-columns search.
pub fn default_synonyms() -> Vec<(String, String)> {
    vec![
        ("湖南".to_string(), "芒果TV湖南".to_string()),
        ("鹅".to_string(), "腾讯".to_string()),
    ]
}

fn default_grounded_ops() -> Vec<CondOp> {
    vec![CondOp::Eq, CondOp::Ne]
}

/// Options for configuring a [`crate::matching::ValueMatcher`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// The designated-column search is accepted at or above this score;
    /// below it, the search widens to every column.
    pub column_accept: f64,

    /// The all-columns search is accepted at or above this score.
    pub widen_accept: f64,

    /// The overlap search ignores cells this long or longer.
    pub max_overlap_cell_len: usize,

    /// The similarity used to rank candidates.
    pub similarity: SimilarityKind,

    /// Apply the used-cell exclusion to every strategy.
    ///
    /// When off, the date, substring, and numeric strategies may return a
    /// cell already consumed by an earlier condition of the same example.
    pub uniform_used_exclusion: bool,

    /// Operators whose values are grounded in table cells.
    ///
    /// Values of other operators go through numeral normalization instead.
    pub grounded_ops: Vec<CondOp>,

    /// `(from, to)` rewrites applied to the question before the
    /// all-columns search.
    pub synonyms: Vec<(String, String)>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            column_accept: DEFAULT_COLUMN_ACCEPT,
            widen_accept: DEFAULT_WIDEN_ACCEPT,
            max_overlap_cell_len: DEFAULT_MAX_OVERLAP_CELL_LEN,
            similarity: SimilarityKind::default(),
            uniform_used_exclusion: false,
            grounded_ops: default_grounded_ops(),
            synonyms: default_synonyms(),
        }
    }
}

impl MatchOptions {
    /// Get the designated-column acceptance threshold.
    pub fn column_accept(&self) -> f64 {
        self.column_accept
    }

    /// Set the designated-column acceptance threshold.
    pub fn set_column_accept(
        &mut self,
        column_accept: f64,
    ) {
        self.column_accept = column_accept;
    }

    /// Set the designated-column acceptance threshold and return the builder.
    pub fn with_column_accept(
        mut self,
        column_accept: f64,
    ) -> Self {
        self.set_column_accept(column_accept);
        self
    }

    /// Get the all-columns acceptance threshold.
    pub fn widen_accept(&self) -> f64 {
        self.widen_accept
    }

    /// Set the all-columns acceptance threshold.
    pub fn set_widen_accept(
        &mut self,
        widen_accept: f64,
    ) {
        self.widen_accept = widen_accept;
    }

    /// Set the all-columns acceptance threshold and return the builder.
    pub fn with_widen_accept(
        mut self,
        widen_accept: f64,
    ) -> Self {
        self.set_widen_accept(widen_accept);
        self
    }

    /// Get the configured [`SimilarityKind`].
    pub fn similarity(&self) -> SimilarityKind {
        self.similarity
    }

    /// Set the configured [`SimilarityKind`].
    pub fn set_similarity(
        &mut self,
        similarity: SimilarityKind,
    ) {
        self.similarity = similarity;
    }

    /// Set the configured [`SimilarityKind`] and return the builder.
    pub fn with_similarity(
        mut self,
        similarity: SimilarityKind,
    ) -> Self {
        self.set_similarity(similarity);
        self
    }

    /// Is the used-cell exclusion applied to every strategy?
    pub fn uniform_used_exclusion(&self) -> bool {
        self.uniform_used_exclusion
    }

    /// Set whether the used-cell exclusion applies to every strategy.
    pub fn set_uniform_used_exclusion(
        &mut self,
        uniform_used_exclusion: bool,
    ) {
        self.uniform_used_exclusion = uniform_used_exclusion;
    }

    /// Set whether the used-cell exclusion applies to every strategy and return the builder.
    pub fn with_uniform_used_exclusion(
        mut self,
        uniform_used_exclusion: bool,
    ) -> Self {
        self.set_uniform_used_exclusion(uniform_used_exclusion);
        self
    }

    /// Is a condition with this operator grounded in table cells?
    pub fn is_grounded(
        &self,
        op: CondOp,
    ) -> bool {
        self.grounded_ops.contains(&op)
    }

    /// Set the grounded operators and return the builder.
    pub fn with_grounded_ops<I>(
        mut self,
        ops: I,
    ) -> Self
    where
        I: IntoIterator<Item = CondOp>,
    {
        self.grounded_ops = ops.into_iter().collect();
        self
    }

    /// Apply the synonym rewrites to a text.
    pub fn apply_synonyms(
        &self,
        text: &str,
    ) -> String {
        self.synonyms
            .iter()
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
    }
}
