//! # Fuzzy Value Matcher
//!
//! Grounds a predicted WHERE value in the cells of a table. Each strategy
//! is a separate entry point; the caller escalates through them:
//!
//! 1. [`ValueMatcher::match_date`] - question dates against the designated column.
//! 2. [`ValueMatcher::match_in_column`] - substring, numeric equality, then
//!    similarity against the designated column; accepted at
//!    [`MatchOptions::column_accept`]. Below it,
//!    [`ValueMatcher::match_widened`] searches every column, accepted at
//!    [`MatchOptions::widen_accept`].
//! 3. [`ValueMatcher::match_overlap`] - character overlap with the question,
//!    designated column only; always answers when any cell qualifies.
//!
//! Cells consumed by earlier conditions of the same example (the `used`
//! set) are skipped by the similarity and overlap strategies. The date,
//! substring, and numeric strategies may return them again unless
//! [`MatchOptions::uniform_used_exclusion`] is set.
//!
//! Comparisons are case-insensitive; results carry the cell's own text.

use std::borrow::Cow;

use crate::{
    matching::{MatchOptions, char_overlap},
    normalize::{
        NormalizedValue,
        chinese_rendering,
        digit_count,
        extract_integers,
        match_date,
        num2char,
    },
    table::{Cell, Table},
    types::SDHashSet,
};

/// Which strategy produced a [`ValueMatch`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStrategy {
    /// A cell date satisfied a question date.
    Date,

    /// The cell text occurs inside the predicted value.
    Substring,

    /// The cell and the predicted value are equal numbers.
    NumericEqual,

    /// An integer mentioned in the question is the cell's only integer.
    NumberMention,

    /// Best similarity within the designated column.
    Similarity,

    /// Best similarity across all columns.
    WidenedSimilarity,

    /// Best character overlap with the question.
    CharOverlap,
}

impl MatchStrategy {
    /// Does this strategy skip cells in the `used` set?
    pub fn honors_used(
        self,
        uniform: bool,
    ) -> bool {
        uniform
            || matches!(
                self,
                MatchStrategy::Similarity
                    | MatchStrategy::WidenedSimilarity
                    | MatchStrategy::CharOverlap
            )
    }
}

/// A grounded value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValueMatch {
    /// The cell text.
    pub value: String,

    /// Strategy score; `1.0` for the exact strategies.
    pub confidence: f64,

    /// The row of the cell.
    pub row: usize,

    /// The column of the cell.
    pub column: usize,

    /// The strategy that produced the match.
    pub strategy: MatchStrategy,
}

struct Candidate<'a> {
    row: usize,
    cell: &'a Cell,
    text: Cow<'a, str>,
    lower: String,
}

/// Grounds predicted values in table cells.
#[derive(Debug, Clone, Default)]
pub struct ValueMatcher {
    options: MatchOptions,
}

impl ValueMatcher {
    /// Create a matcher.
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    /// The matcher options.
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    fn candidates<'a>(
        &self,
        table: &'a Table,
        column: usize,
    ) -> Vec<Candidate<'a>> {
        table
            .column_cells(column)
            .map(|(row, cell)| {
                let text = cell.text();
                let lower = text.to_lowercase();
                Candidate {
                    row,
                    cell,
                    text,
                    lower,
                }
            })
            .collect()
    }

    fn skip(
        &self,
        strategy: MatchStrategy,
        used: &SDHashSet<String>,
        text: &str,
    ) -> bool {
        strategy.honors_used(self.options.uniform_used_exclusion) && used.contains(text)
    }

    fn found(
        candidate: &Candidate<'_>,
        column: usize,
        confidence: f64,
        strategy: MatchStrategy,
    ) -> ValueMatch {
        ValueMatch {
            value: candidate.text.to_string(),
            confidence,
            row: candidate.row,
            column,
            strategy,
        }
    }

    /// Best similarity of `value` to a cell, or to its Chinese rendering.
    fn cell_similarity(
        &self,
        value: &str,
        candidate: &Candidate<'_>,
    ) -> f64 {
        let kind = self.options.similarity;
        let mut score = kind.score(value, &candidate.lower);
        if candidate.cell.number().is_some()
            && let NormalizedValue::Normalized(rendered) = chinese_rendering(&candidate.text)
        {
            score = score.max(kind.score(value, &rendered));
        }
        score
    }

    /// Strategy 1: a cell date satisfying a date in the question.
    ///
    /// ## Arguments
    /// * `table` - The table.
    /// * `column` - The designated column; rows too short use their last cell.
    /// * `question` - The question text.
    /// * `used` - Cells consumed by earlier conditions.
    pub fn match_date(
        &self,
        table: &Table,
        column: usize,
        question: &str,
        used: &SDHashSet<String>,
    ) -> Option<ValueMatch> {
        let candidates = self.candidates(table, column);
        let cells = candidates
            .iter()
            .filter(|c| !self.skip(MatchStrategy::Date, used, &c.text))
            .map(|c| (c.row, c.text.as_ref()));
        let (row, _) = match_date(question, cells)?;
        let candidate = candidates.iter().find(|c| c.row == row)?;
        Some(Self::found(candidate, column, 1.0, MatchStrategy::Date))
    }

    /// Strategy 2: the best cell of the designated column.
    ///
    /// In order: the first cell whose text occurs inside the value; the
    /// first cell numerically equal to the value; otherwise the most similar
    /// cell (comparing numeric cells by their Chinese rendering too).
    ///
    /// ## Returns
    /// The best candidate whatever its score, or `None` with no candidates.
    /// Callers compare the confidence against [`MatchOptions::column_accept`].
    pub fn match_in_column(
        &self,
        table: &Table,
        column: usize,
        value: &str,
        used: &SDHashSet<String>,
    ) -> Option<ValueMatch> {
        let value = value.replace('两', "二").to_lowercase();
        let value_number = value.trim().parse::<f64>().ok();
        let candidates = self.candidates(table, column);

        for c in &candidates {
            if !c.lower.is_empty()
                && !self.skip(MatchStrategy::Substring, used, &c.text)
                && value.contains(c.lower.as_str())
            {
                return Some(Self::found(c, column, 1.0, MatchStrategy::Substring));
            }
        }

        let mut best: Option<(f64, &Candidate<'_>)> = None;
        for c in &candidates {
            if !self.skip(MatchStrategy::Similarity, used, &c.text) {
                let score = self.cell_similarity(&value, c);
                if best.is_none_or(|(s, _)| score > s) {
                    best = Some((score, c));
                }
            }
            if let (Some(v), Some(n)) = (value_number, c.cell.number())
                && (v - n).abs() < 1e-5
                && !self.skip(MatchStrategy::NumericEqual, used, &c.text)
            {
                return Some(Self::found(c, column, 1.0, MatchStrategy::NumericEqual));
            }
        }

        best.map(|(score, c)| Self::found(c, column, score, MatchStrategy::Similarity))
    }

    /// An integer of the question that is some cell's only integer, or the
    /// Chinese rendering of that integer appearing in the question.
    fn match_number_mention<'c>(
        &self,
        candidates: &'c [Candidate<'c>],
        question: &str,
        used: &SDHashSet<String>,
    ) -> Option<&'c Candidate<'c>> {
        let mentioned = extract_integers(question);
        if mentioned.is_empty() {
            return None;
        }
        candidates.iter().find(|c| {
            if self.skip(MatchStrategy::NumberMention, used, &c.text) {
                return false;
            }
            let ints = extract_integers(&c.text);
            let [n] = ints.as_slice() else {
                return false;
            };
            if mentioned.contains(n) {
                return true;
            }
            if digit_count(*n) >= 10 {
                return false;
            }
            match num2char(&n.to_string()) {
                Ok(rendered) if !rendered.is_empty() => question.contains(&rendered),
                _ => false,
            }
        })
    }

    /// Strategy 2, widened: the best cell of any column.
    ///
    /// The question is stripped of `,` and spaces and rewritten with
    /// [`MatchOptions::synonyms`]. Per column, a number mention wins
    /// outright; otherwise the most similar cell to `value` competes.
    ///
    /// ## Returns
    /// The best match across columns if it reaches
    /// [`MatchOptions::widen_accept`]; else `None`.
    pub fn match_widened(
        &self,
        table: &Table,
        question: &str,
        value: &str,
        used: &SDHashSet<String>,
    ) -> Option<ValueMatch> {
        let cleaned: String = question.chars().filter(|&c| c != ',' && c != ' ').collect();
        let question = self.options.apply_synonyms(&cleaned).to_lowercase();
        let value = value.to_lowercase();

        let mut best: Option<ValueMatch> = None;
        for column in 0..table.num_columns() {
            let candidates = self.candidates(table, column);

            let column_best = match self.match_number_mention(&candidates, &question, used) {
                Some(c) => Some(Self::found(c, column, 1.0, MatchStrategy::NumberMention)),
                None => {
                    let mut column_best: Option<(f64, &Candidate<'_>)> = None;
                    for c in &candidates {
                        if self.skip(MatchStrategy::WidenedSimilarity, used, &c.text) {
                            continue;
                        }
                        let score = self.cell_similarity(&value, c);
                        if column_best.is_none_or(|(s, _)| score > s) {
                            column_best = Some((score, c));
                        }
                    }
                    column_best.map(|(score, c)| {
                        Self::found(c, column, score, MatchStrategy::WidenedSimilarity)
                    })
                }
            };

            if let Some(m) = column_best
                && best.as_ref().is_none_or(|b| m.confidence > b.confidence)
            {
                best = Some(m);
            }
        }

        best.filter(|m| m.confidence >= self.options.widen_accept)
    }

    /// Strategy 3: the cell sharing the most characters with the question.
    ///
    /// Only cells shorter than [`MatchOptions::max_overlap_cell_len`] chars
    /// compete. On a tied score a shorter cell does not displace a longer one.
    ///
    /// ## Returns
    /// The best cell regardless of score, or `None` with no candidates.
    pub fn match_overlap(
        &self,
        table: &Table,
        column: usize,
        question: &str,
        used: &SDHashSet<String>,
    ) -> Option<ValueMatch> {
        let question = question.to_lowercase();
        let candidates = self.candidates(table, column);

        let mut best: Option<(f64, usize, &Candidate<'_>)> = None;
        for c in &candidates {
            if self.skip(MatchStrategy::CharOverlap, used, &c.text) {
                continue;
            }
            let len = c.lower.chars().count();
            if len >= self.options.max_overlap_cell_len {
                continue;
            }
            let Some(score) = char_overlap(&c.lower, &question) else {
                continue;
            };
            match best {
                Some((s, _, _)) if score < s => {}
                Some((s, best_len, _)) if score == s && len < best_len => {}
                _ => best = Some((score, len, c)),
            }
        }

        best.map(|(score, _, c)| Self::found(c, column, score, MatchStrategy::CharOverlap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hash_set_new;

    fn people() -> Table {
        serde_json::from_str(
            r#"{"id": "t", "header": ["name", "age"], "types": ["text", "real"],
                "rows": [["Alice", "30"], ["Bob", "25"]]}"#,
        )
        .unwrap()
    }

    fn shows() -> Table {
        serde_json::from_str(
            r#"{"id": "s", "header": ["节目", "平台", "日期", "播放量"],
                "types": ["text", "text", "text", "real"],
                "rows": [
                    ["快乐大本营", "芒果TV湖南", "2024-03-04", 120],
                    ["奔跑吧", "浙江卫视", "2024-03-05", 98.5],
                    ["王者荣耀", "腾讯视频", "2023-12-31", 3000]
                ]}"#,
        )
        .unwrap()
    }

    fn used_of(values: &[&str]) -> SDHashSet<String> {
        let mut used = hash_set_new();
        for v in values {
            used.insert(v.to_string());
        }
        used
    }

    #[test]
    fn test_match_in_column_substring() {
        let matcher = ValueMatcher::default();
        let m = matcher
            .match_in_column(&people(), 0, "bob", &hash_set_new())
            .unwrap();
        assert_eq!(m.value, "Bob");
        assert_eq!(m.row, 1);
        assert_eq!(m.column, 0);
        assert_eq!(m.confidence, 1.0);
        assert_eq!(m.strategy, MatchStrategy::Substring);
    }

    #[test]
    fn test_match_in_column_numeric_equal() {
        let table: Table = serde_json::from_str(
            r#"{"id": "t", "header": ["score"], "types": ["real"],
                "rows": [["30.0"], ["25.0"]]}"#,
        )
        .unwrap();
        let m = ValueMatcher::default()
            .match_in_column(&table, 0, "25", &hash_set_new())
            .unwrap();
        assert_eq!(m.value, "25.0");
        assert_eq!(m.row, 1);
        assert_eq!(m.strategy, MatchStrategy::NumericEqual);
    }

    #[test]
    fn test_match_in_column_chinese_rendering() {
        let matcher = ValueMatcher::default();
        let m = matcher
            .match_in_column(&shows(), 3, "三千", &hash_set_new())
            .unwrap();
        assert_eq!(m.value, "3000");
        assert_eq!(m.row, 2);
        assert_eq!(m.strategy, MatchStrategy::Similarity);
        assert!(m.confidence >= 0.3);
    }

    #[test]
    fn test_match_in_column_similarity_skips_used() {
        let matcher = ValueMatcher::default();
        let m = matcher
            .match_in_column(&people(), 0, "alicia", &hash_set_new())
            .unwrap();
        assert_eq!(m.value, "Alice");

        let m = matcher
            .match_in_column(&people(), 0, "alicia", &used_of(&["Alice"]))
            .unwrap();
        assert_eq!(m.value, "Bob");
        assert!(m.confidence < 0.3);
    }

    #[test]
    fn test_substring_may_repeat_used() {
        let table = people();
        let used = used_of(&["Bob"]);

        let m = ValueMatcher::default()
            .match_in_column(&table, 0, "bob", &used)
            .unwrap();
        assert_eq!(m.value, "Bob");

        let strict = ValueMatcher::new(MatchOptions::default().with_uniform_used_exclusion(true));
        let m = strict.match_in_column(&table, 0, "bob", &used).unwrap();
        assert_eq!(m.value, "Alice");
        assert_eq!(m.strategy, MatchStrategy::Similarity);
    }

    #[test]
    fn test_match_date() {
        let matcher = ValueMatcher::default();
        let m = matcher
            .match_date(&shows(), 2, "2024年3月5日播出的节目", &hash_set_new())
            .unwrap();
        assert_eq!(m.value, "2024-03-05");
        assert_eq!(m.row, 1);
        assert_eq!(m.strategy, MatchStrategy::Date);

        assert!(matcher
            .match_date(&shows(), 2, "是3月9日播出的", &hash_set_new())
            .is_none());
    }

    #[test]
    fn test_match_widened_synonym_and_column_change() {
        let matcher = ValueMatcher::default();
        let m = matcher
            .match_widened(&shows(), "鹅的节目", "腾讯视频", &hash_set_new())
            .unwrap();
        assert_eq!(m.value, "腾讯视频");
        assert_eq!(m.column, 1);
        assert_eq!(m.strategy, MatchStrategy::WidenedSimilarity);
    }

    #[test]
    fn test_match_widened_number_mention() {
        let matcher = ValueMatcher::default();
        let m = matcher
            .match_widened(&shows(), "播放量是3,000的节目", "xyz", &hash_set_new())
            .unwrap();
        assert_eq!(m.value, "3000");
        assert_eq!(m.column, 3);
        assert_eq!(m.strategy, MatchStrategy::NumberMention);
    }

    #[test]
    fn test_match_widened_rejects_low_scores() {
        let matcher = ValueMatcher::default();
        assert!(matcher
            .match_widened(&people(), "who", "zzzz", &hash_set_new())
            .is_none());
    }

    #[test]
    fn test_match_overlap() {
        let matcher = ValueMatcher::default();
        let m = matcher
            .match_overlap(&shows(), 0, "奔跑的节目有哪些", &hash_set_new())
            .unwrap();
        assert_eq!(m.value, "奔跑吧");
        assert_eq!(m.strategy, MatchStrategy::CharOverlap);
        assert!((m.confidence - 2.0 / 3.0).abs() < 1e-9);

        let m = matcher
            .match_overlap(&shows(), 0, "奔跑的节目有哪些", &used_of(&["奔跑吧"]))
            .unwrap();
        assert_ne!(m.value, "奔跑吧");
    }

    #[test]
    fn test_match_overlap_tie_keeps_longer() {
        let table: Table = serde_json::from_str(
            r#"{"id": "t", "header": ["x"], "types": ["text"],
                "rows": [["ab"], ["a"], ["ba"]]}"#,
        )
        .unwrap();
        let m = ValueMatcher::default()
            .match_overlap(&table, 0, "ab", &hash_set_new())
            .unwrap();
        // "ab" and "ba" tie at 1.0 with equal length; the later one wins.
        assert_eq!(m.value, "ba");
        assert_eq!(m.row, 2);
    }

    #[test]
    fn test_match_overlap_length_bound() {
        let table: Table = serde_json::from_str(
            r#"{"id": "t", "header": ["x"], "types": ["text"],
                "rows": [["abcdefghijklmnopqrstuvwxyz"]]}"#,
        )
        .unwrap();
        assert!(ValueMatcher::default()
            .match_overlap(&table, 0, "abc", &hash_set_new())
            .is_none());
    }

    #[test]
    fn test_empty_table() {
        let table: Table =
            serde_json::from_str(r#"{"id": "t", "header": ["x"], "types": ["text"]}"#).unwrap();
        let matcher = ValueMatcher::default();
        let used = hash_set_new();
        assert!(matcher.match_date(&table, 0, "2024年3月5日", &used).is_none());
        assert!(matcher.match_in_column(&table, 0, "a", &used).is_none());
        assert!(matcher.match_widened(&table, "a", "a", &used).is_none());
        assert!(matcher.match_overlap(&table, 0, "a", &used).is_none());
    }
}
