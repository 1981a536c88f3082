//! # Query Assembly
//!
//! Replaces the value spans of a decoded query with value text.
//!
//! For operators in [`MatchOptions::grounded_ops`] the span text is
//! grounded in the table through the [`ValueMatcher`] tiers:
//! date, designated column, all columns, then character overlap. Other
//! operators take the span text with Chinese numerals normalized.
//!
//! Conditions are processed in order and share one `used` set, so a cell
//! chosen for an earlier condition is not re-chosen by the strategies
//! that honor it.
//!
//! [`MatchOptions::grounded_ops`]: crate::matching::MatchOptions::grounded_ops

use crate::{
    alignment::{CONTINUATION_PREFIX, span_text},
    decoders::DEFAULT_SENTINEL_NULL_VALUE,
    errors::{SDResult, SqlDecodeError},
    matching::{ValueMatch, ValueMatcher},
    normalize::normalize_chinese_number,
    query::{CondValue, Condition, StructuredQuery},
    table::Table,
    types::{SDHashSet, hash_set_new},
};

/// How one condition got its value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConditionGrounding {
    /// The condition slot in the decoded query.
    pub slot: usize,

    /// The merged span text; `None` for a literal value.
    pub span_text: Option<String>,

    /// The cell the value was grounded in, if any.
    pub matched: Option<ValueMatch>,

    /// The final value.
    pub value: String,

    /// Was the condition dropped as a duplicate?
    pub duplicate: bool,
}

/// An assembled query and how each condition value was found.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Assembly {
    /// The query with textual condition values.
    pub query: StructuredQuery,

    /// One record per decoded condition slot.
    pub grounding: Vec<ConditionGrounding>,
}

/// Assembles decoded queries into textual queries.
#[derive(Debug, Clone)]
pub struct QueryAssembler {
    matcher: ValueMatcher,
    continuation_prefix: String,
    sentinel_null_value: String,
}

impl Default for QueryAssembler {
    fn default() -> Self {
        Self::new(ValueMatcher::default())
    }
}

impl QueryAssembler {
    /// Create an assembler around a matcher.
    pub fn new(matcher: ValueMatcher) -> Self {
        Self {
            matcher,
            continuation_prefix: CONTINUATION_PREFIX.to_string(),
            sentinel_null_value: DEFAULT_SENTINEL_NULL_VALUE.to_string(),
        }
    }

    /// Set the sub-word continuation prefix and return the builder.
    pub fn with_continuation_prefix<S: Into<String>>(
        mut self,
        prefix: S,
    ) -> Self {
        self.continuation_prefix = prefix.into();
        self
    }

    /// Set the "no filter" condition value and return the builder.
    pub fn with_sentinel_null_value<S: Into<String>>(
        mut self,
        value: S,
    ) -> Self {
        self.sentinel_null_value = value.into();
        self
    }

    /// The value matcher.
    pub fn matcher(&self) -> &ValueMatcher {
        &self.matcher
    }

    /// Ground a value through the matcher tiers.
    fn ground(
        &self,
        table: &Table,
        column: usize,
        question: &str,
        value: &str,
        used: &SDHashSet<String>,
    ) -> Option<ValueMatch> {
        let matcher = &self.matcher;
        if let Some(m) = matcher.match_date(table, column, question, used) {
            return Some(m);
        }
        if let Some(m) = matcher.match_in_column(table, column, value, used)
            && m.confidence >= matcher.options().column_accept()
        {
            return Some(m);
        }
        if let Some(m) = matcher.match_widened(table, question, value, used) {
            return Some(m);
        }
        matcher.match_overlap(table, column, question, used)
    }

    /// Assemble one decoded query.
    ///
    /// ## Arguments
    /// * `decoded` - The decoded query; span values index `question_pieces`.
    /// * `question` - The question text.
    /// * `question_pieces` - The question's sub-word pieces.
    /// * `table` - The example's table.
    ///
    /// ## Returns
    /// The assembly, or [`SqlDecodeError::InvalidSpan`] for a span outside
    /// the question pieces.
    pub fn assemble(
        &self,
        decoded: &StructuredQuery,
        question: &str,
        question_pieces: &[String],
        table: &Table,
    ) -> SDResult<Assembly> {
        let mut used: SDHashSet<String> = hash_set_new();
        let mut conds: Vec<Condition> = Vec::with_capacity(decoded.conds.len());
        let mut grounding = Vec::with_capacity(decoded.conds.len());

        for (slot, cond) in decoded.conds.iter().enumerate() {
            let mut column = cond.column;
            let (raw, matched, value) = match &cond.value {
                CondValue::Text(text) => (None, None, text.clone()),
                CondValue::Span(span) => {
                    let raw = span_text(question_pieces, *span, &self.continuation_prefix)?.text;
                    if self.matcher.options().is_grounded(cond.op) {
                        let matched = self.ground(table, column, question, &raw, &used);
                        let value = match &matched {
                            Some(m) => {
                                column = m.column;
                                m.value.clone()
                            }
                            None => raw.clone(),
                        };
                        log::debug!(
                            "condition {slot}: {raw:?} -> {value:?} via {:?}",
                            matched.as_ref().map(|m| m.strategy)
                        );
                        (Some(raw), matched, value)
                    } else {
                        let value = normalize_chinese_number(&raw).or_raw(&raw);
                        (Some(raw), None, value)
                    }
                }
            };

            used.insert(value.clone());
            let assembled = Condition::new(column, cond.op, value.as_str());
            let duplicate = conds.contains(&assembled);
            if !duplicate {
                conds.push(assembled);
            }
            grounding.push(ConditionGrounding {
                slot,
                span_text: raw,
                matched,
                value,
                duplicate,
            });
        }

        let mut query = StructuredQuery {
            sel: decoded.sel.clone(),
            agg: decoded.agg.clone(),
            cond_conn_op: decoded.cond_conn_op,
            conds,
        };
        query.normalize_degenerate(table.sentinel_column(), &self.sentinel_null_value);
        query.sort_conditions();

        Ok(Assembly { query, grounding })
    }

    /// Assemble with span values required.
    ///
    /// ## Returns
    /// As [`QueryAssembler::assemble`], or
    /// [`SqlDecodeError::MissingValueSpan`] if a condition other than the
    /// "no filter" condition carries a literal value.
    pub fn assemble_strict(
        &self,
        decoded: &StructuredQuery,
        question: &str,
        question_pieces: &[String],
        table: &Table,
    ) -> SDResult<Assembly> {
        let sentinel = table.sentinel_column();
        if let Some(slot) = decoded
            .conds
            .iter()
            .position(|c| c.column != sentinel && c.value.as_span().is_none())
        {
            return Err(SqlDecodeError::MissingValueSpan { slot });
        }
        self.assemble(decoded, question, question_pieces, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        matching::{MatchOptions, MatchStrategy},
        query::{AggOp, CondConn, CondOp},
        types::TokenSpan,
    };

    fn people() -> Table {
        serde_json::from_str(
            r#"{"id": "t", "header": ["name", "age"], "types": ["text", "real"],
                "rows": [["Alice", "30"], ["Bob", "25"], ["Carol", "30"]]}"#,
        )
        .unwrap()
    }

    fn pieces(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn decoded(
        conds: Vec<Condition>,
        conn: CondConn,
    ) -> StructuredQuery {
        StructuredQuery {
            sel: vec![1],
            agg: vec![AggOp::None],
            cond_conn_op: conn,
            conds,
        }
    }

    #[test]
    fn test_grounds_equality_value() {
        let q = decoded(
            vec![Condition::new(0, CondOp::Eq, TokenSpan::new(3, 3))],
            CondConn::None,
        );
        let a = QueryAssembler::default()
            .assemble(
                &q,
                "how old is bob",
                &pieces(&["how", "old", "is", "bob"]),
                &people(),
            )
            .unwrap();

        assert_eq!(a.query.conds, vec![Condition::new(0, CondOp::Eq, "Bob")]);
        let m = a.grounding[0].matched.as_ref().unwrap();
        assert_eq!(m.row, 1);
        assert_eq!(m.strategy, MatchStrategy::Substring);
        assert_eq!(a.grounding[0].span_text.as_deref(), Some("bob"));
    }

    #[test]
    fn test_comparison_value_normalizes_numerals() {
        let q = decoded(
            vec![Condition::new(1, CondOp::Gt, TokenSpan::new(1, 2))],
            CondConn::None,
        );
        let a = QueryAssembler::default()
            .assemble(&q, "大于三十岁", &pieces(&["大", "三", "十", "岁"]), &people())
            .unwrap();
        assert_eq!(a.query.conds, vec![Condition::new(1, CondOp::Gt, "30")]);
        assert!(a.grounding[0].matched.is_none());
    }

    #[test]
    fn test_comparison_value_keeps_raw_text() {
        let q = decoded(
            vec![Condition::new(1, CondOp::Lt, TokenSpan::new(0, 0))],
            CondConn::None,
        );
        let a = QueryAssembler::default()
            .assemble(&q, "25 or less", &pieces(&["25", "or", "less"]), &people())
            .unwrap();
        assert_eq!(a.query.conds[0].value, CondValue::from("25"));
    }

    #[test]
    fn test_duplicates_dropped_and_connector_cleared() {
        let q = decoded(
            vec![
                Condition::new(0, CondOp::Eq, TokenSpan::new(0, 0)),
                Condition::new(0, CondOp::Eq, TokenSpan::new(0, 0)),
            ],
            CondConn::And,
        );
        let a = QueryAssembler::default()
            .assemble(&q, "bob", &pieces(&["bob"]), &people())
            .unwrap();
        assert_eq!(a.query.conds, vec![Condition::new(0, CondOp::Eq, "Bob")]);
        assert_eq!(a.query.cond_conn_op, CondConn::None);
        assert!(a.grounding[1].duplicate);
    }

    #[test]
    fn test_used_cells_skipped_by_similarity() {
        let options = MatchOptions::default().with_column_accept(0.0);
        let assembler = QueryAssembler::new(ValueMatcher::new(options));
        let q = decoded(
            vec![
                Condition::new(0, CondOp::Eq, TokenSpan::new(0, 0)),
                Condition::new(0, CondOp::Ne, TokenSpan::new(0, 0)),
            ],
            CondConn::Or,
        );
        let a = assembler
            .assemble(&q, "alicx", &pieces(&["alicx"]), &people())
            .unwrap();
        let values: Vec<&str> = a
            .query
            .conds
            .iter()
            .filter_map(|c| c.value.as_text())
            .collect();
        assert_eq!(values[0], "Alice");
        assert_ne!(values[1], "Alice");
    }

    #[test]
    fn test_sentinel_condition_kept() {
        let q = decoded(
            vec![Condition::new(2, CondOp::Eq, "Null")],
            CondConn::None,
        );
        let a = QueryAssembler::default()
            .assemble(&q, "list names", &pieces(&["list", "names"]), &people())
            .unwrap();
        assert_eq!(a.query.conds, vec![Condition::new(2, CondOp::Eq, "Null")]);
        assert_eq!(a.grounding[0].span_text, None);
    }

    #[test]
    fn test_invalid_span() {
        let q = decoded(
            vec![Condition::new(0, CondOp::Eq, TokenSpan::new(2, 5))],
            CondConn::None,
        );
        assert!(matches!(
            QueryAssembler::default().assemble(&q, "bob", &pieces(&["bob"]), &people()),
            Err(SqlDecodeError::InvalidSpan { .. })
        ));
    }

    #[test]
    fn test_assemble_strict() {
        let q = decoded(vec![Condition::new(0, CondOp::Eq, "Bob")], CondConn::None);
        assert!(matches!(
            QueryAssembler::default().assemble_strict(&q, "bob", &pieces(&["bob"]), &people()),
            Err(SqlDecodeError::MissingValueSpan { slot: 0 })
        ));
    }
}
