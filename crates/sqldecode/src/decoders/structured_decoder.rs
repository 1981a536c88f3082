//! # Structured Decoder
//!
//! Turns one example's [`ExampleScores`] into a [`StructuredQuery`] whose
//! condition values are still question spans.

use crate::{
    decoders::{
        DecodeOptions,
        ExampleScores,
        FieldProbabilities,
        QueryProbability,
        decode_restricted,
        decode_single,
        decode_span,
        decode_top_k,
        sigmoid,
        softmax,
    },
    errors::{SDResult, SqlDecodeError},
    query::{AggOp, CondConn, CondOp, Condition, StructuredQuery},
};

/// A decoded example.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecodedExample {
    /// The query; condition values are spans over the question pieces,
    /// except the "no filter" condition, which carries its null value.
    pub query: StructuredQuery,

    /// Unrounded probabilities of each decoded choice.
    pub probabilities: FieldProbabilities,
}

impl DecodedExample {
    /// The reported per-field confidences, rounded to 3 places.
    pub fn confidences(&self) -> FieldProbabilities {
        self.probabilities.rounded()
    }

    /// The probability of the decoded query.
    pub fn probability(&self) -> QueryProbability {
        self.probabilities.query_probability()
    }
}

fn slot<'a>(
    rows: &'a [Vec<f32>],
    idx: usize,
    count: usize,
    context: &'static str,
) -> SDResult<&'a [f32]> {
    rows.get(idx)
        .map(|r| r.as_slice())
        .ok_or(SqlDecodeError::ShapeMismatch {
            context,
            expected: count,
            found: rows.len(),
        })
}

/// Decodes per-field scores into structured queries.
#[derive(Debug, Clone, Default)]
pub struct StructuredDecoder {
    options: DecodeOptions,
}

impl StructuredDecoder {
    /// Create a decoder.
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// The decoder options.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode one example.
    ///
    /// Select and condition columns are chosen top-k by the decoded counts
    /// and come out ascending; aggregation, operator, and value slots are
    /// decoded per chosen column in that order. A single condition drops
    /// the connector; a single condition on the last (sentinel) column
    /// becomes the "no filter" condition.
    ///
    /// Value spans range over every scored position; use
    /// [`StructuredDecoder::decode_for_question`] when the score rows are
    /// padded past the question.
    ///
    /// ## Arguments
    /// * `scores` - The example's field scores.
    ///
    /// ## Returns
    /// The decoded example, or [`SqlDecodeError::ShapeMismatch`] when the
    /// scores cannot support the decoded counts.
    pub fn decode(
        &self,
        scores: &ExampleScores,
    ) -> SDResult<DecodedExample> {
        self.decode_bounded(scores, None)
    }

    /// Decode one example whose value-span rows may be padded.
    ///
    /// Span start and end are chosen among the first `num_pieces` positions
    /// only, so a padded position can never be decoded.
    ///
    /// ## Arguments
    /// * `scores` - The example's field scores.
    /// * `num_pieces` - The number of question pieces.
    pub fn decode_for_question(
        &self,
        scores: &ExampleScores,
        num_pieces: usize,
    ) -> SDResult<DecodedExample> {
        self.decode_bounded(scores, Some(num_pieces))
    }

    fn decode_bounded(
        &self,
        scores: &ExampleScores,
        num_pieces: Option<usize>,
    ) -> SDResult<DecodedExample> {
        scores.validate()?;
        let mut probs = FieldProbabilities::default();

        let select_len = decode_single(&scores.select_len, "select count scores")?;
        probs.select_len = select_len.probability;

        let sel = decode_top_k(
            &scores.select_columns,
            select_len.index,
            "select column scores",
        )?;
        let sel_softmax = softmax(&scores.select_columns);
        probs.select_columns = sel.iter().map(|&c| sel_softmax[c]).collect();

        let mut agg = Vec::with_capacity(sel.len());
        for idx in 0..sel.len() {
            let row = slot(
                &scores.select_aggs,
                idx,
                sel.len(),
                "aggregation slots",
            )?;
            let d = decode_single(row, "aggregation scores")?;
            agg.push(AggOp::from_index(d.index)?);
            probs.select_aggs.push(d.probability);
        }

        let max_num = scores.where_num.len().min(self.options.max_conditions + 1);
        let where_num = decode_restricted(&scores.where_num, 0..max_num, "condition count scores")?;
        probs.where_num = where_num.probability;
        let num_conds = where_num.index;

        // Any count other than one needs a real connector.
        let conn = if num_conds != 1 && self.options.force_conn_for_multi {
            decode_restricted(
                &scores.where_conn,
                CondConn::And.index()..CondConn::COUNT,
                "connector scores",
            )?
        } else {
            decode_single(&scores.where_conn, "connector scores")?
        };
        probs.where_conn = conn.probability;

        let where_columns = decode_top_k(
            &scores.where_columns,
            num_conds,
            "condition column scores",
        )?;
        probs.where_columns = where_columns
            .iter()
            .map(|&c| sigmoid(scores.where_columns[c]))
            .collect();

        let mut conds = Vec::with_capacity(num_conds);
        for (idx, &column) in where_columns.iter().enumerate() {
            let op_row = slot(&scores.where_ops, idx, num_conds, "operator slots")?;
            let op = decode_single(op_row, "operator scores")?;
            probs.where_ops.push(op.probability);

            let start = slot(
                &scores.where_value_start,
                idx,
                num_conds,
                "value-span slots",
            )?;
            let end = slot(
                &scores.where_value_end,
                idx,
                num_conds,
                "value-span slots",
            )?;
            let (start, end) = match num_pieces {
                Some(n) => (&start[..n.min(start.len())], &end[..n.min(end.len())]),
                None => (start, end),
            };
            let (span, span_probs) = decode_span(start, end)?;
            probs.where_values.push(span_probs);

            conds.push(Condition::new(column, CondOp::from_index(op.index)?, span));
        }

        let mut query = StructuredQuery {
            sel,
            agg,
            cond_conn_op: CondConn::from_index(conn.index)?,
            conds,
        };
        if let Some(sentinel) = scores.num_columns().checked_sub(1) {
            query.normalize_degenerate(sentinel, &self.options.sentinel_null_value);
        }

        Ok(DecodedExample {
            query,
            probabilities: probs,
        })
    }

    /// Decode a batch of examples, in order.
    ///
    /// ## Returns
    /// One result per example; a malformed example does not affect the
    /// others.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, batch)))]
    pub fn decode_batch(
        &self,
        batch: &[ExampleScores],
    ) -> Vec<SDResult<DecodedExample>> {
        batch.iter().map(|scores| self.decode(scores)).collect()
    }
}


#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{testing::*, *};
    use crate::types::TokenSpan;

    #[test]
    fn test_decode_single_condition() {
        let scores = scores_for(3, 6, &[1], &[(0, 0, 3, 3)], 1);
        let decoded = StructuredDecoder::default().decode(&scores).unwrap();

        assert_eq!(decoded.query.sel, vec![1]);
        assert_eq!(decoded.query.agg, vec![AggOp::None]);
        assert_eq!(decoded.query.cond_conn_op, CondConn::None);
        assert_eq!(
            decoded.query.conds,
            vec![Condition::new(0, CondOp::Eq, TokenSpan::new(3, 3))]
        );

        let confidences = decoded.confidences();
        assert_eq!(confidences.where_ops.len(), 1);
        assert!(decoded.probability().total > 0.0);
        assert!(decoded.probability().total <= 1.0);
    }

    #[test]
    fn test_decode_multi_condition_sorted() {
        let scores = scores_for(4, 6, &[2, 0], &[(2, 1, 4, 4), (1, 3, 1, 2)], 2);
        let decoded = StructuredDecoder::default().decode(&scores).unwrap();

        assert_eq!(decoded.query.sel, vec![0, 2]);
        assert_eq!(decoded.query.cond_conn_op, CondConn::Or);
        assert_eq!(decoded.query.condition_columns(), vec![1, 2]);
        assert_eq!(decoded.query.condition_ops(), vec![CondOp::Ne, CondOp::Gt]);
        assert_eq!(
            decoded.query.conds[0].value.as_span(),
            Some(TokenSpan::new(1, 2))
        );
    }

    #[test]
    fn test_connector_restricted_with_many_conditions() {
        let mut scores = scores_for(4, 6, &[0], &[(1, 0, 1, 1), (2, 0, 2, 2)], 0);
        scores.where_conn = vec![9.0, 1.0, 2.0];
        let decoded = StructuredDecoder::default().decode(&scores).unwrap();
        assert_eq!(decoded.query.cond_conn_op, CondConn::Or);

        let decoded = StructuredDecoder::new(DecodeOptions::default().with_force_conn_for_multi(false))
            .decode(&scores)
            .unwrap();
        assert_eq!(decoded.query.cond_conn_op, CondConn::None);
    }

    #[test]
    fn test_sentinel_condition() {
        let scores = scores_for(3, 6, &[0], &[(2, 1, 3, 4)], 2);
        let decoded = StructuredDecoder::default().decode(&scores).unwrap();
        assert_eq!(
            decoded.query.conds,
            vec![Condition::new(2, CondOp::Eq, "Null")]
        );
        assert_eq!(decoded.query.cond_conn_op, CondConn::None);
    }

    #[test]
    fn test_condition_cap() {
        let mut scores = scores_for(4, 6, &[0], &[(1, 0, 1, 1)], 0);
        scores.where_num = peaked(5, &[4]);
        scores.where_num[1] = 4.0;
        let decoder = StructuredDecoder::new(DecodeOptions::default().with_max_conditions(1));
        let decoded = decoder.decode(&scores).unwrap();
        assert_eq!(decoded.query.num_conditions(), 1);
    }

    #[test]
    fn test_missing_slots() {
        let mut scores = scores_for(4, 6, &[0], &[(1, 0, 1, 1), (2, 0, 2, 2)], 1);
        scores.where_ops.truncate(1);
        assert!(matches!(
            StructuredDecoder::default().decode(&scores),
            Err(SqlDecodeError::ShapeMismatch {
                context: "operator slots",
                ..
            })
        ));
    }

    #[test]
    fn test_decode_batch() {
        let batch = vec![
            scores_for(3, 6, &[1], &[(0, 0, 3, 3)], 0),
            scores_for(3, 6, &[0], &[], 0),
        ];
        let decoded = StructuredDecoder::default().decode_batch(&batch);
        assert_eq!(decoded.len(), 2);
        assert!(decoded[1].as_ref().unwrap().query.conds.is_empty());
    }

    #[test]
    fn test_decode_batch_isolates_failures() {
        let mut bad = scores_for(4, 6, &[0], &[(1, 0, 1, 1), (2, 0, 2, 2)], 1);
        bad.where_ops.truncate(1);
        let batch = vec![scores_for(3, 6, &[1], &[(0, 0, 3, 3)], 0), bad];

        let decoded = StructuredDecoder::default().decode_batch(&batch);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].as_ref().unwrap().query.sel, vec![1]);
        assert!(matches!(
            decoded[1],
            Err(SqlDecodeError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_spans_bounded_by_question() {
        // Rows padded to 6 positions; the question has 2 pieces.
        let scores = scores_for(3, 6, &[1], &[(0, 0, 4, 4)], 0);
        let decoder = StructuredDecoder::default();

        let unbounded = decoder.decode(&scores).unwrap();
        assert_eq!(
            unbounded.query.conds[0].value.as_span(),
            Some(TokenSpan::new(4, 4))
        );

        let bounded = decoder.decode_for_question(&scores, 2).unwrap();
        let span = bounded.query.conds[0].value.as_span().unwrap();
        assert!(span.end < 2);
        assert!(span.start <= span.end);

        assert!(matches!(
            decoder.decode_for_question(&scores, 0),
            Err(SqlDecodeError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_connector_restricted_without_conditions() {
        let mut scores = scores_for(3, 6, &[0], &[], 0);
        scores.where_conn = vec![9.0, 1.0, 2.0];
        let decoded = StructuredDecoder::default().decode(&scores).unwrap();
        assert!(decoded.query.conds.is_empty());
        assert_eq!(decoded.query.cond_conn_op, CondConn::Or);
    }

    proptest! {
        #[test]
        fn test_single_condition_has_no_connector(
            conn in prop::collection::vec(-5.0f32..5.0, 3),
            column in 0usize..3,
        ) {
            let mut scores = scores_for(4, 6, &[0], &[(column, 0, 1, 2)], 0);
            scores.where_conn = conn;
            let decoded = StructuredDecoder::default().decode(&scores).unwrap();
            prop_assert_eq!(decoded.query.num_conditions(), 1);
            prop_assert_eq!(decoded.query.cond_conn_op, CondConn::None);
        }
    }
}
