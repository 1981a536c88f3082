//! # Field Decoders
//!
//! Score-vector to choice rules shared by every decoded field:
//! * [`decode_single`] - arg-max for single-label fields.
//! * [`decode_top_k`] - count-gated multi-label fields, ascending output.
//! * [`decode_span`] - start/end value spans with `end >= start`.

use std::ops::Range;

use crate::{
    errors::{SDResult, SqlDecodeError},
    types::TokenSpan,
};

/// One decoded choice and the probability the model gave it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decision {
    /// The chosen index.
    pub index: usize,

    /// The unrounded probability of the choice.
    pub probability: f32,
}

impl Decision {
    /// The probability rounded to 3 decimal places, as reported.
    pub fn confidence(&self) -> f32 {
        round3(self.probability)
    }
}

/// Round to 3 decimal places.
pub fn round3(x: f32) -> f32 {
    (x * 1000.0).round() / 1000.0
}

/// The logistic function.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable soft-max.
///
/// An empty input yields an empty output.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// The index of the first maximal score.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

fn non_empty(
    scores: &[f32],
    context: &'static str,
) -> SDResult<()> {
    if scores.is_empty() {
        return Err(SqlDecodeError::ShapeMismatch {
            context,
            expected: 1,
            found: 0,
        });
    }
    Ok(())
}

/// Decode a single-label field.
///
/// ## Arguments
/// * `scores` - The field's score vector.
/// * `context` - Field name reported on shape errors.
///
/// ## Returns
/// The arg-max and its soft-max probability, or
/// [`SqlDecodeError::ShapeMismatch`] for an empty vector.
pub fn decode_single(
    scores: &[f32],
    context: &'static str,
) -> SDResult<Decision> {
    decode_restricted(scores, 0..scores.len(), context)
}

/// Decode a single-label field whose choice is restricted to `allowed`.
///
/// The probability is still the soft-max over the whole vector.
pub fn decode_restricted(
    scores: &[f32],
    allowed: Range<usize>,
    context: &'static str,
) -> SDResult<Decision> {
    if allowed.start >= allowed.end || allowed.end > scores.len() {
        return Err(SqlDecodeError::ShapeMismatch {
            context,
            expected: allowed.end.max(1),
            found: scores.len(),
        });
    }
    let offset = allowed.start;
    let index = argmax(&scores[allowed]).map(|i| i + offset).unwrap_or(offset);
    Ok(Decision {
        index,
        probability: softmax(scores)[index],
    })
}

/// Decode a count-gated multi-label field.
///
/// The `k` highest-scoring indices are chosen (ties go to the lower index)
/// and returned in ascending index order.
///
/// ## Returns
/// The chosen indices, or [`SqlDecodeError::ShapeMismatch`] when `k`
/// exceeds the number of scores.
pub fn decode_top_k(
    scores: &[f32],
    k: usize,
    context: &'static str,
) -> SDResult<Vec<usize>> {
    if k > scores.len() {
        return Err(SqlDecodeError::ShapeMismatch {
            context,
            expected: k,
            found: scores.len(),
        });
    }
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order.truncate(k);
    order.sort_unstable();
    Ok(order)
}

/// Decode a value span.
///
/// The start is the arg-max of `start_scores`; the end is the arg-max of
/// `end_scores` over positions at or after the start.
///
/// ## Returns
/// The span and the soft-max probabilities of its start and end, or
/// [`SqlDecodeError::ShapeMismatch`] for empty or unequal vectors.
pub fn decode_span(
    start_scores: &[f32],
    end_scores: &[f32],
) -> SDResult<(TokenSpan, [f32; 2])> {
    non_empty(start_scores, "value-span start scores")?;
    if start_scores.len() != end_scores.len() {
        return Err(SqlDecodeError::ShapeMismatch {
            context: "value-span end scores",
            expected: start_scores.len(),
            found: end_scores.len(),
        });
    }

    let start = decode_single(start_scores, "value-span start scores")?;
    let end = decode_restricted(
        end_scores,
        start.index..end_scores.len(),
        "value-span end scores",
    )?;
    Ok((
        TokenSpan::new(start.index, end.index),
        [start.probability, end.probability],
    ))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_softmax() {
        let p = softmax(&[1.0, 1.0]);
        assert_eq!(p, vec![0.5, 0.5]);

        let p = softmax(&[1000.0, 0.0]);
        assert!((p[0] - 1.0).abs() < 1e-6);
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_decode_single() {
        let d = decode_single(&[0.0, 2.0, 1.0], "agg").unwrap();
        assert_eq!(d.index, 1);
        assert!(d.probability > 0.6);
        assert_eq!(d.confidence(), round3(d.probability));

        assert!(matches!(
            decode_single(&[], "agg"),
            Err(SqlDecodeError::ShapeMismatch { context: "agg", .. })
        ));
    }

    #[test]
    fn test_decode_restricted() {
        let d = decode_restricted(&[9.0, 1.0, 2.0], 1..3, "conn").unwrap();
        assert_eq!(d.index, 2);
        assert!(d.probability < 0.01);

        assert!(decode_restricted(&[9.0], 1..3, "conn").is_err());
    }

    #[test]
    fn test_decode_top_k_is_ascending() {
        let scores = [0.1, 0.9, 0.3, 0.8];
        assert_eq!(decode_top_k(&scores, 2, "sel").unwrap(), vec![1, 3]);
        assert_eq!(decode_top_k(&scores, 0, "sel").unwrap(), Vec::<usize>::new());
        assert!(decode_top_k(&scores, 5, "sel").is_err());
    }

    #[test]
    fn test_decode_span_end_after_start() {
        let (span, probs) = decode_span(&[0.0, 5.0, 0.0], &[9.0, 0.0, 1.0]).unwrap();
        assert_eq!(span, TokenSpan::new(1, 2));
        assert!(probs[1] < 0.01);

        assert!(decode_span(&[], &[]).is_err());
        assert!(decode_span(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(0.9996), 1.0);
    }

    proptest! {
        #[test]
        fn test_top_k_sorted(
            scores in prop::collection::vec(-10.0f32..10.0, 1..12),
            k in 0usize..12,
        ) {
            let k = k.min(scores.len());
            let chosen = decode_top_k(&scores, k, "cols").unwrap();
            prop_assert_eq!(chosen.len(), k);
            prop_assert!(chosen.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn test_span_end_never_before_start(
            pairs in prop::collection::vec((-10.0f32..10.0, -10.0f32..10.0), 1..20),
        ) {
            let (start, end): (Vec<f32>, Vec<f32>) = pairs.into_iter().unzip();
            let (span, _) = decode_span(&start, &end).unwrap();
            prop_assert!(span.end >= span.start);
            prop_assert!(span.end < start.len());
        }
    }
}
