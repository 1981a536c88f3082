//! # Parallel Decoder

use crate::{
    decoders::{ExampleDecoder, ExampleInput, PredictedExample},
    errors::SDResult,
};

/// Batch-Level Parallel Decoder Wrapper.
///
/// Examples of a batch are decoded on the ``rayon`` pool; the conditions
/// of one example are still assembled in order.
#[derive(Debug, Clone)]
pub struct ParallelRayonDecoder<D: ExampleDecoder> {
    /// Wrapped decoder.
    pub inner: D,
}

impl<D: ExampleDecoder> ParallelRayonDecoder<D> {
    /// Create a new parallel example decoder.
    ///
    /// ## Arguments
    /// * `inner` - The example decoder to wrap.
    ///
    /// ## Returns
    /// A new `ParallelRayonDecoder` instance.
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: ExampleDecoder> ExampleDecoder for ParallelRayonDecoder<D> {
    fn decode_example(
        &self,
        input: &ExampleInput<'_>,
    ) -> SDResult<PredictedExample> {
        self.inner.decode_example(input)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, batch)))]
    fn decode_examples(
        &self,
        batch: &[ExampleInput<'_>],
    ) -> Vec<SDResult<PredictedExample>> {
        use rayon::prelude::*;

        batch
            .par_iter()
            .map(|input| self.inner.decode_example(input))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decoders::{QueryPipeline, structured_decoder::testing::scores_for},
        table::Table,
    };

    fn check_is_send<T: Send>(_: &T) {}
    fn check_is_sync<T: Sync>(_: &T) {}

    #[test]
    fn test_parallel_matches_sequential() {
        let table: Table = serde_json::from_str(
            r#"{"id": "t", "header": ["name", "age"], "types": ["text", "real"],
                "rows": [["Alice", "30"], ["Bob", "25"]]}"#,
        )
        .unwrap();
        let pieces: Vec<String> = ["is", "alice", "or", "bob"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let all_scores: Vec<_> = (0..8)
            .map(|i| scores_for(3, 4, &[1], &[(0, 0, 1 + 2 * (i % 2), 1 + 2 * (i % 2))], 0))
            .collect();
        let batch: Vec<ExampleInput<'_>> = all_scores
            .iter()
            .map(|scores| ExampleInput {
                question: "is alice or bob",
                question_pieces: &pieces,
                table: &table,
                scores,
            })
            .collect();

        let sequential = QueryPipeline::default();
        let parallel = ParallelRayonDecoder::new(QueryPipeline::default());
        check_is_send(&parallel);
        check_is_sync(&parallel);

        let expected: Vec<_> = sequential
            .decode_examples(&batch)
            .into_iter()
            .map(|p| p.unwrap())
            .collect();
        let actual: Vec<_> = parallel
            .decode_examples(&batch)
            .into_iter()
            .map(|p| p.unwrap())
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(actual[1].query().conds[0].value.as_text(), Some("Bob"));
    }
}
