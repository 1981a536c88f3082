//! # Example Decoder
//!
//! The per-example pipeline: decode scores, check select legality, and
//! assemble textual values. Examples are independent of each other.

use crate::{
    decoders::{
        Assembly,
        DecodeOptions,
        DecodedExample,
        ExampleScores,
        QueryAssembler,
        StructuredDecoder,
        check_sc_sa_pairs,
    },
    errors::SDResult,
    matching::ValueMatcher,
    query::StructuredQuery,
    table::Table,
};

/// Everything one example needs to be decoded.
#[derive(Debug, Clone, Copy)]
pub struct ExampleInput<'a> {
    /// The question text.
    pub question: &'a str,

    /// The question's sub-word pieces, which value spans index.
    pub question_pieces: &'a [String],

    /// The example's table.
    pub table: &'a Table,

    /// The encoder's field scores.
    pub scores: &'a ExampleScores,
}

/// A fully decoded example.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PredictedExample {
    /// The span-valued decode.
    pub decoded: DecodedExample,

    /// The textual query and its grounding record.
    pub assembly: Assembly,

    /// Legality per select slot.
    pub legal_select: Vec<bool>,
}

impl PredictedExample {
    /// The final textual query.
    pub fn query(&self) -> &StructuredQuery {
        &self.assembly.query
    }

    /// Are all selected `(column, aggregation)` pairs legal?
    pub fn is_legal(&self) -> bool {
        self.legal_select.iter().all(|&ok| ok)
    }
}

/// Decodes examples into queries.
pub trait ExampleDecoder: Send + Sync {
    /// Decode one example.
    ///
    /// ## Returns
    /// The prediction, or a structural error for malformed scores, spans,
    /// or column types.
    fn decode_example(
        &self,
        input: &ExampleInput<'_>,
    ) -> SDResult<PredictedExample>;

    /// Decode a batch of examples, in order.
    ///
    /// ## Returns
    /// One result per example; a failing example does not abort the batch.
    fn decode_examples(
        &self,
        batch: &[ExampleInput<'_>],
    ) -> Vec<SDResult<PredictedExample>> {
        batch.iter().map(|input| self.decode_example(input)).collect()
    }
}

/// The sequential [`ExampleDecoder`].
#[derive(Debug, Clone, Default)]
pub struct QueryPipeline {
    decoder: StructuredDecoder,
    assembler: QueryAssembler,
}

impl QueryPipeline {
    /// Build a pipeline.
    ///
    /// ## Arguments
    /// * `options` - Decoder options; the null value is shared with assembly.
    /// * `matcher` - The value matcher used during assembly.
    pub fn new(
        options: DecodeOptions,
        matcher: ValueMatcher,
    ) -> Self {
        let assembler =
            QueryAssembler::new(matcher).with_sentinel_null_value(options.sentinel_null_value());
        Self {
            decoder: StructuredDecoder::new(options),
            assembler,
        }
    }

    /// The score decoder.
    pub fn decoder(&self) -> &StructuredDecoder {
        &self.decoder
    }

    /// The value assembler.
    pub fn assembler(&self) -> &QueryAssembler {
        &self.assembler
    }
}

impl ExampleDecoder for QueryPipeline {
    fn decode_example(
        &self,
        input: &ExampleInput<'_>,
    ) -> SDResult<PredictedExample> {
        let decoded = self
            .decoder
            .decode_for_question(input.scores, input.question_pieces.len())?;

        let legal_select = check_sc_sa_pairs(input.table, &decoded.query)?;
        if legal_select.contains(&false) {
            log::warn!(
                "table {}: illegal select/aggregation pairs sel={:?} agg={:?}",
                input.table.id,
                decoded.query.sel,
                decoded.query.agg
            );
        }

        let assembly = self.assembler.assemble(
            &decoded.query,
            input.question,
            input.question_pieces,
            input.table,
        )?;

        Ok(PredictedExample {
            decoded,
            assembly,
            legal_select,
        })
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, batch)))]
    fn decode_examples(
        &self,
        batch: &[ExampleInput<'_>],
    ) -> Vec<SDResult<PredictedExample>> {
        batch.iter().map(|input| self.decode_example(input)).collect()
    }
}
