//! # Query Decoders
//!
//! From per-field scores to textual structured queries:
//! * [`ExampleScores`] - the encoder's per-field scores for one example.
//! * [`field_decoders`] - arg-max, top-k, and span rules.
//! * [`StructuredDecoder`] - scores to a span-valued [`crate::query::StructuredQuery`].
//! * [`check_sc_sa_pairs`] - select/aggregation legality.
//! * [`QueryAssembler`] - spans to grounded value text.
//! * [`ExampleDecoder`] / [`QueryPipeline`] - the whole per-example pipeline.

pub mod assembler;
pub mod decode_options;
pub mod example_decoder;
pub mod field_decoders;
pub mod legality;
pub mod probability;
pub mod scores;
pub mod structured_decoder;

pub use assembler::{Assembly, ConditionGrounding, QueryAssembler};
pub use decode_options::{DEFAULT_MAX_CONDITIONS, DEFAULT_SENTINEL_NULL_VALUE, DecodeOptions};
pub use example_decoder::{ExampleDecoder, ExampleInput, PredictedExample, QueryPipeline};
pub use field_decoders::{
    Decision,
    argmax,
    decode_restricted,
    decode_single,
    decode_span,
    decode_top_k,
    round3,
    sigmoid,
    softmax,
};
pub use legality::{check_sc_sa_pairs, is_legal_pair};
pub use probability::{FieldProbabilities, QueryProbability};
pub use scores::ExampleScores;
pub use structured_decoder::{DecodedExample, StructuredDecoder};
