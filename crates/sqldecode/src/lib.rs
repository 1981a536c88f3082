//! # `sqldecode` Table Question-to-SQL Decode Layer
//!
//! The non-neural half of a question-to-SQL parser over single tables:
//! everything between an encoder's per-field scores and a scored,
//! executable structured query.
//!
//! See:
//! * [`alignment`] to map word tokens onto sub-word pieces and back.
//! * [`decoders`] to decode scores into queries and ground their values.
//! * [`matching`] to find predicted values among table cells.
//! * [`normalize`] for Chinese numerals, dates, and digit runs.
//! * [`scoring`] to score predictions against gold.
//! * [`dataset`] to read examples and write prediction files.
//!
//! ## Crate Features
//!
//! #### feature: ``default``
//!
//! * ``ahash``
//! * ``rayon``
//!
//! #### feature: ``ahash``
//!
//! This swaps all HashMap/HashSet implementations for ``ahash``.
//!
//! This is done by the ``types::SDHash{*}`` type alias machinery.
//!
//! #### feature: ``rayon``
//!
//! This enables batch parallelism wrappers using the ``rayon`` crate;
//! see [`rayon::ParallelRayonDecoder`].
//!
//! #### feature: ``tracing``
//!
//! This enables a number of ``tracing`` instrumentation points.
//! This is only useful for timing tracing of the library itself.
//!
//! ## Decoding an Example
//!
//! ```rust,ignore
//! use sqldecode::decoders::{DecodeOptions, ExampleDecoder, ExampleInput, QueryPipeline};
//! use sqldecode::matching::ValueMatcher;
//! use sqldecode::rayon::ParallelRayonDecoder;
//! use sqldecode::scoring::{EvalOptions, Evaluator};
//!
//! let pipeline = QueryPipeline::new(DecodeOptions::default(), ValueMatcher::default());
//! let pipeline = ParallelRayonDecoder::new(pipeline);
//!
//! let input = ExampleInput {
//!     question: &question,
//!     question_pieces: &pieces,
//!     table: store.table(&table_id)?,
//!     scores: &scores,
//! };
//! let predicted = pipeline.decode_example(&input)?;
//!
//! let mut evaluator = Evaluator::new(EvalOptions::default());
//! let m = evaluator.score(&table_id, predicted.query(), &gold);
//!```
#![warn(missing_docs, unused)]

#[cfg(feature = "rayon")]
pub mod rayon;

pub mod alignment;
pub mod dataset;
pub mod decoders;
pub mod errors;
pub mod matching;
pub mod normalize;
pub mod query;
pub mod scoring;
pub mod table;
pub mod types;

pub use errors::{SDResult, SqlDecodeError};
