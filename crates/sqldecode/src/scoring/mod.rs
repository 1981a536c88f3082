//! # Scoring
//!
//! * [`field_match`] - per-field 0/1 correctness against gold.
//! * [`execution`] - execution accuracy through an [`ExecutionEngine`].
//! * [`AccuracyCounts`] - accumulation across batches.
//! * [`Evaluator`] - all of the above behind [`EvalOptions`].

pub mod accuracy;
pub mod evaluator;
pub mod execution;
pub mod field_match;
pub mod score_mode;

pub use accuracy::{AccuracyCounts, AccuracyReport};
pub use evaluator::{EvalOptions, Evaluator};
pub use execution::{ExecutionEngine, ResultSet, TableEngine, execution_match};
pub use field_match::{
    BatchMatches,
    ExampleMatch,
    ascending_order,
    score_aggs,
    score_batch,
    score_columns,
    score_condition_columns,
    score_condition_count,
    score_condition_ops,
    score_condition_values,
    score_connector,
    sort_pr_wc,
};
pub use score_mode::ScoreMode;
