//! # Dataset I/O
//!
//! * [`Example`] - one annotated question, read from line-delimited JSON.
//! * [`GoldQuery`] - a gold query in decoded slot order.
//! * [`results_io`] - prediction files for evaluation.

pub mod example;
pub mod gold_query;
pub mod results_io;

pub use example::{Example, load_examples_path, read_examples};
pub use gold_query::GoldQuery;
pub use results_io::{
    ResultRecord,
    aux_results_path,
    load_results,
    read_jsonl,
    results_path,
    save_for_evaluation,
    save_for_evaluation_aux,
    write_jsonl,
};
