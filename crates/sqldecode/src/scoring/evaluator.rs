//! # Evaluator

use std::sync::Arc;

use crate::{
    errors::{SDResult, SqlDecodeError},
    query::StructuredQuery,
    scoring::{AccuracyCounts, ExampleMatch, ExecutionEngine, ScoreMode, execution_match},
};

/// Options for configuring an [`Evaluator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// How gold slots line up with predicted slots.
    pub mode: ScoreMode,

    /// Score execution accuracy when an engine is available.
    pub execution: bool,
}

impl EvalOptions {
    /// Gets the configured scoring mode.
    pub fn mode(&self) -> ScoreMode {
        self.mode
    }

    /// Sets the configured scoring mode.
    pub fn set_mode(
        &mut self,
        mode: ScoreMode,
    ) {
        self.mode = mode;
    }

    /// Sets the configured scoring mode and returns the builder.
    pub fn with_mode(
        mut self,
        mode: ScoreMode,
    ) -> Self {
        self.set_mode(mode);
        self
    }

    /// Is execution accuracy scored?
    pub fn execution(&self) -> bool {
        self.execution
    }

    /// Sets whether execution accuracy is scored.
    pub fn set_execution(
        &mut self,
        execution: bool,
    ) {
        self.execution = execution;
    }

    /// Sets whether execution accuracy is scored and returns the builder.
    pub fn with_execution(
        mut self,
        execution: bool,
    ) -> Self {
        self.set_execution(execution);
        self
    }
}

/// Scores predictions against gold and accumulates accuracy.
#[derive(Clone, Default)]
pub struct Evaluator {
    options: EvalOptions,
    engine: Option<Arc<dyn ExecutionEngine>>,
    counts: AccuracyCounts,
}

impl Evaluator {
    /// Create an evaluator without an execution engine.
    pub fn new(options: EvalOptions) -> Self {
        Self {
            options,
            engine: None,
            counts: AccuracyCounts::default(),
        }
    }

    /// Attach an execution engine and return the builder.
    pub fn with_engine(
        mut self,
        engine: Arc<dyn ExecutionEngine>,
    ) -> Self {
        self.engine = Some(engine);
        self
    }

    /// The evaluator options.
    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// The counts so far.
    pub fn counts(&self) -> &AccuracyCounts {
        &self.counts
    }

    /// Score one example and count it.
    pub fn score(
        &mut self,
        table_id: &str,
        pred: &StructuredQuery,
        gold: &StructuredQuery,
    ) -> ExampleMatch {
        let mut m = ExampleMatch::score(pred, gold, self.options.mode);
        if self.options.execution
            && let Some(engine) = &self.engine
        {
            m = m.with_execution(execution_match(engine.as_ref(), table_id, pred, gold));
        }
        self.counts.add(&m);
        m
    }

    /// Count an example that produced no prediction.
    ///
    /// Every field scores 0; execution, when scored, scores 0 too.
    pub fn score_failure(&mut self) -> ExampleMatch {
        let mut m = ExampleMatch::default();
        if self.options.execution && self.engine.is_some() {
            m = m.with_execution(0);
        }
        self.counts.add(&m);
        m
    }

    /// Score a batch of examples and count them.
    ///
    /// ## Arguments
    /// * `table_ids` - The table of each example.
    /// * `pred` - Predicted queries.
    /// * `gold` - Gold queries.
    ///
    /// ## Returns
    /// One match per example, or [`SqlDecodeError::ShapeMismatch`] when the
    /// inputs differ in length.
    pub fn score_batch<S: AsRef<str>>(
        &mut self,
        table_ids: &[S],
        pred: &[StructuredQuery],
        gold: &[StructuredQuery],
    ) -> SDResult<Vec<ExampleMatch>> {
        for (context, found) in [("predicted batch", pred.len()), ("table id batch", table_ids.len())] {
            if found != gold.len() {
                return Err(SqlDecodeError::ShapeMismatch {
                    context,
                    expected: gold.len(),
                    found,
                });
            }
        }
        Ok(table_ids
            .iter()
            .zip(pred.iter().zip(gold))
            .map(|(id, (p, g))| self.score(id.as_ref(), p, g))
            .collect())
    }
}
