//! # Field Matching
//!
//! Per-field correctness of a predicted query against gold.
//!
//! Predicted select and condition slots come out of decoding in ascending
//! column order; gold slots arrive in annotation order. In
//! [`ScoreMode::Test`] the gold slot fields are permuted by a stable sort
//! of their columns before comparison.

use crate::{
    errors::{SDResult, SqlDecodeError},
    query::{CondValue, StructuredQuery},
    scoring::ScoreMode,
};

/// The stable ascending order of `columns`, as source indices.
pub fn ascending_order(columns: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..columns.len()).collect();
    order.sort_by_key(|&i| columns[i]);
    order
}

fn permuted<T: Clone>(
    items: &[T],
    order: &[usize],
) -> Vec<T> {
    order.iter().filter_map(|&i| items.get(i).cloned()).collect()
}

fn gold_order(
    columns: &[usize],
    mode: ScoreMode,
) -> Vec<usize> {
    match mode {
        ScoreMode::Test => ascending_order(columns),
        ScoreMode::Train => (0..columns.len()).collect(),
    }
}

/// Do two column lists hold the same columns?
///
/// Lists of different length never match; otherwise both are compared
/// sorted ascending.
///
/// ```
/// use sqldecode::scoring::score_columns;
///
/// assert_eq!(score_columns(&[3, 1], &[1, 3]), 1);
/// assert_eq!(score_columns(&[3], &[1, 3]), 0);
/// ```
pub fn score_columns(
    pred: &[usize],
    gold: &[usize],
) -> u8 {
    if pred.len() != gold.len() {
        return 0;
    }
    let mut pred = pred.to_vec();
    let mut gold = gold.to_vec();
    pred.sort_unstable();
    gold.sort_unstable();
    u8::from(pred == gold)
}

/// Do the aggregations match, paired by select slot?
pub fn score_aggs(
    pred: &StructuredQuery,
    gold: &StructuredQuery,
    mode: ScoreMode,
) -> u8 {
    if pred.sel.len() != gold.sel.len() {
        return 0;
    }
    let order = gold_order(&gold.sel, mode);
    u8::from(permuted(&gold.agg, &order) == pred.agg)
}

/// Do the connectors match?
pub fn score_connector(
    pred: &StructuredQuery,
    gold: &StructuredQuery,
) -> u8 {
    u8::from(pred.cond_conn_op == gold.cond_conn_op)
}

/// Do the condition counts match?
pub fn score_condition_count(
    pred: &StructuredQuery,
    gold: &StructuredQuery,
) -> u8 {
    u8::from(pred.num_conditions() == gold.num_conditions())
}

/// Do the condition columns match?
pub fn score_condition_columns(
    pred: &StructuredQuery,
    gold: &StructuredQuery,
) -> u8 {
    score_columns(&pred.condition_columns(), &gold.condition_columns())
}

/// Do the condition operators match, paired by condition slot?
pub fn score_condition_ops(
    pred: &StructuredQuery,
    gold: &StructuredQuery,
    mode: ScoreMode,
) -> u8 {
    if pred.num_conditions() != gold.num_conditions() {
        return 0;
    }
    let order = gold_order(&gold.condition_columns(), mode);
    u8::from(permuted(&gold.condition_ops(), &order) == pred.condition_ops())
}

fn value_key(value: &CondValue) -> String {
    value.to_string().to_lowercase()
}

/// Do the condition values match, paired by condition slot?
///
/// Values compare as case-insensitive text; a gold condition's canonical
/// value takes the place of its surface value.
pub fn score_condition_values(
    pred: &StructuredQuery,
    gold: &StructuredQuery,
    mode: ScoreMode,
) -> u8 {
    if pred.num_conditions() != gold.num_conditions() {
        return 0;
    }
    let order = gold_order(&gold.condition_columns(), mode);
    let all = order
        .iter()
        .zip(&pred.conds)
        .all(|(&g, p)| value_key(gold.conds[g].scored_value()) == value_key(&p.value));
    u8::from(all)
}

/// Reorder predicted condition columns to gold order when they are the
/// same set of columns.
///
/// When the sets differ, the prediction is returned unchanged.
pub fn sort_pr_wc(
    pred: &[usize],
    gold: &[usize],
) -> Vec<usize> {
    let mut p = pred.to_vec();
    let mut g = gold.to_vec();
    p.sort_unstable();
    p.dedup();
    g.sort_unstable();
    g.dedup();
    if p == g {
        gold.to_vec()
    } else {
        pred.to_vec()
    }
}

/// Per-field correctness of one example.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExampleMatch {
    /// Select columns.
    pub sel: u8,

    /// Condition connector.
    pub conn: u8,

    /// Aggregations.
    pub agg: u8,

    /// Condition count.
    pub wn: u8,

    /// Condition columns.
    pub wc: u8,

    /// Condition operators.
    pub wo: u8,

    /// Condition values.
    pub wv: u8,

    /// Logical form: every field above.
    pub lx: u8,

    /// Execution result, when execution is scored.
    pub x: Option<u8>,
}

impl ExampleMatch {
    /// Score a predicted query against gold.
    pub fn score(
        pred: &StructuredQuery,
        gold: &StructuredQuery,
        mode: ScoreMode,
    ) -> Self {
        let mut m = Self {
            sel: score_columns(&pred.sel, &gold.sel),
            conn: score_connector(pred, gold),
            agg: score_aggs(pred, gold, mode),
            wn: score_condition_count(pred, gold),
            wc: score_condition_columns(pred, gold),
            wo: score_condition_ops(pred, gold, mode),
            wv: score_condition_values(pred, gold, mode),
            lx: 0,
            x: None,
        };
        m.lx = u8::from(
            [m.sel, m.conn, m.agg, m.wn, m.wc, m.wo, m.wv]
                .iter()
                .all(|&f| f == 1),
        );
        m
    }

    /// Attach an execution result.
    pub fn with_execution(
        mut self,
        x: u8,
    ) -> Self {
        self.x = Some(x);
        self
    }
}

/// Per-field 0/1 vectors over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchMatches {
    /// Select columns.
    pub sel: Vec<u8>,

    /// Condition connector.
    pub conn: Vec<u8>,

    /// Aggregations.
    pub agg: Vec<u8>,

    /// Condition count.
    pub wn: Vec<u8>,

    /// Condition columns.
    pub wc: Vec<u8>,

    /// Condition operators.
    pub wo: Vec<u8>,

    /// Condition values.
    pub wv: Vec<u8>,

    /// Logical form.
    pub lx: Vec<u8>,
}

impl FromIterator<ExampleMatch> for BatchMatches {
    fn from_iter<I: IntoIterator<Item = ExampleMatch>>(iter: I) -> Self {
        let mut batch = BatchMatches::default();
        for m in iter {
            batch.sel.push(m.sel);
            batch.conn.push(m.conn);
            batch.agg.push(m.agg);
            batch.wn.push(m.wn);
            batch.wc.push(m.wc);
            batch.wo.push(m.wo);
            batch.wv.push(m.wv);
            batch.lx.push(m.lx);
        }
        batch
    }
}

/// Score a batch of predictions against gold.
///
/// ## Returns
/// The per-field vectors, or [`SqlDecodeError::ShapeMismatch`] when the
/// batches differ in length.
pub fn score_batch(
    pred: &[StructuredQuery],
    gold: &[StructuredQuery],
    mode: ScoreMode,
) -> SDResult<BatchMatches> {
    if pred.len() != gold.len() {
        return Err(SqlDecodeError::ShapeMismatch {
            context: "scored batch",
            expected: gold.len(),
            found: pred.len(),
        });
    }
    Ok(pred
        .iter()
        .zip(gold)
        .map(|(p, g)| ExampleMatch::score(p, g, mode))
        .collect())
}
