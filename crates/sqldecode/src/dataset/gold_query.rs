//! # Gold Query Extraction
//!
//! A gold [`StructuredQuery`] reorganized into the slot order decoding
//! produces: select slots and condition slots ascending by column.

use crate::{
    query::{AggOp, CondConn, CondOp, CondValue, Condition, StructuredQuery},
    scoring::ascending_order,
};

/// The per-example gold record.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GoldQuery {
    /// Select columns, ascending.
    pub sel: Vec<usize>,

    /// Aggregations, permuted alongside `sel`.
    pub agg: Vec<AggOp>,

    /// The number of selected columns.
    pub select_len: usize,

    /// The condition connector.
    pub cond_conn_op: CondConn,

    /// Conditions, ascending by column.
    pub conds: Vec<Condition>,

    /// `order[i]` is the annotation index of sorted condition `i`.
    pub cond_order: Vec<usize>,
}

impl GoldQuery {
    /// Extract the gold record from an annotated query.
    pub fn from_query(query: &StructuredQuery) -> Self {
        let sel_order = ascending_order(&query.sel);
        let cond_order = ascending_order(&query.condition_columns());
        Self {
            sel: sel_order.iter().map(|&i| query.sel[i]).collect(),
            agg: sel_order
                .iter()
                .map(|&i| query.agg.get(i).copied().unwrap_or_default())
                .collect(),
            select_len: query.sel.len(),
            cond_conn_op: query.cond_conn_op,
            conds: cond_order.iter().map(|&i| query.conds[i].clone()).collect(),
            cond_order,
        }
    }

    /// The number of conditions.
    pub fn num_conditions(&self) -> usize {
        self.conds.len()
    }

    /// Condition columns, ascending.
    pub fn condition_columns(&self) -> Vec<usize> {
        self.conds.iter().map(|c| c.column).collect()
    }

    /// Condition operators, in sorted slot order.
    pub fn condition_ops(&self) -> Vec<CondOp> {
        self.conds.iter().map(|c| c.op).collect()
    }

    /// The scored condition values, in sorted slot order.
    pub fn condition_values(&self) -> Vec<&CondValue> {
        self.conds.iter().map(|c| c.scored_value()).collect()
    }

    /// Permute per-condition annotations (such as value spans) from
    /// annotation order into sorted slot order.
    pub fn permute<T: Clone>(
        &self,
        per_condition: &[T],
    ) -> Vec<T> {
        self.cond_order
            .iter()
            .filter_map(|&i| per_condition.get(i).cloned())
            .collect()
    }

    /// The sorted record as a query.
    pub fn to_query(&self) -> StructuredQuery {
        StructuredQuery {
            sel: self.sel.clone(),
            agg: self.agg.clone(),
            cond_conn_op: self.cond_conn_op,
            conds: self.conds.clone(),
        }
    }
}

impl From<&StructuredQuery> for GoldQuery {
    fn from(query: &StructuredQuery) -> Self {
        Self::from_query(query)
    }
}
