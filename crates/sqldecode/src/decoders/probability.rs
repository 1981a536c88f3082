//! # Decoded Probabilities
//!
//! Per-field probabilities of a decoded query and their products.

use crate::decoders::round3;

/// The probability the model gave each decoded choice.
///
/// Slot vectors follow the decoded order: select slots by ascending
/// column, condition slots by ascending column.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldProbabilities {
    /// Select count.
    pub select_len: f32,

    /// Soft-max probability per selected column.
    pub select_columns: Vec<f32>,

    /// Aggregation per select slot.
    pub select_aggs: Vec<f32>,

    /// Condition count.
    pub where_num: f32,

    /// Condition connector.
    pub where_conn: f32,

    /// Sigmoid probability per condition column.
    pub where_columns: Vec<f32>,

    /// Operator per condition slot.
    pub where_ops: Vec<f32>,

    /// `[start, end]` per condition slot.
    pub where_values: Vec<[f32; 2]>,
}

impl FieldProbabilities {
    /// Every probability rounded to 3 decimal places.
    pub fn rounded(&self) -> Self {
        let round_all = |xs: &[f32]| xs.iter().copied().map(round3).collect::<Vec<_>>();
        Self {
            select_len: round3(self.select_len),
            select_columns: round_all(&self.select_columns),
            select_aggs: round_all(&self.select_aggs),
            where_num: round3(self.where_num),
            where_conn: round3(self.where_conn),
            where_columns: round_all(&self.where_columns),
            where_ops: round_all(&self.where_ops),
            where_values: self
                .where_values
                .iter()
                .map(|[s, e]| [round3(*s), round3(*e)])
                .collect(),
        }
    }

    /// The product of the select-clause probabilities.
    pub fn select_probability(&self) -> f64 {
        self.select_columns
            .iter()
            .chain(&self.select_aggs)
            .fold(self.select_len as f64, |p, &x| p * x as f64)
    }

    /// The product of the where-clause probabilities.
    ///
    /// The connector is not a factor.
    pub fn where_probability(&self) -> f64 {
        self.where_columns
            .iter()
            .chain(&self.where_ops)
            .chain(self.where_values.iter().flatten())
            .fold(self.where_num as f64, |p, &x| p * x as f64)
    }

    /// The select, where, and total probabilities.
    pub fn query_probability(&self) -> QueryProbability {
        QueryProbability::new(self.select_probability(), self.where_probability())
    }
}

/// The probability of a decoded query.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryProbability {
    /// Select clause.
    pub select: f64,

    /// Where clause.
    #[serde(rename = "where")]
    pub where_clause: f64,

    /// `select * where_clause`.
    pub total: f64,
}

impl QueryProbability {
    /// Combine clause probabilities.
    pub fn new(
        select: f64,
        where_clause: f64,
    ) -> Self {
        Self {
            select,
            where_clause,
            total: select * where_clause,
        }
    }
}
