//! # Field Scores
//!
//! The per-example score record produced at the encoder boundary.

use crate::errors::{SDResult, SqlDecodeError};

/// The raw per-field scores for one example.
///
/// Column-indexed vectors cover the encoder headers, the synthetic
/// "no filter" column included. Slot-indexed fields hold one row per
/// condition (or select) slot the model scores.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExampleScores {
    /// Scores over the number of selected columns; index `i` means `i` columns.
    pub select_len: Vec<f32>,

    /// Scores per column for selection.
    pub select_columns: Vec<f32>,

    /// `[slot][agg]` aggregation scores, one row per select slot.
    pub select_aggs: Vec<Vec<f32>>,

    /// Scores over the number of conditions; index `i` means `i` conditions.
    pub where_num: Vec<f32>,

    /// Scores over the condition connector.
    pub where_conn: Vec<f32>,

    /// Scores per column for use in a condition.
    pub where_columns: Vec<f32>,

    /// `[slot][op]` operator scores.
    pub where_ops: Vec<Vec<f32>>,

    /// `[slot][position]` value-span start scores over question pieces.
    pub where_value_start: Vec<Vec<f32>>,

    /// `[slot][position]` value-span end scores over question pieces.
    pub where_value_end: Vec<Vec<f32>>,
}

impl ExampleScores {
    /// The number of columns scored, sentinel included.
    pub fn num_columns(&self) -> usize {
        self.where_columns.len()
    }

    /// Check that the fields agree with each other in shape.
    ///
    /// ## Returns
    /// `Ok(())`, or [`SqlDecodeError::ShapeMismatch`] naming the first
    /// disagreeing field.
    pub fn validate(&self) -> SDResult<()> {
        let check = |context: &'static str, expected: usize, found: usize| {
            if expected == found {
                Ok(())
            } else {
                Err(SqlDecodeError::ShapeMismatch {
                    context,
                    expected,
                    found,
                })
            }
        };

        check(
            "select column scores",
            self.where_columns.len(),
            self.select_columns.len(),
        )?;
        check(
            "value-span end slots",
            self.where_value_start.len(),
            self.where_value_end.len(),
        )?;
        for (start, end) in self.where_value_start.iter().zip(&self.where_value_end) {
            check("value-span end positions", start.len(), end.len())?;
        }
        Ok(())
    }
}
