//! # Field Enumerations
//!
//! The index-to-meaning tables for every categorical SQL field.
//! Decoding, assembly, rendering, and scoring all go through these,
//! so an index means the same thing everywhere.

use crate::errors::{SDResult, SqlDecodeError};

macro_rules! indexed_field {
    ($name:ident, $field:literal) => {
        impl $name {
            /// The number of members.
            pub const COUNT: usize = <$name as strum::EnumCount>::COUNT;

            /// The score-vector index of this member.
            pub fn index(self) -> usize {
                self as usize
            }

            /// Look up a member by score-vector index.
            pub fn from_index(index: usize) -> SDResult<Self> {
                <$name as strum::IntoEnumIterator>::iter()
                    .nth(index)
                    .ok_or(SqlDecodeError::InvalidFieldIndex {
                        field: $field,
                        index,
                    })
            }
        }

        impl TryFrom<usize> for $name {
            type Error = SqlDecodeError;

            fn try_from(index: usize) -> SDResult<Self> {
                Self::from_index(index)
            }
        }

        impl From<$name> for usize {
            fn from(value: $name) -> Self {
                value.index()
            }
        }
    };
}

/// Aggregation applied to a selected column.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::EnumIter,
    strum_macros::EnumCount,
    strum_macros::Display,
)]
#[serde(into = "usize", try_from = "usize")]
pub enum AggOp {
    /// No aggregation.
    #[default]
    #[strum(serialize = "")]
    None = 0,

    /// `AVG`
    #[strum(serialize = "AVG")]
    Avg = 1,

    /// `MAX`
    #[strum(serialize = "MAX")]
    Max = 2,

    /// `MIN`
    #[strum(serialize = "MIN")]
    Min = 3,

    /// `COUNT`
    #[strum(serialize = "COUNT")]
    Count = 4,

    /// `SUM`
    #[strum(serialize = "SUM")]
    Sum = 5,
}

indexed_field!(AggOp, "aggregation");

impl AggOp {
    /// Can this aggregation apply to a `text` column?
    pub fn allowed_on_text(self) -> bool {
        matches!(self, AggOp::None | AggOp::Count)
    }
}

/// Comparison operator of a WHERE condition.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::EnumIter,
    strum_macros::EnumCount,
    strum_macros::Display,
)]
#[serde(into = "usize", try_from = "usize")]
pub enum CondOp {
    /// `=`
    #[default]
    #[strum(serialize = "=")]
    Eq = 0,

    /// `>`
    #[strum(serialize = ">")]
    Gt = 1,

    /// `<`
    #[strum(serialize = "<")]
    Lt = 2,

    /// `!=`
    #[strum(serialize = "!=")]
    Ne = 3,
}

indexed_field!(CondOp, "condition operator");

/// Logical joiner between conditions.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::EnumIter,
    strum_macros::EnumCount,
    strum_macros::Display,
)]
#[serde(into = "usize", try_from = "usize")]
pub enum CondConn {
    /// No connector; zero or one condition.
    #[default]
    #[strum(serialize = "")]
    None = 0,

    /// `AND`
    #[strum(serialize = "AND")]
    And = 1,

    /// `OR`
    #[strum(serialize = "OR")]
    Or = 2,
}

indexed_field!(CondConn, "condition connector");

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (idx, op) in AggOp::iter().enumerate() {
            assert_eq!(op.index(), idx);
            assert_eq!(AggOp::from_index(idx).unwrap(), op);
        }
        for (idx, op) in CondOp::iter().enumerate() {
            assert_eq!(op.index(), idx);
            assert_eq!(CondOp::try_from(idx).unwrap(), op);
        }
        for (idx, op) in CondConn::iter().enumerate() {
            assert_eq!(op.index(), idx);
        }

        assert_eq!(AggOp::COUNT, 6);
        assert_eq!(CondOp::COUNT, 4);
        assert_eq!(CondConn::COUNT, 3);
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            AggOp::from_index(6),
            Err(SqlDecodeError::InvalidFieldIndex { index: 6, .. })
        ));
        assert!(CondOp::from_index(4).is_err());
        assert!(CondConn::from_index(3).is_err());
    }

    #[test]
    fn test_symbols() {
        assert_eq!(AggOp::None.to_string(), "");
        assert_eq!(AggOp::Count.to_string(), "COUNT");
        assert_eq!(CondOp::Ne.to_string(), "!=");
        assert_eq!(CondConn::Or.to_string(), "OR");
    }

    #[test]
    fn test_text_legality() {
        let allowed: Vec<AggOp> = AggOp::iter().filter(|a| a.allowed_on_text()).collect();
        assert_eq!(allowed, vec![AggOp::None, AggOp::Count]);
    }

    #[test]
    fn test_json_as_index() {
        assert_eq!(serde_json::to_string(&CondOp::Lt).unwrap(), "2");
        let op: AggOp = serde_json::from_str("4").unwrap();
        assert_eq!(op, AggOp::Count);
        assert!(serde_json::from_str::<CondConn>("7").is_err());
    }
}
