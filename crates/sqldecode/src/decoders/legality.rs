//! # Select Legality
//!
//! A `text` column admits only the no-op and `COUNT` aggregations.

use crate::{
    errors::{SDResult, SqlDecodeError},
    query::{AggOp, StructuredQuery},
    table::{ColumnType, Table},
};

/// Is a `(column, aggregation)` pair legal for the table?
///
/// The synthetic "no filter" column is treated as `text`.
///
/// ## Returns
/// The verdict, or [`SqlDecodeError::UnknownColumnType`] for a column whose
/// type is neither `text` nor `real`, or
/// [`SqlDecodeError::ColumnOutOfRange`].
pub fn is_legal_pair(
    table: &Table,
    column: usize,
    agg: AggOp,
) -> SDResult<bool> {
    if column == table.sentinel_column() && column >= table.types.len() {
        return Ok(agg.allowed_on_text());
    }
    match table.column_type(column)? {
        ColumnType::Text => Ok(agg.allowed_on_text()),
        ColumnType::Real => Ok(true),
        ColumnType::Other(tag) => Err(SqlDecodeError::UnknownColumnType {
            column,
            tag: tag.clone(),
        }),
    }
}

/// Check each selected `(column, aggregation)` pair of a query.
///
/// ## Returns
/// One verdict per select slot; a slot with no aggregation is checked as
/// [`AggOp::None`].
pub fn check_sc_sa_pairs(
    table: &Table,
    query: &StructuredQuery,
) -> SDResult<Vec<bool>> {
    query
        .sel
        .iter()
        .enumerate()
        .map(|(idx, &column)| {
            is_legal_pair(
                table,
                column,
                query.agg.get(idx).copied().unwrap_or_default(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(types: &str) -> Table {
        serde_json::from_str(&format!(
            r#"{{"id": "t", "header": ["name", "age"], "types": {types}, "rows": []}}"#
        ))
        .unwrap()
    }

    fn query(
        sel: Vec<usize>,
        agg: Vec<AggOp>,
    ) -> StructuredQuery {
        StructuredQuery {
            sel,
            agg,
            ..Default::default()
        }
    }

    #[test]
    fn test_text_columns() {
        let t = table(r#"["text", "real"]"#);
        let verdicts = check_sc_sa_pairs(
            &t,
            &query(vec![0, 0, 0], vec![AggOp::None, AggOp::Count, AggOp::Avg]),
        )
        .unwrap();
        assert_eq!(verdicts, vec![true, true, false]);
    }

    #[test]
    fn test_real_columns() {
        let t = table(r#"["text", "real"]"#);
        for agg in [AggOp::Sum, AggOp::Max, AggOp::None] {
            assert!(is_legal_pair(&t, 1, agg).unwrap());
        }
    }

    #[test]
    fn test_sentinel_column() {
        let t = table(r#"["text", "real"]"#);
        assert!(is_legal_pair(&t, 2, AggOp::Count).unwrap());
        assert!(!is_legal_pair(&t, 2, AggOp::Sum).unwrap());
        assert!(matches!(
            is_legal_pair(&t, 3, AggOp::None),
            Err(SqlDecodeError::ColumnOutOfRange { column: 3, .. })
        ));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let t = table(r#"["text", "date"]"#);
        assert!(matches!(
            check_sc_sa_pairs(&t, &query(vec![1], vec![AggOp::None])),
            Err(SqlDecodeError::UnknownColumnType { column: 1, .. })
        ));
    }
}
