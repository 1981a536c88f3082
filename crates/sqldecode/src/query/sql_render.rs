//! # SQL Rendering
//!
//! Human-readable SQL text for a [`StructuredQuery`] against its [`Table`].

use crate::{
    errors::SDResult,
    query::{AggOp, CondValue, StructuredQuery},
    table::Table,
};

/// Render a query as SQL text.
///
/// ```text
/// SELECT MAX(age), name FROM people WHERE name = Bob AND age > 20
/// ```
///
/// Conditions on the synthetic "no filter" column are omitted.
///
/// ## Arguments
/// * `query` - The query; every column must exist in `table`.
/// * `table` - The table supplying header names.
///
/// ## Returns
/// The SQL text, or [`crate::SqlDecodeError::ColumnOutOfRange`].
pub fn render_sql(
    query: &StructuredQuery,
    table: &Table,
) -> SDResult<String> {
    let mut projection = Vec::with_capacity(query.sel.len());
    for (idx, &column) in query.sel.iter().enumerate() {
        let header = table.column_header(column)?;
        projection.push(match query.agg.get(idx).copied().unwrap_or_default() {
            AggOp::None => header.to_string(),
            agg => format!("{agg}({header})"),
        });
    }

    let mut sql = format!("SELECT {}", projection.join(", "));
    if !table.name.is_empty() {
        sql.push_str(" FROM ");
        sql.push_str(&table.name);
    }

    let sentinel = table.sentinel_column();
    let joiner = match query.cond_conn_op.to_string() {
        s if s.is_empty() => "AND".to_string(),
        s => s,
    };

    let mut first = true;
    for cond in query.conds.iter().filter(|c| c.column != sentinel) {
        let header = table.column_header(cond.column)?;
        sql.push_str(if first { " WHERE " } else { " " });
        if !first {
            sql.push_str(&joiner);
            sql.push(' ');
        }
        first = false;

        let value = match &cond.value {
            CondValue::Text(s) => s.clone(),
            span => span.to_string(),
        };
        sql.push_str(&format!("{header} {} {value}", cond.op));
    }

    Ok(sql)
}
