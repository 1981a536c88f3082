//! # Execution Accuracy
//!
//! Queries are executed against their table by an [`ExecutionEngine`];
//! a prediction earns credit when it executes, returns rows, and returns
//! the same rows as gold.

use crate::{
    errors::{SDResult, SqlDecodeError},
    query::{AggOp, CondConn, CondOp, Condition, StructuredQuery},
    table::{Cell, Table, TableStore, format_number},
};

/// Result rows, as text.
pub type ResultSet = Vec<Vec<String>>;

/// Executes structured queries against tables.
pub trait ExecutionEngine: Send + Sync {
    /// Execute a query.
    ///
    /// ## Arguments
    /// * `table_id` - The table to run against.
    /// * `sel` - Selected columns.
    /// * `agg` - Aggregation per selected column.
    /// * `conds` - Conditions with textual values.
    /// * `conn` - How the conditions combine.
    fn execute(
        &self,
        table_id: &str,
        sel: &[usize],
        agg: &[AggOp],
        conds: &[Condition],
        conn: CondConn,
    ) -> SDResult<ResultSet>;

    /// Execute a [`StructuredQuery`].
    fn execute_query(
        &self,
        table_id: &str,
        query: &StructuredQuery,
    ) -> SDResult<ResultSet> {
        self.execute(
            table_id,
            &query.sel,
            &query.agg,
            &query.conds,
            query.cond_conn_op,
        )
    }
}

/// Score a prediction by execution.
///
/// A failure to execute either query scores 0, as does an empty
/// predicted result.
pub fn execution_match(
    engine: &dyn ExecutionEngine,
    table_id: &str,
    pred: &StructuredQuery,
    gold: &StructuredQuery,
) -> u8 {
    let gold_rows = match engine.execute_query(table_id, gold) {
        Ok(rows) => rows,
        Err(err) => {
            log::warn!("table {table_id}: gold query failed to execute: {err}");
            return 0;
        }
    };
    match engine.execute_query(table_id, pred) {
        Ok(rows) => u8::from(!rows.is_empty() && rows == gold_rows),
        Err(err) => {
            log::debug!("table {table_id}: predicted query failed to execute: {err}");
            0
        }
    }
}

/// An [`ExecutionEngine`] evaluating queries directly over a [`TableStore`].
///
/// Conditions on the synthetic "no filter" column match every row. `=`
/// and `!=` compare numerically when both sides are numbers and as
/// case-insensitive text otherwise; `>` and `<` only hold between numbers.
/// With any aggregation the result is a single row.
#[derive(Debug, Clone)]
pub struct TableEngine<S: TableStore> {
    store: S,
}

impl<S: TableStore> TableEngine<S> {
    /// Create an engine over a table store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

fn cell_number(cell: Option<&Cell>) -> Option<f64> {
    cell.and_then(Cell::number)
}

fn holds(
    cell: Option<&Cell>,
    op: CondOp,
    value: &str,
) -> bool {
    let target = value.trim().parse::<f64>().ok();
    let numbers = cell_number(cell).zip(target);
    let equal = || match numbers {
        Some((a, b)) => (a - b).abs() < 1e-9,
        None => cell.is_some_and(|c| c.text().to_lowercase() == value.to_lowercase()),
    };
    match op {
        CondOp::Eq => equal(),
        CondOp::Ne => !equal(),
        CondOp::Gt => numbers.is_some_and(|(a, b)| a > b),
        CondOp::Lt => numbers.is_some_and(|(a, b)| a < b),
    }
}

fn aggregate(
    rows: &[&Vec<Cell>],
    column: usize,
    agg: AggOp,
) -> String {
    let numbers = || rows.iter().filter_map(|r| cell_number(r.get(column)));
    let value = match agg {
        AggOp::None => {
            return rows
                .first()
                .and_then(|r| r.get(column))
                .map(|c| c.text().into_owned())
                .unwrap_or_default();
        }
        AggOp::Count => Some(rows.len() as f64),
        AggOp::Sum => numbers().reduce(|a, b| a + b),
        AggOp::Max => numbers().reduce(f64::max),
        AggOp::Min => numbers().reduce(f64::min),
        AggOp::Avg => {
            let xs: Vec<f64> = numbers().collect();
            (!xs.is_empty()).then(|| xs.iter().sum::<f64>() / xs.len() as f64)
        }
    };
    value.map(format_number).unwrap_or_default()
}

fn check_column(
    table: &Table,
    column: usize,
) -> SDResult<()> {
    table.column_header(column).map(|_| ())
}

impl<S: TableStore> ExecutionEngine for TableEngine<S> {
    fn execute(
        &self,
        table_id: &str,
        sel: &[usize],
        agg: &[AggOp],
        conds: &[Condition],
        conn: CondConn,
    ) -> SDResult<ResultSet> {
        let table = self.store.table(table_id)?;
        for &column in sel {
            check_column(table, column)?;
        }

        let sentinel = table.sentinel_column();
        let mut filters = Vec::with_capacity(conds.len());
        for (slot, cond) in conds.iter().enumerate() {
            if cond.column == sentinel {
                continue;
            }
            check_column(table, cond.column)?;
            let value = cond
                .value
                .as_text()
                .ok_or(SqlDecodeError::MissingValueSpan { slot })?;
            filters.push((cond.column, cond.op, value));
        }

        let keep = |row: &Vec<Cell>| {
            let mut results = filters
                .iter()
                .map(|&(column, op, value)| holds(row.get(column), op, value));
            match conn {
                CondConn::Or => filters.is_empty() || results.any(|ok| ok),
                CondConn::None | CondConn::And => results.all(|ok| ok),
            }
        };
        let rows: Vec<&Vec<Cell>> = table.rows.iter().filter(|r| keep(*r)).collect();

        let aggs: Vec<AggOp> = (0..sel.len())
            .map(|i| agg.get(i).copied().unwrap_or_default())
            .collect();
        if aggs.iter().all(|&a| a == AggOp::None) {
            return Ok(rows
                .iter()
                .map(|r| {
                    sel.iter()
                        .map(|&c| r.get(c).map(|x| x.text().into_owned()).unwrap_or_default())
                        .collect()
                })
                .collect());
        }

        Ok(vec![
            sel.iter()
                .zip(&aggs)
                .map(|(&column, &a)| aggregate(&rows, column, a))
                .collect(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::InMemoryTableStore;

    fn engine() -> TableEngine<InMemoryTableStore> {
        let table: Table = serde_json::from_str(
            r#"{"id": "t", "header": ["name", "age"], "types": ["text", "real"],
                "rows": [["Alice", "30"], ["Bob", "25"], ["Carol", 41]]}"#,
        )
        .unwrap();
        TableEngine::new([table].into_iter().collect())
    }

    fn query(
        sel: Vec<usize>,
        agg: Vec<AggOp>,
        conn: CondConn,
        conds: Vec<Condition>,
    ) -> StructuredQuery {
        StructuredQuery {
            sel,
            agg,
            cond_conn_op: conn,
            conds,
        }
    }

    #[test]
    fn test_filter_and_project() {
        let q = query(
            vec![1],
            vec![AggOp::None],
            CondConn::None,
            vec![Condition::new(0, CondOp::Eq, "bob")],
        );
        assert_eq!(engine().execute_query("t", &q).unwrap(), vec![vec!["25"]]);
    }

    #[test]
    fn test_numeric_comparisons() {
        let q = query(
            vec![0],
            vec![AggOp::None],
            CondConn::Or,
            vec![
                Condition::new(1, CondOp::Gt, "40"),
                Condition::new(1, CondOp::Lt, "26"),
            ],
        );
        assert_eq!(
            engine().execute_query("t", &q).unwrap(),
            vec![vec!["Bob"], vec!["Carol"]]
        );
    }

    #[test]
    fn test_aggregations() {
        let q = query(vec![1, 0], vec![AggOp::Avg, AggOp::Count], CondConn::None, vec![]);
        assert_eq!(
            engine().execute_query("t", &q).unwrap(),
            vec![vec!["32", "3"]]
        );

        let q = query(
            vec![1],
            vec![AggOp::Max],
            CondConn::None,
            vec![Condition::new(2, CondOp::Eq, "Null")],
        );
        assert_eq!(engine().execute_query("t", &q).unwrap(), vec![vec!["41"]]);
    }

    #[test]
    fn test_errors() {
        let q = query(vec![5], vec![AggOp::None], CondConn::None, vec![]);
        assert!(matches!(
            engine().execute_query("t", &q),
            Err(SqlDecodeError::ColumnOutOfRange { column: 5, .. })
        ));
        assert!(matches!(
            engine().execute_query("missing", &q),
            Err(SqlDecodeError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_execution_match() {
        let e = engine();
        let gold = query(
            vec![1],
            vec![AggOp::None],
            CondConn::None,
            vec![Condition::new(0, CondOp::Eq, "Bob")],
        );
        let same_rows = query(
            vec![1],
            vec![AggOp::None],
            CondConn::None,
            vec![Condition::new(1, CondOp::Lt, "26")],
        );
        assert_eq!(execution_match(&e, "t", &same_rows, &gold), 1);

        let empty = query(
            vec![1],
            vec![AggOp::None],
            CondConn::None,
            vec![Condition::new(0, CondOp::Eq, "Dave")],
        );
        assert_eq!(execution_match(&e, "t", &empty, &empty), 0);

        let broken = query(vec![9], vec![AggOp::None], CondConn::None, vec![]);
        assert_eq!(execution_match(&e, "t", &broken, &gold), 0);
    }
}
