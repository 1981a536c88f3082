//! # Structured Queries
//!
//! * [`ops`] - the shared field enumerations.
//! * [`StructuredQuery`] - the `{sel, agg, cond_conn_op, conds}` record.
//! * [`render_sql`] - SQL text rendering.

pub mod ops;
pub mod sql_render;
pub mod structured_query;

pub use ops::{AggOp, CondConn, CondOp};
pub use sql_render::render_sql;
pub use structured_query::{CondValue, Condition, StructuredQuery};
