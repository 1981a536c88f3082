//! # Tables
//!
//! Headers, per-column type tags, and rows; plus the [`TableStore`]
//! boundary used to look tables up by id.

pub mod data_table;
pub mod table_store;

pub use data_table::{Cell, ColumnType, SENTINEL_HEADER, Table, format_number};
pub use table_store::{InMemoryTableStore, TableStore};
