//! Tabular query results via DuckDB
//!
//! DuckDB can also attach PostgreSQL, MySQL and SQLite databases through its
//! extensions, so any of those can be exported with setup statements.

mod engine;

pub use engine::{duckdb_value_to_value, DuckDbSource, DEFAULT_PREFETCH_ROWS};
