//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the dialect differences
//! that matter to generated analytical queries:
//!
//! - Identifier quoting: `"` (PG/Redshift/Snowflake/DuckDB), `` ` `` (BigQuery/MySQL/Databricks)
//! - Table qualification: `schema.table`
//! - Boolean and string literals
//! - Row limiting
//!
//! # Usage
//!
//! ```
//! use intentql::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! assert_eq!(dialect.quote_identifier("user"), "\"user\"");
//! assert_eq!(dialect.qualify_table("sales", "orders"), "\"sales\".\"orders\"");
//! ```

mod bigquery;
mod databricks;
mod duckdb;
pub mod helpers;
mod mysql;
mod postgres;
mod redshift;
mod snowflake;

pub use bigquery::BigQuery;
pub use databricks::Databricks;
pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use redshift::Redshift;
pub use snowflake::Snowflake;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (schema, table, column, output name).
    ///
    /// - PostgreSQL/Redshift/Snowflake/DuckDB: `"identifier"`
    /// - BigQuery/MySQL/Databricks: `` `identifier` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    /// Emit the row-limit clause.
    fn emit_limit(&self, limit: u64) -> String {
        helpers::emit_limit_standard(limit)
    }

    /// Schema-qualified, quoted table name.
    fn qualify_table(&self, schema: &str, table: &str) -> String {
        format!(
            "{}.{}",
            self.quote_identifier(schema),
            self.quote_identifier(table)
        )
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Redshift,
    Snowflake,
    DuckDb,
    BigQuery,
    MySql,
    Databricks,
}

impl Dialect {
    /// Every supported dialect, in declaration order.
    pub const ALL: [Dialect; 7] = [
        Dialect::Postgres,
        Dialect::Redshift,
        Dialect::Snowflake,
        Dialect::DuckDb,
        Dialect::BigQuery,
        Dialect::MySql,
        Dialect::Databricks,
    ];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::Redshift => &Redshift,
            Dialect::Snowflake => &Snowflake,
            Dialect::DuckDb => &DuckDb,
            Dialect::BigQuery => &BigQuery,
            Dialect::MySql => &MySql,
            Dialect::Databricks => &Databricks,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn emit_limit(&self, limit: u64) -> String {
        self.dialect().emit_limit(limit)
    }

    fn qualify_table(&self, schema: &str, table: &str) -> String {
        self.dialect().qualify_table(schema, table)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

/// Error for an unrecognised dialect name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SQL dialect '{0}' (expected one of: postgres, redshift, snowflake, duckdb, bigquery, mysql, databricks)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "redshift" => Ok(Dialect::Redshift),
            "snowflake" => Ok(Dialect::Snowflake),
            "duckdb" => Ok(Dialect::DuckDb),
            "bigquery" | "bq" => Ok(Dialect::BigQuery),
            "mysql" => Ok(Dialect::MySql),
            "databricks" | "spark" => Ok(Dialect::Databricks),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}
