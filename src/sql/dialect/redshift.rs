//! Amazon Redshift SQL dialect.
//!
//! Redshift is PostgreSQL-based:
//! - ANSI identifier quoting (`"`)
//! - Identifiers are case-insensitive unless `enable_case_sensitive_identifier` is on

use super::helpers;
use super::SqlDialect;

/// Amazon Redshift SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Redshift;

impl SqlDialect for Redshift {
    fn name(&self) -> &'static str {
        "redshift"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_keyword(b)
    }
}
