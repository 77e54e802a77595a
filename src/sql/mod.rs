//! SQL generation module.
//!
//! - [`dialect`] - SQL dialect implementations
//! - [`expr`] - Tokenized catalog expressions and column references
//! - [`time`] - Time range resolution
//! - [`templates`] - Clause renderers and statement assembly

pub mod dialect;
pub mod expr;
pub mod templates;
pub mod time;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{BareColumns, ColumnRef, ExprError, SqlTemplate};
pub use templates::{OrderFallback, RenderError};
pub use time::{resolve_range, DateRange, TimeRangeError};
