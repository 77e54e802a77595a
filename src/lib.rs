//! # intentql
//!
//! Compiles structured business-query intents into deterministic SQL,
//! validated against a semantic catalog.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     QueryIntent                          │
//! │  (metric, dimensions, time range, filters, limit)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SemanticCatalog                         │
//! │  (entities, dimensions, metrics, relationship graph)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [planner: join paths + aliases]
//! ┌─────────────────────────────────────────────────────────┐
//! │               SQL templates + dialects                   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │            CompiledQuery (SQL + metadata)                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Compilation is pure: the same intent, catalog and options always produce
//! byte-identical SQL.

pub mod catalog;
pub mod compile;
pub mod config;
pub mod hash;
pub mod intent;
pub mod logging;
pub mod planner;
pub mod sql;
pub mod validation;

// Re-export SQL submodules at crate level for convenience
pub use sql::dialect;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::samples::SampleCatalog;
    pub use crate::catalog::{
        AggregationType, CatalogBuilder, DataType, Dimension, Entity, Metric, Relationship,
        RelationshipKind, SemanticCatalog,
    };
    pub use crate::compile::{CompileError, CompileOptions, CompiledQuery, SqlCompiler};
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::intent::{
        FilterCondition, FilterOperator, QueryIntent, TimeRange, TimeRangeType,
    };
    pub use crate::validation::{SemanticValidator, ValidationIssue};
}

pub use catalog::SemanticCatalog;
pub use compile::{compile, CompiledQuery, SqlCompiler};
pub use dialect::Dialect;
pub use intent::QueryIntent;
