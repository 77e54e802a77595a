//! Join planning - connects the entities a query touches.
//!
//! Two pieces:
//! 1. [`AliasManager`]: collision-free table aliases for one compilation
//! 2. [`JoinResolver`]: relationship paths from the primary entity to every
//!    other involved entity, rendered as JOIN clauses

pub mod alias;
pub mod resolver;

pub use alias::{base_alias, AliasManager};
pub use resolver::{JoinClause, JoinResolver, ResolvedJoins};

use thiserror::Error;

/// Errors that can occur during join planning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinPathError {
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("unknown relationship '{0}'")]
    UnknownRelationship(String),

    #[error("cannot reach entities: {} (from '{start}')", missing.join(", "))]
    Unreachable { start: String, missing: Vec<String> },

    #[error("join condition '{reference}' of relationship '{relationship}' does not belong to entity '{entity}'")]
    InvalidJoinCondition {
        relationship: String,
        reference: String,
        entity: String,
    },
}

pub type JoinResult<T> = Result<T, JoinPathError>;
