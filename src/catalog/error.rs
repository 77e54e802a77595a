//! Catalog lookup and registration errors.

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while building or querying a [`SemanticCatalog`](super::SemanticCatalog).
///
/// Lookup failures always carry the offending name so callers can surface it
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Entity '{0}' not found in catalog")]
    EntityNotFound(String),

    #[error("Dimension '{0}' not found in catalog")]
    DimensionNotFound(String),

    #[error("Metric '{0}' not found in catalog")]
    MetricNotFound(String),

    #[error("No entity owns table '{0}'")]
    TableNotFound(String),

    #[error("Table '{table}' is ambiguous: owned by {}", entities.join(", "))]
    AmbiguousTable { table: String, entities: Vec<String> },

    #[error("Duplicate entity name: '{0}'")]
    DuplicateEntity(String),

    #[error("Dimension '{name}' is declared more than once (entities: {})", entities.join(", "))]
    DuplicateDimension { name: String, entities: Vec<String> },

    #[error("Metric '{name}' is declared more than once (entities: {})", entities.join(", "))]
    DuplicateMetric { name: String, entities: Vec<String> },

    #[error("Entity '{entity}' declares relationship '{name}' more than once")]
    DuplicateRelationship { entity: String, name: String },

    #[error("{kind} '{name}' is registered on entity '{owner}' but declares entity '{declared}'")]
    EntityMismatch {
        kind: &'static str,
        name: String,
        owner: String,
        declared: String,
    },

    #[error("Relationship '{relationship}' points to unknown entity '{target}'")]
    UnknownRelationshipTarget { relationship: String, target: String },

    #[error("Relationship '{0}' has no join conditions")]
    EmptyJoinConditions(String),

    #[error("Metric '{metric}' uses unknown time dimension '{dimension}'")]
    UnknownTimeDimension { metric: String, dimension: String },

    #[error("Metric '{metric}' requires unknown dimension '{dimension}'")]
    UnknownRequiredDimension { metric: String, dimension: String },
}
