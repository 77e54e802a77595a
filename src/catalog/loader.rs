//! Catalog definition files.
//!
//! A definition is a list of entities, each carrying its dimensions, metrics
//! and outgoing relationships. Owner names are implied by nesting, so a file
//! never repeats the entity name inside its members:
//!
//! ```toml
//! [[entities]]
//! name = "orders"
//! schema = "sales"
//!
//! [[entities.dimensions]]
//! name = "order_date"
//! data_type = "date"
//! column = "created_at"
//! sql_expression = "DATE(created_at)"
//!
//! [[entities.metrics]]
//! name = "revenue"
//! aggregation = "sum"
//! sql_expression = "amount_usd"
//! time_dimension = "order_date"
//!
//! [[entities.relationships]]
//! name = "orders_to_customers"
//! to_entity = "customers"
//! kind = "many_to_one"
//! join_conditions = [{ left = "customer_id", right = "id" }]
//! ```
//!
//! The same shape is accepted as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{
    AggregationType, CatalogBuilder, CatalogError, DataType, Dimension, Entity, JoinCondition,
    Metric, Relationship, RelationshipKind, SemanticCatalog,
};
use crate::sql::dialect::Dialect;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported catalog file extension for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Top-level definition document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDef {
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Defaults to the entity name.
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub alias_prefix: Option<String>,
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub dimensions: Vec<DimensionDef>,
    #[serde(default)]
    pub metrics: Vec<MetricDef>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDef>,
}

fn default_schema() -> String {
    "public".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionDef {
    pub name: String,
    pub data_type: DataType,
    /// Defaults to the dimension name.
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub sql_expression: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricDef {
    pub name: String,
    pub aggregation: AggregationType,
    pub sql_expression: String,
    #[serde(default)]
    pub time_dimension: Option<String>,
    #[serde(default)]
    pub required_dimensions: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipDef {
    pub name: String,
    pub to_entity: String,
    pub kind: RelationshipKind,
    pub join_conditions: Vec<JoinCondition>,
}

impl EntityDef {
    fn into_entity(self) -> Result<Entity, CatalogError> {
        let table = self.table.unwrap_or_else(|| self.name.clone());
        let mut entity = Entity::new(&self.name, self.schema, table)
            .with_description(self.description)
            .with_dialect(self.dialect);
        entity.database = self.database;
        entity.alias_prefix = self.alias_prefix;
        entity.primary_key = self.primary_key;

        for def in self.dimensions {
            let column = def.column.unwrap_or_else(|| def.name.clone());
            let mut dimension = Dimension::new(def.name, &self.name, column, def.data_type)
                .with_description(def.description);
            dimension.sql_expression = def.sql_expression;
            dimension.format = def.format;
            entity.add_dimension(dimension)?;
        }

        for def in self.metrics {
            let mut metric = Metric::new(def.name, &self.name, def.aggregation, def.sql_expression)
                .with_description(def.description);
            metric.time_dimension = def.time_dimension;
            metric.required_dimensions = def.required_dimensions;
            if let Some(format) = def.format {
                metric.format = format;
            }
            entity.add_metric(metric)?;
        }

        for def in self.relationships {
            let mut relationship = Relationship::new(def.name, &self.name, def.to_entity, def.kind);
            relationship.join_conditions = def.join_conditions;
            entity.add_relationship(relationship)?;
        }

        Ok(entity)
    }
}

impl CatalogDef {
    pub fn from_toml_str(content: &str) -> LoadResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> LoadResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Convert into a builder, so callers can add entities before building.
    pub fn into_builder(self) -> LoadResult<CatalogBuilder> {
        let mut builder = CatalogBuilder::new();
        for def in self.entities {
            builder.add_entity(def.into_entity()?);
        }
        Ok(builder)
    }

    pub fn build(self) -> LoadResult<SemanticCatalog> {
        Ok(self.into_builder()?.build()?)
    }
}

pub fn from_toml_str(content: &str) -> LoadResult<SemanticCatalog> {
    CatalogDef::from_toml_str(content)?.build()
}

pub fn from_json_str(content: &str) -> LoadResult<SemanticCatalog> {
    CatalogDef::from_json_str(content)?.build()
}

/// Load a catalog file, picking the format from its extension.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> LoadResult<SemanticCatalog> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let parse: fn(&str) -> LoadResult<SemanticCatalog> = match extension.as_deref() {
        Some("toml") => from_toml_str,
        Some("json") => from_json_str,
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loading catalog definition");
    parse(&content)
}
