//! Semantic catalog - the single source of truth for entities, dimensions,
//! metrics and relationships.
//!
//! A catalog is assembled once with [`CatalogBuilder`] (from code, from a
//! definition file via [`loader`], or from one of the [`samples`]) and is
//! immutable afterwards. All registration rules are enforced at build time:
//!
//! - dimensions and metrics declare the entity that owns them,
//! - dimension and metric names are unique across the whole catalog,
//! - relationships start at their owner and end at a known entity,
//! - metric time dimensions and required dimensions exist.
//!
//! Entities are kept in name order, so every scan over the catalog is
//! deterministic across processes.

mod error;
pub mod graph;
pub mod loader;
pub mod samples;
mod types;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::info;

pub use error::{CatalogError, CatalogResult};
pub use graph::{Direction, JoinPath, JoinStep, RelationshipGraph};
pub use types::{
    AggregationType, DataType, Dimension, Entity, JoinCondition, JoinType, Metric, Relationship,
    RelationshipKind,
};

/// Immutable catalog of entities and their relationship graph.
#[derive(Debug, Clone)]
pub struct SemanticCatalog {
    entities: BTreeMap<String, Entity>,
    graph: RelationshipGraph,
    /// dimension name -> owning entity
    dimension_index: BTreeMap<String, String>,
    /// metric name -> owning entity
    metric_index: BTreeMap<String, String>,
}

impl SemanticCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    pub fn entity(&self, name: &str) -> CatalogResult<&Entity> {
        self.entities
            .get(name)
            .ok_or_else(|| CatalogError::EntityNotFound(name.to_string()))
    }

    /// Look up a dimension by name across all entities.
    pub fn dimension(&self, name: &str) -> CatalogResult<&Dimension> {
        self.dimension_index
            .get(name)
            .and_then(|entity| self.entities.get(entity))
            .and_then(|entity| entity.dimensions.get(name))
            .ok_or_else(|| CatalogError::DimensionNotFound(name.to_string()))
    }

    /// Look up a metric by name across all entities.
    pub fn metric(&self, name: &str) -> CatalogResult<&Metric> {
        self.metric_index
            .get(name)
            .and_then(|entity| self.entities.get(entity))
            .and_then(|entity| entity.metrics.get(name))
            .ok_or_else(|| CatalogError::MetricNotFound(name.to_string()))
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimension_index.contains_key(name)
    }

    pub fn has_metric(&self, name: &str) -> bool {
        self.metric_index.contains_key(name)
    }

    /// Resolve a `[schema.]table` qualifier to the entity owning that table.
    pub fn entity_for_table(&self, schema: Option<&str>, table: &str) -> CatalogResult<&Entity> {
        let matches: Vec<&Entity> = self
            .entities
            .values()
            .filter(|e| e.matches_table(schema, table))
            .collect();

        let qualified = match schema {
            Some(schema) => format!("{}.{}", schema, table),
            None => table.to_string(),
        };

        match matches.as_slice() {
            [] => Err(CatalogError::TableNotFound(qualified)),
            [entity] => Ok(entity),
            many => Err(CatalogError::AmbiguousTable {
                table: qualified,
                entities: many.iter().map(|e| e.name.clone()).collect(),
            }),
        }
    }

    /// All entities in name order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// All dimensions in (entity, dimension) name order.
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.entities.values().flat_map(|e| e.dimensions.values())
    }

    /// All metrics in (entity, metric) name order.
    pub fn metrics(&self) -> impl Iterator<Item = &Metric> {
        self.entities.values().flat_map(|e| e.metrics.values())
    }

    pub fn relationship(&self, owner: &str, name: &str) -> CatalogResult<&Relationship> {
        self.entity(owner)?
            .relationships
            .get(name)
            .ok_or_else(|| CatalogError::EntityNotFound(format!("{}.{}", owner, name)))
    }

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    /// Whether `to` can be reached from `from` through any chain of relationships.
    pub fn join_path_exists(&self, from: &str, to: &str) -> bool {
        from == to || self.graph.has_path(from, to)
    }

    /// Listing of available metrics and dimensions.
    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            entities: self
                .entities
                .values()
                .map(|e| EntitySummary {
                    name: e.name.clone(),
                    schema: e.schema.clone(),
                    table: e.table.clone(),
                    dialect: e.dialect.to_string(),
                })
                .collect(),
            metrics: self
                .metrics()
                .map(|m| MetricSummary {
                    name: m.name.clone(),
                    description: m.description.clone(),
                    aggregation: m.aggregation.to_string(),
                    entity: m.entity_name.clone(),
                    time_dimension: m.time_dimension.clone(),
                    format: m.format.clone(),
                })
                .collect(),
            dimensions: self
                .dimensions()
                .map(|d| DimensionSummary {
                    name: d.name.clone(),
                    description: d.description.clone(),
                    data_type: d.data_type,
                    entity: d.entity_name.clone(),
                })
                .collect(),
        }
    }
}

/// Serializable listing of a catalog's contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub entities: Vec<EntitySummary>,
    pub metrics: Vec<MetricSummary>,
    pub dimensions: Vec<DimensionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub name: String,
    pub schema: String,
    pub table: String,
    pub dialect: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub name: String,
    pub description: String,
    pub aggregation: String,
    pub entity: String,
    pub time_dimension: Option<String>,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSummary {
    pub name: String,
    pub description: String,
    pub data_type: DataType,
    pub entity: String,
}

/// Collects entities and validates them into a [`SemanticCatalog`].
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    entities: Vec<Entity>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn add_entity(&mut self, entity: Entity) -> &mut Self {
        self.entities.push(entity);
        self
    }

    /// Validate registrations and freeze the catalog.
    pub fn build(self) -> CatalogResult<SemanticCatalog> {
        let mut entities: BTreeMap<String, Entity> = BTreeMap::new();
        for entity in self.entities {
            if entities.contains_key(&entity.name) {
                return Err(CatalogError::DuplicateEntity(entity.name));
            }
            check_ownership(&entity)?;
            entities.insert(entity.name.clone(), entity);
        }

        let dimension_index = index_names(&entities, |e| e.dimensions.keys(), |name, owners| {
            CatalogError::DuplicateDimension {
                name,
                entities: owners,
            }
        })?;
        let metric_index = index_names(&entities, |e| e.metrics.keys(), |name, owners| {
            CatalogError::DuplicateMetric {
                name,
                entities: owners,
            }
        })?;

        for entity in entities.values() {
            for metric in entity.metrics.values() {
                if let Some(time_dimension) = &metric.time_dimension {
                    if !dimension_index.contains_key(time_dimension) {
                        return Err(CatalogError::UnknownTimeDimension {
                            metric: metric.name.clone(),
                            dimension: time_dimension.clone(),
                        });
                    }
                }
                for required in &metric.required_dimensions {
                    if !dimension_index.contains_key(required) {
                        return Err(CatalogError::UnknownRequiredDimension {
                            metric: metric.name.clone(),
                            dimension: required.clone(),
                        });
                    }
                }
            }
        }

        let graph = RelationshipGraph::build(&entities)?;

        info!(
            entities = graph.entity_count(),
            relationships = graph.relationship_count(),
            dimensions = dimension_index.len(),
            metrics = metric_index.len(),
            "semantic catalog built"
        );

        Ok(SemanticCatalog {
            entities,
            graph,
            dimension_index,
            metric_index,
        })
    }
}

fn check_ownership(entity: &Entity) -> CatalogResult<()> {
    let mismatch = |kind: &'static str, name: &str, declared: &str| CatalogError::EntityMismatch {
        kind,
        name: name.to_string(),
        owner: entity.name.clone(),
        declared: declared.to_string(),
    };

    for dimension in entity.dimensions.values() {
        if dimension.entity_name != entity.name {
            return Err(mismatch("Dimension", &dimension.name, &dimension.entity_name));
        }
    }
    for metric in entity.metrics.values() {
        if metric.entity_name != entity.name {
            return Err(mismatch("Metric", &metric.name, &metric.entity_name));
        }
    }
    for relationship in entity.relationships.values() {
        if relationship.from_entity != entity.name {
            return Err(mismatch(
                "Relationship",
                &relationship.name,
                &relationship.from_entity,
            ));
        }
        if relationship.join_conditions.is_empty() {
            return Err(CatalogError::EmptyJoinConditions(relationship.name.clone()));
        }
    }
    Ok(())
}

/// Map each name to its owning entity, failing on names declared by more than one entity.
fn index_names<'a, F, I, E>(
    entities: &'a BTreeMap<String, Entity>,
    names: F,
    duplicate: E,
) -> CatalogResult<BTreeMap<String, String>>
where
    F: Fn(&'a Entity) -> I,
    I: Iterator<Item = &'a String>,
    E: Fn(String, Vec<String>) -> CatalogError,
{
    let mut owners: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for entity in entities.values() {
        for name in names(entity) {
            owners
                .entry(name.clone())
                .or_default()
                .insert(entity.name.clone());
        }
    }

    let mut index = BTreeMap::new();
    for (name, owning) in owners {
        if owning.len() > 1 {
            return Err(duplicate(name, owning.into_iter().collect()));
        }
        if let Some(owner) = owning.into_iter().next() {
            index.insert(name, owner);
        }
    }
    Ok(index)
}
