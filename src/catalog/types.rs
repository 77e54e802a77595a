//! Typed catalog definitions: dimensions, metrics, relationships and entities.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{CatalogError, CatalogResult};
use crate::sql::dialect::{Dialect, SqlDialect};

/// Data type of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
    Datetime,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::Datetime => "datetime",
        }
    }

    /// Date-like types can drive a time range filter.
    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::Datetime)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregation applied to a metric's measure expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationType {
    #[serde(alias = "SUM")]
    Sum,
    #[serde(alias = "COUNT")]
    Count,
    #[serde(alias = "COUNT_DISTINCT")]
    CountDistinct,
    #[serde(alias = "AVG")]
    Avg,
    #[serde(alias = "MIN")]
    Min,
    #[serde(alias = "MAX")]
    Max,
}

impl AggregationType {
    /// SQL aggregate function name.
    pub fn function_name(&self) -> &'static str {
        match self {
            AggregationType::Sum => "SUM",
            AggregationType::Count | AggregationType::CountDistinct => "COUNT",
            AggregationType::Avg => "AVG",
            AggregationType::Min => "MIN",
            AggregationType::Max => "MAX",
        }
    }

    /// Wrap an already-rendered measure expression in this aggregation.
    ///
    /// `COUNT_DISTINCT` renders as `COUNT(DISTINCT expr)`.
    pub fn apply(&self, expr: &str) -> String {
        match self {
            AggregationType::CountDistinct => format!("COUNT(DISTINCT {})", expr),
            other => format!("{}({})", other.function_name(), expr),
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationType::CountDistinct => write!(f, "COUNT_DISTINCT"),
            other => write!(f, "{}", other.function_name()),
        }
    }
}

/// Cardinality of a relationship, read from the `from` side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    OneToMany,
    ManyToOne,
    OneToOne,
}

impl RelationshipKind {
    /// Reverse the cardinality (swap left/right sides).
    pub fn reverse(self) -> Self {
        match self {
            RelationshipKind::OneToMany => RelationshipKind::ManyToOne,
            RelationshipKind::ManyToOne => RelationshipKind::OneToMany,
            RelationshipKind::OneToOne => RelationshipKind::OneToOne,
        }
    }

    pub fn join_type(&self) -> JoinType {
        match self {
            RelationshipKind::OneToMany | RelationshipKind::ManyToOne => JoinType::Left,
            RelationshipKind::OneToOne => JoinType::Inner,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::OneToMany => write!(f, "1:N"),
            RelationshipKind::ManyToOne => write!(f, "N:1"),
            RelationshipKind::OneToOne => write!(f, "1:1"),
        }
    }
}

/// JOIN keyword emitted for a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Left,
    Inner,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Left => "LEFT JOIN",
            JoinType::Inner => "INNER JOIN",
        }
    }
}

/// A groupable / filterable attribute of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub data_type: DataType,
    /// Physical column name.
    pub column_name: String,
    /// Owning entity.
    pub entity_name: String,
    /// Expression replacing the bare column reference, e.g. `DATE(created_at)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Dimension {
    pub fn new(
        name: impl Into<String>,
        entity_name: impl Into<String>,
        column_name: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            data_type,
            column_name: column_name.into(),
            entity_name: entity_name.into(),
            sql_expression: None,
            format: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_expression(mut self, sql: impl Into<String>) -> Self {
        self.sql_expression = Some(sql.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// An aggregatable business measure attached to one primary entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub aggregation: AggregationType,
    /// Pre-aggregation measure. Bare identifiers are columns of the owning
    /// entity; `{schema.table.column}` reaches into another entity.
    pub sql_expression: String,
    pub entity_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_dimension: Option<String>,
    #[serde(default)]
    pub required_dimensions: Vec<String>,
    pub format: String,
}

impl Metric {
    pub fn new(
        name: impl Into<String>,
        entity_name: impl Into<String>,
        aggregation: AggregationType,
        sql_expression: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            aggregation,
            sql_expression: sql_expression.into(),
            entity_name: entity_name.into(),
            time_dimension: None,
            required_dimensions: Vec::new(),
            format: "number".to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_time_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.time_dimension = Some(dimension.into());
        self
    }

    pub fn requires(mut self, dimension: impl Into<String>) -> Self {
        self.required_dimensions.push(dimension.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

/// One equality in a relationship's ON clause.
///
/// `left` belongs to the relationship's `from` entity and `right` to its `to`
/// entity. Either side may be written `column`, `table.column` or
/// `schema.table.column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCondition {
    pub left: String,
    pub right: String,
}

impl JoinCondition {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// A directed, typed join definition between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub name: String,
    pub from_entity: String,
    pub to_entity: String,
    pub kind: RelationshipKind,
    pub join_conditions: Vec<JoinCondition>,
}

impl Relationship {
    pub fn new(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        kind: RelationshipKind,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            kind,
            join_conditions: Vec::new(),
        }
    }

    /// Add a join condition (`from.left = to.right`).
    pub fn on(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.join_conditions.push(JoinCondition::new(left, right));
        self
    }

    pub fn join_type(&self) -> JoinType {
        self.kind.join_type()
    }
}

/// A catalog-level stand-in for a schema-qualified physical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub name: String,
    pub description: String,
    /// Database (catalog) name. Informational; never emitted in SQL.
    pub database: Option<String>,
    pub schema: String,
    pub table: String,
    /// Overrides the alias base computed from schema and table initials.
    pub alias_prefix: Option<String>,
    pub dialect: Dialect,
    pub primary_key: Option<String>,
    pub dimensions: BTreeMap<String, Dimension>,
    pub metrics: BTreeMap<String, Metric>,
    /// Outgoing relationships, keyed by relationship name.
    pub relationships: BTreeMap<String, Relationship>,
}

impl Entity {
    pub fn new(name: impl Into<String>, schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            database: None,
            schema: schema.into(),
            table: table.into(),
            alias_prefix: None,
            dialect: Dialect::default(),
            primary_key: None,
            dimensions: BTreeMap::new(),
            metrics: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_alias_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.alias_prefix = Some(prefix.into());
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    /// Attach a dimension. A later dimension with the same name replaces the earlier one.
    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.insert(dimension.name.clone(), dimension);
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.insert(metric.name.clone(), metric);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships
            .insert(relationship.name.clone(), relationship);
        self
    }

    /// Attach a dimension, rejecting a name already used on this entity.
    pub fn add_dimension(&mut self, dimension: Dimension) -> CatalogResult<()> {
        if self.dimensions.contains_key(&dimension.name) {
            return Err(CatalogError::DuplicateDimension {
                name: dimension.name,
                entities: vec![self.name.clone(), self.name.clone()],
            });
        }
        self.dimensions.insert(dimension.name.clone(), dimension);
        Ok(())
    }

    pub fn add_metric(&mut self, metric: Metric) -> CatalogResult<()> {
        if self.metrics.contains_key(&metric.name) {
            return Err(CatalogError::DuplicateMetric {
                name: metric.name,
                entities: vec![self.name.clone(), self.name.clone()],
            });
        }
        self.metrics.insert(metric.name.clone(), metric);
        Ok(())
    }

    pub fn add_relationship(&mut self, relationship: Relationship) -> CatalogResult<()> {
        if self.relationships.contains_key(&relationship.name) {
            return Err(CatalogError::DuplicateRelationship {
                entity: self.name.clone(),
                name: relationship.name,
            });
        }
        self.relationships
            .insert(relationship.name.clone(), relationship);
        Ok(())
    }

    /// Quote an identifier with this entity's dialect.
    pub fn quote(&self, ident: &str) -> String {
        self.dialect.quote_identifier(ident)
    }

    /// Dialect-quoted `schema.table`.
    pub fn qualified_table(&self) -> String {
        self.dialect.qualify_table(&self.schema, &self.table)
    }

    /// Physical columns this entity names: dimension columns, the primary
    /// key and the local side of outgoing join conditions.
    pub fn declared_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self
            .dimensions
            .values()
            .map(|d| d.column_name.as_str())
            .chain(self.primary_key.as_deref())
            .chain(
                self.relationships
                    .values()
                    .flat_map(|r| r.join_conditions.iter())
                    .map(|c| c.left.as_str())
                    .filter(|c| !c.contains('.')),
            )
            .collect();
        columns.sort_unstable();
        columns.dedup();
        columns
    }

    /// `alias.quoted_column`.
    pub fn qualified_column(&self, alias: &str, column: &str) -> String {
        format!("{}.{}", alias, self.quote(column))
    }

    /// Whether a `[schema.]table` qualifier names this entity's table.
    pub fn matches_table(&self, schema: Option<&str>, table: &str) -> bool {
        self.table == table && schema.map_or(true, |s| s == self.schema)
    }
}
