//! End-to-end compilation from query intent to SQL.
//!
//! ```text
//! QueryIntent → resolve metric/dimensions → collect entities → resolve joins
//!             → render clauses → assemble SQL + metadata
//! ```
//!
//! # Example
//!
//! ```
//! use intentql::catalog::samples::SampleCatalog;
//! use intentql::compile::SqlCompiler;
//! use intentql::intent::QueryIntent;
//!
//! let catalog = SampleCatalog::MultiSchema.build().unwrap();
//! let intent = QueryIntent::new("revenue").by("country").with_limit(100);
//! let compiled = SqlCompiler::new(&catalog).compile(&intent).unwrap();
//! assert!(compiled.sql.contains("LEFT JOIN \"crm\".\"customers\" cc"));
//! ```
//!
//! The compiler assumes the intent passed semantic validation but never
//! papers over a failure: unknown names, unreachable entities and malformed
//! expressions all surface as [`CompileError`]. Use
//! [`SqlCompiler::compile_checked`] to run validation first.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogError, Dimension, Entity, SemanticCatalog};
use crate::hash;
use crate::intent::{FilterCondition, QueryIntent};
use crate::planner::{JoinPathError, JoinResolver, ResolvedJoins};
use crate::sql::dialect::Dialect;
use crate::sql::expr::{BareColumns, ColumnRef, ExprError, SqlTemplate};
use crate::sql::templates::{self, OrderFallback, RenderError};
use crate::sql::time::{resolve_range, DateRange, TimeRangeError};
use crate::validation::{SemanticValidator, ValidationIssue, DEFAULT_MAX_LIMIT};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Join path error: {0}")]
    JoinPath(#[from] JoinPathError),

    #[error("Expression error: {0}")]
    Expr(#[from] ExprError),

    #[error("Time range error: {0}")]
    TimeRange(#[from] TimeRangeError),

    #[error("Rendering error: {0}")]
    Rendering(#[from] RenderError),

    #[error("Validation failed: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("Reference '{reference}' in an expression of entity '{owner}' does not name a catalog table")]
    UnresolvedReference { reference: String, owner: String },

    #[error("Metric '{0}' has no time dimension but a time range was requested")]
    MissingTimeDimension(String),

    #[error("Query mixes SQL dialects: {}", .0.join(", "))]
    MixedDialects(Vec<String>),

    #[error("Failed to fingerprint intent: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Date relative time ranges are resolved against. `None` means today.
    pub reference_date: Option<NaiveDate>,
    /// Ordering for queries without dimensions.
    pub order_fallback: OrderFallback,
    /// Row limit applied when the intent has none.
    pub default_limit: Option<u64>,
    /// Largest limit `compile_checked` accepts.
    pub max_limit: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            reference_date: None,
            order_fallback: OrderFallback::None,
            default_limit: None,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

impl CompileOptions {
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_order_fallback(mut self, fallback: OrderFallback) -> Self {
        self.order_fallback = fallback;
        self
    }

    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = Some(limit);
        self
    }

    pub fn with_max_limit(mut self, limit: u64) -> Self {
        self.max_limit = limit;
        self
    }

    /// The reference date, falling back to today's local date.
    pub fn effective_reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Compiled SQL plus a description of how it was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub metadata: QueryMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryMetadata {
    pub entities_involved: BTreeSet<String>,
    pub entity_aliases: BTreeMap<String, String>,
    /// Entities in join order, primary entity first.
    pub join_order: Vec<String>,
    pub primary_entity: String,
    pub primary_schema: String,
    pub primary_table: String,
    pub joins_count: usize,
    /// Joins whose two sides live in different schemas.
    pub schema_crossings: usize,
    pub dialect: Dialect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// SHA-256 of the intent and the effective compile options.
    pub fingerprint: String,
}

// ============================================================================
// Compiler
// ============================================================================

/// An expression to render, together with the entity that owns it.
struct OwnedTemplate<'a> {
    owner: &'a Entity,
    template: SqlTemplate,
}

/// Compiles intents against one catalog.
pub struct SqlCompiler<'a> {
    catalog: &'a SemanticCatalog,
    options: CompileOptions,
}

impl<'a> SqlCompiler<'a> {
    pub fn new(catalog: &'a SemanticCatalog) -> Self {
        Self {
            catalog,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Validate the intent, then compile it.
    pub fn compile_checked(&self, intent: &QueryIntent) -> CompileResult<CompiledQuery> {
        SemanticValidator::new(self.catalog)
            .with_max_limit(self.options.max_limit)
            .check(intent)
            .map_err(CompileError::Validation)?;
        self.compile(intent)
    }

    /// Compile an intent without running semantic validation.
    pub fn compile(&self, intent: &QueryIntent) -> CompileResult<CompiledQuery> {
        let metric = self.catalog.metric(&intent.metric)?;
        let primary = self.catalog.entity(&metric.entity_name)?;

        let dimensions = intent
            .dimensions
            .iter()
            .map(|name| self.dimension_template(name))
            .collect::<CompileResult<Vec<_>>>()?;

        let filters = intent
            .filters
            .iter()
            .map(|filter| -> CompileResult<_> {
                Ok((filter, self.dimension_template(&filter.dimension)?))
            })
            .collect::<CompileResult<Vec<_>>>()?;

        let reference_date = self.options.effective_reference_date();
        let time_filter = match &intent.time_range {
            Some(range) => {
                let name = metric
                    .time_dimension
                    .as_deref()
                    .ok_or_else(|| CompileError::MissingTimeDimension(metric.name.clone()))?;
                let (_, template) = self.dimension_template(name)?;
                Some((template, resolve_range(range, reference_date)?))
            }
            None => None,
        };

        let declared = primary.declared_columns();
        let measure = OwnedTemplate {
            owner: primary,
            template: SqlTemplate::parse(&metric.sql_expression, BareColumns::Identifiers(&declared))?,
        };

        // Every expression contributes the entities it references.
        let mut involved: BTreeSet<&'a str> = BTreeSet::from([primary.name.as_str()]);
        let templates = dimensions
            .iter()
            .map(|(_, t)| t)
            .chain(filters.iter().map(|(_, (_, t))| t))
            .chain(time_filter.iter().map(|(t, _)| t))
            .chain(std::iter::once(&measure));
        for owned in templates {
            for reference in owned.template.references() {
                involved.insert(self.reference_entity(reference, owned.owner)?.name.as_str());
            }
        }

        let dialect = self.query_dialect(&involved)?;
        let joins = JoinResolver::new(self.catalog).resolve(&primary.name, involved.iter().copied())?;

        debug!(
            metric = %metric.name,
            primary = %primary.name,
            entities = involved.len(),
            joins = joins.joins.len(),
            "joins resolved"
        );

        let mut select_items = Vec::with_capacity(dimensions.len() + 1);
        for (dimension, owned) in &dimensions {
            let expr = self.render(owned, &joins)?;
            select_items.push(templates::select_item(&expr, &dimension.name, &dialect));
        }
        let measure_sql = metric.aggregation.apply(&self.render(&measure, &joins)?);
        select_items.push(templates::select_item(&measure_sql, &metric.name, &dialect));

        let mut conditions = Vec::new();
        if let Some((owned, range)) = &time_filter {
            conditions.push(templates::time_filter(&self.render(owned, &joins)?, range));
        }
        for (filter, (dimension, owned)) in &filters {
            conditions.push(self.render_filter(filter, dimension, owned, &joins, &dialect)?);
        }

        let primary_alias = joins
            .alias(&primary.name)
            .ok_or_else(|| JoinPathError::UnknownEntity(primary.name.clone()))?;
        let join_sql: Vec<String> = joins.joins.iter().map(|j| j.sql.clone()).collect();
        let limit = intent.limit.or(self.options.default_limit);

        let sql = templates::assemble(&[
            templates::select_clause(&select_items),
            templates::from_clause(primary, primary_alias),
            templates::join_clauses(&join_sql),
            templates::where_clause(&conditions),
            templates::group_by_clause(dimensions.len()),
            templates::order_by_clause(dimensions.len(), self.options.order_fallback),
            templates::limit_clause(limit, &dialect),
        ]);

        let effective = CompileOptions {
            reference_date: Some(reference_date),
            ..self.options.clone()
        };
        let metadata = QueryMetadata {
            entities_involved: involved.iter().map(|e| e.to_string()).collect(),
            entity_aliases: joins.aliases.clone(),
            join_order: joins.join_order.clone(),
            primary_entity: primary.name.clone(),
            primary_schema: primary.schema.clone(),
            primary_table: primary.table.clone(),
            joins_count: joins.joins.len(),
            schema_crossings: joins.schema_crossings(),
            dialect,
            date_range: time_filter.as_ref().map(|(_, range)| *range),
            fingerprint: hash::fingerprint(intent, &effective)?,
        };

        debug!(fingerprint = %metadata.fingerprint, "compiled intent");
        Ok(CompiledQuery { sql, metadata })
    }

    /// A dimension and its expression template.
    fn dimension_template(&self, name: &str) -> CompileResult<(&'a Dimension, OwnedTemplate<'a>)> {
        let dimension = self.catalog.dimension(name)?;
        let owner = self.catalog.entity(&dimension.entity_name)?;
        let template = match &dimension.sql_expression {
            Some(expr) => SqlTemplate::parse(expr, BareColumns::Only(&dimension.column_name))?,
            None => SqlTemplate::column(ColumnRef::local(dimension.column_name.clone())),
        };
        Ok((dimension, OwnedTemplate { owner, template }))
    }

    /// Entity a column reference points at. Unqualified references belong
    /// to the expression's owner.
    fn reference_entity(&self, reference: &ColumnRef, owner: &'a Entity) -> CompileResult<&'a Entity> {
        let Some(table) = &reference.table else {
            return Ok(owner);
        };
        match self.catalog.entity_for_table(reference.schema.as_deref(), table) {
            Ok(entity) => Ok(entity),
            Err(CatalogError::TableNotFound(_)) => Err(CompileError::UnresolvedReference {
                reference: reference.to_string(),
                owner: owner.name.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// All involved entities must share one dialect.
    fn query_dialect(&self, involved: &BTreeSet<&str>) -> CompileResult<Dialect> {
        let mut by_dialect: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        let mut first = None;
        for name in involved {
            let entity = self.catalog.entity(name)?;
            first.get_or_insert(entity.dialect);
            by_dialect
                .entry(entity.dialect.to_string())
                .or_default()
                .push(*name);
        }
        if by_dialect.len() > 1 {
            return Err(CompileError::MixedDialects(
                by_dialect
                    .into_iter()
                    .map(|(dialect, entities)| format!("{} ({})", dialect, entities.join(", ")))
                    .collect(),
            ));
        }
        Ok(first.unwrap_or_default())
    }

    fn render(&self, owned: &OwnedTemplate<'a>, joins: &ResolvedJoins) -> CompileResult<String> {
        owned.template.render(|reference| -> CompileResult<String> {
            let entity = self.reference_entity(reference, owned.owner)?;
            let alias = joins
                .alias(&entity.name)
                .ok_or_else(|| JoinPathError::UnknownEntity(entity.name.clone()))?;
            Ok(entity.qualified_column(alias, &reference.column))
        })
    }

    fn render_filter(
        &self,
        filter: &FilterCondition,
        dimension: &Dimension,
        owned: &OwnedTemplate<'a>,
        joins: &ResolvedJoins,
        dialect: &Dialect,
    ) -> CompileResult<String> {
        let expr = self.render(owned, joins)?;
        Ok(templates::filter_condition(
            &expr,
            filter,
            dimension.data_type,
            dialect,
        )?)
    }
}

/// Compile `intent` against `catalog` with default options.
pub fn compile(intent: &QueryIntent, catalog: &SemanticCatalog) -> CompileResult<CompiledQuery> {
    SqlCompiler::new(catalog).compile(intent)
}
