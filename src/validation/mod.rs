//! Semantic validation of query intents against a catalog.
//!
//! Every check runs and the issues are collected, so a caller can report
//! everything wrong with an intent at once. The one exception is an unknown
//! metric: nothing else can be checked without it.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::warn;

use crate::catalog::SemanticCatalog;
use crate::intent::{QueryIntent, TimeRangeType};
use crate::sql::expr::{BareColumns, ColumnRef, SqlTemplate};

/// Upper bound for `limit` unless configured otherwise.
pub const DEFAULT_MAX_LIMIT: u64 = 10_000;

/// A semantic rule violated by an intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("Metric '{0}' not found in catalog")]
    MetricNotFound(String),

    #[error("Dimension '{0}' not found in catalog")]
    DimensionNotFound(String),

    #[error("Dimension '{0}' is listed more than once")]
    DuplicateDimension(String),

    #[error("Metric '{metric}' requires dimension '{dimension}'")]
    MissingRequiredDimension { metric: String, dimension: String },

    #[error("No join path from entity '{from_entity}' (metric '{metric}') to entity '{to_entity}' (dimension '{dimension}')")]
    NoJoinPath {
        from_entity: String,
        metric: String,
        to_entity: String,
        dimension: String,
    },

    #[error("Metric '{0}' does not have a time dimension, but time range was specified")]
    TimeRangeWithoutTimeDimension(String),

    #[error("Time dimension '{dimension}' for metric '{metric}' not found in catalog")]
    TimeDimensionNotFound { metric: String, dimension: String },

    #[error("Filter dimension '{0}' not found in catalog")]
    FilterDimensionNotFound(String),

    #[error("Filter on dimension '{0}' has no values")]
    FilterWithoutValues(String),

    #[error("Filter dimension '{dimension}' (entity '{entity}') cannot be joined to metric '{metric}'")]
    UnreachableFilter {
        metric: String,
        dimension: String,
        entity: String,
    },

    #[error("Expression of '{name}' is invalid: {error}")]
    InvalidExpression { name: String, error: String },

    #[error("Reference '{reference}' in the expression of '{name}' does not name a catalog table")]
    UnresolvedReference { name: String, reference: String },

    #[error("Reference '{reference}' in the expression of '{name}' points at entity '{entity}', which cannot be joined to metric '{metric}'")]
    UnreachableReference {
        name: String,
        reference: String,
        entity: String,
        metric: String,
    },

    #[error("Custom time range requires both start_date and end_date")]
    CustomRangeMissingDates,

    #[error("Start date must be before end date")]
    InvalidDateOrder,

    #[error("Limit {limit} is out of range (1..={max})")]
    LimitOutOfRange { limit: u64, max: u64 },
}

/// Validates intents against one catalog.
pub struct SemanticValidator<'a> {
    catalog: &'a SemanticCatalog,
    max_limit: u64,
}

impl<'a> SemanticValidator<'a> {
    pub fn new(catalog: &'a SemanticCatalog) -> Self {
        Self {
            catalog,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    pub fn with_max_limit(mut self, max_limit: u64) -> Self {
        self.max_limit = max_limit;
        self
    }

    /// All issues found in `intent`; empty means valid.
    pub fn validate(&self, intent: &QueryIntent) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let Ok(metric) = self.catalog.metric(&intent.metric) else {
            issues.push(ValidationIssue::MetricNotFound(intent.metric.clone()));
            warn!(metric = %intent.metric, "intent rejected: unknown metric");
            return issues;
        };

        self.check_dimensions(intent, &mut issues);
        self.check_join_paths(intent, &mut issues);
        self.check_time_dimension(intent, &mut issues);
        self.check_filters(intent, &mut issues);
        self.check_expression_references(intent, &mut issues);
        check_time_range(intent, &mut issues);
        self.check_limit(intent, &mut issues);

        if !issues.is_empty() {
            warn!(
                metric = %metric.name,
                issues = issues.len(),
                "intent rejected by semantic validation"
            );
        }
        issues
    }

    /// Like [`validate`](Self::validate), as a `Result`.
    pub fn check(&self, intent: &QueryIntent) -> Result<(), Vec<ValidationIssue>> {
        let issues = self.validate(intent);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    fn check_dimensions(&self, intent: &QueryIntent, issues: &mut Vec<ValidationIssue>) {
        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        for name in &intent.dimensions {
            if !self.catalog.has_dimension(name) {
                issues.push(ValidationIssue::DimensionNotFound(name.clone()));
            }
            if !seen.insert(name.as_str()) && reported.insert(name.as_str()) {
                issues.push(ValidationIssue::DuplicateDimension(name.clone()));
            }
        }
    }

    fn check_join_paths(&self, intent: &QueryIntent, issues: &mut Vec<ValidationIssue>) {
        let Ok(metric) = self.catalog.metric(&intent.metric) else {
            return;
        };

        for required in &metric.required_dimensions {
            if !intent.dimensions.contains(required) {
                issues.push(ValidationIssue::MissingRequiredDimension {
                    metric: metric.name.clone(),
                    dimension: required.clone(),
                });
            }
        }

        let mut checked = BTreeSet::new();
        for name in &intent.dimensions {
            if !checked.insert(name.as_str()) {
                continue;
            }
            let Ok(dimension) = self.catalog.dimension(name) else {
                continue;
            };
            if !self
                .catalog
                .join_path_exists(&metric.entity_name, &dimension.entity_name)
            {
                issues.push(ValidationIssue::NoJoinPath {
                    from_entity: metric.entity_name.clone(),
                    metric: metric.name.clone(),
                    to_entity: dimension.entity_name.clone(),
                    dimension: name.clone(),
                });
            }
        }
    }

    fn check_time_dimension(&self, intent: &QueryIntent, issues: &mut Vec<ValidationIssue>) {
        if intent.time_range.is_none() {
            return;
        }
        let Ok(metric) = self.catalog.metric(&intent.metric) else {
            return;
        };

        let Some(time_dimension) = &metric.time_dimension else {
            issues.push(ValidationIssue::TimeRangeWithoutTimeDimension(
                metric.name.clone(),
            ));
            return;
        };

        match self.catalog.dimension(time_dimension) {
            Ok(dimension) => {
                if !self
                    .catalog
                    .join_path_exists(&metric.entity_name, &dimension.entity_name)
                {
                    issues.push(ValidationIssue::NoJoinPath {
                        from_entity: metric.entity_name.clone(),
                        metric: metric.name.clone(),
                        to_entity: dimension.entity_name.clone(),
                        dimension: time_dimension.clone(),
                    });
                }
            }
            Err(_) => issues.push(ValidationIssue::TimeDimensionNotFound {
                metric: metric.name.clone(),
                dimension: time_dimension.clone(),
            }),
        }
    }

    fn check_filters(&self, intent: &QueryIntent, issues: &mut Vec<ValidationIssue>) {
        let metric = self.catalog.metric(&intent.metric).ok();

        for filter in &intent.filters {
            let Ok(dimension) = self.catalog.dimension(&filter.dimension) else {
                issues.push(ValidationIssue::FilterDimensionNotFound(
                    filter.dimension.clone(),
                ));
                continue;
            };
            if filter.values.is_empty() {
                issues.push(ValidationIssue::FilterWithoutValues(filter.dimension.clone()));
            }
            if let Some(metric) = metric {
                if !self
                    .catalog
                    .join_path_exists(&metric.entity_name, &dimension.entity_name)
                {
                    issues.push(ValidationIssue::UnreachableFilter {
                        metric: metric.name.clone(),
                        dimension: filter.dimension.clone(),
                        entity: dimension.entity_name.clone(),
                    });
                }
            }
        }
    }

    /// `{schema.table.column}` references in the metric expression and in the
    /// expressions of every dimension the intent touches must name a table
    /// reachable from the metric's entity.
    fn check_expression_references(&self, intent: &QueryIntent, issues: &mut Vec<ValidationIssue>) {
        let Ok(metric) = self.catalog.metric(&intent.metric) else {
            return;
        };

        let mut names: BTreeSet<&str> = intent.dimensions.iter().map(String::as_str).collect();
        names.extend(intent.filters.iter().map(|f| f.dimension.as_str()));
        if intent.time_range.is_some() {
            names.extend(metric.time_dimension.as_deref());
        }

        let mut expressions = vec![(metric.name.as_str(), metric.sql_expression.as_str())];
        for name in names {
            if let Ok(dimension) = self.catalog.dimension(name) {
                if let Some(expr) = &dimension.sql_expression {
                    expressions.push((dimension.name.as_str(), expr.as_str()));
                }
            }
        }

        for (name, expr) in expressions {
            let template = match SqlTemplate::parse(expr, BareColumns::Identifiers(&[])) {
                Ok(template) => template,
                Err(e) => {
                    issues.push(ValidationIssue::InvalidExpression {
                        name: name.to_string(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            let references: BTreeSet<&ColumnRef> = template.references().collect();
            for reference in references {
                let Some(table) = &reference.table else {
                    continue;
                };
                match self.catalog.entity_for_table(reference.schema.as_deref(), table) {
                    Ok(entity) => {
                        if !self.catalog.join_path_exists(&metric.entity_name, &entity.name) {
                            issues.push(ValidationIssue::UnreachableReference {
                                name: name.to_string(),
                                reference: reference.to_string(),
                                entity: entity.name.clone(),
                                metric: metric.name.clone(),
                            });
                        }
                    }
                    Err(_) => issues.push(ValidationIssue::UnresolvedReference {
                        name: name.to_string(),
                        reference: reference.to_string(),
                    }),
                }
            }
        }
    }

    fn check_limit(&self, intent: &QueryIntent, issues: &mut Vec<ValidationIssue>) {
        if let Some(limit) = intent.limit {
            if limit == 0 || limit > self.max_limit {
                issues.push(ValidationIssue::LimitOutOfRange {
                    limit,
                    max: self.max_limit,
                });
            }
        }
    }
}

fn check_time_range(intent: &QueryIntent, issues: &mut Vec<ValidationIssue>) {
    let Some(range) = &intent.time_range else {
        return;
    };
    if range.kind != TimeRangeType::Custom {
        return;
    }
    match (range.start_date, range.end_date) {
        (Some(start), Some(end)) if start > end => issues.push(ValidationIssue::InvalidDateOrder),
        (Some(_), Some(_)) => {}
        _ => issues.push(ValidationIssue::CustomRangeMissingDates),
    }
}

/// Validate `intent` with default settings.
pub fn validate(intent: &QueryIntent, catalog: &SemanticCatalog) -> Vec<ValidationIssue> {
    SemanticValidator::new(catalog).validate(intent)
}
