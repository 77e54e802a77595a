//! Structured query intent - the sole input contract of the validator and compiler.
//!
//! An intent names catalog objects only; it never carries SQL. Its JSON form:
//!
//! ```json
//! {
//!   "metric": "revenue",
//!   "dimensions": ["country"],
//!   "time_range": {"type": "custom", "start_date": "2023-01-01", "end_date": "2023-12-31"},
//!   "filters": [{"dimension": "status", "operator": "in", "values": ["completed", "pending"]}],
//!   "limit": 100
//! }
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of time window applied to the metric's time dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRangeType {
    LastQuarter,
    LastMonth,
    LastWeek,
    LastYear,
    CurrentQuarter,
    CurrentMonth,
    CurrentWeek,
    CurrentYear,
    Custom,
}

impl TimeRangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRangeType::LastQuarter => "last_quarter",
            TimeRangeType::LastMonth => "last_month",
            TimeRangeType::LastWeek => "last_week",
            TimeRangeType::LastYear => "last_year",
            TimeRangeType::CurrentQuarter => "current_quarter",
            TimeRangeType::CurrentMonth => "current_month",
            TimeRangeType::CurrentWeek => "current_week",
            TimeRangeType::CurrentYear => "current_year",
            TimeRangeType::Custom => "custom",
        }
    }
}

impl fmt::Display for TimeRangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time range of an intent. Dates are only meaningful for `custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(rename = "type")]
    pub kind: TimeRangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl TimeRange {
    pub fn relative(kind: TimeRangeType) -> Self {
        Self {
            kind,
            start_date: None,
            end_date: None,
        }
    }

    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            kind: TimeRangeType::Custom,
            start_date: Some(start),
            end_date: Some(end),
        }
    }
}

/// Comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    #[default]
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl FilterOperator {
    /// SQL operator for a single value.
    pub fn sql_operator(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "=",
            FilterOperator::NotEquals => "!=",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT IN",
            FilterOperator::GreaterThan => ">",
            FilterOperator::LessThan => "<",
            FilterOperator::GreaterThanOrEqual => ">=",
            FilterOperator::LessThanOrEqual => "<=",
        }
    }

    /// Whether the operator takes a parenthesised value list.
    pub fn is_list(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::NotIn)
    }
}

/// A predicate on one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub dimension: String,
    #[serde(default)]
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

impl FilterCondition {
    pub fn new<I, S>(dimension: impl Into<String>, operator: FilterOperator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dimension: dimension.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A business question in structured form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub metric: String,
    /// Group-by dimensions, in output column order.
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl QueryIntent {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            dimensions: Vec::new(),
            time_range: None,
            filters: Vec::new(),
            limit: None,
        }
    }

    pub fn by(mut self, dimension: impl Into<String>) -> Self {
        self.dimensions.push(dimension.into());
        self
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn with_filter(mut self, filter: FilterCondition) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Parse an intent from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
