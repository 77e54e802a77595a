//! Semantic validation of query intents against the sample catalogs.

use chrono::NaiveDate;
use intentql::catalog::samples::SampleCatalog;
use intentql::catalog::SemanticCatalog;
use intentql::intent::{FilterCondition, FilterOperator, QueryIntent, TimeRange, TimeRangeType};
use intentql::validation::{validate, SemanticValidator, ValidationIssue, DEFAULT_MAX_LIMIT};

fn catalog() -> SemanticCatalog {
    SampleCatalog::MultiSchema.build().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_valid_intents_have_no_issues() {
    let catalog = catalog();
    let intents = [
        QueryIntent::new("revenue"),
        QueryIntent::new("revenue").by("country").with_limit(100),
        QueryIntent::new("units_sold").by("brand").by("customer_segment"),
        QueryIntent::new("order_count")
            .with_time_range(TimeRange::relative(TimeRangeType::CurrentWeek))
            .with_filter(FilterCondition::new("status", FilterOperator::In, ["completed"])),
        QueryIntent::new("campaign_spend").by("channel"),
    ];
    for intent in &intents {
        assert_eq!(validate(intent, &catalog), vec![], "{:?}", intent);
    }
}

#[test]
fn test_unknown_metric_stops_early() {
    let catalog = catalog();
    let intent = QueryIntent::new("profit_margin").by("nope").with_limit(0);
    assert_eq!(
        validate(&intent, &catalog),
        vec![ValidationIssue::MetricNotFound("profit_margin".into())]
    );
}

#[test]
fn test_issues_accumulate_in_order() {
    let catalog = catalog();
    let intent = QueryIntent::new("revenue")
        .by("shoe_size")
        .by("channel")
        .with_time_range(TimeRange {
            kind: TimeRangeType::Custom,
            start_date: Some(date(2023, 12, 31)),
            end_date: Some(date(2023, 1, 1)),
        })
        .with_filter(FilterCondition::new("colour", FilterOperator::Equals, ["red"]))
        .with_filter(FilterCondition::new(
            "campaign_start",
            FilterOperator::GreaterThan,
            Vec::<String>::new(),
        ))
        .with_limit(DEFAULT_MAX_LIMIT + 1);

    let issues = validate(&intent, &catalog);
    assert_eq!(
        issues,
        vec![
            ValidationIssue::DimensionNotFound("shoe_size".into()),
            ValidationIssue::NoJoinPath {
                from_entity: "orders".into(),
                metric: "revenue".into(),
                to_entity: "campaigns".into(),
                dimension: "channel".into(),
            },
            ValidationIssue::FilterDimensionNotFound("colour".into()),
            ValidationIssue::FilterWithoutValues("campaign_start".into()),
            ValidationIssue::UnreachableFilter {
                metric: "revenue".into(),
                dimension: "campaign_start".into(),
                entity: "campaigns".into(),
            },
            ValidationIssue::InvalidDateOrder,
            ValidationIssue::LimitOutOfRange {
                limit: 10_001,
                max: 10_000,
            },
        ]
    );
}

#[test]
fn test_messages() {
    let catalog = catalog();
    let issues = validate(&QueryIntent::new("revenue").by("channel"), &catalog);
    assert_eq!(
        issues[0].to_string(),
        "No join path from entity 'orders' (metric 'revenue') to entity 'campaigns' (dimension 'channel')"
    );

    let issues = validate(
        &QueryIntent::new("units_sold").with_time_range(TimeRange::relative(TimeRangeType::LastWeek)),
        &catalog,
    );
    assert_eq!(
        issues[0].to_string(),
        "Metric 'units_sold' does not have a time dimension, but time range was specified"
    );
}

#[test]
fn test_duplicate_dimension_reported_once() {
    let catalog = catalog();
    let intent = QueryIntent::new("revenue")
        .by("country")
        .by("country")
        .by("country");
    assert_eq!(
        validate(&intent, &catalog),
        vec![ValidationIssue::DuplicateDimension("country".into())]
    );
}

#[test]
fn test_custom_range_requires_both_dates() {
    let catalog = catalog();
    let intent = QueryIntent::new("revenue").with_time_range(TimeRange {
        kind: TimeRangeType::Custom,
        start_date: Some(date(2023, 1, 1)),
        end_date: None,
    });
    assert_eq!(
        validate(&intent, &catalog),
        vec![ValidationIssue::CustomRangeMissingDates]
    );

    let same_day = QueryIntent::new("revenue")
        .with_time_range(TimeRange::custom(date(2023, 1, 1), date(2023, 1, 1)));
    assert!(validate(&same_day, &catalog).is_empty());
}

#[test]
fn test_limit_bounds() {
    let catalog = catalog();
    let validator = SemanticValidator::new(&catalog).with_max_limit(10);

    assert!(validator.check(&QueryIntent::new("revenue").with_limit(1)).is_ok());
    assert!(validator.check(&QueryIntent::new("revenue").with_limit(10)).is_ok());
    assert_eq!(
        validator
            .check(&QueryIntent::new("revenue").with_limit(0))
            .unwrap_err(),
        vec![ValidationIssue::LimitOutOfRange { limit: 0, max: 10 }]
    );
}

#[test]
fn test_simple_catalog() {
    let catalog = SampleCatalog::Simple.build().unwrap();
    assert!(validate(&QueryIntent::new("revenue").by("country"), &catalog).is_empty());
    assert!(validate(&QueryIntent::new("user_count").by("product_category"), &catalog).is_empty());
    assert_eq!(
        validate(
            &QueryIntent::new("user_count").with_time_range(TimeRange::relative(TimeRangeType::LastYear)),
            &catalog
        ),
        vec![ValidationIssue::TimeRangeWithoutTimeDimension("user_count".into())]
    );
}

fn catalog_with_cross_table_expressions() -> SemanticCatalog {
    use intentql::catalog::{
        AggregationType, CatalogBuilder, DataType, Dimension, Entity, Metric, Relationship,
        RelationshipKind,
    };

    CatalogBuilder::new()
        .entity(
            Entity::new("orders", "sales", "orders")
                .with_dimension(
                    Dimension::new("campaign_channel", "orders", "campaign_id", DataType::String)
                        .with_expression("COALESCE({marketing.campaigns.channel}, 'direct')"),
                )
                .with_metric(Metric::new(
                    "discounted_revenue",
                    "orders",
                    AggregationType::Sum,
                    "amount * (1 - {crm.customers.discount_rate})",
                ))
                .with_metric(Metric::new(
                    "ghost_revenue",
                    "orders",
                    AggregationType::Sum,
                    "amount * {finance.fx_rates.rate}",
                ))
                .with_metric(Metric::new(
                    "attributed_spend",
                    "orders",
                    AggregationType::Sum,
                    "{marketing.campaigns.budget}",
                ))
                .with_metric(Metric::new("broken", "orders", AggregationType::Sum, "{amount"))
                .with_relationship(
                    Relationship::new("o_c", "orders", "customers", RelationshipKind::ManyToOne)
                        .on("customer_id", "id"),
                ),
        )
        .entity(Entity::new("customers", "crm", "customers"))
        .entity(Entity::new("campaigns", "marketing", "campaigns"))
        .build()
        .unwrap()
}

#[test]
fn test_expression_references_must_be_reachable() {
    let catalog = catalog_with_cross_table_expressions();

    assert!(validate(&QueryIntent::new("discounted_revenue"), &catalog).is_empty());

    assert_eq!(
        validate(&QueryIntent::new("ghost_revenue"), &catalog),
        vec![ValidationIssue::UnresolvedReference {
            name: "ghost_revenue".into(),
            reference: "finance.fx_rates.rate".into(),
        }]
    );

    assert_eq!(
        validate(&QueryIntent::new("attributed_spend"), &catalog),
        vec![ValidationIssue::UnreachableReference {
            name: "attributed_spend".into(),
            reference: "marketing.campaigns.budget".into(),
            entity: "campaigns".into(),
            metric: "attributed_spend".into(),
        }]
    );
}

#[test]
fn test_dimension_expression_references_checked() {
    let catalog = catalog_with_cross_table_expressions();
    let intent = QueryIntent::new("discounted_revenue").by("campaign_channel");
    assert_eq!(
        validate(&intent, &catalog),
        vec![ValidationIssue::UnreachableReference {
            name: "campaign_channel".into(),
            reference: "marketing.campaigns.channel".into(),
            entity: "campaigns".into(),
            metric: "discounted_revenue".into(),
        }]
    );
}

#[test]
fn test_malformed_expression_reported() {
    let catalog = catalog_with_cross_table_expressions();
    let issues = validate(&QueryIntent::new("broken"), &catalog);
    assert!(matches!(
        issues.as_slice(),
        [ValidationIssue::InvalidExpression { name, .. }] if name == "broken"
    ));
}

#[test]
fn test_checked_compile_reports_reference_issues() {
    use intentql::compile::{CompileError, SqlCompiler};

    let catalog = catalog_with_cross_table_expressions();
    let err = SqlCompiler::new(&catalog)
        .compile_checked(&QueryIntent::new("ghost_revenue"))
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::Validation(issues)
            if matches!(issues.as_slice(), [ValidationIssue::UnresolvedReference { .. }])
    ));
}
