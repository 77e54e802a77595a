//! Dialect-specific rendering of compiled queries.

#[path = "../common/mod.rs"]
mod common;

use common::{assert_valid_sql, compiler, sample};
use intentql::catalog::samples::SampleCatalog;
use intentql::catalog::{
    AggregationType, CatalogBuilder, DataType, Dimension, Entity, Metric, Relationship,
    RelationshipKind, SemanticCatalog,
};
use intentql::compile::CompileError;
use intentql::intent::{FilterCondition, FilterOperator, QueryIntent, TimeRange, TimeRangeType};
use intentql::sql::Dialect;

fn shop_catalog(dialect: Dialect) -> SemanticCatalog {
    CatalogBuilder::new()
        .entity(
            Entity::new("orders", "shop", "orders")
                .with_dialect(dialect)
                .with_dimension(Dimension::new("channel", "orders", "channel", DataType::String))
                .with_dimension(Dimension::new("is_gift", "orders", "is_gift", DataType::Boolean))
                .with_metric(Metric::new("revenue", "orders", AggregationType::Sum, "amount"))
                .with_relationship(
                    Relationship::new("orders_to_stores", "orders", "stores", RelationshipKind::ManyToOne)
                        .on("store_id", "id"),
                ),
        )
        .entity(
            Entity::new("stores", "shop", "stores")
                .with_dialect(dialect)
                .with_dimension(Dimension::new("region", "stores", "region", DataType::String)),
        )
        .build()
        .unwrap()
}

#[test]
fn test_snowflake_sample() {
    let catalog = sample(SampleCatalog::Snowflake);
    let intent = QueryIntent::new("billed_amount")
        .by("region")
        .with_time_range(TimeRange::relative(TimeRangeType::LastMonth));
    let compiled = compiler(&catalog).compile_checked(&intent).unwrap();

    insta::assert_snapshot!(compiled.sql, @r#"
    SELECT
      aa."region" AS "region",
      SUM(bi."amount") AS "billed_amount"
    FROM "billing"."invoices" bi
    LEFT JOIN "analytics"."accounts" aa ON bi."account_id" = aa."id"
    WHERE DATE_TRUNC('month', bi."issued_at") BETWEEN '2024-04-01' AND '2024-04-30'
    GROUP BY 1
    ORDER BY 1 ASC;
    "#);
    assert_eq!(compiled.metadata.dialect, Dialect::Snowflake);
    assert_eq!(compiled.metadata.schema_crossings, 1);
    assert_valid_sql(&compiled.sql, Dialect::Snowflake);
}

#[test]
fn test_snowflake_count_star() {
    let catalog = sample(SampleCatalog::Snowflake);
    let intent = QueryIntent::new("event_count").by("plan_tier").with_limit(10);
    let compiled = compiler(&catalog).compile_checked(&intent).unwrap();

    insta::assert_snapshot!(compiled.sql, @r#"
    SELECT
      aa."plan" AS "plan_tier",
      COUNT(*) AS "event_count"
    FROM "analytics"."events" ae
    LEFT JOIN "analytics"."accounts" aa ON ae."account_id" = aa."id"
    GROUP BY 1
    ORDER BY 1 ASC
    LIMIT 10;
    "#);
    assert_eq!(compiled.metadata.schema_crossings, 0);
    assert_valid_sql(&compiled.sql, Dialect::Snowflake);
}

#[test]
fn test_bigquery_backticks() {
    let catalog = shop_catalog(Dialect::BigQuery);
    let intent = QueryIntent::new("revenue").by("region").with_limit(5);
    let compiled = compiler(&catalog).compile_checked(&intent).unwrap();

    insta::assert_snapshot!(compiled.sql, @r"
    SELECT
      ss.`region` AS `region`,
      SUM(so.`amount`) AS `revenue`
    FROM `shop`.`orders` so
    LEFT JOIN `shop`.`stores` ss ON so.`store_id` = ss.`id`
    GROUP BY 1
    ORDER BY 1 ASC
    LIMIT 5;
    ");
    assert_eq!(compiled.metadata.dialect, Dialect::BigQuery);
    assert_valid_sql(&compiled.sql, Dialect::BigQuery);
}

#[test]
fn test_mysql_literals() {
    let catalog = shop_catalog(Dialect::MySql);
    let intent = QueryIntent::new("revenue")
        .with_filter(FilterCondition::new("channel", FilterOperator::Equals, ["O'Reilly"]))
        .with_filter(FilterCondition::new("is_gift", FilterOperator::Equals, ["false"]));
    let compiled = compiler(&catalog).compile_checked(&intent).unwrap();

    assert!(compiled
        .sql
        .contains("WHERE so.`channel` = 'O''Reilly' AND so.`is_gift` = FALSE"));
    assert_valid_sql(&compiled.sql, Dialect::MySql);
}

#[test]
fn test_every_dialect_parses() {
    for dialect in Dialect::ALL {
        let catalog = shop_catalog(dialect);
        let intent = QueryIntent::new("revenue")
            .by("region")
            .by("channel")
            .with_filter(FilterCondition::new("channel", FilterOperator::NotIn, ["web", "app"]))
            .with_limit(20);
        let compiled = compiler(&catalog).compile_checked(&intent).unwrap();
        assert_eq!(compiled.metadata.dialect, dialect);
        assert_valid_sql(&compiled.sql, dialect);
    }
}

#[test]
fn test_mixed_dialects_rejected() {
    let catalog = CatalogBuilder::new()
        .entity(
            Entity::new("orders", "shop", "orders")
                .with_metric(Metric::new("revenue", "orders", AggregationType::Sum, "amount"))
                .with_relationship(
                    Relationship::new("orders_to_stores", "orders", "stores", RelationshipKind::ManyToOne)
                        .on("store_id", "id"),
                ),
        )
        .entity(
            Entity::new("stores", "shop", "stores")
                .with_dialect(Dialect::Snowflake)
                .with_dimension(Dimension::new("region", "stores", "region", DataType::String)),
        )
        .build()
        .unwrap();

    let err = compiler(&catalog)
        .compile(&QueryIntent::new("revenue").by("region"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Query mixes SQL dialects: postgres (orders), snowflake (stores)"
    );
    assert!(matches!(err, CompileError::MixedDialects(_)));

    // A single-entity query is unaffected.
    assert!(compiler(&catalog).compile(&QueryIntent::new("revenue")).is_ok());
}
