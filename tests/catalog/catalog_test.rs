//! Catalog construction, lookup and reachability.

use intentql::catalog::samples::SampleCatalog;
use intentql::catalog::{
    AggregationType, CatalogBuilder, CatalogError, DataType, Dimension, Entity, Metric,
    Relationship, RelationshipKind,
};

fn multi_schema() -> intentql::SemanticCatalog {
    SampleCatalog::MultiSchema.build().unwrap()
}

#[test]
fn test_lookup_by_name() {
    let catalog = multi_schema();

    let revenue = catalog.metric("revenue").unwrap();
    assert_eq!(revenue.entity_name, "orders");
    assert_eq!(revenue.aggregation, AggregationType::Sum);
    assert_eq!(revenue.time_dimension.as_deref(), Some("order_date"));

    let country = catalog.dimension("country").unwrap();
    assert_eq!(country.entity_name, "customers");
    assert_eq!(country.column_name, "country_code");

    let orders = catalog.entity("orders").unwrap();
    assert_eq!(orders.schema, "sales");
    assert_eq!(orders.qualified_table(), "\"sales\".\"orders\"");
}

#[test]
fn test_lookup_failures_carry_names() {
    let catalog = multi_schema();
    assert_eq!(
        catalog.entity("ghosts").unwrap_err().to_string(),
        "Entity 'ghosts' not found in catalog"
    );
    assert_eq!(
        catalog.dimension("shoe_size").unwrap_err(),
        CatalogError::DimensionNotFound("shoe_size".into())
    );
    assert_eq!(
        catalog.metric("profit_margin").unwrap_err(),
        CatalogError::MetricNotFound("profit_margin".into())
    );
}

#[test]
fn test_reachability_is_undirected() {
    let catalog = multi_schema();
    assert!(catalog.join_path_exists("orders", "customers"));
    assert!(catalog.join_path_exists("customers", "orders"));
    assert!(catalog.join_path_exists("customers", "products"));
    assert!(catalog.join_path_exists("campaigns", "campaigns"));
    assert!(!catalog.join_path_exists("orders", "campaigns"));
    assert!(!catalog.join_path_exists("campaigns", "orders"));
    assert!(!catalog.join_path_exists("orders", "ghosts"));
}

#[test]
fn test_graph_paths() {
    let catalog = multi_schema();
    let path = catalog.graph().find_path("customers", "products").unwrap();
    assert_eq!(
        path.entities(),
        vec!["customers", "orders", "order_items", "products"]
    );
    assert!(catalog.graph().find_path("orders", "campaigns").is_none());
}

#[test]
fn test_iteration_is_name_ordered() {
    let catalog = multi_schema();
    let names: Vec<&str> = catalog.entities().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["campaigns", "customers", "order_items", "orders", "products"]
    );

    let summary = catalog.summary();
    assert_eq!(summary.entities.len(), 5);
    assert!(summary.metrics.iter().any(|m| m.name == "revenue" && m.aggregation == "SUM"));
    assert!(summary
        .dimensions
        .iter()
        .any(|d| d.name == "is_active" && d.data_type == DataType::Boolean));
}

#[test]
fn test_metric_name_collision_rejected() {
    let err = CatalogBuilder::new()
        .entity(
            Entity::new("a", "s", "a")
                .with_metric(Metric::new("total", "a", AggregationType::Sum, "x")),
        )
        .entity(
            Entity::new("b", "s", "b")
                .with_metric(Metric::new("total", "b", AggregationType::Sum, "y")),
        )
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Metric 'total' is declared more than once (entities: a, b)"
    );
}

#[test]
fn test_relationship_must_start_at_owner() {
    let err = CatalogBuilder::new()
        .entity(Entity::new("a", "s", "a").with_relationship(
            Relationship::new("b_to_a", "b", "a", RelationshipKind::ManyToOne).on("a_id", "id"),
        ))
        .entity(Entity::new("b", "s", "b"))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::EntityMismatch {
            kind: "Relationship",
            ..
        }
    ));
}

#[test]
fn test_relationship_without_conditions_rejected() {
    let err = CatalogBuilder::new()
        .entity(Entity::new("a", "s", "a").with_relationship(Relationship::new(
            "a_to_b",
            "a",
            "b",
            RelationshipKind::OneToOne,
        )))
        .entity(Entity::new("b", "s", "b"))
        .build()
        .unwrap_err();
    assert_eq!(err, CatalogError::EmptyJoinConditions("a_to_b".into()));
}

#[test]
fn test_required_dimension_must_exist() {
    let err = CatalogBuilder::new()
        .entity(
            Entity::new("a", "s", "a")
                .with_dimension(Dimension::new("d", "a", "d", DataType::String))
                .with_metric(Metric::new("m", "a", AggregationType::Count, "*").requires("e")),
        )
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        CatalogError::UnknownRequiredDimension {
            metric: "m".into(),
            dimension: "e".into(),
        }
    );
}

#[test]
fn test_ambiguous_table_lookup() {
    let catalog = CatalogBuilder::new()
        .entity(Entity::new("eu_orders", "eu", "orders"))
        .entity(Entity::new("us_orders", "us", "orders"))
        .build()
        .unwrap();

    assert_eq!(
        catalog.entity_for_table(Some("us"), "orders").unwrap().name,
        "us_orders"
    );
    assert!(matches!(
        catalog.entity_for_table(None, "orders"),
        Err(CatalogError::AmbiguousTable { .. })
    ));
}
