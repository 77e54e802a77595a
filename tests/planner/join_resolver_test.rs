//! Join path resolution over the multi-schema sample catalog.

use intentql::catalog::samples::SampleCatalog;
use intentql::catalog::SemanticCatalog;
use intentql::planner::{JoinPathError, JoinResolver};

fn catalog() -> SemanticCatalog {
    SampleCatalog::MultiSchema.build().unwrap()
}

#[test]
fn test_direct_join() {
    let catalog = catalog();
    let resolved = JoinResolver::new(&catalog)
        .resolve("orders", ["customers"])
        .unwrap();

    assert_eq!(resolved.joins.len(), 1);
    let join = &resolved.joins[0];
    assert_eq!(join.relationship, "orders_to_customers");
    assert_eq!(join.from_entity, "orders");
    assert_eq!(join.to_entity, "customers");
    assert_eq!(join.from_schema, "sales");
    assert_eq!(join.to_schema, "crm");
    assert!(join.crosses_schema());
    assert!(!join.reversed);
}

#[test]
fn test_qualified_join_condition() {
    let catalog = catalog();
    let resolved = JoinResolver::new(&catalog)
        .resolve("order_items", ["products"])
        .unwrap();
    assert_eq!(
        resolved.joins[0].sql,
        "LEFT JOIN \"inventory\".\"products\" ip ON soi.\"product_id\" = ip.\"id\""
    );
}

#[test]
fn test_reverse_walk_from_dimension_side() {
    let catalog = catalog();
    let resolved = JoinResolver::new(&catalog)
        .resolve("products", ["customers"])
        .unwrap();

    assert_eq!(
        resolved.join_order,
        vec!["products", "order_items", "orders", "customers"]
    );
    let sql: Vec<&str> = resolved.joins.iter().map(|j| j.sql.as_str()).collect();
    assert_eq!(
        sql,
        vec![
            "LEFT JOIN \"sales\".\"order_items\" soi ON soi.\"product_id\" = ip.\"id\"",
            "LEFT JOIN \"sales\".\"orders\" so ON soi.\"order_id\" = so.\"id\"",
            "LEFT JOIN \"crm\".\"customers\" cc ON so.\"customer_id\" = cc.\"id\"",
        ]
    );
    assert_eq!(
        resolved.joins.iter().map(|j| j.reversed).collect::<Vec<_>>(),
        vec![true, false, false]
    );
    assert_eq!(resolved.schema_crossings(), 2);
}

#[test]
fn test_paths_reuse_joined_entities() {
    let catalog = catalog();
    // customers is reached through orders; products then only needs order_items.
    let resolved = JoinResolver::new(&catalog)
        .resolve("order_items", ["products", "customers", "orders"])
        .unwrap();

    assert_eq!(resolved.joins.len(), 3);
    assert_eq!(
        resolved.join_order,
        vec!["order_items", "orders", "customers", "products"]
    );
    let targets: Vec<&str> = resolved.joins.iter().map(|j| j.to_entity.as_str()).collect();
    assert_eq!(targets, vec!["orders", "customers", "products"]);
}

#[test]
fn test_target_order_does_not_matter() {
    let catalog = catalog();
    let resolver = JoinResolver::new(&catalog);
    let a = resolver.resolve("orders", ["products", "customers"]).unwrap();
    let b = resolver.resolve("orders", ["customers", "products"]).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_duplicate_targets_join_once() {
    let catalog = catalog();
    let resolved = JoinResolver::new(&catalog)
        .resolve("orders", ["customers", "customers", "orders"])
        .unwrap();
    assert_eq!(resolved.joins.len(), 1);
}

#[test]
fn test_disconnected_entity() {
    let catalog = catalog();
    let err = JoinResolver::new(&catalog)
        .resolve("orders", ["customers", "campaigns"])
        .unwrap_err();
    assert_eq!(
        err,
        JoinPathError::Unreachable {
            start: "orders".into(),
            missing: vec!["campaigns".into()],
        }
    );
}

#[test]
fn test_unknown_target() {
    let catalog = catalog();
    let err = JoinResolver::new(&catalog)
        .resolve("orders", ["ghosts"])
        .unwrap_err();
    assert_eq!(err, JoinPathError::UnknownEntity("ghosts".into()));
}

fn one_to_one_catalog() -> SemanticCatalog {
    use intentql::catalog::{CatalogBuilder, Entity, Relationship, RelationshipKind};

    CatalogBuilder::new()
        .entity(Entity::new("orders", "sales", "orders").with_relationship(
            Relationship::new("order_details", "orders", "details", RelationshipKind::OneToOne)
                .on("id", "order_id"),
        ))
        .entity(Entity::new("details", "sales", "order_details"))
        .build()
        .unwrap()
}

#[test]
fn test_one_to_one_renders_inner_join() {
    let catalog = one_to_one_catalog();
    let resolver = JoinResolver::new(&catalog);

    let forward = resolver.resolve("orders", ["details"]).unwrap();
    assert_eq!(
        forward.joins[0].sql,
        "INNER JOIN \"sales\".\"order_details\" sod ON so.\"id\" = sod.\"order_id\""
    );
    assert!(!forward.joins[0].reversed);
    assert_eq!(forward.schema_crossings(), 0);

    let reverse = resolver.resolve("details", ["orders"]).unwrap();
    assert_eq!(
        reverse.joins[0].sql,
        "INNER JOIN \"sales\".\"orders\" so ON so.\"id\" = sod.\"order_id\""
    );
    assert!(reverse.joins[0].reversed);
}
