//! Table aliases as they appear in compiled SQL.

use intentql::catalog::samples::SampleCatalog;
use intentql::catalog::{
    AggregationType, CatalogBuilder, DataType, Dimension, Entity, Metric, Relationship,
    RelationshipKind, SemanticCatalog,
};
use intentql::compile::compile;
use intentql::intent::QueryIntent;
use intentql::planner::{base_alias, AliasManager};

fn colliding_catalog() -> SemanticCatalog {
    CatalogBuilder::new()
        .entity(
            Entity::new("orders", "sales", "orders")
                .with_metric(Metric::new("revenue", "orders", AggregationType::Sum, "amount"))
                .with_relationship(
                    Relationship::new("orders_to_offers", "orders", "offers", RelationshipKind::ManyToOne)
                        .on("offer_id", "id"),
                )
                .with_relationship(
                    Relationship::new("orders_to_outlets", "orders", "outlets", RelationshipKind::ManyToOne)
                        .on("outlet_id", "id"),
                ),
        )
        .entity(
            Entity::new("offers", "sales", "offers")
                .with_dimension(Dimension::new("offer_name", "offers", "name", DataType::String)),
        )
        .entity(
            Entity::new("outlets", "stores", "outlets")
                .with_dimension(Dimension::new("outlet_city", "outlets", "city", DataType::String)),
        )
        .build()
        .unwrap()
}

#[test]
fn test_collisions_are_suffixed_in_sql() {
    let catalog = colliding_catalog();
    let compiled = compile(
        &QueryIntent::new("revenue").by("offer_name").by("outlet_city"),
        &catalog,
    )
    .unwrap();

    insta::assert_snapshot!(compiled.sql, @r#"
    SELECT
      so2."name" AS "offer_name",
      so3."city" AS "outlet_city",
      SUM(so."amount") AS "revenue"
    FROM "sales"."orders" so
    LEFT JOIN "sales"."offers" so2 ON so."offer_id" = so2."id"
    LEFT JOIN "stores"."outlets" so3 ON so."outlet_id" = so3."id"
    GROUP BY 1, 2
    ORDER BY 1 ASC, 2 ASC;
    "#);
    assert_eq!(compiled.metadata.entity_aliases["offers"], "so2");
    assert_eq!(compiled.metadata.entity_aliases["outlets"], "so3");
    assert_eq!(compiled.metadata.schema_crossings, 1);
}

#[test]
fn test_primary_entity_always_gets_base_alias() {
    let catalog = colliding_catalog();
    let compiled = compile(&QueryIntent::new("revenue"), &catalog).unwrap();
    assert_eq!(compiled.metadata.entity_aliases.len(), 1);
    assert_eq!(compiled.metadata.entity_aliases["orders"], "so");
}

#[test]
fn test_sample_aliases() {
    let catalog = SampleCatalog::MultiSchema.build().unwrap();
    let mut manager = AliasManager::new();
    let assigned: Vec<String> = catalog.entities().map(|e| manager.assign(e)).collect();
    assert_eq!(assigned, vec!["mc", "cc", "soi", "so", "ip"]);

    let simple = SampleCatalog::Simple.build().unwrap();
    assert_eq!(base_alias(simple.entity("users").unwrap()), "u");
    assert_eq!(base_alias(simple.entity("orders").unwrap()), "o");
}
