//! Loading catalogs from definition files on disk.

#[path = "../common/mod.rs"]
mod common;

use std::path::PathBuf;

use common::{assert_valid_sql, compiler};
use intentql::catalog::loader::{load_catalog, LoadError};
use intentql::catalog::{DataType, RelationshipKind};
use intentql::intent::QueryIntent;
use intentql::sql::Dialect;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_load_toml_fixture() {
    let catalog = load_catalog(fixture("warehouse.toml")).unwrap();

    assert_eq!(catalog.entities().count(), 2);
    let customers = catalog.entity("customers").unwrap();
    assert_eq!(customers.table, "customers");
    assert_eq!(customers.schema, "crm");

    let is_active = catalog.dimension("is_active").unwrap();
    assert_eq!(is_active.column_name, "is_active");
    assert_eq!(is_active.data_type, DataType::Boolean);

    let relationship = catalog
        .relationship("orders", "orders_to_customers")
        .unwrap();
    assert_eq!(relationship.kind, RelationshipKind::ManyToOne);
    assert_eq!(relationship.from_entity, "orders");

    let compiled = compiler(&catalog)
        .compile_checked(&QueryIntent::new("revenue").by("country").with_limit(100))
        .unwrap();
    assert!(compiled
        .sql
        .contains("LEFT JOIN \"crm\".\"customers\" cc ON so.\"customer_id\" = cc.\"id\""));
    assert_valid_sql(&compiled.sql, Dialect::Postgres);
}

#[test]
fn test_load_json_fixture() {
    let catalog = load_catalog(fixture("warehouse.json")).unwrap();

    let compiled = compiler(&catalog)
        .compile_checked(&QueryIntent::new("event_count").by("plan"))
        .unwrap();
    insta::assert_snapshot!(compiled.sql, @r#"
    SELECT
      usr."plan_name" AS "plan",
      COUNT(*) AS "event_count"
    FROM "analytics"."events" ae
    LEFT JOIN "analytics"."users" usr ON ae."user_id" = usr."id"
    GROUP BY 1
    ORDER BY 1 ASC;
    "#);
    assert_eq!(compiled.metadata.dialect, Dialect::DuckDb);
    assert_valid_sql(&compiled.sql, Dialect::DuckDb);
}

#[test]
fn test_missing_file_reports_path() {
    let path = fixture("does_not_exist.toml");
    let err = load_catalog(&path).unwrap_err();
    match err {
        LoadError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn test_unsupported_extension() {
    let err = load_catalog(fixture("warehouse.yaml")).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat(_)));
}
