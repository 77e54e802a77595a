//! Identical inputs must always produce byte-identical SQL.

#[path = "../common/mod.rs"]
mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use common::{compiler, date, multi_schema};
use intentql::catalog::samples::SampleCatalog;
use intentql::catalog::SemanticCatalog;
use intentql::compile::{CompileOptions, SqlCompiler};
use intentql::intent::{FilterCondition, FilterOperator, QueryIntent, TimeRange, TimeRangeType};

fn busy_intent() -> QueryIntent {
    QueryIntent::new("units_sold")
        .by("country")
        .by("brand")
        .by("status")
        .with_filter(FilterCondition::new(
            "customer_segment",
            FilterOperator::In,
            ["enterprise", "smb"],
        ))
        .with_limit(250)
}

#[test]
fn test_repeated_compilation_is_identical() {
    let catalog = multi_schema();
    let intent = busy_intent();
    let first = compiler(&catalog).compile_checked(&intent).unwrap();
    for _ in 0..20 {
        let again = compiler(&catalog).compile_checked(&intent).unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn test_independent_catalog_builds_agree() {
    let intent = busy_intent();
    let a = compiler(&multi_schema()).compile(&intent).unwrap();
    let b = compiler(&multi_schema()).compile(&intent).unwrap();
    assert_eq!(a.sql, b.sql);
    assert_eq!(a.metadata.fingerprint, b.metadata.fingerprint);
}

#[test]
fn test_shared_catalog_across_threads() {
    let catalog: Arc<SemanticCatalog> = Arc::new(multi_schema());
    let expected = compiler(&catalog).compile(&busy_intent()).unwrap().sql;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || compiler(&catalog).compile(&busy_intent()).unwrap().sql)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_aliases_are_unique() {
    for sample in SampleCatalog::ALL {
        let catalog = sample.build().unwrap();
        let entities: Vec<&str> = catalog.entities().map(|e| e.name.as_str()).collect();
        for metric in catalog.metrics() {
            let mut intent = QueryIntent::new(&metric.name);
            for dimension in catalog.dimensions() {
                if catalog.join_path_exists(&metric.entity_name, &dimension.entity_name) {
                    intent = intent.by(&dimension.name);
                }
            }
            let compiled = compiler(&catalog).compile_checked(&intent).unwrap();
            let aliases: BTreeSet<&String> = compiled.metadata.entity_aliases.values().collect();
            assert_eq!(
                aliases.len(),
                compiled.metadata.entity_aliases.len(),
                "duplicate alias in {} / {}: {:?}",
                sample,
                metric.name,
                compiled.metadata.entity_aliases
            );
            assert!(compiled
                .metadata
                .entity_aliases
                .keys()
                .all(|e| entities.contains(&e.as_str())));
        }
    }
}

#[test]
fn test_reference_date_changes_sql_only_through_time_range() {
    let catalog = multi_schema();
    let intent = QueryIntent::new("revenue")
        .with_time_range(TimeRange::relative(TimeRangeType::CurrentYear));

    let in_2024 = compiler(&catalog).compile(&intent).unwrap();
    let in_2020 = SqlCompiler::new(&catalog)
        .with_options(CompileOptions::default().with_reference_date(date(2020, 2, 29)))
        .compile(&intent)
        .unwrap();

    assert!(in_2024.sql.contains("BETWEEN '2024-01-01' AND '2024-12-31'"));
    assert!(in_2020.sql.contains("BETWEEN '2020-01-01' AND '2020-12-31'"));
    assert_ne!(in_2024.metadata.fingerprint, in_2020.metadata.fingerprint);
}
