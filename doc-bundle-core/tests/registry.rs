use doc_bundle_core::registry::{PriorityClass, TypeRegistry};
use std::collections::HashSet;

#[test]
fn test_catalog_contains_core_types_with_unique_ids() {
    let registry = TypeRegistry::new();
    let types = registry.list_types();

    let ids: HashSet<&str> = types.iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), types.len(), "type ids must be unique");
    assert!(ids.contains("swppp"));
    assert!(ids.contains("jsa"));

    let swppp = registry.get("swppp").expect("swppp is registered");
    assert_eq!(swppp.category, "environmental");
    assert!(registry.get("bogus_type").is_none());
}

#[test]
fn test_filter_by_priority_only_returns_that_class() {
    let registry = TypeRegistry::new();
    let mut total = 0;
    for priority in [PriorityClass::High, PriorityClass::Medium, PriorityClass::Low] {
        let filtered = registry.filter_by_priority(priority);
        assert!(!filtered.is_empty(), "no types with priority {priority}");
        assert!(filtered.iter().all(|t| t.priority == priority));
        total += filtered.len();
    }
    assert_eq!(total, registry.list_types().len());
}

#[test]
fn test_group_by_category_is_sorted_and_complete() {
    let registry = TypeRegistry::new();
    let groups = registry.group_by_category();

    let categories: Vec<&str> = groups.keys().copied().collect();
    let mut sorted = categories.clone();
    sorted.sort();
    assert_eq!(categories, sorted);

    let grouped: usize = groups.values().map(Vec::len).sum();
    assert_eq!(grouped, registry.list_types().len());
    assert!(groups["safety"].iter().any(|t| t.id == "jsa"));
}
