// Query Engine - pure filter + sort over a store snapshot.
//
// Never mutates the store; every call materializes a fresh Vec because the
// presentation layer needs the full result for immediate display.

use std::cmp::Ordering;

use crate::store::{CatalogStore, Record};

/// Display orders. `Unsorted` keeps insertion order and doubles as the
/// defined fallback for unknown sort tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    NameAsc,
    NameDesc,
    RegionAsc,
    RegionDesc,
    Unsorted,
}

impl SortOrder {
    /// Parse a UI sort token. Unknown tokens fall back to `Unsorted`
    /// rather than erroring.
    pub fn parse(token: &str) -> SortOrder {
        match token {
            "nameAsc" => SortOrder::NameAsc,
            "nameDesc" => SortOrder::NameDesc,
            "regionAsc" => SortOrder::RegionAsc,
            "regionDesc" => SortOrder::RegionDesc,
            _ => SortOrder::Unsorted,
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::NameAsc
    }
}

/// One view request: free-text search, exact region filter, sort order.
/// Empty search/region mean "match everything".
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub search: String,
    pub region: String,
    pub sort: SortOrder,
}

/// Produce the ordered, filtered view of the store's current snapshot.
pub fn run_query(store: &CatalogStore, params: &QueryParams) -> Vec<Record> {
    let search = params.search.to_lowercase();

    let mut results: Vec<Record> = store
        .records()
        .iter()
        .filter(|record| matches(record, &search, &params.region))
        .cloned()
        .collect();

    sort_records(&mut results, params.sort);
    results
}

/// The distinct-region set for the filter control: deduplicated and
/// sorted lexicographically. Recomputed on demand after every mutation.
pub fn region_set(store: &CatalogStore) -> Vec<String> {
    let mut regions: Vec<String> = store
        .records()
        .iter()
        .map(|record| record.region.clone())
        .collect();
    regions.sort();
    regions.dedup();
    regions
}

/// Region must match exactly; the search text matches case-insensitively
/// as a substring of name, lore, or description lore.
fn matches(record: &Record, search_lower: &str, region: &str) -> bool {
    if !region.is_empty() && record.region != region {
        return false;
    }
    if search_lower.is_empty() {
        return true;
    }
    record.name.to_lowercase().contains(search_lower)
        || record.lore.to_lowercase().contains(search_lower)
        || record.description_lore.to_lowercase().contains(search_lower)
}

/// Case-insensitive compare with a raw-byte tie-break so the order stays
/// strict and total even for names differing only in case.
fn compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn sort_records(records: &mut [Record], sort: SortOrder) {
    match sort {
        SortOrder::NameAsc => records.sort_by(|a, b| compare(&a.name, &b.name)),
        SortOrder::NameDesc => records.sort_by(|a, b| compare(&b.name, &a.name)),
        SortOrder::RegionAsc => records.sort_by(|a, b| {
            compare(&a.region, &b.region).then_with(|| compare(&a.name, &b.name))
        }),
        SortOrder::RegionDesc => records.sort_by(|a, b| {
            compare(&b.region, &a.region).then_with(|| compare(&a.name, &b.name))
        }),
        SortOrder::Unsorted => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordFields;

    fn store_with(items: &[(&str, &str, &str)]) -> CatalogStore {
        // (name, region, lore)
        let mut store = CatalogStore::new();
        for (name, region, lore) in items {
            store
                .add_manual(RecordFields {
                    name: name.to_string(),
                    region: region.to_string(),
                    lore: lore.to_string(),
                    ..RecordFields::default()
                })
                .unwrap();
        }
        store
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_params_return_everything_in_insertion_order() {
        let store = store_with(&[("Sword", "North", ""), ("Axe", "South", "")]);

        let params = QueryParams {
            sort: SortOrder::Unsorted,
            ..QueryParams::default()
        };
        let results = run_query(&store, &params);

        assert_eq!(names(&results), vec!["Sword", "Axe"]);
    }

    #[test]
    fn test_search_matches_name_lore_and_description() {
        let mut store = store_with(&[
            ("Frost Blade", "North", ""),
            ("Axe", "South", "forged in frost"),
            ("Bow", "East", ""),
        ]);
        store
            .add_manual(RecordFields {
                name: "Helm".to_string(),
                description_lore: "Frostbitten steel".to_string(),
                ..RecordFields::default()
            })
            .unwrap();

        let params = QueryParams {
            search: "FROST".to_string(),
            sort: SortOrder::Unsorted,
            ..QueryParams::default()
        };
        let results = run_query(&store, &params);

        assert_eq!(names(&results), vec!["Frost Blade", "Axe", "Helm"]);
    }

    #[test]
    fn test_region_filter_is_exact() {
        let store = store_with(&[
            ("Sword", "North", ""),
            ("Axe", "North Wind", ""),
            ("Bow", "North", ""),
        ]);

        let params = QueryParams {
            region: "North".to_string(),
            sort: SortOrder::Unsorted,
            ..QueryParams::default()
        };
        let results = run_query(&store, &params);

        assert_eq!(names(&results), vec!["Sword", "Bow"]);
    }

    #[test]
    fn test_search_and_region_compose() {
        let store = store_with(&[
            ("Frost Sword", "North", ""),
            ("Frost Axe", "South", ""),
            ("Bow", "North", ""),
        ]);

        let params = QueryParams {
            search: "frost".to_string(),
            region: "North".to_string(),
            sort: SortOrder::Unsorted,
        };
        let results = run_query(&store, &params);

        assert_eq!(names(&results), vec!["Frost Sword"]);
    }

    #[test]
    fn test_name_sort_ascending_and_descending() {
        let store = store_with(&[("Sword", "", ""), ("axe", "", ""), ("Bow", "", "")]);

        let asc = run_query(
            &store,
            &QueryParams {
                sort: SortOrder::NameAsc,
                ..QueryParams::default()
            },
        );
        assert_eq!(names(&asc), vec!["axe", "Bow", "Sword"]);

        let desc = run_query(
            &store,
            &QueryParams {
                sort: SortOrder::NameDesc,
                ..QueryParams::default()
            },
        );
        assert_eq!(names(&desc), vec!["Sword", "Bow", "axe"]);
    }

    #[test]
    fn test_region_sort_breaks_ties_by_name_ascending() {
        let store = store_with(&[
            ("Sword", "North", ""),
            ("Axe", "South", ""),
            ("Bow", "North", ""),
        ]);

        let asc = run_query(
            &store,
            &QueryParams {
                sort: SortOrder::RegionAsc,
                ..QueryParams::default()
            },
        );
        assert_eq!(names(&asc), vec!["Bow", "Sword", "Axe"]);

        // descending region still breaks ties by name ascending
        let desc = run_query(
            &store,
            &QueryParams {
                sort: SortOrder::RegionDesc,
                ..QueryParams::default()
            },
        );
        assert_eq!(names(&desc), vec!["Axe", "Bow", "Sword"]);
    }

    #[test]
    fn test_unknown_sort_token_falls_back_to_input_order() {
        let store = store_with(&[("Sword", "", ""), ("Axe", "", "")]);

        assert_eq!(SortOrder::parse("bogus"), SortOrder::Unsorted);

        let params = QueryParams {
            sort: SortOrder::parse("bogus"),
            ..QueryParams::default()
        };
        assert_eq!(names(&run_query(&store, &params)), vec!["Sword", "Axe"]);
    }

    #[test]
    fn test_query_never_invents_or_duplicates_records() {
        let store = store_with(&[
            ("Sword", "North", "frost"),
            ("Axe", "South", ""),
            ("Bow", "North", ""),
        ]);

        for sort in [
            SortOrder::NameAsc,
            SortOrder::NameDesc,
            SortOrder::RegionAsc,
            SortOrder::RegionDesc,
            SortOrder::Unsorted,
        ] {
            let results = run_query(
                &store,
                &QueryParams {
                    search: "o".to_string(),
                    sort,
                    ..QueryParams::default()
                },
            );

            let mut ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), results.len(), "no duplicates");
            assert!(
                results.iter().all(|r| store.get(&r.id).is_some()),
                "every result comes from the store"
            );
        }
    }

    #[test]
    fn test_query_does_not_mutate_the_store() {
        let store = store_with(&[("Sword", "North", ""), ("Axe", "South", "")]);
        let before: Vec<String> = store.records().iter().map(|r| r.id.clone()).collect();

        run_query(
            &store,
            &QueryParams {
                sort: SortOrder::NameDesc,
                ..QueryParams::default()
            },
        );

        let after: Vec<String> = store.records().iter().map(|r| r.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_region_set_is_deduplicated_and_sorted() {
        let store = store_with(&[
            ("Sword", "North", ""),
            ("Axe", "East", ""),
            ("Bow", "North", ""),
            ("Helm", "", ""),
        ]);

        assert_eq!(region_set(&store), vec!["East", "North", "Unknown"]);
    }
}
