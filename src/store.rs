// 🗃️ Collection Store - canonical records plus source provenance
//
// The authoritative in-memory set of catalog records. All mutation goes
// through this type; readers get immutable slices. Invariants:
// - every record's source_id is "manual" or names exactly one batch
// - no two batches share a file name
// - record ids are unique
// - region is never empty ("Unknown" stands in for absent values)

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CatalogError, Result};
use crate::normalizer::{normalize_region, normalize_row};
use std::collections::HashMap;

/// Source id carried by every hand-authored record.
pub const MANUAL_SOURCE: &str = "manual";

// ============================================================================
// RECORD
// ============================================================================

/// Provenance class of a record, independent of its source id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Csv,
    Manual,
}

/// One canonical catalog entry.
///
/// `id` has two documented variants:
/// - `"manual-{millis}-{random}"` for hand-authored records (time component
///   plus a random component, collision-safe within the same instant);
/// - `"{source_id}-{row_index}"` for records derived from a tabular source,
///   so re-deriving from the same source and row is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub region: String,
    pub lore: String,
    pub description_lore: String,
    pub image: String,
    pub source_id: String,
    pub origin: Origin,
}

/// Metadata for one completed file ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBatch {
    pub source_id: String,
    pub file_name: String,
    /// Records contributed at ingestion time. A snapshot: removing single
    /// records later does not adjust it.
    pub record_count: usize,
}

/// The five user-editable fields, shared by manual add and edit.
#[derive(Debug, Clone, Default)]
pub struct RecordFields {
    pub name: String,
    pub region: String,
    pub description_lore: String,
    pub lore: String,
    pub image: String,
}

/// One row of the "loaded sources" summary shown by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEntry {
    File {
        source_id: String,
        file_name: String,
        record_count: usize,
    },
    Manual {
        record_count: usize,
    },
}

// ============================================================================
// ID GENERATION
// ============================================================================

/// Epoch-millis plus a random fragment, unique within the process lifetime.
fn unique_token() -> String {
    let millis = Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", millis, &random[..8])
}

fn manual_id() -> String {
    format!("{}-{}", MANUAL_SOURCE, unique_token())
}

fn batch_source_id() -> String {
    format!("src-{}", unique_token())
}

// ============================================================================
// CATALOG STORE
// ============================================================================

/// Ordered records (insertion order, not display order) plus the batches
/// that produced them. Serializes directly as the persisted state blob
/// `{ records, batches }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogStore {
    records: Vec<Record>,
    batches: Vec<SourceBatch>,
}

impl CatalogStore {
    pub fn new() -> Self {
        CatalogStore::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn batches(&self) -> &[SourceBatch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    /// File names are compared exactly (case-sensitive).
    pub fn has_source_file(&self, file_name: &str) -> bool {
        self.batches.iter().any(|batch| batch.file_name == file_name)
    }

    /// Add a hand-authored record. The name is the one required field;
    /// everything else falls back to its default. All fields are trimmed.
    pub fn add_manual(&mut self, fields: RecordFields) -> Result<Record> {
        let name = fields.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::Validation("item name is required".to_string()));
        }

        let record = Record {
            id: manual_id(),
            name,
            region: normalize_region(fields.region.trim()),
            lore: fields.lore.trim().to_string(),
            description_lore: fields.description_lore.trim().to_string(),
            image: fields.image.trim().to_string(),
            source_id: MANUAL_SOURCE.to_string(),
            origin: Origin::Manual,
        };

        self.records.push(record.clone());
        Ok(record)
    }

    /// Merge one parsed file into the collection as a new batch.
    ///
    /// Rejects the whole batch if the file name was already ingested;
    /// otherwise every row is normalized, tagged with the fresh source id,
    /// and appended in row order.
    pub fn merge_batch(
        &mut self,
        rows: &[HashMap<String, String>],
        file_name: &str,
    ) -> Result<SourceBatch> {
        if self.has_source_file(file_name) {
            return Err(CatalogError::DuplicateSource {
                file_name: file_name.to_string(),
            });
        }

        let batch = SourceBatch {
            source_id: batch_source_id(),
            file_name: file_name.to_string(),
            record_count: rows.len(),
        };

        for (row_index, row) in rows.iter().enumerate() {
            self.records.push(normalize_row(row, &batch.source_id, row_index));
        }
        self.batches.push(batch.clone());

        Ok(batch)
    }

    /// Overwrite the editable fields of an existing record in place.
    /// `id`, `source_id` and `origin` are immutable post-creation.
    pub fn edit(&mut self, id: &str, fields: RecordFields) -> Result<Record> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })?;

        record.name = fields.name.trim().to_string();
        record.region = normalize_region(fields.region.trim());
        record.description_lore = fields.description_lore.trim().to_string();
        record.lore = fields.lore.trim().to_string();
        record.image = fields.image.trim().to_string();

        Ok(record.clone())
    }

    /// Delete one record. The owning batch's record_count snapshot is
    /// deliberately left untouched.
    pub fn remove(&mut self, id: &str) -> Result<Record> {
        let index = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })?;

        Ok(self.records.remove(index))
    }

    /// Remove a batch and every record it contributed, as one step.
    /// Returns the number of records removed.
    pub fn remove_batch(&mut self, source_id: &str) -> Result<usize> {
        let index = self
            .batches
            .iter()
            .position(|batch| batch.source_id == source_id)
            .ok_or_else(|| CatalogError::NotFound {
                id: source_id.to_string(),
            })?;

        self.batches.remove(index);
        let before = self.records.len();
        self.records.retain(|record| record.source_id != source_id);
        Ok(before - self.records.len())
    }

    /// Remove every hand-authored record. No batch is affected, since
    /// manual records have none. Returns the number of records removed.
    pub fn remove_manual(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.origin != Origin::Manual);
        before - self.records.len()
    }

    /// Per-batch rows plus one pseudo-row for manual records when any exist.
    pub fn sources_summary(&self) -> Vec<SourceEntry> {
        let mut entries: Vec<SourceEntry> = self
            .batches
            .iter()
            .map(|batch| SourceEntry::File {
                source_id: batch.source_id.clone(),
                file_name: batch.file_name.clone(),
                record_count: batch.record_count,
            })
            .collect();

        let manual_count = self
            .records
            .iter()
            .filter(|record| record.origin == Origin::Manual)
            .count();
        if manual_count > 0 {
            entries.push(SourceEntry::Manual {
                record_count: manual_count,
            });
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> RecordFields {
        RecordFields {
            name: name.to_string(),
            ..RecordFields::default()
        }
    }

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_add_manual_requires_name() {
        let mut store = CatalogStore::new();

        let err = store.add_manual(named("   ")).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(store.is_empty(), "failed add must not mutate the store");
    }

    #[test]
    fn test_add_manual_applies_defaults_and_trims() {
        let mut store = CatalogStore::new();

        let record = store
            .add_manual(RecordFields {
                name: "  Shield  ".to_string(),
                region: "  ".to_string(),
                lore: " old ".to_string(),
                ..RecordFields::default()
            })
            .unwrap();

        assert_eq!(record.name, "Shield");
        assert_eq!(record.region, "Unknown");
        assert_eq!(record.lore, "old");
        assert_eq!(record.source_id, MANUAL_SOURCE);
        assert_eq!(record.origin, Origin::Manual);
        assert!(record.id.starts_with("manual-"));
    }

    #[test]
    fn test_add_manual_title_cases_region() {
        let mut store = CatalogStore::new();

        let record = store
            .add_manual(RecordFields {
                name: "Shield".to_string(),
                region: "frozen coast".to_string(),
                ..RecordFields::default()
            })
            .unwrap();

        assert_eq!(record.region, "Frozen Coast");
    }

    #[test]
    fn test_merge_batch_normalizes_and_tags_rows() {
        let mut store = CatalogStore::new();

        let batch = store
            .merge_batch(
                &[
                    row(&[("Item Name", "Sword"), ("Region", "north wind")]),
                    row(&[("name", "Axe")]),
                ],
                "items.csv",
            )
            .unwrap();

        assert_eq!(batch.file_name, "items.csv");
        assert_eq!(batch.record_count, 2);
        assert_eq!(store.len(), 2);

        let sword = &store.records()[0];
        assert_eq!(sword.name, "Sword");
        assert_eq!(sword.region, "North Wind");
        assert_eq!(sword.origin, Origin::Csv);
        assert_eq!(sword.source_id, batch.source_id);
        assert_eq!(sword.id, format!("{}-0", batch.source_id));

        assert_eq!(store.records()[1].region, "Unknown");
    }

    #[test]
    fn test_merge_batch_rejects_duplicate_file_name() {
        let mut store = CatalogStore::new();
        let rows = vec![row(&[("Item Name", "Sword")])];

        store.merge_batch(&rows, "items.csv").unwrap();
        let count_before = store.len();

        let err = store.merge_batch(&rows, "items.csv").unwrap_err();

        assert!(matches!(err, CatalogError::DuplicateSource { .. }));
        assert_eq!(store.len(), count_before, "rejected merge must not add records");
        assert_eq!(store.batches().len(), 1);
    }

    #[test]
    fn test_merge_batch_same_rows_different_file_gets_fresh_ids() {
        let mut store = CatalogStore::new();
        let rows = vec![row(&[("Item Name", "Sword")])];

        let first = store.merge_batch(&rows, "a.csv").unwrap();
        let second = store.merge_batch(&rows, "b.csv").unwrap();

        assert_ne!(first.source_id, second.source_id);

        let mut ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), store.len(), "record ids must stay unique");
    }

    #[test]
    fn test_edit_overwrites_values_but_not_identity() {
        let mut store = CatalogStore::new();
        let original = store.add_manual(named("Shield")).unwrap();

        let edited = store
            .edit(
                &original.id,
                RecordFields {
                    name: "Tower Shield".to_string(),
                    region: "iron hills".to_string(),
                    description_lore: "heavy".to_string(),
                    lore: "forged twice".to_string(),
                    image: "http://example.com/tower.png".to_string(),
                },
            )
            .unwrap();

        assert_eq!(edited.name, "Tower Shield");
        assert_eq!(edited.region, "Iron Hills");
        assert_eq!(edited.description_lore, "heavy");
        assert_eq!(edited.lore, "forged twice");
        assert_eq!(edited.image, "http://example.com/tower.png");
        // identity and provenance are immutable
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.source_id, original.source_id);
        assert_eq!(edited.origin, original.origin);
    }

    #[test]
    fn test_edit_unknown_id_is_not_found() {
        let mut store = CatalogStore::new();

        let err = store.edit("missing", named("X")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn test_remove_leaves_batch_count_stale() {
        let mut store = CatalogStore::new();
        let batch = store
            .merge_batch(
                &[row(&[("Item Name", "Sword")]), row(&[("Item Name", "Axe")])],
                "items.csv",
            )
            .unwrap();

        let removed = store.remove(&format!("{}-0", batch.source_id)).unwrap();

        assert_eq!(removed.name, "Sword");
        assert_eq!(store.len(), 1);
        // record_count is an ingestion-time snapshot
        assert_eq!(store.batches()[0].record_count, 2);
    }

    #[test]
    fn test_remove_unknown_id_is_not_found() {
        let mut store = CatalogStore::new();

        let err = store.remove("missing").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn test_remove_batch_is_atomic() {
        let mut store = CatalogStore::new();
        let keep = store
            .merge_batch(&[row(&[("Item Name", "Sword")])], "keep.csv")
            .unwrap();
        let doomed = store
            .merge_batch(
                &[row(&[("Item Name", "Axe")]), row(&[("Item Name", "Bow")])],
                "drop.csv",
            )
            .unwrap();
        store.add_manual(named("Shield")).unwrap();

        let removed = store.remove_batch(&doomed.source_id).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.batches().len(), 1);
        assert_eq!(store.batches()[0].source_id, keep.source_id);
        assert!(
            store.records().iter().all(|r| r.source_id != doomed.source_id),
            "no orphaned records may survive a batch removal"
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_manual_only_touches_manual_records() {
        let mut store = CatalogStore::new();
        store
            .merge_batch(&[row(&[("Item Name", "Sword")])], "items.csv")
            .unwrap();
        store.add_manual(named("Shield")).unwrap();
        store.add_manual(named("Helm")).unwrap();

        let removed = store.remove_manual();

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].name, "Sword");
        assert_eq!(store.batches().len(), 1, "batches are untouched by remove_manual");
    }

    #[test]
    fn test_manual_ids_are_unique() {
        let mut store = CatalogStore::new();
        for i in 0..50 {
            store.add_manual(named(&format!("Item {}", i))).unwrap();
        }

        let mut ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_sources_summary_includes_manual_pseudo_entry() {
        let mut store = CatalogStore::new();
        let batch = store
            .merge_batch(&[row(&[("Item Name", "Sword")])], "items.csv")
            .unwrap();

        assert_eq!(store.sources_summary().len(), 1);

        store.add_manual(named("Shield")).unwrap();
        let summary = store.sources_summary();

        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary[0],
            SourceEntry::File {
                source_id: batch.source_id.clone(),
                file_name: "items.csv".to_string(),
                record_count: 1,
            }
        );
        assert_eq!(summary[1], SourceEntry::Manual { record_count: 1 });
    }
}
