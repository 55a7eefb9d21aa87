//! Id-keyed lookup tables over catalog listings.

use std::collections::{hash_map::Entry, HashMap};

use consultas_core::RawRecord;
use tracing::warn;

/// Catalog records keyed by the string form of their `id`.
///
/// When an id repeats, the last record seen wins; the id keeps the position
/// of its first appearance for ordered iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogIndex {
    entries: HashMap<String, RawRecord>,
    order: Vec<String>,
}

impl CatalogIndex {
    pub fn get(&self, id: &str) -> Option<&RawRecord> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(id, record)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawRecord)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|record| (id.as_str(), record)))
    }

    fn insert(&mut self, id: String, record: RawRecord) {
        match self.entries.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.insert(record);
            }
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(record);
            }
        }
    }
}

/// Single pass over a catalog listing. Entries without an `id` break the
/// catalog contract; they are logged and left out.
pub fn build_index(records: &[RawRecord]) -> CatalogIndex {
    let mut index = CatalogIndex::default();
    for record in records {
        match record.id_text() {
            Some(id) => index.insert(id, record.clone()),
            None => warn!(record = %record.as_value(), "catalog entry without id skipped"),
        }
    }
    index
}

/// The two reference catalogs consultations are joined against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogs {
    pub athletes: CatalogIndex,
    pub professionals: CatalogIndex,
}

impl Catalogs {
    pub fn build(athletes: &[RawRecord], professionals: &[RawRecord]) -> Self {
        Self {
            athletes: build_index(athletes),
            professionals: build_index(professionals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn keys_are_stringified_ids() {
        let index = build_index(&records(json!([
            {"id": 7, "nombre": "Ana"},
            {"id": "8", "nombre": "Luis"}
        ])));
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("7").and_then(|r| r.text("nombre")), Some("Ana"));
        assert!(index.contains("8"));
    }

    #[test]
    fn duplicate_ids_keep_last_record_at_first_position() {
        let index = build_index(&records(json!([
            {"id": 1, "nombre": "Primero"},
            {"id": 2, "nombre": "Otro"},
            {"id": 1, "nombre": "Ultimo"}
        ])));
        assert_eq!(index.len(), 2);
        let names: Vec<_> = index
            .iter()
            .map(|(id, record)| (id, record.text_or("nombre", "")))
            .collect();
        assert_eq!(names, vec![("1", "Ultimo"), ("2", "Otro")]);
    }

    #[test]
    fn entries_without_id_are_left_out() {
        let index = build_index(&records(json!([{"nombre": "Sin id"}, {"id": null}, "x"])));
        assert!(index.is_empty());
    }
}
