//! Inventory store: the in-memory set of known servers.
//!
//! Records are kept in insertion order. A record is never edited in place:
//! adding a record whose id already exists replaces it in its slot.

use super::types::{generate_id, ServerRecord};

#[derive(Debug, Default)]
pub struct InventoryStore {
    records: Vec<ServerRecord>,
    selected: Option<String>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ServerRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.add(record);
        }
        store
    }

    /// Append a record, or replace the record that already carries its id.
    pub fn add(&mut self, record: ServerRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Delete by id. Clears the detail selection if it pointed at the record.
    pub fn remove(&mut self, id: &str) -> Option<ServerRecord> {
        let pos = self.records.iter().position(|r| r.id == id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Some(self.records.remove(pos))
    }

    /// Records matching every whitespace-separated term of `query`
    /// (case-insensitive substring match). A blank query matches everything.
    pub fn filter(&self, query: &str) -> Vec<&ServerRecord> {
        let query = query.trim().to_lowercase();
        let terms: Vec<&str> = query.split_whitespace().collect();
        if terms.is_empty() {
            return self.records.iter().collect();
        }

        self.records
            .iter()
            .filter(|r| {
                let text = r.searchable_text();
                terms.iter().all(|t| text.contains(t))
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&ServerRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn list(&self) -> &[ServerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mark a record as the one shown in the detail view.
    pub fn select(&mut self, id: &str) -> Option<&ServerRecord> {
        let record = self.records.iter().find(|r| r.id == id)?;
        self.selected = Some(record.id.clone());
        Some(record)
    }

    pub fn selected(&self) -> Option<&ServerRecord> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// An identifier not used by any record in the store.
    pub fn fresh_id(&self) -> String {
        loop {
            let id = generate_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}
