use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One selectable row of the receipt history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub download_id: String,
    pub receipt_id: String,
    pub pdf_ref: String,
    pub store_name: String,
    pub cost: String,
    pub cumulus_points: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub total_pages: u32,
    /// Document order, unique by `download_id`.
    pub entries: Vec<ListingEntry>,
}

/// Accumulates listing entries across pages, keyed by download id.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ReceiptIndex {
    entries: Vec<ListingEntry>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl ReceiptIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; a repeated download id replaces the earlier entry in place.
    pub fn insert(&mut self, entry: ListingEntry) {
        match self.positions.get(&entry.download_id) {
            Some(&idx) => self.entries[idx] = entry,
            None => {
                self.positions
                    .insert(entry.download_id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn merge(&mut self, page: ListingPage) {
        for entry in page.entries {
            self.insert(entry);
        }
    }

    pub fn get(&self, download_id: &str) -> Option<&ListingEntry> {
        self.positions.get(download_id).map(|&idx| &self.entries[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListingEntry> {
        self.entries.iter()
    }

    pub fn receipt_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.receipt_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
