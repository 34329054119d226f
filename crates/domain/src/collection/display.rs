//! Flat display list built from the filtered view.

use serde::Serialize;

use super::address::{LeafAddress, address_of};
use super::item::Node;
use crate::request::{HttpMethod, Request};

/// One visible request row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEntry {
    /// Unique list key. Carries a sequence index to keep duplicates apart;
    /// never used for tree lookup.
    pub key: String,
    /// Canonical address used to find the request in the full tree.
    pub address: LeafAddress,
    /// Raw URL shown next to the name.
    pub url: String,
    /// Folder nesting depth (0 for root requests).
    pub depth: usize,
}

/// The user-facing request list.
///
/// Rebuilt from the filtered view on every load and patched locally after each
/// mutation. It is a cache: a fresh load always replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayList {
    entries: Vec<DisplayEntry>,
    next_index: usize,
}

impl DisplayList {
    /// Builds the list from the filtered view's root items (depth-first, document order).
    #[must_use]
    pub fn from_items(items: &[Node]) -> Self {
        let mut list = Self::default();
        list.collect(items, None, 0);
        list
    }

    fn collect(&mut self, items: &[Node], parent: Option<&str>, depth: usize) {
        for item in items {
            match item {
                Node::Request(request) => {
                    let entry = self.entry_for(request, parent, depth);
                    self.entries.push(entry);
                }
                Node::Folder(folder) => self.collect(&folder.items, Some(&folder.name), depth + 1),
            }
        }
    }

    fn entry_for(&mut self, request: &Request, parent: Option<&str>, depth: usize) -> DisplayEntry {
        let address = address_of(request, parent);
        let key = display_key(&address, self.next_index);
        self.next_index += 1;
        DisplayEntry {
            key,
            address,
            url: request.url.clone(),
            depth,
        }
    }

    /// Returns the entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    /// Returns the number of visible requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry by its display key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DisplayEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    fn position(&self, address: &LeafAddress) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.address == address)
    }

    /// Reflects an in-place edit. The method may have changed, so the entry's
    /// address is recomputed from the edited request.
    pub fn patch_edited(&mut self, previous: &LeafAddress, request: &Request) {
        if let Some(index) = self.position(previous) {
            let entry = &mut self.entries[index];
            entry.address = LeafAddress::new(
                previous.parent_folder.clone(),
                request.name.clone(),
                request.method,
            );
            entry.url = request.url.clone();
        }
    }

    /// Inserts a row for a clone right after its source's row. Clones of
    /// requests hidden from the filtered view stay hidden.
    pub fn patch_cloned(&mut self, source: &LeafAddress, clone: &Request) {
        if let Some(index) = self.position(source) {
            let depth = self.entries[index].depth;
            let parent = (!source.is_root()).then_some(source.parent_folder.as_str());
            let entry = self.entry_for(clone, parent, depth);
            self.entries.insert(index + 1, entry);
        }
    }

    /// Removes the first row with the given address.
    pub fn patch_removed(&mut self, address: &LeafAddress) {
        if let Some(index) = self.position(address) {
            self.entries.remove(index);
        }
    }
}

fn display_key(address: &LeafAddress, index: usize) -> String {
    format!(
        "{}::{}::{}::{index}",
        address.parent_folder, address.name, address.method
    )
}

/// Counts rows per method, for list headers.
#[must_use]
pub fn method_histogram(list: &DisplayList) -> Vec<(HttpMethod, usize)> {
    let mut counts: Vec<(HttpMethod, usize)> = Vec::new();
    for entry in list.entries() {
        match counts.iter_mut().find(|(method, _)| *method == entry.address.method) {
            Some((_, count)) => *count += 1,
            None => counts.push((entry.address.method, 1)),
        }
    }
    counts
}
