use linked_hash_set::LinkedHashSet;

use crate::memory::PageId;

/// Translation look-aside buffer in front of the page table.
///
/// Holds up to `max_size` page numbers and replaces in insertion order.
#[derive(Debug, Clone)]
pub struct Tlb {
    entries: LinkedHashSet<PageId>,
    max_size: usize,
}

impl Tlb {
    pub fn new(size: usize) -> Self {
        Self {
            entries: LinkedHashSet::new(),
            max_size: size,
        }
    }

    /// Caches `pn`, dropping the oldest entry if full.
    pub fn push(&mut self, pn: PageId) {
        if self.max_size == 0 || self.entries.contains(&pn) {
            return;
        }
        if self.entries.len() == self.max_size {
            self.entries.pop_front();
        }
        self.entries.insert(pn);
    }

    pub fn contains(&self, pn: PageId) -> bool {
        self.entries.contains(&pn)
    }

    pub fn remove(&mut self, pn: PageId) {
        self.entries.remove(&pn);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached page numbers, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = PageId> + '_ {
        self.entries.iter().copied()
    }
}
