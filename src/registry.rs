//! Ordered marker registry
//!
//! Insertion order is the iteration order for drawing and for hit testing,
//! so it also decides which of several overlapping markers wins a click.
//! Replacing an entry keeps its original slot.

use std::collections::HashMap;
use std::rc::Rc;

use crate::domain::{MarkerId, MarkerRef};

/// Removed slots tolerated before `order` is compacted
const COMPACT_SLACK: usize = 64;

/// Address of the marker object behind an `Rc`, used as identity for
/// markers that do not carry their own key
fn object_addr(marker: &MarkerRef) -> usize {
    Rc::as_ptr(marker).cast::<()>() as usize
}

struct Entry {
    slot: usize,
    marker: MarkerRef,
}

#[derive(Default)]
pub struct MarkerRegistry {
    /// Insertion order; removed entries leave a hole until compaction
    order: Vec<Option<MarkerId>>,
    entries: HashMap<MarkerId, Entry>,
    by_object: HashMap<usize, MarkerId>,
    next_auto: u64,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity this marker already has, either its own key or the id
    /// assigned when the same object was registered
    pub fn resolve_id(&self, marker: &MarkerRef) -> Option<MarkerId> {
        marker
            .key()
            .map(MarkerId::Key)
            .or_else(|| self.by_object.get(&object_addr(marker)).copied())
    }

    /// Return the marker's identity, allocating a fresh one if it has none
    pub fn assign_id(&mut self, marker: &MarkerRef) -> MarkerId {
        if let Some(id) = self.resolve_id(marker) {
            return id;
        }
        self.next_auto += 1;
        MarkerId::Auto(self.next_auto)
    }

    /// Register a marker, replacing any entry with the same identity.
    /// Returns the assigned id and the replaced marker.
    pub fn add(&mut self, marker: MarkerRef) -> (MarkerId, Option<MarkerRef>) {
        let id = self.assign_id(&marker);
        let previous = self.insert(id, marker);
        (id, previous)
    }

    /// Insert under an explicit identity (last write wins)
    pub fn insert(&mut self, id: MarkerId, marker: MarkerRef) -> Option<MarkerRef> {
        if marker.key().is_none() {
            self.by_object.insert(object_addr(&marker), id);
        }

        let Some(entry) = self.entries.get_mut(&id) else {
            let slot = self.order.len();
            self.order.push(Some(id));
            self.entries.insert(id, Entry { slot, marker });
            return None;
        };

        let previous = std::mem::replace(&mut entry.marker, marker);
        if !Rc::ptr_eq(&previous, &entry.marker) {
            self.forget_object(&previous, id);
        }
        Some(previous)
    }

    /// Remove an entry; absent ids are ignored
    pub fn remove(&mut self, id: MarkerId) -> Option<MarkerRef> {
        let Entry { slot, marker } = self.entries.remove(&id)?;
        self.order[slot] = None;
        self.forget_object(&marker, id);
        self.maybe_compact();
        Some(marker)
    }

    pub fn get(&self, id: MarkerId) -> Option<&MarkerRef> {
        self.entries.get(&id).map(|entry| &entry.marker)
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh traversal in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, &MarkerRef)> + '_ {
        self.order
            .iter()
            .flatten()
            .filter_map(|id| self.entries.get(id).map(|entry| (*id, &entry.marker)))
    }

    /// Snapshot of the current ids in insertion order
    pub fn ids(&self) -> Vec<MarkerId> {
        self.order.iter().flatten().copied().collect()
    }

    /// Visit entries in order, removing those the visitor rejects
    pub fn retain(&mut self, mut keep: impl FnMut(MarkerId, &MarkerRef) -> bool) {
        for id in self.ids() {
            let Some(marker) = self.get(id) else {
                continue;
            };
            if !keep(id, marker) {
                self.remove(id);
            }
        }
    }

    /// Drop holes once they outnumber live entries, keeping removal
    /// amortized constant time
    fn maybe_compact(&mut self) {
        let holes = self.order.len() - self.entries.len();
        if holes <= COMPACT_SLACK || holes <= self.entries.len() {
            return;
        }
        self.order.retain(Option::is_some);
        for (slot, id) in self.order.iter().flatten().enumerate() {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.slot = slot;
            }
        }
    }

    fn forget_object(&mut self, marker: &MarkerRef, id: MarkerId) {
        let addr = object_addr(marker);
        if self.by_object.get(&addr) == Some(&id) {
            self.by_object.remove(&addr);
        }
    }
}

impl std::fmt::Debug for MarkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerRegistry")
            .field("order", &self.ids())
            .finish_non_exhaustive()
    }
}
