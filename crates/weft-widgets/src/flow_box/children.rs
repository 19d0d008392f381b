#![forbid(unsafe_code)]

//! Ordered child storage.
//!
//! Children live in an arena of generation-tagged slots; iteration order is a
//! separate list of ids. Reordering only permutes the list, so a [`ChildId`]
//! stays valid until its child is removed.
//!
//! # Invariants
//!
//! 1. `order` holds every live id exactly once.
//! 2. `record.position` equals the index of the record's id in `order`.
//! 3. A freed slot bumps its generation, so stale ids never alias a new child.
//!
//! # Failure Modes
//!
//! - Looking up a removed id, or an id minted by another collection, panics.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use bitflags::bitflags;
use weft_core::geometry::Rect;

static NEXT_OWNER: AtomicU32 = AtomicU32::new(1);

/// Stable handle to a child of a flow box.
///
/// Handles survive sorting, filtering and the insertion or removal of other
/// children. Using a handle after its child was removed is a contract
/// violation and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildId {
    owner: u32,
    slot: u32,
    generation: u32,
}

bitflags! {
    /// Per-child state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct ChildFlags: u8 {
        const SELECTED       = 0b001;
        /// Intrinsic show/hide flag set by the owner of the child.
        const SHOWN          = 0b010;
        /// Result of the filter predicate.
        const FILTER_VISIBLE = 0b100;
    }
}

pub(crate) struct ChildRecord<W> {
    pub(crate) widget: W,
    pub(crate) flags: ChildFlags,
    /// Last allocated rectangle; kept while the child is hidden.
    pub(crate) allocation: Rect,
    position: usize,
}

impl<W> ChildRecord<W> {
    /// Shown and not filtered out.
    #[inline]
    pub(crate) fn is_visible(&self) -> bool {
        self.flags
            .contains(ChildFlags::SHOWN | ChildFlags::FILTER_VISIBLE)
    }

    #[inline]
    pub(crate) fn is_selected(&self) -> bool {
        self.flags.contains(ChildFlags::SELECTED)
    }

    /// Set the selected bit. Returns whether it changed.
    pub(crate) fn set_selected(&mut self, selected: bool) -> bool {
        if self.is_selected() == selected {
            return false;
        }
        self.flags.set(ChildFlags::SELECTED, selected);
        true
    }
}

struct Slot<W> {
    generation: u32,
    record: Option<ChildRecord<W>>,
}

pub(crate) struct Children<W> {
    owner: u32,
    slots: Vec<Slot<W>>,
    free: Vec<u32>,
    order: Vec<ChildId>,
}

impl<W> Default for Children<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Children<W> {
    pub(crate) fn new() -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, AtomicOrdering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in sequence order.
    #[inline]
    pub(crate) fn ids(&self) -> &[ChildId] {
        &self.order
    }

    pub(crate) fn at(&self, index: usize) -> Option<ChildId> {
        self.order.get(index).copied()
    }

    /// Insert `widget` at `index` (clamped to the end).
    pub(crate) fn insert(&mut self, widget: W, index: usize) -> ChildId {
        let index = index.min(self.order.len());
        let record = ChildRecord {
            widget,
            flags: ChildFlags::SHOWN | ChildFlags::FILTER_VISIBLE,
            allocation: Rect::default(),
            position: index,
        };
        let id = match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.record = Some(record);
                ChildId {
                    owner: self.owner,
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                let slot = u32::try_from(self.slots.len())
                    .unwrap_or_else(|_| panic!("flow box child arena exhausted"));
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                ChildId {
                    owner: self.owner,
                    slot,
                    generation: 0,
                }
            }
        };
        self.order.insert(index, id);
        self.renumber(index);
        id
    }

    /// Index at which `widget` would be inserted under `cmp`: after every
    /// child that does not compare greater.
    pub(crate) fn sorted_index(&self, widget: &W, cmp: &dyn Fn(&W, &W) -> Ordering) -> usize {
        self.order
            .partition_point(|&id| cmp(&self.get(id).widget, widget) != Ordering::Greater)
    }

    pub(crate) fn remove(&mut self, id: ChildId) -> ChildRecord<W> {
        let position = self.get(id).position;
        self.order.remove(position);
        self.renumber(position);

        let entry = &mut self.slots[id.slot as usize];
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.slot);
        match entry.record.take() {
            Some(record) => record,
            None => unreachable!("live id checked above"),
        }
    }

    /// Whether `id` names a live child of this collection.
    pub(crate) fn contains(&self, id: ChildId) -> bool {
        id.owner == self.owner
            && self
                .slots
                .get(id.slot as usize)
                .is_some_and(|s| s.generation == id.generation && s.record.is_some())
    }

    pub(crate) fn get(&self, id: ChildId) -> &ChildRecord<W> {
        self.check(id);
        match &self.slots[id.slot as usize].record {
            Some(record) => record,
            None => unreachable!("checked"),
        }
    }

    pub(crate) fn get_mut(&mut self, id: ChildId) -> &mut ChildRecord<W> {
        self.check(id);
        match &mut self.slots[id.slot as usize].record {
            Some(record) => record,
            None => unreachable!("checked"),
        }
    }

    #[inline]
    pub(crate) fn position(&self, id: ChildId) -> usize {
        self.get(id).position
    }

    /// Iterate `(id, record)` in sequence order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (ChildId, &ChildRecord<W>)> + '_ {
        self.order.iter().map(move |&id| (id, self.get(id)))
    }

    /// Stable re-sort of the whole sequence.
    pub(crate) fn sort_by(&mut self, cmp: &dyn Fn(&W, &W) -> Ordering) {
        let mut order = std::mem::take(&mut self.order);
        order.sort_by(|&a, &b| cmp(&self.get(a).widget, &self.get(b).widget));
        self.order = order;
        self.renumber(0);
    }

    /// Move one child to its sorted place, leaving the rest untouched.
    pub(crate) fn resort_one(&mut self, id: ChildId, cmp: &dyn Fn(&W, &W) -> Ordering) {
        let old = self.position(id);
        self.order.remove(old);
        let widget = &self.get(id).widget;
        let new = self
            .order
            .partition_point(|&other| cmp(&self.get(other).widget, widget) != Ordering::Greater);
        self.order.insert(new, id);
        self.renumber(old.min(new));
    }

    fn renumber(&mut self, from: usize) {
        for index in from..self.order.len() {
            let id = self.order[index];
            if let Some(record) = self.slots[id.slot as usize].record.as_mut() {
                record.position = index;
            }
        }
    }

    fn check(&self, id: ChildId) {
        assert!(
            self.contains(id),
            "flow box contract violated: {id:?} is not a live child of this flow box"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(children: &Children<&'static str>) -> Vec<&'static str> {
        children.iter().map(|(_, r)| r.widget).collect()
    }

    #[test]
    fn insert_at_index_and_clamp() {
        let mut c = Children::new();
        c.insert("b", 0);
        c.insert("a", 0);
        c.insert("d", 99);
        c.insert("c", 2);
        assert_eq!(names(&c), ["a", "b", "c", "d"]);
        for (i, &id) in c.ids().iter().enumerate() {
            assert_eq!(c.position(id), i);
        }
    }

    #[test]
    fn removal_keeps_other_handles_valid() {
        let mut c = Children::new();
        let a = c.insert("a", 0);
        let b = c.insert("b", 1);
        let d = c.insert("d", 2);
        assert_eq!(c.remove(b).widget, "b");
        assert!(!c.contains(b));
        assert_eq!(c.get(a).widget, "a");
        assert_eq!(c.get(d).widget, "d");
        assert_eq!(c.position(d), 1);
    }

    #[test]
    fn reused_slot_does_not_revive_stale_id() {
        let mut c = Children::new();
        let a = c.insert("a", 0);
        c.remove(a);
        let b = c.insert("b", 0);
        assert!(!c.contains(a));
        assert!(c.contains(b));
    }

    #[test]
    #[should_panic(expected = "not a live child")]
    fn stale_id_panics() {
        let mut c = Children::new();
        let a = c.insert("a", 0);
        c.remove(a);
        let _ = c.get(a);
    }

    #[test]
    #[should_panic(expected = "not a live child")]
    fn foreign_id_panics() {
        let mut one = Children::new();
        let two: Children<&str> = Children::new();
        let a = one.insert("a", 0);
        let _ = two.get(a);
    }

    #[test]
    fn sorted_insert_goes_after_equals() {
        let mut c: Children<(u8, char)> = Children::new();
        let by_key = |a: &(u8, char), b: &(u8, char)| a.0.cmp(&b.0);
        for item in [(2, 'x'), (1, 'a'), (2, 'y'), (0, 'z')] {
            let at = c.sorted_index(&item, &by_key);
            c.insert(item, at);
        }
        let got: Vec<char> = c.iter().map(|(_, r)| r.widget.1).collect();
        assert_eq!(got, ['z', 'a', 'x', 'y']);
    }

    #[test]
    fn sort_is_stable_and_resort_one_moves_single_child() {
        let mut c: Children<(u8, char)> = Children::new();
        for (i, item) in [(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')].into_iter().enumerate() {
            c.insert(item, i);
        }
        let by_key = |a: &(u8, char), b: &(u8, char)| a.0.cmp(&b.0);
        c.sort_by(&by_key);
        let got: Vec<char> = c.iter().map(|(_, r)| r.widget.1).collect();
        assert_eq!(got, ['b', 'd', 'a', 'c']);

        let b = c.ids()[0];
        c.get_mut(b).widget.0 = 5;
        c.resort_one(b, &by_key);
        let got: Vec<char> = c.iter().map(|(_, r)| r.widget.1).collect();
        assert_eq!(got, ['d', 'a', 'c', 'b']);
        assert_eq!(c.position(b), 3);
    }

    #[test]
    fn flags_default_to_visible_and_unselected() {
        let mut c = Children::new();
        let a = c.insert("a", 0);
        let rec = c.get_mut(a);
        assert!(rec.is_visible());
        assert!(!rec.is_selected());
        assert!(rec.set_selected(true));
        assert!(!rec.set_selected(true));
        rec.flags.remove(ChildFlags::FILTER_VISIBLE);
        assert!(!rec.is_visible());
    }
}
