#![forbid(unsafe_code)]

//! Binding a flow box to a list model.
//!
//! A bound flow box mirrors the model one child per item, in model order.
//! The host forwards each structural change of the model with
//! [`FlowBox::model_items_changed`]; [`VecModel::splice`] returns the
//! matching [`ItemsChanged`] record.
//!
//! While a model is bound, sort and filter functions are ignored and
//! [`FlowBox::remove_all`] does nothing: the model owns the order and the
//! membership.

use std::cell::RefCell;
use std::rc::Rc;

use super::{FlowBox, FlowChild};

/// An ordered collection of items a flow box can mirror.
pub trait ListModel {
    type Item;

    /// Number of items.
    fn n_items(&self) -> usize;

    /// Item at `position`, or `None` past the end.
    fn item(&self, position: usize) -> Option<Self::Item>;
}

/// A structural change: `removed` items at `position` were replaced by
/// `added` new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemsChanged {
    pub position: usize,
    pub removed: usize,
    pub added: usize,
}

/// A shared, growable list model. Clones share the same items.
#[derive(Debug)]
pub struct VecModel<T> {
    items: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for VecModel<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
        }
    }
}

impl<T> Default for VecModel<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> VecModel<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Replace `removed` items at `position` with `items`.
    ///
    /// # Panics
    ///
    /// Panics if `position + removed` is past the end.
    pub fn splice(&self, position: usize, removed: usize, items: impl IntoIterator<Item = T>) -> ItemsChanged {
        let mut vec = self.items.borrow_mut();
        let before = vec.len();
        vec.splice(position..position + removed, items).for_each(drop);
        ItemsChanged {
            position,
            removed,
            added: vec.len() + removed - before,
        }
    }

    pub fn push(&self, item: T) -> ItemsChanged {
        let position = self.len();
        self.splice(position, 0, [item])
    }

    pub fn remove(&self, position: usize) -> ItemsChanged {
        self.splice(position, 1, [])
    }
}

impl<T: Clone> ListModel for VecModel<T> {
    type Item = T;

    fn n_items(&self) -> usize {
        self.len()
    }

    fn item(&self, position: usize) -> Option<T> {
        self.items.borrow().get(position).cloned()
    }
}

/// Type-erased model binding held by the flow box.
pub(crate) struct BoundModel<W> {
    n_items: Box<dyn Fn() -> usize>,
    create: Box<dyn FnMut(usize) -> Option<W>>,
}

impl<W: FlowChild> FlowBox<W> {
    /// Mirror `model`, creating one child per item with `factory`.
    ///
    /// Removes every existing child (and any previous binding) first.
    pub fn bind_model<M>(&mut self, model: Rc<M>, mut factory: impl FnMut(M::Item) -> W + 'static)
    where
        M: ListModel + 'static,
        W: 'static,
    {
        self.model = None;
        let mut dirty = self.clear_children();

        let counted = Rc::clone(&model);
        self.model = Some(BoundModel {
            n_items: Box::new(move || counted.n_items()),
            create: Box::new(move |position| model.item(position).map(&mut factory)),
        });
        self.check_model_compat();

        let n = self.model.as_ref().map_or(0, |m| (m.n_items)());
        dirty |= self.splice_model_children(0, 0, n);
        if dirty {
            self.notify_selection_changed("bind_model");
        }
    }

    /// Drop the model binding and the children created from it.
    pub fn unbind_model(&mut self) {
        if self.model.take().is_some() && self.clear_children() {
            self.notify_selection_changed("unbind_model");
        }
    }

    /// Whether a list model is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.model.is_some()
    }

    /// Apply a structural change of the bound model: remove `removed`
    /// children at `position`, then create `added` children from the items
    /// now at `position..position + added`.
    ///
    /// A change that reaches past the current children is clamped and
    /// logged. Without a bound model the call does nothing. Removing any
    /// number of selected children fires one `SelectionChanged`.
    pub fn model_items_changed(&mut self, position: usize, removed: usize, added: usize) {
        if self.splice_model_children(position, removed, added) {
            self.notify_selection_changed("model_items_changed");
        }
    }

    /// Apply a model change without notifying selection listeners. Returns
    /// whether the selection changed.
    fn splice_model_children(&mut self, position: usize, removed: usize, added: usize) -> bool {
        if self.model.is_none() {
            return false;
        }
        let len = self.children.len();
        if position > len || removed > len - position.min(len) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                position,
                removed,
                children = len,
                "model items-changed refers to positions outside the flow box"
            );
        }
        let position = position.min(len);
        let removed = removed.min(len - position);

        let mut dirty = false;
        for _ in 0..removed {
            if let Some(id) = self.children.at(position) {
                dirty |= self.remove_child(id).1;
            }
        }

        let mut inserted = 0;
        for offset in 0..added {
            let widget = self.model.as_mut().and_then(|m| (m.create)(position + offset));
            let Some(widget) = widget else {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    position = position + offset,
                    model_items = self.model.as_ref().map_or(0, |m| (m.n_items)()),
                    "model has no item for an added position"
                );
                continue;
            };
            let id = self.children.insert(widget, position + inserted);
            self.apply_filter(id);
            inserted += 1;
        }

        self.queue_resize();
        dirty | self.enforce_browse_selection()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::flow_box::FlowBoxEvent;

    fn keys(fb: &FlowBox<Tile>) -> Vec<i32> {
        fb.children().iter().map(|&id| fb.child(id).key).collect()
    }

    #[test]
    fn bind_replaces_children_with_model_items() {
        let (mut fb, _) = tiles(3);
        let model = Rc::new(VecModel::new(vec![10, 20]));
        fb.bind_model(Rc::clone(&model), Tile::new);
        assert!(fb.is_bound());
        assert_eq!(keys(&fb), [10, 20]);
    }

    #[test]
    fn items_changed_splices_children() {
        let mut fb = FlowBox::new();
        let model = Rc::new(VecModel::new(vec![1, 2, 3, 4]));
        fb.bind_model(Rc::clone(&model), Tile::new);

        let change = model.splice(1, 2, [7, 8, 9]);
        assert_eq!(
            change,
            ItemsChanged {
                position: 1,
                removed: 2,
                added: 3
            }
        );
        fb.model_items_changed(change.position, change.removed, change.added);
        assert_eq!(keys(&fb), [1, 7, 8, 9, 4]);

        let change = model.remove(0);
        fb.model_items_changed(change.position, change.removed, change.added);
        let change = model.push(5);
        fb.model_items_changed(change.position, change.removed, change.added);
        assert_eq!(keys(&fb), [7, 8, 9, 4, 5]);
    }

    #[test]
    fn bound_model_ignores_sort_filter_and_remove_all() {
        let mut fb = FlowBox::new();
        let model = Rc::new(VecModel::new(vec![3, 1, 2]));
        fb.bind_model(Rc::clone(&model), Tile::new);
        fb.set_sort_func(|a: &Tile, b: &Tile| a.key.cmp(&b.key));
        fb.set_filter_func(|t: &Tile| t.key > 1);
        fb.remove_all();
        assert_eq!(keys(&fb), [3, 1, 2]);
        assert!(fb.children().iter().all(|&id| fb.is_child_visible(id)));
    }

    #[test]
    fn unbind_clears_children() {
        let mut fb = FlowBox::new();
        let model = Rc::new(VecModel::new(vec![1, 2]));
        fb.bind_model(model, Tile::new);
        fb.unbind_model();
        assert!(!fb.is_bound());
        assert!(fb.is_empty());
    }

    #[test]
    fn out_of_range_change_is_clamped() {
        let mut fb = FlowBox::new();
        let model = Rc::new(VecModel::new(vec![1, 2]));
        fb.bind_model(Rc::clone(&model), Tile::new);
        fb.model_items_changed(1, 5, 0);
        assert_eq!(keys(&fb), [1]);
    }

    #[test]
    fn removing_selected_model_item_notifies() {
        let mut fb = FlowBox::new();
        let model = Rc::new(VecModel::new(vec![1, 2, 3]));
        fb.bind_model(Rc::clone(&model), Tile::new);
        let second = fb.children()[1];
        fb.select_child(second);
        let log = record(&mut fb);

        let change = model.remove(1);
        fb.model_items_changed(change.position, change.removed, change.added);
        assert_eq!(keys(&fb), [1, 3]);
        assert_eq!(count(&log, FlowBoxEvent::SelectionChanged), 1);
    }

    #[test]
    fn clones_share_items() {
        let a = VecModel::new(vec!['x']);
        let b = a.clone();
        b.push('y');
        assert_eq!(a.n_items(), 2);
        assert_eq!(a.item(1), Some('y'));
        assert_eq!(a.item(2), None);
    }
}
