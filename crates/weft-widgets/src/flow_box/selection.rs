#![forbid(unsafe_code)]

//! Selection state machine.
//!
//! # Modes
//!
//! | Mode       | Selected children | Plain click            | Ctrl              | Shift           |
//! |------------|-------------------|------------------------|-------------------|-----------------|
//! | `None`     | 0                 | cursor only            | cursor only       | cursor only     |
//! | `Single`   | 0..=1             | select exclusively     | toggle, exclusive | as plain        |
//! | `Browse`   | 1 once focused    | select exclusively     | as plain          | as plain        |
//! | `Multiple` | any               | exclusive toggle       | toggle one        | anchor..child   |
//!
//! # Invariants
//!
//! 1. The anchor is either `None` or a selected child; every path that clears
//!    a selected bit also clears the anchor if it pointed there.
//! 2. Each public operation emits at most one `SelectionChanged`, and only if
//!    at least one bit changed.
//! 3. Range operations work on sequence position and only touch visible
//!    children.

use super::children::ChildId;
use super::events::FlowBoxEvent;
use super::{FlowBox, FlowChild};

/// Selection policy of a flow box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelectionMode {
    /// Nothing can be selected.
    None,
    /// Zero or one child.
    #[default]
    Single,
    /// Exactly one child once the user has interacted with the flow box.
    Browse,
    /// Any number of children, with range and toggle gestures.
    Multiple,
}

impl<W: FlowChild> FlowBox<W> {
    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    #[must_use]
    pub fn is_selected(&self, id: ChildId) -> bool {
        self.children.get(id).is_selected()
    }

    /// Selected children in sequence order, hidden ones included.
    #[must_use]
    pub fn selected_children(&self) -> Vec<ChildId> {
        self.children
            .iter()
            .filter(|(_, record)| record.is_selected())
            .map(|(id, _)| id)
            .collect()
    }

    /// Call `f` for every selected child in sequence order.
    pub fn selected_foreach(&self, mut f: impl FnMut(ChildId, &W)) {
        for (id, record) in self.children.iter() {
            if record.is_selected() {
                f(id, &record.widget);
            }
        }
    }

    /// Pivot of range selection.
    #[must_use]
    pub fn selection_anchor(&self) -> Option<ChildId> {
        self.anchor
    }

    /// The child holding the keyboard cursor.
    #[must_use]
    pub fn cursor_child(&self) -> Option<ChildId> {
        self.cursor
    }

    fn selected_count(&self) -> usize {
        self.children
            .iter()
            .filter(|(_, record)| record.is_selected())
            .count()
    }

    // -----------------------------------------------------------------------
    // Public operations
    // -----------------------------------------------------------------------

    /// Change the selection mode. Switching to `None`, or away from
    /// `Multiple`, clears the selection.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        if mode == self.selection_mode {
            return;
        }
        let mut dirty = false;
        if mode == SelectionMode::None || self.selection_mode == SelectionMode::Multiple {
            dirty = self.unselect_all_internal();
            self.anchor = None;
        }
        self.selection_mode = mode;
        dirty |= self.enforce_browse_selection();
        if dirty {
            self.notify_selection_changed("mode_change");
        }
    }

    /// Select `id`. Outside `Multiple` mode this replaces the selection.
    pub fn select_child(&mut self, id: ChildId) {
        if self.select_child_internal(id) {
            self.notify_selection_changed("select");
        }
    }

    /// Unselect `id`. Rejected in `Browse` mode.
    pub fn unselect_child(&mut self, id: ChildId) {
        if self.unselect_child_internal(id) {
            self.notify_selection_changed("unselect");
        }
    }

    /// Flip `id`: unselect it if selected, otherwise select it (exclusively
    /// outside `Multiple` mode).
    pub fn toggle_child(&mut self, id: ChildId) {
        if self.is_selected(id) {
            self.unselect_child(id);
        } else {
            self.select_child(id);
        }
    }

    /// Select every visible child. Only valid in `Multiple` mode.
    pub fn select_all(&mut self) {
        if self.selection_mode != SelectionMode::Multiple || self.children.is_empty() {
            return;
        }
        if self.select_all_between(None, None, false) {
            self.notify_selection_changed("select_all");
        }
    }

    /// Clear the selection. Rejected in `Browse` mode.
    pub fn unselect_all(&mut self) {
        if self.selection_mode == SelectionMode::Browse {
            return;
        }
        if self.unselect_all_internal() {
            self.notify_selection_changed("unselect_all");
        }
    }

    /// The general entry point for clicks and keyboard moves: move the cursor
    /// to `id`, then change the selection per mode.
    ///
    /// - `Browse`: select `id` exclusively.
    /// - `Single`: with `modify`, toggle `id` (dropping any other selection);
    ///   otherwise select it exclusively.
    /// - `Multiple` with `extend`: select the range from the anchor to `id`,
    ///   or just `id` (becoming the anchor) if there is no anchor.
    /// - `Multiple` with `modify`: toggle `id`, leave the rest.
    /// - `Multiple`, plain: exclusive toggle. `id` ends up the only selected
    ///   child, unless it already was, in which case nothing stays selected.
    pub fn update_selection(&mut self, id: ChildId, modify: bool, extend: bool) {
        self.update_cursor(id);
        let before = self.selected_children();

        match self.selection_mode {
            SelectionMode::None => {}
            SelectionMode::Browse => {
                self.unselect_all_internal();
                self.set_selected(id, true);
                self.anchor = Some(id);
            }
            SelectionMode::Single => {
                let was_selected = self.is_selected(id);
                self.unselect_all_internal();
                let now = if modify { !was_selected } else { true };
                self.set_selected(id, now);
                self.anchor = now.then_some(id);
            }
            SelectionMode::Multiple if extend => {
                let anchor = self.anchor;
                self.unselect_all_internal();
                match anchor {
                    None => {
                        self.set_selected(id, true);
                        self.anchor = Some(id);
                    }
                    Some(anchor) => {
                        self.select_all_between(Some(anchor), Some(id), false);
                        self.anchor = self.is_selected(anchor).then_some(anchor);
                    }
                }
            }
            SelectionMode::Multiple if modify => {
                let now = !self.is_selected(id);
                self.set_selected(id, now);
            }
            SelectionMode::Multiple => {
                let only = before == [id];
                self.unselect_all_internal();
                self.set_selected(id, !only);
                self.anchor = (!only).then_some(id);
            }
        }

        let dirty = self.selected_children() != before;
        if dirty {
            self.notify_selection_changed("update");
        }
    }

    /// Select `id`, move the cursor to it and emit `ChildActivated`.
    pub fn select_and_activate(&mut self, id: ChildId) {
        if self.select_child_internal(id) {
            self.notify_selection_changed("activate");
        }
        self.update_cursor(id);
        self.events.emit(FlowBoxEvent::ChildActivated(id));
    }

    /// Select (or toggle, with `modify`) every visible child between `from`
    /// and `to` inclusive, in sequence order. `None` stands for the start and
    /// the end respectively. Fires one `SelectionChanged` if anything changed.
    ///
    /// Only valid in `Multiple` mode; other modes ignore the call.
    pub fn select_range(&mut self, from: Option<ChildId>, to: Option<ChildId>, modify: bool) {
        if self.selection_mode != SelectionMode::Multiple {
            return;
        }
        if self.select_all_between(from, to, modify) {
            self.notify_selection_changed("range");
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Set one bit, keeping the anchor invariant. Returns whether it changed.
    pub(super) fn set_selected(&mut self, id: ChildId, selected: bool) -> bool {
        let changed = self.children.get_mut(id).set_selected(selected);
        if !selected && self.anchor == Some(id) {
            self.anchor = None;
        }
        changed
    }

    pub(super) fn unselect_all_internal(&mut self) -> bool {
        if self.selection_mode == SelectionMode::None {
            return false;
        }
        let ids = self.children.ids().to_vec();
        let mut dirty = false;
        for id in ids {
            dirty |= self.children.get_mut(id).set_selected(false);
        }
        self.anchor = None;
        dirty
    }

    fn select_child_internal(&mut self, id: ChildId) -> bool {
        if self.is_selected(id) || self.selection_mode == SelectionMode::None {
            return false;
        }
        if self.selection_mode != SelectionMode::Multiple {
            self.unselect_all_internal();
        }
        self.children.get_mut(id).set_selected(true);
        self.anchor = Some(id);
        true
    }

    pub(super) fn unselect_child_internal(&mut self, id: ChildId) -> bool {
        if !self.is_selected(id) {
            return false;
        }
        match self.selection_mode {
            SelectionMode::None | SelectionMode::Browse => false,
            SelectionMode::Single => self.unselect_all_internal(),
            SelectionMode::Multiple => self.set_selected(id, false),
        }
    }

    /// Range walk shared by Shift-extend, select-all and the rubberband.
    pub(super) fn select_all_between(
        &mut self,
        from: Option<ChildId>,
        to: Option<ChildId>,
        modify: bool,
    ) -> bool {
        let (lo, hi) = self.range_bounds(from, to);
        if self.children.is_empty() {
            return false;
        }
        let mut dirty = false;
        for index in lo..=hi {
            let Some(id) = self.children.at(index) else {
                break;
            };
            if !self.children.get(id).is_visible() {
                continue;
            }
            let now = if modify { !self.is_selected(id) } else { true };
            dirty |= self.set_selected(id, now);
        }
        dirty
    }

    /// Inclusive sequence bounds of a range, independent of argument order.
    pub(super) fn range_bounds(&self, from: Option<ChildId>, to: Option<ChildId>) -> (usize, usize) {
        let last = self.children.len().saturating_sub(1);
        let a = from.map_or(0, |id| self.children.position(id));
        let b = to.map_or(last, |id| self.children.position(id));
        (a.min(b), a.max(b))
    }

    /// Move the keyboard cursor (and focus) to `id`.
    pub(super) fn update_cursor(&mut self, id: ChildId) {
        self.has_focus = true;
        self.ever_focused = true;
        if self.cursor == Some(id) {
            return;
        }
        self.cursor = Some(id);
        self.focus_inside = false;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "flow_box.cursor",
            index = self.children.position(id),
        );

        self.events.emit(FlowBoxEvent::CursorChanged(Some(id)));
    }

    /// Keep one child selected in `Browse` mode once the box has had focus.
    /// Re-select a child when browse mode has lost its selection. Returns
    /// whether anything was selected; the caller notifies.
    pub(super) fn enforce_browse_selection(&mut self) -> bool {
        if self.selection_mode != SelectionMode::Browse
            || !self.ever_focused
            || self.children.is_empty()
            || self.selected_count() > 0
        {
            return false;
        }
        let target = self
            .cursor
            .or_else(|| self.first_focusable())
            .or_else(|| self.children.at(0));
        let Some(id) = target else {
            return false;
        };
        self.children.get_mut(id).set_selected(true);
        self.anchor = Some(id);
        true
    }

    pub(super) fn notify_selection_changed(&self, action: &str) {
        #[cfg(feature = "tracing")]
        self.log_selection_change(action);
        #[cfg(not(feature = "tracing"))]
        let _ = action;
        self.events.emit(FlowBoxEvent::SelectionChanged);
    }

    #[cfg(feature = "tracing")]
    fn log_selection_change(&self, action: &str) {
        tracing::debug!(
            message = "flow_box.selection",
            action,
            selected_count = self.selected_count(),
            anchor = self.anchor.map(|id| self.children.position(id)),
            mode = ?self.selection_mode,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn selected_keys(fb: &FlowBox<Tile>) -> Vec<i32> {
        fb.selected_children()
            .into_iter()
            .map(|id| fb.child(id).key)
            .collect()
    }

    #[test]
    fn none_mode_selects_nothing_but_moves_cursor() {
        let (mut fb, ids) = tiles(3);
        fb.set_selection_mode(SelectionMode::None);
        fb.select_child(ids[0]);
        fb.update_selection(ids[1], false, false);
        assert!(fb.selected_children().is_empty());
        assert_eq!(fb.cursor_child(), Some(ids[1]));
    }

    #[test]
    fn single_mode_select_replaces() {
        let (mut fb, ids) = tiles(3);
        fb.select_child(ids[0]);
        fb.select_child(ids[2]);
        assert_eq!(selected_keys(&fb), [2]);
        assert_eq!(fb.selection_anchor(), Some(ids[2]));
    }

    #[test]
    fn single_mode_modify_toggles() {
        let (mut fb, ids) = tiles(3);
        fb.update_selection(ids[1], true, false);
        assert_eq!(selected_keys(&fb), [1]);
        fb.update_selection(ids[1], true, false);
        assert!(fb.selected_children().is_empty());
        assert_eq!(fb.selection_anchor(), None);
    }

    #[test]
    fn single_mode_unselect_clears_anchor() {
        let (mut fb, ids) = tiles(2);
        fb.select_child(ids[0]);
        fb.unselect_child(ids[0]);
        assert!(!fb.is_selected(ids[0]));
        assert_eq!(fb.selection_anchor(), None);
    }

    #[test]
    fn multiple_plain_click_is_exclusive_toggle() {
        let (mut fb, ids) = tiles(4);
        fb.set_selection_mode(SelectionMode::Multiple);
        fb.select_child(ids[0]);
        fb.select_child(ids[1]);
        fb.update_selection(ids[1], false, false);
        assert_eq!(selected_keys(&fb), [1]);
        assert_eq!(fb.selection_anchor(), Some(ids[1]));

        fb.update_selection(ids[1], false, false);
        assert!(fb.selected_children().is_empty());
        assert_eq!(fb.selection_anchor(), None);
    }

    #[test]
    fn multiple_modify_flips_one() {
        let (mut fb, ids) = tiles(4);
        fb.set_selection_mode(SelectionMode::Multiple);
        fb.update_selection(ids[0], false, false);
        fb.update_selection(ids[2], true, false);
        assert_eq!(selected_keys(&fb), [0, 2]);
        fb.update_selection(ids[0], true, false);
        assert_eq!(selected_keys(&fb), [2]);
        assert_eq!(fb.selection_anchor(), None);
    }

    #[test]
    fn extend_without_anchor_selects_child_as_anchor() {
        let (mut fb, ids) = tiles(4);
        fb.set_selection_mode(SelectionMode::Multiple);
        fb.update_selection(ids[2], false, true);
        assert_eq!(selected_keys(&fb), [2]);
        assert_eq!(fb.selection_anchor(), Some(ids[2]));
    }

    #[test]
    fn extend_backwards_selects_by_position() {
        let (mut fb, ids) = tiles(6);
        fb.set_selection_mode(SelectionMode::Multiple);
        fb.select_child(ids[4]);
        fb.update_selection(ids[1], false, true);
        assert_eq!(selected_keys(&fb), [1, 2, 3, 4]);
        assert_eq!(fb.selection_anchor(), Some(ids[4]));
    }

    #[test]
    fn range_skips_hidden_children() {
        let (mut fb, ids) = tiles(5);
        fb.set_selection_mode(SelectionMode::Multiple);
        fb.set_child_visible(ids[2], false);
        fb.select_range(Some(ids[0]), Some(ids[4]), false);
        assert_eq!(selected_keys(&fb), [0, 1, 3, 4]);
    }

    #[test]
    fn select_all_only_in_multiple_and_unselect_all_not_in_browse() {
        let (mut fb, ids) = tiles(3);
        fb.select_all();
        assert!(fb.selected_children().is_empty());

        fb.set_selection_mode(SelectionMode::Multiple);
        let log = record(&mut fb);
        fb.select_all();
        assert_eq!(selected_keys(&fb), [0, 1, 2]);
        fb.select_all();
        assert_eq!(count(&log, FlowBoxEvent::SelectionChanged), 1);

        fb.set_selection_mode(SelectionMode::Browse);
        fb.update_selection(ids[0], false, false);
        fb.unselect_all();
        assert_eq!(selected_keys(&fb), [0]);
    }

    #[test]
    fn leaving_multiple_clears_selection_once() {
        let (mut fb, _) = tiles(3);
        fb.set_selection_mode(SelectionMode::Multiple);
        fb.select_all();
        let log = record(&mut fb);
        fb.set_selection_mode(SelectionMode::Single);
        assert!(fb.selected_children().is_empty());
        assert_eq!(count(&log, FlowBoxEvent::SelectionChanged), 1);
    }

    #[test]
    fn browse_keeps_one_selected_after_removal() {
        let (mut fb, ids) = tiles(3);
        fb.set_selection_mode(SelectionMode::Browse);
        fb.update_selection(ids[1], false, false);
        fb.remove(ids[1]);
        assert_eq!(fb.selected_children().len(), 1);
    }

    #[test]
    fn select_and_activate_emits_activation() {
        let (mut fb, ids) = tiles(2);
        let log = record(&mut fb);
        fb.select_and_activate(ids[1]);
        assert!(fb.is_selected(ids[1]));
        assert_eq!(fb.cursor_child(), Some(ids[1]));
        assert_eq!(count(&log, FlowBoxEvent::ChildActivated(ids[1])), 1);
        assert_eq!(count(&log, FlowBoxEvent::SelectionChanged), 1);
    }

    #[test]
    fn selection_survives_hiding() {
        let (mut fb, ids) = tiles(2);
        fb.select_child(ids[0]);
        fb.set_child_visible(ids[0], false);
        assert!(fb.is_selected(ids[0]));
        let mut seen = Vec::new();
        fb.selected_foreach(|id, tile| seen.push((id, tile.key)));
        assert_eq!(seen, [(ids[0], 0)]);
    }

    #[test]
    fn no_notification_when_nothing_changes() {
        let (mut fb, ids) = tiles(2);
        fb.select_child(ids[0]);
        let log = record(&mut fb);
        fb.select_child(ids[0]);
        fb.update_selection(ids[0], false, false);
        fb.unselect_child(ids[1]);
        assert_eq!(count(&log, FlowBoxEvent::SelectionChanged), 0);
    }
}
