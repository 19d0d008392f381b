#![forbid(unsafe_code)]

//! Keyboard navigation over the visual grid.
//!
//! The cursor moves through children that are visible and sensitive; other
//! children are absent from the navigation graph. Line moves step over
//! `children_per_line` visible children, so they land in the same slot of
//! the neighbouring line.
//!
//! # Key bindings
//!
//! | Keys                     | Action                                   |
//! |--------------------------|------------------------------------------|
//! | Left / Right             | previous / next child                    |
//! | Up / Down                | same slot, previous / next line          |
//! | PageUp / PageDown        | one page of lines                        |
//! | Home / End               | first / last child                       |
//! | + Shift                  | extend the selection from the anchor     |
//! | + Ctrl                   | move the cursor without selecting        |
//! | Enter, Space             | activate the cursor child                |
//! | Ctrl+Space               | toggle the cursor child                  |
//! | Ctrl+A / Ctrl+Shift+A    | select all / unselect all                |
//! | Tab / Shift+Tab          | focus chain through the children         |
//! | Escape                   | cancel an active rubberband              |
//!
//! In a vertical flow, Left/Right and Up/Down swap roles.

use weft_core::adjustment::ScrollAdjustment;
use weft_core::event::{KeyCode, KeyEvent, KeyEventKind};
use weft_layout::{Orientation, TextDirection};

use super::child::FocusDirection;
use super::children::ChildId;
use super::events::FlowBoxEvent;
use super::selection::SelectionMode;
use super::{FlowBox, FlowChild};

/// Page height used when no scroll adjustment is attached.
const DEFAULT_PAGE_SIZE: i32 = 100;

/// Unit of a cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementStep {
    /// Neighbouring children in sequence order.
    VisualPositions,
    /// Whole lines.
    DisplayLines,
    /// Pages of lines, sized by the scroll adjustment's page increment.
    Pages,
    /// First or last child.
    BufferEnds,
}

impl<W: FlowChild> FlowBox<W> {
    // -----------------------------------------------------------------------
    // Navigation graph
    // -----------------------------------------------------------------------

    fn is_navigable(&self, index: usize) -> bool {
        self.children.at(index).is_some_and(|id| {
            let record = self.children.get(id);
            record.is_visible() && record.widget.is_sensitive()
        })
    }

    fn is_visible_at(&self, index: usize) -> bool {
        self.children
            .at(index)
            .is_some_and(|id| self.children.get(id).is_visible())
    }

    fn next_focusable(&self, index: usize) -> Option<usize> {
        (index + 1..self.children.len()).find(|&i| self.is_navigable(i))
    }

    fn previous_focusable(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|&i| self.is_navigable(i))
    }

    pub(super) fn first_focusable(&self) -> Option<ChildId> {
        (0..self.children.len())
            .find(|&i| self.is_navigable(i))
            .and_then(|i| self.children.at(i))
    }

    fn last_focusable(&self) -> Option<ChildId> {
        (0..self.children.len())
            .rev()
            .find(|&i| self.is_navigable(i))
            .and_then(|i| self.children.at(i))
    }

    /// One line up: step back over `children_per_line` visible children,
    /// repeating while the landing child is insensitive.
    fn above_focusable(&self, mut index: usize) -> Option<usize> {
        let per_line = self.children_per_line.max(1);
        loop {
            let mut seen = 0;
            while seen < per_line {
                if index == 0 {
                    return None;
                }
                index -= 1;
                if self.is_visible_at(index) {
                    seen += 1;
                }
            }
            if self.is_navigable(index) {
                return Some(index);
            }
        }
    }

    fn below_focusable(&self, mut index: usize) -> Option<usize> {
        let per_line = self.children_per_line.max(1);
        loop {
            let mut seen = 0;
            while seen < per_line {
                index += 1;
                if index >= self.children.len() {
                    return None;
                }
                if self.is_visible_at(index) {
                    seen += 1;
                }
            }
            if self.is_navigable(index) {
                return Some(index);
            }
        }
    }

    /// Position of a child along the axis lines stack on.
    fn line_axis_position(&self, index: usize) -> i32 {
        self.children.at(index).map_or(0, |id| {
            let rect = self.children.get(id).allocation;
            match self.config.orientation {
                Orientation::Horizontal => rect.y,
                Orientation::Vertical => rect.x,
            }
        })
    }

    fn page_size(&self) -> i32 {
        let adjustment = match self.config.orientation {
            Orientation::Horizontal => self.vadjustment.as_ref(),
            Orientation::Vertical => self.hadjustment.as_ref(),
        };
        adjustment.map_or(DEFAULT_PAGE_SIZE, |adj| adj.page_increment() as i32)
    }

    /// Walk up or down while the target stays within one page of `start`,
    /// checking the bound only at line boundaries.
    fn page_target(&self, start_index: usize, count: i32) -> usize {
        let per_line = self.children_per_line.max(1);
        let page = self.page_size();
        let start = self.line_axis_position(start_index);
        let mut target = start_index;
        let mut iter = start_index;
        let mut steps = 0usize;

        loop {
            let next = if count < 0 {
                self.previous_focusable(iter)
            } else {
                self.next_focusable(iter)
            };
            let Some(next) = next else {
                break;
            };
            iter = next;
            if steps % per_line == 0 {
                let pos = self.line_axis_position(next);
                let beyond = if count < 0 {
                    pos < start - page
                } else {
                    pos > start + page
                };
                if beyond {
                    break;
                }
            }
            target = next;
            steps += 1;
        }
        target
    }

    // -----------------------------------------------------------------------
    // Cursor movement
    // -----------------------------------------------------------------------

    /// Move the cursor by `count` units of `step`.
    ///
    /// On success the selection follows the cursor (`update_selection` with
    /// `extend`) unless `modify` is set. When there is no target, or the
    /// target is the cursor itself, `KeynavFailed` is emitted. Returns
    /// whether the movement was handled.
    pub fn move_cursor(&mut self, step: MovementStep, count: i32, extend: bool, modify: bool) -> bool {
        let step = match (self.config.orientation, step) {
            (Orientation::Vertical, MovementStep::VisualPositions) => MovementStep::DisplayLines,
            (Orientation::Vertical, MovementStep::DisplayLines) => MovementStep::VisualPositions,
            (_, step) => step,
        };
        let cursor_index = self.cursor.map(|id| self.children.position(id));

        let target = match step {
            MovementStep::VisualPositions => cursor_index.and_then(|start| {
                let mut count = count;
                if self.config.direction == TextDirection::Rtl {
                    count = -count;
                }
                let mut at = Some(start);
                while count < 0 && at.is_some() {
                    at = at.and_then(|i| self.previous_focusable(i));
                    count += 1;
                }
                while count > 0 && at.is_some() {
                    at = at.and_then(|i| self.next_focusable(i));
                    count -= 1;
                }
                at
            }),
            MovementStep::DisplayLines => cursor_index.and_then(|start| {
                let mut count = count;
                let mut at = Some(start);
                while count < 0 && at.is_some() {
                    at = at.and_then(|i| self.above_focusable(i));
                    count += 1;
                }
                while count > 0 && at.is_some() {
                    at = at.and_then(|i| self.below_focusable(i));
                    count -= 1;
                }
                at
            }),
            MovementStep::Pages => cursor_index.map(|start| self.page_target(start, count)),
            MovementStep::BufferEnds => {
                let id = if count < 0 {
                    self.first_focusable()
                } else {
                    self.last_focusable()
                };
                id.map(|id| self.children.position(id))
            }
        };

        let target = target.and_then(|i| self.children.at(i));
        let Some(id) = target.filter(|&id| Some(id) != self.cursor) else {
            let direction = if count < 0 {
                FocusDirection::Up
            } else {
                FocusDirection::Down
            };
            self.keynav_failed(direction);
            return true;
        };

        self.update_cursor(id);
        let record = self.children.get_mut(id);
        if !record.widget.is_focusable() {
            let direction = if count < 0 {
                FocusDirection::TabBackward
            } else {
                FocusDirection::TabForward
            };
            self.focus_inside = record.widget.focus_descendant(direction);
        }
        if !modify {
            self.update_selection(id, false, extend);
        }
        true
    }

    fn keynav_failed(&self, direction: FocusDirection) {
        #[cfg(feature = "tracing")]
        tracing::trace!(message = "flow_box.keynav_failed", ?direction);
        self.events.emit(FlowBoxEvent::KeynavFailed(direction));
    }

    // -----------------------------------------------------------------------
    // Focus chain
    // -----------------------------------------------------------------------

    /// Whether the flow box (or a child inside it) holds keyboard focus.
    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Move focus into, within, or out of the flow box.
    ///
    /// Without focus, the target is the selection anchor, else the first
    /// focusable child (the last one for `Up`/`TabBackward`). With focus, the
    /// cursor child's content gets a chance first, then the neighbour in
    /// `direction` is focused. Returns `false` when focus should leave the
    /// flow box; an arrow direction without a target emits `KeynavFailed`
    /// and keeps focus.
    pub fn focus(&mut self, direction: FocusDirection) -> bool {
        let target = match self.cursor.filter(|_| self.has_focus) {
            Some(cursor) => {
                if self.child_focus(cursor, direction) {
                    return true;
                }
                let index = self.children.position(cursor);
                let next = match direction {
                    FocusDirection::Left | FocusDirection::TabBackward => self.previous_focusable(index),
                    FocusDirection::Right | FocusDirection::TabForward => self.next_focusable(index),
                    FocusDirection::Up => self.above_focusable(index),
                    FocusDirection::Down => self.below_focusable(index),
                };
                next.and_then(|i| self.children.at(i))
            }
            None => self.anchor.or_else(|| match direction {
                FocusDirection::Up | FocusDirection::TabBackward => self.last_focusable(),
                _ => self.first_focusable(),
            }),
        };

        let Some(id) = target else {
            if direction.is_arrow() {
                self.keynav_failed(direction);
                return true;
            }
            self.has_focus = false;
            return false;
        };
        self.child_focus(id, direction);
        true
    }

    /// Focus handling of a single child: enter its content or take focus on
    /// the child itself.
    fn child_focus(&mut self, id: ChildId, direction: FocusDirection) -> bool {
        let current = self.has_focus && self.cursor == Some(id);
        let entering_content = matches!(
            direction,
            FocusDirection::Right | FocusDirection::TabForward
        );
        let leaving_content = matches!(
            direction,
            FocusDirection::Left | FocusDirection::TabBackward
        );

        if !self.children.get(id).widget.is_focusable() {
            if self.children.get_mut(id).widget.focus_descendant(direction) {
                self.update_cursor(id);
                self.focus_inside = true;
                return true;
            }
            return false;
        }

        if current && !self.focus_inside {
            if entering_content && self.children.get_mut(id).widget.focus_descendant(direction) {
                self.focus_inside = true;
                return true;
            }
            return false;
        }

        if current {
            if self.children.get_mut(id).widget.focus_descendant(direction) {
                return true;
            }
            if leaving_content {
                self.focus_inside = false;
                self.update_selection(id, false, false);
                return true;
            }
            return false;
        }

        if leaving_content && self.children.get_mut(id).widget.focus_descendant(direction) {
            self.update_cursor(id);
            self.focus_inside = true;
            return true;
        }
        if self.is_selected(id) {
            self.update_cursor(id);
        } else {
            self.update_selection(id, false, false);
        }
        true
    }

    /// The flow box lost keyboard focus. Cancels an active rubberband.
    pub fn focus_out(&mut self) {
        self.has_focus = false;
        self.focus_inside = false;
        self.cancel_rubberband();
    }

    // -----------------------------------------------------------------------
    // Activation
    // -----------------------------------------------------------------------

    /// Select and activate the cursor child (Enter/Space).
    pub fn activate_cursor_child(&mut self) {
        if let Some(id) = self.cursor {
            self.select_and_activate(id);
        }
    }

    /// Unselect the cursor child if it is selected in `Single` or `Multiple`
    /// mode, otherwise select and activate it (Ctrl+Space).
    pub fn toggle_cursor_child(&mut self) {
        let Some(id) = self.cursor else {
            return;
        };
        let can_unselect = matches!(
            self.selection_mode,
            SelectionMode::Single | SelectionMode::Multiple
        );
        if can_unselect && self.is_selected(id) {
            self.unselect_child(id);
        } else {
            self.select_and_activate(id);
        }
    }

    // -----------------------------------------------------------------------
    // Key bindings
    // -----------------------------------------------------------------------

    /// Handle a key press. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let extend = key.shift();
        let modify = key.ctrl();

        match key.code {
            KeyCode::Escape => {
                if self.rubberband.active {
                    self.cancel_rubberband();
                    true
                } else {
                    false
                }
            }
            KeyCode::Home => self.move_cursor(MovementStep::BufferEnds, -1, extend, modify),
            KeyCode::End => self.move_cursor(MovementStep::BufferEnds, 1, extend, modify),
            KeyCode::Up => self.move_cursor(MovementStep::DisplayLines, -1, extend, modify),
            KeyCode::Down => self.move_cursor(MovementStep::DisplayLines, 1, extend, modify),
            KeyCode::Left => self.move_cursor(MovementStep::VisualPositions, -1, extend, modify),
            KeyCode::Right => self.move_cursor(MovementStep::VisualPositions, 1, extend, modify),
            KeyCode::PageUp => self.move_cursor(MovementStep::Pages, -1, extend, modify),
            KeyCode::PageDown => self.move_cursor(MovementStep::Pages, 1, extend, modify),
            KeyCode::Space if modify => {
                self.toggle_cursor_child();
                self.cursor.is_some()
            }
            KeyCode::Enter | KeyCode::Space => {
                self.activate_cursor_child();
                self.cursor.is_some()
            }
            KeyCode::Char(c) if modify && c.eq_ignore_ascii_case(&'a') => {
                if extend {
                    self.unselect_all();
                } else {
                    self.select_all();
                }
                true
            }
            KeyCode::Tab => self.focus(FocusDirection::TabForward),
            KeyCode::BackTab => self.focus(FocusDirection::TabBackward),
            _ => false,
        }
    }
}
