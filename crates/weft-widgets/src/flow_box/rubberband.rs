#![forbid(unsafe_code)]

//! Pointer input: the click path and the rubberband drag with autoscroll.
//!
//! A primary press over a child marks it as the pending-activation target;
//! releasing over the same child selects (and possibly activates) it. In
//! `Multiple` mode a press that travels past the drag threshold turns into a
//! rubberband instead: the children between the first and the last child
//! the pointer crossed are selected when the button is released.
//!
//! While the rubberband is active and the pointer leaves the viewport, the
//! flow box registers a tick on the attached frame clock and scrolls one
//! small step per [`FlowBox::autoscroll_tick`].
//!
//! # Invariants
//!
//! 1. The selection is only touched when the gesture completes; a drag in
//!    progress changes nothing but the overlay.
//! 2. A completed rubberband emits at most one `SelectionChanged`.
//! 3. A tick registration exists iff the autoscroll mode is not `None` and a
//!    frame clock is attached.

use weft_core::adjustment::ScrollAdjustment;
use weft_core::event::{Event, Modifiers, MouseButton, MouseEvent, MouseEventKind, PointerSource};
use weft_core::frame_clock::{FrameClock, TickToken};
use weft_core::geometry::Rect;
use weft_core::gesture::DragEvent;
use weft_layout::Orientation;

use super::children::ChildId;
use super::events::FlowBoxEvent;
use super::selection::SelectionMode;
use super::{FlowBox, FlowChild};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Autoscroll speed bands.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutoscrollConfig {
    /// Overshoot beyond the viewport edge, in pixels, past which scrolling
    /// switches from step to page speed (default: 32).
    pub fast_distance: i32,
    /// Step speed scrolls `step_increment / step_divisor` per tick
    /// (default: 20.0).
    pub step_divisor: f64,
    /// Page speed scrolls `step_increment / page_divisor` per tick
    /// (default: 10.0).
    pub page_divisor: f64,
}

impl Default for AutoscrollConfig {
    fn default() -> Self {
        Self {
            fast_distance: 32,
            step_divisor: 20.0,
            page_divisor: 10.0,
        }
    }
}

/// Direction and speed of rubberband autoscroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AutoscrollMode {
    #[default]
    None,
    StepForward,
    StepBackward,
    PageForward,
    PageBackward,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Rubberband {
    pub(crate) active: bool,
    pub(crate) first: Option<ChildId>,
    pub(crate) last: Option<ChildId>,
    /// Ctrl held at press time.
    pub(crate) modify: bool,
    /// Shift held at press time.
    pub(crate) extend: bool,
    /// Press point of the drag.
    origin: (f64, f64),
    /// Last known pointer position in flow box coordinates.
    pointer: (f64, f64),
}

#[derive(Debug, Default)]
pub(crate) struct Autoscroll {
    pub(crate) config: AutoscrollConfig,
    mode: AutoscrollMode,
    token: Option<TickToken>,
}

impl<W: FlowChild> FlowBox<W> {
    // -----------------------------------------------------------------------
    // Input dispatch
    // -----------------------------------------------------------------------

    /// Feed one input event. Returns whether the flow box consumed it.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) => {
                let handled = self.handle_key(key);
                // The drag tracker forgets its sequence on Escape as well.
                self.drag.process(event);
                handled
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Focus(true) => false,
            Event::Focus(false) => {
                self.drag.process(event);
                self.focus_out();
                false
            }
        }
    }

    /// Feed one pointer event through the click and drag recognizers.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent) -> bool {
        let mut handled = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.click_pressed(mouse),
            MouseEventKind::Up(MouseButton::Left) => self.click_released(mouse),
            _ => false,
        };
        for phase in self.drag.process(&Event::Mouse(*mouse)) {
            handled |= self.drag_phase(phase);
        }
        handled
    }

    fn click_pressed(&mut self, mouse: &MouseEvent) -> bool {
        let Some(hit) = self.child_at_pos(mouse.x, mouse.y) else {
            return false;
        };
        if !self.children.get(hit).widget.is_sensitive() {
            return false;
        }
        self.active_child = Some(hit);
        self.queue_draw();
        if mouse.click_count == 2 && !self.activate_on_single_click {
            self.events.emit(FlowBoxEvent::ChildActivated(hit));
        }
        true
    }

    fn click_released(&mut self, mouse: &MouseEvent) -> bool {
        let Some(active) = self.active_child.take() else {
            return false;
        };
        self.queue_draw();
        if self.child_at_pos(mouse.x, mouse.y) != Some(active) {
            return true;
        }
        if self.activate_on_single_click {
            self.select_and_activate(active);
        } else {
            let mut modify = mouse.modifiers.contains(Modifiers::CTRL);
            let extend = mouse.modifiers.contains(Modifiers::SHIFT);
            if mouse.source == PointerSource::Touchscreen {
                modify = !modify;
            }
            self.update_selection(active, modify, extend);
        }
        true
    }

    fn drag_phase(&mut self, phase: DragEvent) -> bool {
        match phase {
            DragEvent::Begin { modifiers, .. } => {
                if self.selection_mode != SelectionMode::Multiple {
                    self.drag.deny();
                    return false;
                }
                self.rubberband = Rubberband {
                    modify: modifiers.contains(Modifiers::CTRL),
                    extend: modifiers.contains(Modifiers::SHIFT),
                    ..Rubberband::default()
                };
                false
            }
            DragEvent::Start { start_x, start_y } => {
                self.rubberband.active = true;
                self.rubberband.origin = (start_x, start_y);
                self.rubberband.pointer = (start_x, start_y);
                self.rubberband.first = self.child_at_pos(start_x, start_y);
                if let Some(first) = self.rubberband.first {
                    self.update_cursor(first);
                }
                self.active_child = None;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    message = "flow_box.rubberband",
                    phase = "start",
                    modify = self.rubberband.modify,
                    extend = self.rubberband.extend,
                );
                true
            }
            DragEvent::Update { offset_x, offset_y } => {
                if !self.rubberband.active {
                    return false;
                }
                let (x, y) = (
                    self.rubberband.origin.0 + offset_x,
                    self.rubberband.origin.1 + offset_y,
                );
                self.rubberband.pointer = (x, y);
                let hit = self.child_at_pos(x, y);
                if self.rubberband.first.is_none() {
                    self.rubberband.first = hit;
                    if let Some(first) = hit {
                        self.update_cursor(first);
                    }
                }
                if hit.is_some() {
                    self.rubberband.last = hit;
                }
                self.update_autoscroll_mode(x, y);
                self.queue_draw();
                true
            }
            DragEvent::End { .. } => {
                if !self.rubberband.active {
                    return false;
                }
                self.commit_rubberband();
                true
            }
            DragEvent::Cancel => {
                if !self.rubberband.active {
                    return false;
                }
                self.cancel_rubberband();
                true
            }
        }
    }

    // -----------------------------------------------------------------------
    // Rubberband
    // -----------------------------------------------------------------------

    /// Whether a rubberband drag is in progress.
    #[must_use]
    pub fn is_rubberband_active(&self) -> bool {
        self.rubberband.active
    }

    fn commit_rubberband(&mut self) {
        let before = self.selected_children();
        let Rubberband {
            first,
            last,
            modify,
            extend,
            ..
        } = self.rubberband;

        if !extend && !modify {
            self.unselect_all_internal();
        }
        if let (Some(first), Some(last)) = (first, last) {
            self.select_all_between(Some(first), Some(last), modify);
        }
        self.stop_rubberband();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "flow_box.rubberband",
            phase = "commit",
            first = first.map(|id| self.children.position(id)),
            last = last.map(|id| self.children.position(id)),
        );

        if self.selected_children() != before {
            self.notify_selection_changed("rubberband");
        }
    }

    /// Abandon an active rubberband without touching the selection.
    pub(super) fn cancel_rubberband(&mut self) {
        if !self.rubberband.active {
            return;
        }
        self.drag.deny();
        self.stop_rubberband();
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "flow_box.rubberband", phase = "cancel");
    }

    fn stop_rubberband(&mut self) {
        self.rubberband = Rubberband::default();
        self.remove_autoscroll();
        self.queue_draw();
    }

    /// Line bands covering the children between the rubberband anchors, in
    /// sequence order. Consecutive children on the same line are merged into
    /// one rectangle. Empty while no rubberband is active.
    #[must_use]
    pub fn rubberband_overlay_rects(&self) -> Vec<Rect> {
        let (Some(first), Some(last)) = (self.rubberband.first, self.rubberband.last) else {
            return Vec::new();
        };
        if !self.rubberband.active {
            return Vec::new();
        }
        let (lo, hi) = self.range_bounds(Some(first), Some(last));
        let mut bands: Vec<Rect> = Vec::new();
        for (_, record) in self.children.iter().skip(lo).take(hi - lo + 1) {
            if !record.is_visible() {
                continue;
            }
            let rect = record.allocation;
            match bands.last_mut() {
                Some(band) if self.same_line(band, &rect) => *band = band.union(&rect),
                _ => bands.push(rect),
            }
        }
        bands
    }

    fn same_line(&self, a: &Rect, b: &Rect) -> bool {
        match self.config.orientation {
            Orientation::Horizontal => a.y == b.y,
            Orientation::Vertical => a.x == b.x,
        }
    }

    /// The selection that releasing the pointer now would produce.
    #[must_use]
    pub fn rubberband_preview(&self) -> Vec<ChildId> {
        if !self.rubberband.active {
            return self.selected_children();
        }
        let keep = self.rubberband.extend || self.rubberband.modify;
        let range = match (self.rubberband.first, self.rubberband.last) {
            (Some(first), Some(last)) => Some(self.range_bounds(Some(first), Some(last))),
            _ => None,
        };
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, (id, record))| {
                let base = keep && record.is_selected();
                let touched = record.is_visible()
                    && range.is_some_and(|(lo, hi)| (lo..=hi).contains(&index));
                let selected = match (touched, self.rubberband.modify) {
                    (false, _) => base,
                    (true, true) => !base,
                    (true, false) => true,
                };
                selected.then_some(id)
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Autoscroll
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn autoscroll_mode(&self) -> AutoscrollMode {
        self.autoscroll.mode
    }

    /// Classify the pointer against the viewport along the scroll axis.
    fn update_autoscroll_mode(&mut self, x: f64, y: f64) {
        let mode = match self.viewport {
            None => AutoscrollMode::None,
            Some(viewport) => {
                let origin_x = self.hadjustment.as_ref().map_or(0.0, |adj| adj.value());
                let origin_y = self.vadjustment.as_ref().map_or(0.0, |adj| adj.value());
                let (pos, size) = match self.config.orientation {
                    Orientation::Vertical => (x - origin_x, f64::from(viewport.width)),
                    Orientation::Horizontal => (y - origin_y, f64::from(viewport.height)),
                };
                let fast = f64::from(self.autoscroll.config.fast_distance);
                if pos < -fast {
                    AutoscrollMode::PageBackward
                } else if pos > size + fast {
                    AutoscrollMode::PageForward
                } else if pos < 0.0 {
                    AutoscrollMode::StepBackward
                } else if pos > size {
                    AutoscrollMode::StepForward
                } else {
                    AutoscrollMode::None
                }
            }
        };
        self.set_autoscroll_mode(mode);
    }

    fn set_autoscroll_mode(&mut self, mode: AutoscrollMode) {
        if mode == self.autoscroll.mode {
            return;
        }
        self.remove_autoscroll();
        self.autoscroll.mode = mode;
        if mode != AutoscrollMode::None
            && let Some(clock) = &self.frame_clock
        {
            self.autoscroll.token = Some(clock.add_tick_callback());
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "flow_box.autoscroll",
            ?mode,
            registered = self.autoscroll.token.is_some(),
        );
    }

    /// Drop the tick registration and reset the mode.
    pub(super) fn remove_autoscroll(&mut self) {
        if let Some(token) = self.autoscroll.token.take()
            && let Some(clock) = &self.frame_clock
        {
            clock.remove_tick_callback(token);
        }
        self.autoscroll.mode = AutoscrollMode::None;
    }

    /// Advance autoscroll by one frame.
    ///
    /// Scrolls the adjustment along the flow's scroll axis, moves the stored
    /// pointer with the content and extends the rubberband to the child now
    /// under it. Returns `false` once there is nothing left to do; the host
    /// may stop ticking then.
    pub fn autoscroll_tick(&mut self) -> bool {
        if !self.rubberband.active || self.autoscroll.mode == AutoscrollMode::None {
            return false;
        }
        let adjustment = match self.config.orientation {
            Orientation::Horizontal => self.vadjustment.clone(),
            Orientation::Vertical => self.hadjustment.clone(),
        };
        let Some(adjustment) = adjustment else {
            return false;
        };

        let config = self.autoscroll.config;
        let step = adjustment.step_increment();
        let delta = match self.autoscroll.mode {
            AutoscrollMode::StepForward => step / config.step_divisor,
            AutoscrollMode::StepBackward => -step / config.step_divisor,
            AutoscrollMode::PageForward => step / config.page_divisor,
            AutoscrollMode::PageBackward => -step / config.page_divisor,
            AutoscrollMode::None => 0.0,
        };
        let before = adjustment.value();
        adjustment.set_value(before + delta);
        let moved = adjustment.value() - before;

        let (mut x, mut y) = self.rubberband.pointer;
        match self.config.orientation {
            Orientation::Horizontal => y += moved,
            Orientation::Vertical => x += moved,
        }
        self.rubberband.pointer = (x, y);
        if let Some(hit) = self.child_at_pos(x, y) {
            self.rubberband.last = Some(hit);
        }
        self.queue_draw();
        true
    }

    /// The flow box left the screen: stop autoscrolling and forget a pending
    /// press.
    pub fn unmap(&mut self) {
        self.remove_autoscroll();
        self.active_child = None;
    }
}
