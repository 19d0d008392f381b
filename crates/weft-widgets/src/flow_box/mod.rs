#![forbid(unsafe_code)]

//! Flow box: a container that wraps its children into rows or columns.
//!
//! A [`FlowBox`] owns an ordered sequence of child widgets and lays them out
//! with the flow solver from `weft-layout`: left to right with line wrapping
//! for a horizontal orientation, top to bottom for a vertical one. On top of
//! the layout it keeps selection state, a keyboard cursor that moves across
//! the visual grid, and a rubberband drag gesture for range selection.
//!
//! # Driving a flow box
//!
//! The flow box never paints and never talks to a windowing system. A host:
//!
//! 1. calls [`FlowBox::measure`] and [`FlowBox::size_allocate`] when
//!    [`FlowBoxEvent::ResizeQueued`] fires,
//! 2. forwards input through [`FlowBox::handle_event`],
//! 3. calls [`FlowBox::autoscroll_tick`] once per frame while the flow box
//!    holds a tick registration on the attached frame clock,
//! 4. paints children at [`FlowBox::child_allocation`] and the rubberband at
//!    [`FlowBox::rubberband_overlay_rects`].
//!
//! # Invariants
//!
//! 1. At most one cursor child; it is always a live child.
//! 2. In `Single` and `Browse` mode at most one child is selected.
//! 3. The selection anchor, when set, is a selected child.
//! 4. Only children that are both shown and pass the filter take part in
//!    measurement, allocation, hit testing and navigation. Hidden children
//!    keep their selection and their last rectangle.
//!
//! # Failure Modes
//!
//! - Passing a [`ChildId`] that was removed, or that belongs to another flow
//!   box, panics.
//! - `set_max_children_per_line(0)` and negative spacings panic; use
//!   [`FlowBox::set_config`] to get a [`FlowConfigError`] instead.

mod child;
mod children;
mod events;
mod hooks;
mod keynav;
mod model;
mod rubberband;
mod selection;

use std::rc::Rc;

use weft_core::adjustment::ScrollAdjustment;
use weft_core::frame_clock::FrameClock;
use weft_core::geometry::{Rect, Size};
use weft_core::gesture::{DragConfig, DragTracker};
use weft_layout::{
    Align, FlowConfig, FlowConfigError, FlowItems, Orientation, SizeRequest, TextDirection,
};

pub use child::{FlowChild, FocusDirection};
pub use children::ChildId;
pub use events::{FlowBoxEvent, SubscriptionId};
pub use hooks::{FilterFunc, SortFunc};
pub use keynav::MovementStep;
pub use model::{ItemsChanged, ListModel, VecModel};
pub use rubberband::{AutoscrollConfig, AutoscrollMode};
pub use selection::SelectionMode;

use children::{ChildFlags, Children};
use events::Emitter;
use hooks::Hook;
use model::BoundModel;
use rubberband::{Autoscroll, Rubberband};

/// Where [`FlowBox::insert`] places a child when no sort function is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before the child currently at this index; past the end appends.
    Index(usize),
    /// After the last child.
    Append,
}

/// A wrapping, selectable container of `W` children.
pub struct FlowBox<W> {
    config: FlowConfig,
    children: Children<W>,
    /// Line length from the last allocation; 0 before the first one.
    children_per_line: usize,
    size: Size,
    needs_layout: bool,

    selection_mode: SelectionMode,
    activate_on_single_click: bool,
    cursor: Option<ChildId>,
    anchor: Option<ChildId>,
    /// Child under a pending primary press.
    active_child: Option<ChildId>,
    has_focus: bool,
    /// Focus sits inside the cursor child's content rather than on the child.
    focus_inside: bool,
    ever_focused: bool,

    sort: Option<Hook<SortFunc<W>>>,
    filter: Option<Hook<FilterFunc<W>>>,
    model: Option<BoundModel<W>>,

    drag: DragTracker,
    rubberband: Rubberband,
    autoscroll: Autoscroll,
    hadjustment: Option<Rc<dyn ScrollAdjustment>>,
    vadjustment: Option<Rc<dyn ScrollAdjustment>>,
    frame_clock: Option<Rc<dyn FrameClock>>,
    viewport: Option<Size>,

    events: Emitter,
}

impl<W: FlowChild> Default for FlowBox<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: FlowChild> FlowBox<W> {
    /// Create an empty flow box with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FlowConfig::default(),
            children: Children::new(),
            children_per_line: 0,
            size: Size::ZERO,
            needs_layout: false,
            selection_mode: SelectionMode::default(),
            activate_on_single_click: true,
            cursor: None,
            anchor: None,
            active_child: None,
            has_focus: false,
            focus_inside: false,
            ever_focused: false,
            sort: None,
            filter: None,
            model: None,
            drag: DragTracker::new(DragConfig::default()),
            rubberband: Rubberband::default(),
            autoscroll: Autoscroll::default(),
            hadjustment: None,
            vadjustment: None,
            frame_clock: None,
            viewport: None,
            events: Emitter::default(),
        }
    }

    /// Create an empty flow box with a validated configuration.
    pub fn with_config(config: FlowConfig) -> Result<Self, FlowConfigError> {
        config.validate()?;
        let mut flow_box = Self::new();
        flow_box.config = config;
        Ok(flow_box)
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Current layout configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Replace the layout configuration after validating it.
    pub fn set_config(&mut self, config: FlowConfig) -> Result<(), FlowConfigError> {
        config.validate()?;
        self.update_config(|c| *c = config);
        Ok(())
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.update_config(|c| c.orientation = orientation);
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.config.orientation
    }

    pub fn set_homogeneous(&mut self, homogeneous: bool) {
        self.update_config(|c| c.homogeneous = homogeneous);
    }

    /// # Panics
    ///
    /// Panics if `spacing` is negative.
    pub fn set_row_spacing(&mut self, spacing: i32) {
        assert!(spacing >= 0, "flow box contract violated: negative row spacing {spacing}");
        self.update_config(|c| c.row_spacing = spacing);
    }

    /// # Panics
    ///
    /// Panics if `spacing` is negative.
    pub fn set_column_spacing(&mut self, spacing: i32) {
        assert!(spacing >= 0, "flow box contract violated: negative column spacing {spacing}");
        self.update_config(|c| c.column_spacing = spacing);
    }

    pub fn set_min_children_per_line(&mut self, n: u32) {
        self.update_config(|c| c.min_children_per_line = n);
    }

    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn set_max_children_per_line(&mut self, n: u32) {
        assert!(n >= 1, "flow box contract violated: max_children_per_line must be at least 1");
        self.update_config(|c| c.max_children_per_line = n);
    }

    pub fn set_halign(&mut self, align: Align) {
        self.update_config(|c| c.halign = align);
    }

    pub fn set_valign(&mut self, align: Align) {
        self.update_config(|c| c.valign = align);
    }

    /// Layout direction. Right-to-left mirrors placement only; line breaking
    /// and keyboard order are unchanged, except that Left/Right swap.
    pub fn set_direction(&mut self, direction: TextDirection) {
        self.update_config(|c| c.direction = direction);
    }

    #[must_use]
    pub fn activate_on_single_click(&self) -> bool {
        self.activate_on_single_click
    }

    /// When `true` (the default) a single click selects and activates a
    /// child; otherwise a click only updates the selection and a double click
    /// activates.
    pub fn set_activate_on_single_click(&mut self, single: bool) {
        self.activate_on_single_click = single;
    }

    /// Horizontal scroll adjustment of the enclosing viewport. Used for
    /// paging in vertical flows and autoscroll.
    pub fn set_hadjustment(&mut self, adjustment: Option<Rc<dyn ScrollAdjustment>>) {
        self.hadjustment = adjustment;
    }

    /// Vertical scroll adjustment of the enclosing viewport. Used for paging
    /// in horizontal flows and autoscroll.
    pub fn set_vadjustment(&mut self, adjustment: Option<Rc<dyn ScrollAdjustment>>) {
        self.vadjustment = adjustment;
    }

    /// Size of the enclosing viewport, if the flow box is scrolled. Without a
    /// viewport rubberband drags never autoscroll.
    pub fn set_viewport(&mut self, viewport: Option<Size>) {
        self.viewport = viewport;
    }

    /// Frame clock used for autoscroll ticks.
    pub fn set_frame_clock(&mut self, clock: Option<Rc<dyn FrameClock>>) {
        self.remove_autoscroll();
        self.frame_clock = clock;
    }

    pub fn set_autoscroll_config(&mut self, config: AutoscrollConfig) {
        self.autoscroll.config = config;
    }

    pub fn set_drag_config(&mut self, config: DragConfig) {
        self.drag = DragTracker::new(config);
    }

    fn update_config(&mut self, apply: impl FnOnce(&mut FlowConfig)) {
        let before = self.config;
        apply(&mut self.config);
        if self.config != before {
            self.queue_resize();
        }
    }

    // -----------------------------------------------------------------------
    // Children
    // -----------------------------------------------------------------------

    /// Number of children, visible or not.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child ids in sequence order.
    #[must_use]
    pub fn children(&self) -> &[ChildId] {
        self.children.ids()
    }

    /// Insert `widget`. With an active sort function the child goes to its
    /// sorted place (after equal children) and `position` is ignored.
    pub fn insert(&mut self, widget: W, position: InsertPosition) -> ChildId {
        let index = match (&self.sort, &self.model) {
            (Some(sort), None) => self.children.sorted_index(&widget, sort.func()),
            _ => match position {
                InsertPosition::Index(index) => index,
                InsertPosition::Append => self.children.len(),
            },
        };
        let id = self.children.insert(widget, index);
        self.apply_filter(id);
        self.queue_resize();
        if self.enforce_browse_selection() {
            self.notify_selection_changed("browse_keep");
        }
        id
    }

    /// Insert at the start (or the sorted place).
    pub fn prepend(&mut self, widget: W) -> ChildId {
        self.insert(widget, InsertPosition::Index(0))
    }

    /// Insert at the end (or the sorted place).
    pub fn append(&mut self, widget: W) -> ChildId {
        self.insert(widget, InsertPosition::Append)
    }

    /// Remove a child and hand its widget back.
    ///
    /// Clears the child from the cursor, anchor and pending-press slots.
    /// Removing a selected child fires one `SelectionChanged`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live child of this flow box.
    pub fn remove(&mut self, id: ChildId) -> W {
        let (widget, was_selected) = self.remove_child(id);
        let kept = self.enforce_browse_selection();
        if was_selected || kept {
            self.notify_selection_changed("remove");
        }
        widget
    }

    /// Remove every child. Does nothing while a model is bound.
    ///
    /// Fires one `SelectionChanged` if any removed child was selected.
    pub fn remove_all(&mut self) {
        if self.model.is_some() {
            return;
        }
        if self.clear_children() {
            self.notify_selection_changed("remove_all");
        }
    }

    /// Remove every child without notifying. Returns whether a selected
    /// child was among them.
    fn clear_children(&mut self) -> bool {
        let mut dirty = false;
        while let Some(id) = self.children.at(0) {
            dirty |= self.remove_child(id).1;
        }
        dirty
    }

    /// Detach one child and the state that refers to it. Returns the widget
    /// and whether it was selected; selection listeners are not notified.
    fn remove_child(&mut self, id: ChildId) -> (W, bool) {
        let (was_visible, was_selected) = {
            let record = self.children.get(id);
            (record.is_visible(), record.is_selected())
        };

        if self.active_child == Some(id) {
            self.active_child = None;
        }
        if self.anchor == Some(id) {
            self.anchor = None;
        }
        if self.rubberband.first == Some(id) {
            self.rubberband.first = None;
        }
        if self.rubberband.last == Some(id) {
            self.rubberband.last = None;
        }
        let widget = self.children.remove(id).widget;
        if self.cursor == Some(id) {
            self.cursor = None;
            self.focus_inside = false;
            self.events.emit(FlowBoxEvent::CursorChanged(None));
        }

        if was_visible {
            self.queue_resize();
        }
        (widget, was_selected)
    }

    /// Show or hide a child independently of the filter.
    pub fn set_child_visible(&mut self, id: ChildId, visible: bool) {
        let record = self.children.get_mut(id);
        if record.flags.contains(ChildFlags::SHOWN) == visible {
            return;
        }
        record.flags.set(ChildFlags::SHOWN, visible);
        let effective = record.is_visible();
        record.widget.set_effective_visibility(effective);
        self.queue_resize();
    }

    /// Shown and not filtered out.
    #[must_use]
    pub fn is_child_visible(&self, id: ChildId) -> bool {
        self.children.get(id).is_visible()
    }

    #[must_use]
    pub fn child(&self, id: ChildId) -> &W {
        &self.children.get(id).widget
    }

    /// Mutable access to a child widget. Call [`FlowBox::child_changed`]
    /// afterwards if the change affects sorting or filtering.
    #[must_use]
    pub fn child_mut(&mut self, id: ChildId) -> &mut W {
        &mut self.children.get_mut(id).widget
    }

    /// Whether `id` names a live child of this flow box.
    #[must_use]
    pub fn contains(&self, id: ChildId) -> bool {
        self.children.contains(id)
    }

    /// Rectangle from the last allocation pass the child took part in.
    #[must_use]
    pub fn child_allocation(&self, id: ChildId) -> Rect {
        self.children.get(id).allocation
    }

    #[must_use]
    pub fn child_at_index(&self, index: usize) -> Option<ChildId> {
        self.children.at(index)
    }

    /// Position of the child in the sequence.
    #[must_use]
    pub fn index_of(&self, id: ChildId) -> usize {
        self.children.position(id)
    }

    /// The child after `id` in sequence order; `None` at the end.
    #[must_use]
    pub fn next_child(&self, id: ChildId) -> Option<ChildId> {
        self.children.at(self.children.position(id) + 1)
    }

    /// The child before `id` in sequence order; `None` at the start.
    #[must_use]
    pub fn previous_child(&self, id: ChildId) -> Option<ChildId> {
        self.children
            .position(id)
            .checked_sub(1)
            .and_then(|index| self.children.at(index))
    }

    /// The visible child whose allocation contains `(x, y)`.
    #[must_use]
    pub fn child_at_pos(&self, x: f64, y: f64) -> Option<ChildId> {
        self.children
            .iter()
            .find(|(_, record)| record.is_visible() && record.allocation.contains_point(x, y))
            .map(|(id, _)| id)
    }

    /// Items per line from the last allocation; 0 before the first one.
    #[must_use]
    pub fn children_per_line(&self) -> usize {
        self.children_per_line
    }

    // -----------------------------------------------------------------------
    // Sorting and filtering
    // -----------------------------------------------------------------------

    /// Keep children ordered by `func`. Re-sorts immediately.
    pub fn set_sort_func(&mut self, func: impl Fn(&W, &W) -> std::cmp::Ordering + 'static) {
        self.install_sort(Some(Hook::new(Box::new(func), None)));
    }

    /// Like [`FlowBox::set_sort_func`]; `teardown` runs when the function is
    /// replaced, unset, or the flow box is dropped.
    pub fn set_sort_func_with_teardown(
        &mut self,
        func: impl Fn(&W, &W) -> std::cmp::Ordering + 'static,
        teardown: impl FnOnce() + 'static,
    ) {
        self.install_sort(Some(Hook::new(Box::new(func), Some(Box::new(teardown)))));
    }

    pub fn unset_sort_func(&mut self) {
        self.install_sort(None);
    }

    fn install_sort(&mut self, hook: Option<Hook<SortFunc<W>>>) {
        self.sort = hook;
        self.check_model_compat();
        self.invalidate_sort();
    }

    /// Re-sort all children with the current sort function.
    pub fn invalidate_sort(&mut self) {
        if self.model.is_some() {
            return;
        }
        if let Some(sort) = &self.sort {
            self.children.sort_by(sort.func());
            self.queue_resize();
        }
    }

    /// Hide children for which `func` returns `false`. Re-filters
    /// immediately.
    pub fn set_filter_func(&mut self, func: impl Fn(&W) -> bool + 'static) {
        self.install_filter(Some(Hook::new(Box::new(func), None)));
    }

    /// Like [`FlowBox::set_filter_func`] with a teardown hook.
    pub fn set_filter_func_with_teardown(
        &mut self,
        func: impl Fn(&W) -> bool + 'static,
        teardown: impl FnOnce() + 'static,
    ) {
        self.install_filter(Some(Hook::new(Box::new(func), Some(Box::new(teardown)))));
    }

    pub fn unset_filter_func(&mut self) {
        self.install_filter(None);
    }

    fn install_filter(&mut self, hook: Option<Hook<FilterFunc<W>>>) {
        self.filter = hook;
        self.check_model_compat();
        self.apply_filter_all();
    }

    /// Re-run the filter over all children.
    pub fn invalidate_filter(&mut self) {
        if self.filter.is_some() {
            self.apply_filter_all();
        }
    }

    /// Re-sort and re-filter a single child after its content changed.
    pub fn child_changed(&mut self, id: ChildId) {
        if self.model.is_none()
            && let Some(sort) = &self.sort
        {
            self.children.resort_one(id, sort.func());
            self.queue_resize();
        }
        self.apply_filter(id);
    }

    fn apply_filter(&mut self, id: ChildId) {
        let passes = match (&self.filter, &self.model) {
            (Some(filter), None) => (filter.func())(&self.children.get(id).widget),
            _ => true,
        };
        let record = self.children.get_mut(id);
        record.flags.set(ChildFlags::FILTER_VISIBLE, passes);
        let effective = record.is_visible();
        record.widget.set_effective_visibility(effective);
    }

    fn apply_filter_all(&mut self) {
        let ids = self.children.ids().to_vec();
        for id in ids {
            self.apply_filter(id);
        }
        self.queue_resize();
    }

    fn check_model_compat(&self) {
        if self.model.is_some() && (self.sort.is_some() || self.filter.is_some()) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                has_sort = self.sort.is_some(),
                has_filter = self.filter.is_some(),
                "flow box with a bound model ignores sort and filter functions"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    fn visible_ids(&self) -> Vec<ChildId> {
        self.children
            .iter()
            .filter(|(_, record)| record.is_visible())
            .map(|(id, _)| id)
            .collect()
    }

    /// Minimum and natural size along `orientation`, optionally for a given
    /// size on the other axis. Only visible children count.
    #[must_use]
    pub fn measure(&self, orientation: Orientation, for_size: Option<i32>) -> SizeRequest {
        let items = VisibleChildren {
            children: &self.children,
            ids: self.visible_ids(),
        };
        weft_layout::measure(&self.config, &items, orientation, for_size)
    }

    /// Place the visible children inside a `width` × `height` box.
    pub fn size_allocate(&mut self, width: i32, height: i32) {
        let ids = self.visible_ids();
        let allocation = {
            let items = VisibleChildren {
                children: &self.children,
                ids: ids.clone(),
            };
            weft_layout::allocate(&self.config, &items, width, height)
        };
        if allocation.line_length > 0 {
            self.children_per_line = allocation.line_length;
        }
        for (id, rect) in ids.into_iter().zip(allocation.rects) {
            let record = self.children.get_mut(id);
            record.allocation = rect;
            record.widget.size_allocate(rect);
        }
        self.size = Size::new(width, height);
        self.needs_layout = false;
    }

    /// Size passed to the last [`FlowBox::size_allocate`].
    #[must_use]
    pub fn allocated_size(&self) -> Size {
        self.size
    }

    /// Whether a change since the last allocation requires another one.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    fn queue_resize(&mut self) {
        if !self.needs_layout {
            self.needs_layout = true;
            self.events.emit(FlowBoxEvent::ResizeQueued);
        }
    }

    fn queue_draw(&self) {
        self.events.emit(FlowBoxEvent::RedrawRequested);
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Subscribe to [`FlowBoxEvent`]s.
    pub fn connect(&mut self, listener: impl Fn(&FlowBoxEvent) + 'static) -> SubscriptionId {
        self.events.connect(listener)
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn disconnect(&mut self, id: SubscriptionId) -> bool {
        self.events.disconnect(id)
    }
}

/// The visible children of a flow box, as seen by the flow solver.
struct VisibleChildren<'a, W> {
    children: &'a Children<W>,
    ids: Vec<ChildId>,
}

impl<W: FlowChild> FlowItems for VisibleChildren<'_, W> {
    fn len(&self) -> usize {
        self.ids.len()
    }

    fn measure(&self, index: usize, orientation: Orientation, for_size: Option<i32>) -> SizeRequest {
        self.children
            .get(self.ids[index])
            .widget
            .measure(orientation, for_size)
    }
}
