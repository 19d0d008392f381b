#![forbid(unsafe_code)]

//! Flow measurement and allocation.
//!
//! Items are placed along the *main* axis (the flow orientation) until a line
//! is full, then wrap onto the next line along the *cross* axis. The number
//! of items per line (the line length) is resolved from the available main
//! size and clamped into `[min_children_per_line, max_children_per_line]`.
//!
//! Two policies:
//!
//! - **Homogeneous**: every item gets the same main size, derived from the
//!   largest natural item size; every line gets the same cross size.
//! - **Aligned**: items are grouped into slots by `index % line_length`; a
//!   slot is as wide as its widest member, and each line is as tall as its
//!   tallest member measured at that member's slot size.
//!
//! # Invariants
//!
//! 1. The resolved line length `L` satisfies `min_items <= L <= max_children_per_line`
//!    where `min_items = max(1, min_children_per_line)`.
//! 2. Every line except possibly the last holds exactly `L` items.
//! 3. [`allocate`] returns exactly one rectangle per item.
//! 4. Leftover units are handed out one at a time to the earliest
//!    items/lines (first-come, not round-robin).
//! 5. Right-to-left mirroring only flips final `x` coordinates; line
//!    construction is direction-agnostic.
//!
//! # Failure Modes
//!
//! - Zero items: measurement is zero and allocation returns no rectangles.
//! - Largest natural main size of zero: every item is allocated an empty
//!   rectangle at the origin.
//! - `max_children_per_line == 0` violates the configuration contract and
//!   panics; use [`FlowConfig::validate`] to reject such configs up front.

use std::fmt;

use serde::{Deserialize, Serialize};
use weft_core::geometry::Rect;

use crate::cache::CachedItems;
use crate::distribute::distribute_natural_allocation;
use crate::{Align, Orientation, SizeRequest, TextDirection};

/// Default upper bound on items per line.
pub const DEFAULT_MAX_CHILDREN_PER_LINE: u32 = 7;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Flow layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub orientation: Orientation,
    /// Give every item the same main-axis size.
    pub homogeneous: bool,
    /// Space between rows, in units.
    pub row_spacing: i32,
    /// Space between columns, in units.
    pub column_spacing: i32,
    /// Lower bound on items per line (0 behaves as 1).
    pub min_children_per_line: u32,
    /// Upper bound on items per line. Must be at least 1.
    pub max_children_per_line: u32,
    /// Horizontal alignment of the flow within its allocation.
    pub halign: Align,
    /// Vertical alignment of the flow within its allocation.
    pub valign: Align,
    pub direction: TextDirection,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            homogeneous: false,
            row_spacing: 0,
            column_spacing: 0,
            min_children_per_line: 0,
            max_children_per_line: DEFAULT_MAX_CHILDREN_PER_LINE,
            halign: Align::Fill,
            valign: Align::Fill,
            direction: TextDirection::Ltr,
        }
    }
}

impl FlowConfig {
    /// Set the flow orientation.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set homogeneous sizing.
    #[must_use]
    pub fn homogeneous(mut self, homogeneous: bool) -> Self {
        self.homogeneous = homogeneous;
        self
    }

    /// Set the spacing between rows.
    #[must_use]
    pub fn row_spacing(mut self, spacing: i32) -> Self {
        self.row_spacing = spacing;
        self
    }

    /// Set the spacing between columns.
    #[must_use]
    pub fn column_spacing(mut self, spacing: i32) -> Self {
        self.column_spacing = spacing;
        self
    }

    /// Set the lower bound on items per line.
    #[must_use]
    pub fn min_children_per_line(mut self, n: u32) -> Self {
        self.min_children_per_line = n;
        self
    }

    /// Set the upper bound on items per line.
    #[must_use]
    pub fn max_children_per_line(mut self, n: u32) -> Self {
        self.max_children_per_line = n;
        self
    }

    /// Set the horizontal alignment.
    #[must_use]
    pub fn halign(mut self, align: Align) -> Self {
        self.halign = align;
        self
    }

    /// Set the vertical alignment.
    #[must_use]
    pub fn valign(mut self, align: Align) -> Self {
        self.valign = align;
        self
    }

    /// Set the text direction.
    #[must_use]
    pub fn direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Check the configuration contract.
    pub fn validate(&self) -> Result<(), FlowConfigError> {
        if self.max_children_per_line == 0 {
            return Err(FlowConfigError::ZeroMaxChildrenPerLine);
        }
        if self.row_spacing < 0 {
            return Err(FlowConfigError::NegativeSpacing {
                axis: SpacingAxis::Row,
                value: self.row_spacing,
            });
        }
        if self.column_spacing < 0 {
            return Err(FlowConfigError::NegativeSpacing {
                axis: SpacingAxis::Column,
                value: self.column_spacing,
            });
        }
        Ok(())
    }

    /// `max(1, min_children_per_line)`, never above the maximum.
    #[must_use]
    pub fn min_items(&self) -> usize {
        (self.min_children_per_line.max(1) as usize).min(self.max_items())
    }

    /// The maximum items per line as `usize`.
    ///
    /// # Panics
    ///
    /// Panics if `max_children_per_line` is zero.
    #[must_use]
    pub fn max_items(&self) -> usize {
        assert!(
            self.max_children_per_line >= 1,
            "flow contract violated: max_children_per_line must be at least 1"
        );
        self.max_children_per_line as usize
    }

    fn item_spacing(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.column_spacing,
            Orientation::Vertical => self.row_spacing,
        }
        .max(0)
    }

    fn line_spacing(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.row_spacing,
            Orientation::Vertical => self.column_spacing,
        }
        .max(0)
    }

    fn item_align(&self) -> Align {
        match self.orientation {
            Orientation::Horizontal => self.halign,
            Orientation::Vertical => self.valign,
        }
    }

    fn line_align(&self) -> Align {
        match self.orientation {
            Orientation::Horizontal => self.valign,
            Orientation::Vertical => self.halign,
        }
    }
}

/// Which spacing field a [`FlowConfigError::NegativeSpacing`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacingAxis {
    Row,
    Column,
}

impl fmt::Display for SpacingAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => write!(f, "row"),
            Self::Column => write!(f, "column"),
        }
    }
}

/// Configuration contract violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowConfigError {
    ZeroMaxChildrenPerLine,
    NegativeSpacing { axis: SpacingAxis, value: i32 },
}

impl fmt::Display for FlowConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxChildrenPerLine => {
                write!(f, "max_children_per_line must be at least 1")
            }
            Self::NegativeSpacing { axis, value } => {
                write!(f, "{axis} spacing must not be negative (got {value})")
            }
        }
    }
}

impl std::error::Error for FlowConfigError {}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// The visible items of a flow, in order.
pub trait FlowItems {
    /// Number of items.
    fn len(&self) -> usize;

    /// Whether there are no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Minimum/natural extent of item `index` along `orientation`, given an
    /// optional size on the other axis.
    fn measure(&self, index: usize, orientation: Orientation, for_size: Option<i32>) -> SizeRequest;
}

/// An item with constant requests on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedItem {
    pub width: SizeRequest,
    pub height: SizeRequest,
}

impl FixedItem {
    /// Item whose minimum and natural sizes coincide.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: SizeRequest::fixed(width),
            height: SizeRequest::fixed(height),
        }
    }
}

impl FlowItems for [FixedItem] {
    fn len(&self) -> usize {
        <[FixedItem]>::len(self)
    }

    fn measure(&self, index: usize, orientation: Orientation, _for_size: Option<i32>) -> SizeRequest {
        let item = &self[index];
        match orientation {
            Orientation::Horizontal => item.width,
            Orientation::Vertical => item.height,
        }
    }
}

impl FlowItems for Vec<FixedItem> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn measure(&self, index: usize, orientation: Orientation, for_size: Option<i32>) -> SizeRequest {
        self.as_slice().measure(index, orientation, for_size)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Result of one allocation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowAllocation {
    /// Resolved items per line; 0 when nothing was flowed.
    pub line_length: usize,
    /// Number of lines.
    pub lines: usize,
    /// One rectangle per item, in item order.
    pub rects: Vec<Rect>,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn line_count(n: usize, line_length: usize) -> usize {
    n.div_ceil(line_length).max(1)
}

/// Largest unconstrained request over all items.
fn max_item_size<I: FlowItems + ?Sized>(items: &I, orientation: Orientation) -> SizeRequest {
    (0..items.len()).fold(SizeRequest::ZERO, |acc, i| {
        acc.max(items.measure(i, orientation, None))
    })
}

/// Largest cross-axis request when every item gets `item_size` on the main axis.
fn largest_for_item_size<I: FlowItems + ?Sized>(
    items: &I,
    main: Orientation,
    item_size: i32,
) -> SizeRequest {
    (0..items.len()).fold(SizeRequest::ZERO, |acc, i| {
        acc.max(items.measure(i, main.opposite(), Some(item_size)))
    })
}

/// First guess at the line length from the natural item size.
fn initial_line_length(avail: i32, nat_item: i32, spacing: i32, config: &FlowConfig) -> usize {
    let avail = i64::from(avail.max(0));
    let nat = i64::from(nat_item.max(1));
    let sp = i64::from(spacing);
    let mut length = avail / (nat + sp);
    if length * sp + (length + 1) * nat <= avail {
        length += 1;
    }
    let length = usize::try_from(length).unwrap_or(usize::MAX);
    length.max(config.min_items()).min(config.max_items())
}

/// Slot requests for `line_length` slots plus the natural line extent.
fn gather_aligned<I: FlowItems + ?Sized>(
    items: &I,
    config: &FlowConfig,
    line_length: usize,
) -> (Vec<SizeRequest>, i64) {
    let n = items.len();
    let extra_items = n % line_length;
    let shift_last = config.item_align() == Align::End && extra_items > 0;
    let mut slots = vec![SizeRequest::ZERO; line_length];

    for i in 0..n {
        let mut position = i % line_length;
        if shift_last && i >= n - extra_items {
            position += line_length - extra_items;
        }
        let request = items.measure(i, config.orientation, None);
        slots[position] = slots[position].max(request);
    }

    let natural: i64 = slots.iter().map(|s| i64::from(s.natural)).sum::<i64>()
        + (line_length as i64 - 1) * i64::from(config.item_spacing());
    (slots, natural)
}

/// Grow the line length past `line_length` while the aligned line still fits.
fn fit_aligned<I: FlowItems + ?Sized>(
    items: &I,
    config: &FlowConfig,
    avail: i32,
    line_length: &mut usize,
) -> Vec<SizeRequest> {
    let avail = i64::from(avail);
    let (mut slots, mut try_line_size) = gather_aligned(items, config, *line_length);
    let mut try_length = *line_length + 1;

    while try_line_size < avail && try_length <= config.max_items() {
        let (try_slots, size) = gather_aligned(items, config, try_length);
        try_line_size = size;
        if size <= avail {
            *line_length = try_length;
            slots = try_slots;
            try_length += 1;
        } else {
            break;
        }
    }
    slots
}

/// Unconstrained aligned extent of `line_length` slots.
fn aligned_line_extent<I: FlowItems + ?Sized>(
    items: &I,
    config: &FlowConfig,
    orientation: Orientation,
    line_length: usize,
) -> SizeRequest {
    let spacing = match orientation {
        Orientation::Horizontal => config.column_spacing,
        Orientation::Vertical => config.row_spacing,
    }
    .max(0);
    let mut slots = vec![SizeRequest::ZERO; line_length];
    for i in 0..items.len() {
        let slot = i % line_length;
        slots[slot] = slots[slot].max(items.measure(i, orientation, None));
    }
    let gaps = (line_length as i32 - 1) * spacing;
    SizeRequest::new(
        slots.iter().map(|s| s.minimum).sum::<i32>() + gaps,
        slots.iter().map(|s| s.natural).sum::<i32>() + gaps,
    )
}

/// Per-slot share of leftover main-axis units under `Fill`.
#[derive(Debug, Clone, Copy, Default)]
struct Spread {
    per: i32,
    first: usize,
}

impl Spread {
    fn new(extra: i32, count: usize, align: Align) -> Self {
        if align != Align::Fill || count == 0 || extra <= 0 {
            return Self::default();
        }
        let count = count as i32;
        Self {
            per: extra / count,
            first: (extra % count) as usize,
        }
    }

    fn bonus(&self, index: usize) -> i32 {
        self.per + i32::from(index < self.first)
    }
}

/// Geometry of one aligned line pass.
struct AlignedLines {
    slots: Vec<SizeRequest>,
    lines: Vec<SizeRequest>,
    extra: i32,
}

/// Slot index of item `position_in_line` on line `line`.
fn slot_for(
    config: &FlowConfig,
    position_in_line: usize,
    line: usize,
    n_lines: usize,
    last_line_extra_items: usize,
) -> usize {
    if config.item_align() == Align::End && line + 1 == n_lines {
        position_in_line + last_line_extra_items
    } else {
        position_in_line
    }
}

fn last_line_extra_items(n: usize, line_length: usize) -> usize {
    match n % line_length {
        0 => 0,
        rem => line_length - rem,
    }
}

/// Resolve slot sizes for `avail` and measure every line's cross extent.
fn aligned_lines<I: FlowItems + ?Sized>(
    items: &I,
    config: &FlowConfig,
    avail: i32,
    line_length: &mut usize,
) -> AlignedLines {
    let mut slots = fit_aligned(items, config, avail, line_length);
    let ll = *line_length;
    let n = items.len();
    let n_lines = line_count(n, ll);

    let used: i32 = slots.iter().map(|s| s.minimum).sum::<i32>()
        + (ll as i32 - 1) * config.item_spacing();
    let remaining = avail - used;
    let extra = if remaining > 0 {
        distribute_natural_allocation(remaining, &mut slots)
    } else {
        0
    };

    let spread = Spread::new(extra, ll, config.item_align());
    let shift = last_line_extra_items(n, ll);
    let cross = config.orientation.opposite();
    let mut lines = vec![SizeRequest::ZERO; n_lines];
    for index in 0..n {
        let line = index / ll;
        let slot = slot_for(config, index % ll, line, n_lines, shift);
        let size = slots[slot].minimum + spread.bonus(slot);
        lines[line] = lines[line].max(items.measure(index, cross, Some(size)));
    }

    AlignedLines {
        slots,
        lines,
        extra,
    }
}

/// Sum line extents, skipping spacing around lines with no natural extent.
fn stack_lines(lines: &[SizeRequest], spacing: i32) -> SizeRequest {
    let mut total = SizeRequest::ZERO;
    let mut first = true;
    for line in lines.iter().filter(|l| l.natural > 0) {
        if !first {
            total.minimum += spacing;
            total.natural += spacing;
        }
        first = false;
        total.minimum += line.minimum;
        total.natural += line.natural;
    }
    total
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// Measure the flow along `orientation`, optionally for a given size on the
/// other axis.
///
/// - Main axis, unconstrained: the extent of `min_items` (minimum) and up to
///   `max_children_per_line` (natural) items side by side.
/// - Cross axis for a main size: wrap the items into lines at that size and
///   stack the lines.
/// - Cross axis, unconstrained: the cross extent at the main-axis minimum.
/// - Main axis for a cross size: the smallest main size whose wrapped cross
///   extent fits, found by binary search.
pub fn measure<I: FlowItems + ?Sized>(
    config: &FlowConfig,
    items: &I,
    orientation: Orientation,
    for_size: Option<i32>,
) -> SizeRequest {
    if items.is_empty() {
        return SizeRequest::ZERO;
    }
    let items = CachedItems::new(items);
    let request = match (orientation == config.orientation, for_size) {
        (true, None) => main_unconstrained(config, &items),
        (true, Some(cross)) => main_for_cross(config, &items, cross),
        (false, None) => {
            let main = main_unconstrained(config, &items).minimum;
            cross_for_main(config, &items, main)
        }
        (false, Some(main)) => cross_for_main(config, &items, main),
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(
        message = "flow.measure",
        ?orientation,
        ?for_size,
        minimum = request.minimum,
        natural = request.natural,
    );

    request
}

fn main_unconstrained<I: FlowItems + ?Sized>(config: &FlowConfig, items: &I) -> SizeRequest {
    let main = config.orientation;
    let min_items = config.min_items();
    let nat_items = config.max_items().min(items.len()).max(min_items);

    if config.homogeneous {
        let item = max_item_size(items, main);
        let spacing = config.item_spacing();
        let extent = |size: i32, count: usize| size * count as i32 + (count as i32 - 1) * spacing;
        SizeRequest::new(extent(item.minimum, min_items), extent(item.natural, nat_items))
    } else {
        let min = aligned_line_extent(items, config, main, min_items);
        let natural = if nat_items > min_items {
            aligned_line_extent(items, config, main, nat_items).natural
        } else {
            min.natural
        };
        SizeRequest::new(min.minimum, natural)
    }
}

fn cross_for_main<I: FlowItems + ?Sized>(config: &FlowConfig, items: &I, main_size: i32) -> SizeRequest {
    let n = items.len();
    if n == 0 {
        return SizeRequest::ZERO;
    }
    let min_main = main_unconstrained(config, items).minimum;
    let avail = main_size.max(min_main);
    if avail <= 0 {
        return SizeRequest::ZERO;
    }
    let max_item = max_item_size(items, config.orientation);
    if max_item.natural <= 0 {
        return SizeRequest::ZERO;
    }

    let spacing = config.item_spacing();
    let mut line_length = initial_line_length(avail, max_item.natural, spacing, config);

    if config.homogeneous {
        let mut item_size = (avail - (line_length as i32 - 1) * spacing) / line_length as i32;
        if config.item_align() != Align::Fill {
            item_size = item_size.min(max_item.natural);
        }
        let line = largest_for_item_size(items, config.orientation, item_size.max(0));
        let lines = line_count(n, line_length) as i32;
        let gaps = (lines - 1) * config.line_spacing();
        SizeRequest::new(line.minimum * lines + gaps, line.natural * lines + gaps)
    } else {
        let aligned = aligned_lines(items, config, avail, &mut line_length);
        stack_lines(&aligned.lines, config.line_spacing())
    }
}

fn main_for_cross<I: FlowItems + ?Sized>(config: &FlowConfig, items: &I, cross_size: i32) -> SizeRequest {
    let unconstrained = main_unconstrained(config, items);
    let floor = unconstrained.minimum;
    let mut lo = floor;
    let mut hi = i32::MAX;

    while lo < hi {
        let test = if hi != i32::MAX {
            lo + (hi - lo) / 2
        } else if lo == floor {
            lo
        } else {
            lo.saturating_mul(2)
        };
        let cross = cross_for_main(config, items, test);
        if cross.minimum > cross_size {
            if test == i32::MAX {
                lo = test;
                break;
            }
            lo = test + 1;
        } else {
            hi = test;
        }
    }

    SizeRequest::new(lo, lo.max(unconstrained.natural))
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Place every item inside a `width` × `height` container.
pub fn allocate<I: FlowItems + ?Sized>(
    config: &FlowConfig,
    items: &I,
    width: i32,
    height: i32,
) -> FlowAllocation {
    let n = items.len();
    if n == 0 {
        return FlowAllocation::default();
    }
    let items = CachedItems::new(items);

    let (avail, avail_other) = match config.orientation {
        Orientation::Horizontal => (width, height),
        Orientation::Vertical => (height, width),
    };
    let item_spacing = config.item_spacing();
    let line_spacing = config.line_spacing();
    let item_align = config.item_align();
    let line_align = config.line_align();

    let max_item = max_item_size(&items, config.orientation);
    if max_item.natural <= 0 {
        return FlowAllocation {
            line_length: config.min_items(),
            lines: line_count(n, config.min_items()),
            rects: vec![Rect::default(); n],
        };
    }

    let mut line_length = initial_line_length(avail, max_item.natural, item_spacing, config);

    // Either a shared item/line size or per-slot and per-line requests.
    let mut item_size = 0;
    let mut line_size = 0;
    let mut slots = Vec::new();
    let mut lines = Vec::new();
    let extra;
    let extra_lines;
    let n_lines;

    if config.homogeneous {
        n_lines = line_count(n, line_length);
        let ll = line_length as i32;
        item_size = (avail - (ll - 1) * item_spacing) / ll;
        if item_align != Align::Fill {
            item_size = item_size.min(max_item.natural);
        }
        item_size = item_size.max(0);

        let fixed_line = largest_for_item_size(&items, config.orientation, item_size);
        let nl = n_lines as i32;
        line_size = (avail_other - (nl - 1) * line_spacing) / nl;
        if line_align != Align::Fill {
            line_size = line_size.min(fixed_line.natural);
        }
        line_size = line_size.max(0);

        extra = (avail - (ll - 1) * item_spacing - item_size * ll).max(0);
        extra_lines = (avail_other - (nl - 1) * line_spacing - line_size * nl).max(0);
    } else {
        let aligned = aligned_lines(&items, config, avail, &mut line_length);
        n_lines = aligned.lines.len();
        slots = aligned.slots;
        lines = aligned.lines;
        extra = aligned.extra;

        let stacked = stack_lines(&lines, line_spacing);
        let remaining = avail_other - stacked.minimum;
        extra_lines = if remaining > 0 {
            distribute_natural_allocation(remaining, &mut lines)
        } else {
            0
        };
    }

    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "flow.allocate",
        children = n,
        line_length,
        lines = n_lines,
        width,
        height
    )
    .entered();

    let item_spread = Spread::new(extra, line_length, item_align);
    let line_spread = Spread::new(extra_lines, n_lines, line_align);
    let shift = last_line_extra_items(n, line_length);

    let line_extent = |line: usize| -> i32 {
        if config.homogeneous {
            line_size
        } else {
            lines[line].minimum + line_spread.bonus(line)
        }
    };
    let line_has_content = |line: usize| config.homogeneous || lines[line].natural > 0;
    let line_start = |line: usize| -> i32 {
        let mut offset = item_align.offset(extra);
        if item_align == Align::End && line + 1 == n_lines {
            for slot in 0..shift {
                let size = if config.homogeneous {
                    item_size
                } else {
                    slots[slot].minimum
                };
                offset += size + item_spacing;
            }
        }
        offset
    };

    let mut rects = Vec::with_capacity(n);
    let mut line = 0;
    let mut line_offset = line_align.offset(extra_lines);
    let mut item_offset = line_start(0);
    let mut seen_content = line_has_content(0);

    for i in 0..n {
        let position = i % line_length;
        if i > 0 && position == 0 {
            line_offset += line_extent(line);
            line += 1;
            if line_has_content(line) {
                if seen_content {
                    line_offset += line_spacing;
                }
                seen_content = true;
            }
            item_offset = line_start(line);
        }

        let slot = slot_for(config, position, line, n_lines, shift);
        let base = if config.homogeneous {
            item_size
        } else {
            slots[slot].minimum
        };
        let this_item = base + item_spread.bonus(slot);
        let this_line = line_extent(line);

        let mut rect = match config.orientation {
            Orientation::Horizontal => Rect::new(item_offset, line_offset, this_item, this_line),
            Orientation::Vertical => Rect::new(line_offset, item_offset, this_line, this_item),
        };
        if config.direction == TextDirection::Rtl {
            rect = rect.mirrored(width);
        }
        rects.push(rect);

        item_offset += this_item + item_spacing;
    }

    FlowAllocation {
        line_length,
        lines: n_lines,
        rects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(n: usize, w: i32, h: i32) -> Vec<FixedItem> {
        vec![FixedItem::new(w, h); n]
    }

    #[test]
    fn validate_rejects_zero_max() {
        let config = FlowConfig::default().max_children_per_line(0);
        assert_eq!(
            config.validate(),
            Err(FlowConfigError::ZeroMaxChildrenPerLine)
        );
        assert_eq!(
            FlowConfig::default().row_spacing(-2).validate(),
            Err(FlowConfigError::NegativeSpacing {
                axis: SpacingAxis::Row,
                value: -2
            })
        );
        assert!(FlowConfig::default().validate().is_ok());
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = FlowConfigError::NegativeSpacing {
            axis: SpacingAxis::Column,
            value: -1,
        };
        assert_eq!(err.to_string(), "column spacing must not be negative (got -1)");
    }

    #[test]
    fn min_items_clamped() {
        let config = FlowConfig::default()
            .min_children_per_line(9)
            .max_children_per_line(4);
        assert_eq!(config.min_items(), 4);
        assert_eq!(FlowConfig::default().min_items(), 1);
    }

    #[test]
    fn initial_guess_fits_one_more_without_trailing_spacing() {
        let config = FlowConfig::default();
        // 3 items of 10 with spacing 5 need 40; 40 / 15 = 2, then the +1 check passes.
        assert_eq!(initial_line_length(40, 10, 5, &config), 3);
        assert_eq!(initial_line_length(39, 10, 5, &config), 2);
        assert_eq!(initial_line_length(0, 10, 5, &config), 1);
    }

    #[test]
    fn homogeneous_fill_hands_remainder_to_first_items() {
        let config = FlowConfig::default().homogeneous(true).max_children_per_line(3);
        let items = fixed(3, 10, 10);
        let alloc = allocate(&config, &items, 32, 10);
        assert_eq!(alloc.line_length, 3);
        let widths: Vec<i32> = alloc.rects.iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![11, 11, 10]);
        assert_eq!(alloc.rects[2].x, 22);
    }

    #[test]
    fn start_alignment_keeps_natural_size() {
        let config = FlowConfig::default()
            .homogeneous(true)
            .halign(Align::Start)
            .valign(Align::Start);
        let items = fixed(2, 10, 10);
        let alloc = allocate(&config, &items, 100, 100);
        assert_eq!(alloc.rects[0], Rect::new(0, 0, 10, 10));
        assert_eq!(alloc.rects[1], Rect::new(10, 0, 10, 10));
    }

    #[test]
    fn center_alignment_offsets_by_half() {
        let config = FlowConfig::default()
            .homogeneous(true)
            .max_children_per_line(2)
            .halign(Align::Center)
            .valign(Align::Start);
        let items = fixed(2, 10, 10);
        let alloc = allocate(&config, &items, 40, 10);
        assert_eq!(alloc.rects[0].x, 10);
        assert_eq!(alloc.rects[1].x, 20);
    }

    #[test]
    fn end_alignment_right_aligns_partial_last_line() {
        let config = FlowConfig::default()
            .homogeneous(true)
            .max_children_per_line(3)
            .halign(Align::End)
            .valign(Align::Start);
        let items = fixed(4, 10, 10);
        let alloc = allocate(&config, &items, 30, 100);
        assert_eq!(alloc.line_length, 3);
        // First line fills the row, the lone last item sits under the third column.
        assert_eq!(alloc.rects[0].x, 0);
        assert_eq!(alloc.rects[3], Rect::new(20, 10, 10, 10));
    }

    #[test]
    fn end_alignment_applies_to_single_short_line() {
        let config = FlowConfig::default()
            .homogeneous(true)
            .max_children_per_line(4)
            .halign(Align::End)
            .valign(Align::Start);
        let items = fixed(2, 10, 10);
        let alloc = allocate(&config, &items, 40, 10);
        assert_eq!(alloc.line_length, 4);
        assert_eq!(alloc.rects[0].x, 20);
        assert_eq!(alloc.rects[1].x, 30);
    }

    #[test]
    fn rtl_mirrors_x_only() {
        let ltr = FlowConfig::default().homogeneous(true).max_children_per_line(2);
        let rtl = ltr.direction(TextDirection::Rtl);
        let items = fixed(3, 10, 10);
        let a = allocate(&ltr, &items, 20, 20);
        let b = allocate(&rtl, &items, 20, 20);
        for (l, r) in a.rects.iter().zip(&b.rects) {
            assert_eq!(r.x, 20 - l.x - l.width);
            assert_eq!(r.y, l.y);
        }
    }

    #[test]
    fn zero_natural_items_get_empty_rects() {
        let config = FlowConfig::default();
        let items = fixed(3, 0, 10);
        let alloc = allocate(&config, &items, 100, 100);
        assert_eq!(alloc.rects, vec![Rect::default(); 3]);
    }

    #[test]
    fn empty_flow_measures_zero() {
        let config = FlowConfig::default();
        let items: Vec<FixedItem> = Vec::new();
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            assert_eq!(measure(&config, &items, orientation, None), SizeRequest::ZERO);
            assert_eq!(measure(&config, &items, orientation, Some(50)), SizeRequest::ZERO);
        }
        assert!(allocate(&config, &items, 100, 100).rects.is_empty());
    }

    #[test]
    fn aligned_slots_take_widest_member() {
        let config = FlowConfig::default().max_children_per_line(2).halign(Align::Start);
        let items = vec![
            FixedItem::new(10, 5),
            FixedItem::new(30, 5),
            FixedItem::new(20, 5),
            FixedItem::new(10, 5),
        ];
        let alloc = allocate(&config, &items, 50, 10);
        assert_eq!(alloc.line_length, 2);
        assert_eq!(alloc.rects[0].width, 20);
        assert_eq!(alloc.rects[1].width, 30);
        assert_eq!(alloc.rects[2].width, 20);
        assert_eq!(alloc.rects[3].x, 20);
    }

    #[test]
    fn main_axis_unconstrained_measure() {
        let config = FlowConfig::default()
            .homogeneous(true)
            .column_spacing(2)
            .min_children_per_line(2)
            .max_children_per_line(4);
        let items = vec![
            FixedItem {
                width: SizeRequest::new(5, 10),
                height: SizeRequest::fixed(10),
            };
            6
        ];
        let req = measure(&config, &items, Orientation::Horizontal, None);
        assert_eq!(req, SizeRequest::new(5 * 2 + 2, 10 * 4 + 3 * 2));
    }

    #[test]
    fn natural_measure_counts_only_existing_items() {
        let config = FlowConfig::default().homogeneous(true);
        let items = fixed(2, 10, 10);
        let req = measure(&config, &items, Orientation::Horizontal, None);
        assert_eq!(req.natural, 20);
    }

    #[test]
    fn height_for_width_wraps_lines() {
        let config = FlowConfig::default().row_spacing(1);
        let items = fixed(5, 10, 10);
        // Width 20 holds 2 per line → 3 lines + 2 gaps.
        let req = measure(&config, &items, Orientation::Vertical, Some(20));
        assert_eq!(req, SizeRequest::new(32, 32));
    }

    #[test]
    fn width_for_height_is_smallest_fitting_width() {
        let config = FlowConfig::default();
        let items = fixed(6, 10, 10);
        // Height 20 holds 2 lines → 3 per line → width 30.
        let req = measure(&config, &items, Orientation::Horizontal, Some(20));
        assert_eq!(req.minimum, 30);
        let lines = measure(&config, &items, Orientation::Vertical, Some(req.minimum));
        assert!(lines.minimum <= 20);
    }

    #[test]
    fn cross_unconstrained_uses_main_minimum() {
        let config = FlowConfig::default();
        let items = fixed(3, 10, 10);
        // Minimum main extent is one item → one item per line.
        let req = measure(&config, &items, Orientation::Vertical, None);
        assert_eq!(req, SizeRequest::new(30, 30));
    }

    #[test]
    fn vertical_flow_fills_columns() {
        let config = FlowConfig::default()
            .orientation(Orientation::Vertical)
            .max_children_per_line(2)
            .halign(Align::Start)
            .valign(Align::Start);
        let items = fixed(3, 10, 10);
        let alloc = allocate(&config, &items, 100, 20);
        assert_eq!(alloc.rects[0], Rect::new(0, 0, 10, 10));
        assert_eq!(alloc.rects[1], Rect::new(0, 10, 10, 10));
        assert_eq!(alloc.rects[2], Rect::new(10, 0, 10, 10));
    }
}
