#![forbid(unsafe_code)]

//! Scroll adjustments.
//!
//! A scroll adjustment is the model behind one scrollable axis: a value
//! clamped into `[lower, upper - page_size]`, plus the step and page
//! increments used by keyboard paging and autoscroll.
//!
//! Adjustments are shared between a scrolling parent and the widgets it
//! scrolls, so the trait takes `&self` and implementations use interior
//! mutability.

use std::cell::Cell;

/// The contract of a scrollable axis as seen by a child widget.
pub trait ScrollAdjustment {
    /// Current scroll offset.
    fn value(&self) -> f64;

    /// Move the scroll offset. Implementations clamp into their range.
    fn set_value(&self, value: f64);

    /// Distance moved by a single step (arrow key, small autoscroll).
    fn step_increment(&self) -> f64;

    /// Distance moved by a page (PageUp/PageDown).
    fn page_increment(&self) -> f64;
}

/// Concrete single-threaded adjustment.
///
/// # Invariants
///
/// - `lower <= value <= max(lower, upper - page_size)` after every mutation.
#[derive(Debug, Clone)]
pub struct Adjustment {
    value: Cell<f64>,
    lower: Cell<f64>,
    upper: Cell<f64>,
    step_increment: Cell<f64>,
    page_increment: Cell<f64>,
    page_size: Cell<f64>,
}

impl Default for Adjustment {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }
}

impl Adjustment {
    /// Create an adjustment. The initial value is clamped into range.
    #[must_use]
    pub fn new(
        value: f64,
        lower: f64,
        upper: f64,
        step_increment: f64,
        page_increment: f64,
        page_size: f64,
    ) -> Self {
        let adj = Self {
            value: Cell::new(lower),
            lower: Cell::new(lower),
            upper: Cell::new(upper),
            step_increment: Cell::new(step_increment),
            page_increment: Cell::new(page_increment),
            page_size: Cell::new(page_size),
        };
        adj.set_value(value);
        adj
    }

    /// Lower bound.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower.get()
    }

    /// Upper bound (end of content).
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper.get()
    }

    /// Visible extent.
    #[must_use]
    pub fn page_size(&self) -> f64 {
        self.page_size.get()
    }

    /// Reconfigure the range and re-clamp the current value.
    pub fn configure(&self, lower: f64, upper: f64, page_size: f64) {
        self.lower.set(lower);
        self.upper.set(upper);
        self.page_size.set(page_size);
        self.set_value(self.value.get());
    }

    /// Change the increments.
    pub fn set_increments(&self, step: f64, page: f64) {
        self.step_increment.set(step);
        self.page_increment.set(page);
    }

    fn clamp(&self, value: f64) -> f64 {
        let lower = self.lower.get();
        let max = (self.upper.get() - self.page_size.get()).max(lower);
        value.clamp(lower, max)
    }
}

impl ScrollAdjustment for Adjustment {
    fn value(&self) -> f64 {
        self.value.get()
    }

    fn set_value(&self, value: f64) {
        self.value.set(self.clamp(value));
    }

    fn step_increment(&self) -> f64 {
        self.step_increment.get()
    }

    fn page_increment(&self) -> f64 {
        self.page_increment.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_clamped_to_scrollable_range() {
        let adj = Adjustment::new(0.0, 0.0, 1000.0, 10.0, 90.0, 100.0);
        adj.set_value(5000.0);
        assert_eq!(adj.value(), 900.0);
        adj.set_value(-3.0);
        assert_eq!(adj.value(), 0.0);
    }

    #[test]
    fn page_larger_than_content_pins_to_lower() {
        let adj = Adjustment::new(50.0, 0.0, 80.0, 1.0, 1.0, 100.0);
        assert_eq!(adj.value(), 0.0);
    }

    #[test]
    fn configure_reclamps() {
        let adj = Adjustment::new(400.0, 0.0, 1000.0, 10.0, 90.0, 100.0);
        adj.configure(0.0, 300.0, 100.0);
        assert_eq!(adj.value(), 200.0);
        assert_eq!(adj.upper(), 300.0);
    }

    #[test]
    fn increments_are_reported() {
        let adj = Adjustment::default();
        adj.set_increments(12.0, 240.0);
        assert_eq!(adj.step_increment(), 12.0);
        assert_eq!(adj.page_increment(), 240.0);
    }
}
