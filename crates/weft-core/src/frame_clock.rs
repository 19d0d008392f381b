#![forbid(unsafe_code)]

//! Frame clock capability.
//!
//! Widgets that animate (autoscroll, transitions) ask the host's frame clock
//! for ticks and receive a [`TickToken`]. While the token is live the host
//! calls the widget's tick entry point once per frame. Removing the token
//! stops the ticks; removing a token twice is a no-op.
//!
//! # Invariants
//!
//! - Tokens are never reused by the same clock.
//! - `remove_tick_callback` on an unknown or already-removed token does
//!   nothing.

use std::cell::RefCell;
use std::rc::Rc;

/// Handle for an active tick registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickToken(pub u64);

/// Per-frame tick registration.
pub trait FrameClock {
    /// Start delivering ticks for a new registration.
    fn add_tick_callback(&self) -> TickToken;

    /// Stop delivering ticks for `token`.
    fn remove_tick_callback(&self, token: TickToken);
}

#[derive(Debug, Default)]
struct ManualInner {
    next: u64,
    active: Vec<TickToken>,
}

/// A frame clock driven by hand. Used by tests and hosts without vsync.
///
/// Cloning shares the same registration table.
#[derive(Debug, Clone, Default)]
pub struct ManualFrameClock {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualFrameClock {
    /// Create an empty clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `token` is currently registered.
    #[must_use]
    pub fn is_active(&self, token: TickToken) -> bool {
        self.inner.borrow().active.contains(&token)
    }

    /// Number of live registrations.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }
}

impl FrameClock for ManualFrameClock {
    fn add_tick_callback(&self) -> TickToken {
        let mut inner = self.inner.borrow_mut();
        inner.next += 1;
        let token = TickToken(inner.next);
        inner.active.push(token);
        token
    }

    fn remove_tick_callback(&self, token: TickToken) {
        self.inner.borrow_mut().active.retain(|t| *t != token);
    }
}
