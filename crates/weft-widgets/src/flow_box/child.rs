#![forbid(unsafe_code)]

//! What a flow box needs from the widgets it holds.

use weft_core::geometry::Rect;
use weft_layout::{Orientation, SizeRequest};

/// Direction of a focus movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusDirection {
    TabForward,
    TabBackward,
    Up,
    Down,
    Left,
    Right,
}

impl FocusDirection {
    /// Arrow directions, as opposed to tab-chain movement.
    #[inline]
    #[must_use]
    pub const fn is_arrow(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}

/// Capability interface of a flow box child.
///
/// Only [`measure`](FlowChild::measure) is required. The remaining hooks
/// default to a plain, always-enabled, self-focusable leaf.
pub trait FlowChild {
    /// Minimum and natural extent along `orientation`, optionally for a
    /// given size on the other axis.
    fn measure(&self, orientation: Orientation, for_size: Option<i32>) -> SizeRequest;

    /// Whether the child accepts input. Insensitive children are skipped by
    /// keyboard navigation.
    fn is_sensitive(&self) -> bool {
        true
    }

    /// Whether the child itself can hold keyboard focus. When it cannot,
    /// focus is handed to its content through
    /// [`focus_descendant`](FlowChild::focus_descendant).
    fn is_focusable(&self) -> bool {
        true
    }

    /// Move focus into or within the child's own content. Returns `true` if
    /// focus ended up inside the child.
    fn focus_descendant(&mut self, _direction: FocusDirection) -> bool {
        false
    }

    /// Called when the child's effective visibility (shown and not filtered
    /// out) is (re)computed.
    fn set_effective_visibility(&mut self, _visible: bool) {}

    /// Called with the child's rectangle after every allocation pass it takes
    /// part in.
    fn size_allocate(&mut self, _rect: Rect) {}
}
