#![forbid(unsafe_code)]

//! Layout primitives and the flow solver.
//!
//! The flow solver places an ordered sequence of items into wrapping lines:
//! rows for a horizontal flow, columns for a vertical one. It answers two
//! questions for the container that owns the items:
//!
//! - [`measure`]: how big does the flow want to be along an axis, optionally
//!   given a size on the other axis (height-for-width and the converse)?
//! - [`allocate`]: given a final size, how many items go on a line and where
//!   does every item go?
//!
//! Items are supplied through the [`FlowItems`] trait and must already be
//! filtered down to the visible ones.

mod cache;
mod distribute;
mod flow;

pub use cache::CachedItems;
pub use distribute::distribute_natural_allocation;
pub use flow::{
    FixedItem, FlowAllocation, FlowConfig, FlowConfigError, FlowItems, SpacingAxis, allocate,
    measure,
};
pub use weft_core::geometry::{Rect, Size};

use serde::{Deserialize, Serialize};

/// Axis along which items are laid out before wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Items fill rows left to right, rows stack top to bottom.
    #[default]
    Horizontal,
    /// Items fill columns top to bottom, columns stack left to right.
    Vertical,
}

impl Orientation {
    /// The other axis.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// How spare space along an axis is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    /// Spare space is distributed into the item/line sizes.
    #[default]
    Fill,
    /// Content is packed at the start; spare space trails.
    Start,
    /// Content is packed at the end; spare space leads.
    End,
    /// Spare space is split evenly before and after.
    Center,
}

impl Align {
    /// Leading offset for `extra` spare units.
    #[inline]
    #[must_use]
    pub const fn offset(self, extra: i32) -> i32 {
        match self {
            Self::Fill | Self::Start => 0,
            Self::Center => extra / 2,
            Self::End => extra,
        }
    }
}

/// Horizontal layout direction of the locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Minimum and natural extent along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizeRequest {
    pub minimum: i32,
    pub natural: i32,
}

impl SizeRequest {
    /// Zero request.
    pub const ZERO: Self = Self::new(0, 0);

    /// Create a request.
    #[inline]
    pub const fn new(minimum: i32, natural: i32) -> Self {
        Self { minimum, natural }
    }

    /// Fixed request where minimum equals natural.
    #[inline]
    pub const fn fixed(size: i32) -> Self {
        Self::new(size, size)
    }

    /// Component-wise maximum.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            minimum: self.minimum.max(other.minimum),
            natural: self.natural.max(other.natural),
        }
    }

    /// Natural minus minimum, never negative.
    #[inline]
    pub const fn gap(&self) -> i32 {
        let gap = self.natural - self.minimum;
        if gap > 0 { gap } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_orientation() {
        assert_eq!(Orientation::Horizontal.opposite(), Orientation::Vertical);
        assert_eq!(Orientation::Vertical.opposite(), Orientation::Horizontal);
    }

    #[test]
    fn align_offsets() {
        assert_eq!(Align::Fill.offset(10), 0);
        assert_eq!(Align::Start.offset(10), 0);
        assert_eq!(Align::Center.offset(11), 5);
        assert_eq!(Align::End.offset(10), 10);
    }

    #[test]
    fn size_request_gap_clamps() {
        assert_eq!(SizeRequest::new(5, 9).gap(), 4);
        assert_eq!(SizeRequest::new(9, 5).gap(), 0);
        assert_eq!(
            SizeRequest::new(1, 9).max(SizeRequest::new(4, 2)),
            SizeRequest::new(4, 9)
        );
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&TextDirection::Rtl).unwrap(),
            "\"rtl\""
        );
        assert_eq!(
            serde_json::from_str::<Orientation>("\"vertical\"").unwrap(),
            Orientation::Vertical
        );
    }
}
