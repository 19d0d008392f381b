#![forbid(unsafe_code)]

//! Weft public facade crate.
//!
//! Re-exports the flow box and the types needed to drive it, plus a prelude
//! for day-to-day usage.
//!
//! ```
//! use weft::prelude::*;
//!
//! struct Tile;
//!
//! impl FlowChild for Tile {
//!     fn measure(&self, _: Orientation, _: Option<i32>) -> SizeRequest {
//!         SizeRequest::fixed(32)
//!     }
//! }
//!
//! let mut flow_box = FlowBox::with_config(FlowConfig::default().max_children_per_line(4))?;
//! for _ in 0..10 {
//!     flow_box.append(Tile);
//! }
//! flow_box.size_allocate(128, 96);
//! assert_eq!(flow_box.children_per_line(), 4);
//! # Ok::<(), weft::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use weft_core::adjustment::{Adjustment, ScrollAdjustment};
pub use weft_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
    PointerSource,
};
pub use weft_core::frame_clock::{FrameClock, ManualFrameClock, TickToken};
pub use weft_core::geometry::{Rect, Size};
pub use weft_core::gesture::DragConfig;

// --- Layout re-exports -----------------------------------------------------

pub use weft_layout::{
    Align, FlowAllocation, FlowConfig, FlowConfigError, FlowItems, Orientation, SizeRequest,
    TextDirection,
};

// --- Widget re-exports -----------------------------------------------------

pub use weft_widgets::{
    AutoscrollConfig, AutoscrollMode, ChildId, FlowBox, FlowBoxEvent, FlowChild, FocusDirection,
    InsertPosition, ItemsChanged, ListModel, MovementStep, SelectionMode, SubscriptionId,
    VecModel,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for weft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A flow configuration failed validation.
    Config(FlowConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid flow configuration: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
        }
    }
}

impl From<FlowConfigError> for Error {
    fn from(err: FlowConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for weft APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Common imports for building with a flow box.
pub mod prelude {
    pub use crate::{
        Align, ChildId, Error, Event, FlowBox, FlowBoxEvent, FlowChild, FlowConfig, KeyCode,
        KeyEvent, Modifiers, MouseEvent, Orientation, Rect, Result, SelectionMode, SizeRequest,
    };

    pub use crate::{core, layout, widgets};
}

pub use weft_core as core;
pub use weft_layout as layout;
pub use weft_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_errors_convert_and_keep_source() {
        fn build() -> Result<FlowBox<Unit>> {
            Ok(FlowBox::with_config(FlowConfig::default().max_children_per_line(0))?)
        }

        struct Unit;
        impl FlowChild for Unit {
            fn measure(&self, _: Orientation, _: Option<i32>) -> SizeRequest {
                SizeRequest::ZERO
            }
        }

        let err = build().err().expect("zero max children must be rejected");
        assert_eq!(err, Error::Config(FlowConfigError::ZeroMaxChildrenPerLine));
        assert!(err.to_string().contains("max_children_per_line"));
        assert!(err.source().is_some());
    }
}
