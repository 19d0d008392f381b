#![forbid(unsafe_code)]

//! Container widgets for Weft.
//!
//! The crate currently holds one container, [`FlowBox`], which wraps an
//! ordered set of children into rows or columns and adds selection, keyboard
//! navigation and rubberband selection on top of the flow layout from
//! `weft-layout`.

pub mod flow_box;

pub use flow_box::{
    AutoscrollConfig, AutoscrollMode, ChildId, FilterFunc, FlowBox, FlowBoxEvent, FlowChild,
    FocusDirection, InsertPosition, ItemsChanged, ListModel, MovementStep, SelectionMode,
    SortFunc, SubscriptionId, VecModel,
};
