#![forbid(unsafe_code)]

//! Core: geometry, input events, and the host capabilities widgets lean on.
//!
//! # Role in Weft
//! `weft-core` is the leaf crate. It owns the vocabulary every other crate
//! speaks: integer rectangles in device-independent units, canonical key and
//! pointer events, and the small capability traits a host toolkit implements
//! so widgets can scroll and animate without knowing the backend.
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::Rect`] and [`geometry::Size`] for allocation and
//!   hit testing.
//! - **Event**: canonical input events (keys, pointer, focus).
//! - **DragTracker**: press → pending → active drag recognition with a
//!   distance threshold and Escape cancellation.
//! - **ScrollAdjustment**: the value/step/page contract of a scrollable axis.
//! - **FrameClock**: per-frame tick registration with explicit cancellation.
//!
//! # How it fits in the system
//! `weft-layout` computes rectangles in [`geometry::Rect`]; `weft-widgets`
//! consumes events from here and drives adjustments through the frame clock.

pub mod adjustment;
pub mod event;
pub mod frame_clock;
pub mod geometry;
pub mod gesture;
