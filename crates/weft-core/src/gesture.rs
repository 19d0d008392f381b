#![forbid(unsafe_code)]

//! Drag recognition: turns raw pointer events into drag phases.
//!
//! [`DragTracker`] follows a single primary-button sequence from press to
//! release and reports offsets relative to the press point. A drag only
//! *starts* once the pointer has travelled farther than
//! [`DragConfig::start_distance`] (Euclidean, strict) from the press point.
//!
//! # State Machine
//!
//! ```text
//! Idle ──press──▶ Pending ──move beyond threshold──▶ Active
//!   ▲                │                                  │
//!   └────release─────┴──────release / Escape / deny─────┘
//! ```
//!
//! # Invariants
//!
//! 1. `Start` is emitted at most once per sequence, and always before the
//!    first `Update` that reports the same offset.
//! 2. `End` reports `started == true` iff a `Start` was emitted for the
//!    sequence.
//! 3. `Cancel` is only emitted for active drags; a pending sequence that is
//!    cancelled returns to `Idle` silently.
//! 4. Only the first press of a multi-press sequence begins tracking.
//!
//! # Failure Modes
//!
//! - A `Drag` event without a prior press is ignored; no synthetic press is
//!   invented.

use crate::event::{Event, KeyCode, KeyEventKind, Modifiers, MouseButton, MouseEventKind};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for drag recognition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    /// Distance the pointer must travel (strictly more than) before the drag
    /// starts (default: 32.0).
    pub start_distance: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            start_distance: 32.0,
        }
    }
}

/// Drag phase reported by [`DragTracker::process`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    /// Primary button pressed; a drag may follow.
    Begin {
        x: f64,
        y: f64,
        /// Modifiers held at press time.
        modifiers: Modifiers,
    },
    /// The pointer crossed the start threshold.
    Start { start_x: f64, start_y: f64 },
    /// Pointer moved while the button is held.
    Update { offset_x: f64, offset_y: f64 },
    /// Button released.
    End {
        offset_x: f64,
        offset_y: f64,
        started: bool,
    },
    /// An active drag was aborted.
    Cancel,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Sequence {
    start_x: f64,
    start_y: f64,
    last_offset: (f64, f64),
    started: bool,
}

// ---------------------------------------------------------------------------
// DragTracker
// ---------------------------------------------------------------------------

/// Stateful drag recognizer for the primary button.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    config: DragConfig,
    sequence: Option<Sequence>,
}

impl DragTracker {
    /// Create a tracker with the given configuration.
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            sequence: None,
        }
    }

    /// Process a raw event, returning the drag phases it produced.
    pub fn process(&mut self, event: &Event) -> Vec<DragEvent> {
        let mut out = Vec::with_capacity(2);
        match event {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    if mouse.click_count != 1 {
                        self.cancel(&mut out);
                        return out;
                    }
                    self.sequence = Some(Sequence {
                        start_x: mouse.x,
                        start_y: mouse.y,
                        last_offset: (0.0, 0.0),
                        started: false,
                    });
                    out.push(DragEvent::Begin {
                        x: mouse.x,
                        y: mouse.y,
                        modifiers: mouse.modifiers,
                    });
                }
                MouseEventKind::Drag(MouseButton::Left) => {
                    self.on_motion(mouse.x, mouse.y, &mut out);
                }
                MouseEventKind::Up(MouseButton::Left) => {
                    if let Some(seq) = self.sequence.take() {
                        out.push(DragEvent::End {
                            offset_x: mouse.x - seq.start_x,
                            offset_y: mouse.y - seq.start_y,
                            started: seq.started,
                        });
                    }
                }
            },
            Event::Key(key) => {
                if key.code == KeyCode::Escape && key.kind != KeyEventKind::Release {
                    self.cancel(&mut out);
                }
            }
            Event::Focus(false) => self.cancel(&mut out),
            Event::Focus(true) => {}
        }
        out
    }

    /// Drop the current sequence. Emits `Cancel` if the drag was active.
    pub fn deny(&mut self) -> Option<DragEvent> {
        let mut out = Vec::new();
        self.cancel(&mut out);
        out.pop()
    }

    /// Whether a drag has started in the current sequence.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.sequence.is_some_and(|s| s.started)
    }

    /// Press point of the current sequence, if any.
    #[must_use]
    pub fn start_point(&self) -> Option<(f64, f64)> {
        self.sequence.map(|s| (s.start_x, s.start_y))
    }

    /// Current pointer position (press point plus last offset), if tracking.
    #[must_use]
    pub fn current_point(&self) -> Option<(f64, f64)> {
        self.sequence
            .map(|s| (s.start_x + s.last_offset.0, s.start_y + s.last_offset.1))
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    fn on_motion(&mut self, x: f64, y: f64, out: &mut Vec<DragEvent>) {
        let threshold = self.config.start_distance;
        let Some(seq) = self.sequence.as_mut() else {
            return;
        };
        let offset_x = x - seq.start_x;
        let offset_y = y - seq.start_y;
        seq.last_offset = (offset_x, offset_y);

        if !seq.started && offset_x * offset_x + offset_y * offset_y > threshold * threshold {
            seq.started = true;
            out.push(DragEvent::Start {
                start_x: seq.start_x,
                start_y: seq.start_y,
            });
        }
        out.push(DragEvent::Update { offset_x, offset_y });
    }

    fn cancel(&mut self, out: &mut Vec<DragEvent>) {
        if let Some(seq) = self.sequence.take()
            && seq.started
        {
            out.push(DragEvent::Cancel);
        }
    }
}
