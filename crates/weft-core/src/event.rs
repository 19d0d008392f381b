#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! This module defines the input events widgets receive from the host
//! toolkit. All events derive `Clone` and `PartialEq` for use in tests and
//! pattern matching.
//!
//! # Design Notes
//!
//! - Pointer coordinates are fractional and relative to the receiving widget
//! - `KeyEventKind` defaults to `Press` when not available from the host
//! - `Modifiers` use bitflags for easy combination

use bitflags::bitflags;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A pointer event.
    Mouse(MouseEvent),

    /// Focus gained or lost.
    ///
    /// `true` = focus gained, `false` = focus lost.
    Focus(bool),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Space bar.
    Space,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b00;
        /// Shift key: extend a selection.
        const SHIFT = 0b01;
        /// Control key: modify a selection.
        const CTRL  = 0b10;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Where a pointer event originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerSource {
    /// Mouse, trackpad, or pen.
    #[default]
    Mouse,
    /// Touchscreen contact.
    Touchscreen,
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// The type of pointer event.
    pub kind: MouseEventKind,

    /// X coordinate relative to the receiving widget.
    pub x: f64,

    /// Y coordinate relative to the receiving widget.
    pub y: f64,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// Press count for `Down` events (1 = single, 2 = double click).
    pub click_count: u8,

    /// Device the event came from.
    pub source: PointerSource,
}

impl MouseEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
            click_count: 1,
            source: PointerSource::Mouse,
        }
    }

    /// Create a pointer event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the press count.
    #[must_use]
    pub const fn with_click_count(mut self, count: u8) -> Self {
        self.click_count = count;
        self
    }

    /// Set the originating device.
    #[must_use]
    pub const fn with_source(mut self, source: PointerSource) -> Self {
        self.source = source;
        self
    }

}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// Button pressed down.
    Down(MouseButton),

    /// Button released.
    Up(MouseButton),

    /// Pointer moved while button held.
    Drag(MouseButton),
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) button. Other buttons are not reported.
    Left,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_modifier_helpers() {
        let key = KeyEvent::new(KeyCode::Char('a')).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(key.ctrl());
        assert!(key.shift());
        assert_eq!(key.code, KeyCode::Char('a'));
        assert_eq!(key.kind, KeyEventKind::Press);
        let held = KeyEvent::new(KeyCode::Down).with_kind(KeyEventKind::Repeat);
        assert!(!held.ctrl());
        assert_eq!(held.kind, KeyEventKind::Repeat);
    }

    #[test]
    fn mouse_event_defaults_to_single_mouse_click() {
        let ev = MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 3.5, 4.0);
        assert_eq!(ev.click_count, 1);
        assert_eq!(ev.source, PointerSource::Mouse);
        assert_eq!((ev.x, ev.y), (3.5, 4.0));
    }

    #[test]
    fn modifiers_default_is_none() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
        assert!(Modifiers::default().is_empty());
    }
}
