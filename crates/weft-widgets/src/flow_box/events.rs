#![forbid(unsafe_code)]

//! Typed notifications from a flow box to its collaborators.
//!
//! Listeners are registered with [`FlowBox::connect`](super::FlowBox::connect)
//! and receive every [`FlowBoxEvent`] in emission order. Listeners are plain
//! `Fn` closures; use `Cell`/`RefCell` captures to accumulate state.
//!
//! # Invariants
//!
//! - At most one `SelectionChanged` is emitted per public call, however many
//!   children changed.

use std::rc::Rc;

use super::child::FocusDirection;
use super::children::ChildId;

/// Something observable happened inside a flow box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowBoxEvent {
    /// The set of selected children changed.
    SelectionChanged,
    /// The cursor (keyboard focus anchor) moved. `None` when the cursor child
    /// was removed.
    CursorChanged(Option<ChildId>),
    /// A child was activated (click, double click, Enter/Space).
    ChildActivated(ChildId),
    /// Keyboard navigation found no target in `direction`.
    KeynavFailed(FocusDirection),
    /// Structure or configuration changed; the host should measure and
    /// allocate again.
    ResizeQueued,
    /// Visual state (rubberband, pressed child) changed; the host should
    /// repaint.
    RedrawRequested,
}

/// Handle returned by [`FlowBox::connect`](super::FlowBox::connect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&FlowBoxEvent)>;

#[derive(Default)]
pub(crate) struct Emitter {
    next: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Emitter {
    pub(crate) fn connect(&mut self, listener: impl Fn(&FlowBoxEvent) + 'static) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.listeners.push((id, Rc::new(listener)));
        id
    }

    pub(crate) fn disconnect(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub(crate) fn emit(&self, event: FlowBoxEvent) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot: Vec<Listener> = self.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in &snapshot {
            listener(&event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn listeners_see_events_in_order_until_disconnected() {
        let mut emitter = Emitter::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = emitter.connect(move |e| sink.borrow_mut().push(*e));

        emitter.emit(FlowBoxEvent::ResizeQueued);
        emitter.emit(FlowBoxEvent::SelectionChanged);
        assert!(emitter.disconnect(id));
        assert!(!emitter.disconnect(id));
        emitter.emit(FlowBoxEvent::RedrawRequested);

        assert_eq!(
            *seen.borrow(),
            [FlowBoxEvent::ResizeQueued, FlowBoxEvent::SelectionChanged]
        );
        assert_eq!(emitter.len(), 0);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut emitter = Emitter::default();
        let a = emitter.connect(|_| {});
        emitter.disconnect(a);
        let b = emitter.connect(|_| {});
        assert_ne!(a, b);
    }
}
