#![cfg(feature = "tracing")]
//! Structured log events emitted by the flow box.

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use weft_layout::{Orientation, SizeRequest};
use weft_widgets::{FlowBox, FlowChild, SelectionMode, VecModel};

struct Dot;

impl FlowChild for Dot {
    fn measure(&self, _orientation: Orientation, _for_size: Option<i32>) -> SizeRequest {
        SizeRequest::fixed(8)
    }
}

#[derive(Debug, Default)]
struct FlowTraceState {
    selection_events: usize,
    selection_actions: Vec<String>,
    cursor_events: usize,
    warnings: usize,
}

struct FlowTraceCapture {
    state: Arc<Mutex<FlowTraceState>>,
}

impl<S> Layer<S> for FlowTraceCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        #[derive(Default)]
        struct FieldVisitor {
            message: Option<String>,
            action: Option<String>,
        }
        impl tracing::field::Visit for FieldVisitor {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                match field.name() {
                    "message" => self.message = Some(value.to_owned()),
                    "action" => self.action = Some(value.to_owned()),
                    _ => {}
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                let text = format!("{value:?}").trim_matches('"').to_owned();
                match field.name() {
                    "message" => self.message = Some(text),
                    "action" => self.action = Some(text),
                    _ => {}
                }
            }
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let mut state = self.state.lock().expect("flow trace state lock");
        if *event.metadata().level() == tracing::Level::WARN {
            state.warnings += 1;
        }
        match visitor.message.as_deref() {
            Some("flow_box.selection") => {
                state.selection_events += 1;
                if let Some(action) = visitor.action {
                    state.selection_actions.push(action);
                }
            }
            Some("flow_box.cursor") => state.cursor_events += 1,
            _ => {}
        }
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, FlowTraceState) {
    let state = Arc::new(Mutex::new(FlowTraceState::default()));
    let subscriber = tracing_subscriber::registry().with(FlowTraceCapture {
        state: Arc::clone(&state),
    });
    let out = {
        let _guard = tracing::subscriber::set_default(subscriber);
        tracing::callsite::rebuild_interest_cache();
        f()
    };
    let state = std::mem::take(&mut *state.lock().expect("flow trace state lock"));
    (out, state)
}

#[test]
fn selection_changes_are_logged_once_per_call() {
    let ((), state) = capture(|| {
        let mut fb = FlowBox::new();
        let ids: Vec<_> = (0..4).map(|_| fb.append(Dot)).collect();
        fb.set_selection_mode(SelectionMode::Multiple);
        fb.select_all();
        fb.select_all();
        fb.update_selection(ids[1], false, false);
        fb.unselect_all();
    });

    assert_eq!(state.selection_events, 3);
    assert_eq!(state.selection_actions, ["select_all", "update", "unselect_all"]);
    assert_eq!(state.cursor_events, 1);
}

#[test]
fn sort_with_bound_model_warns() {
    let ((), state) = capture(|| {
        let mut fb = FlowBox::new();
        fb.bind_model(Rc::new(VecModel::new(vec![1, 2, 3])), |_| Dot);
        fb.set_filter_func(|_: &Dot| false);
        fb.model_items_changed(7, 1, 0);
        assert_eq!(fb.len(), 3);
    });

    assert_eq!(state.warnings, 2);
}
