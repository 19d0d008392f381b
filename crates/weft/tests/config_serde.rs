//! Serialized form of the configuration types.
//!
//! The dev-dependency on `weft-widgets` turns its `serde` feature on, so this
//! suite runs under a plain `cargo test`.

use weft::{AutoscrollConfig, AutoscrollMode, FlowConfig, Orientation, SelectionMode};

#[test]
fn selection_mode_uses_snake_case() {
    let json = serde_json::to_string(&SelectionMode::Multiple).expect("serialize");
    assert_eq!(json, "\"multiple\"");
    let mode: SelectionMode = serde_json::from_str("\"browse\"").expect("deserialize");
    assert_eq!(mode, SelectionMode::Browse);
    let mode: AutoscrollMode = serde_json::from_str("\"page_backward\"").expect("deserialize");
    assert_eq!(mode, AutoscrollMode::PageBackward);
}

#[test]
fn autoscroll_config_fills_missing_fields_with_defaults() {
    let config: AutoscrollConfig =
        serde_json::from_str(r#"{ "fast_distance": 48 }"#).expect("deserialize");
    assert_eq!(config.fast_distance, 48);
    assert_eq!(config.step_divisor, AutoscrollConfig::default().step_divisor);
    assert_eq!(config.page_divisor, 10.0);
}

#[test]
fn flow_config_round_trips_with_widget_settings() {
    let flow = FlowConfig::default()
        .orientation(Orientation::Vertical)
        .max_children_per_line(3);
    let json = serde_json::to_string(&flow).expect("serialize");
    let back: FlowConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, flow);
    assert!(back.validate().is_ok());
}
