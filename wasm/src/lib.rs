//! WebAssembly module for the Weather Polygon Dashboard
//!
//! Provides client-side computation for:
//! - Closing a drawn ring and computing its centroid
//! - Threshold evaluation and polygon coloring
//! - Data source form validation

use serde::Serialize;
use shared::{DataSource, Operator, Vertex, WeatherReading};
use wasm_bindgen::prelude::*;

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error("Serialization failed", e))
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("weather-dashboard-wasm loaded"));
}

/// Close a finished drawing, returning the ring as JSON
#[wasm_bindgen]
pub fn close_drawing(points_json: &str) -> Result<String, JsValue> {
    let points: Vec<Vertex> =
        serde_json::from_str(points_json).map_err(|e| js_error("Invalid points JSON", e))?;
    let ring = shared::close_ring(&points).map_err(|e| js_error("Invalid drawing", e))?;
    to_json(&ring)
}

/// Centroid of a ring as `[longitude, latitude]` JSON
#[wasm_bindgen]
pub fn polygon_centroid(ring_json: &str) -> Result<String, JsValue> {
    let ring: Vec<Vertex> =
        serde_json::from_str(ring_json).map_err(|e| js_error("Invalid ring JSON", e))?;
    let center = shared::centroid(&ring).map_err(|e| js_error("Invalid ring", e))?;
    to_json(&[center.longitude, center.latitude])
}

/// Evaluate `value <operator> threshold`; unknown operators never match
#[wasm_bindgen]
pub fn threshold_matches(value: f64, operator: &str, threshold: f64) -> bool {
    shared::matches(value, &Operator::from(operator), threshold)
}

/// Fill color for a reading under a data source rule.
///
/// `reading_json` may be `null` for polygons that have not been fetched yet.
#[wasm_bindgen]
pub fn polygon_color(reading_json: &str, data_source_json: &str) -> Result<String, JsValue> {
    let reading: Option<WeatherReading> =
        serde_json::from_str(reading_json).map_err(|e| js_error("Invalid reading JSON", e))?;
    let data_source: DataSource = serde_json::from_str(data_source_json)
        .map_err(|e| js_error("Invalid data source JSON", e))?;
    Ok(shared::color_for(reading.as_ref(), Some(&data_source)))
}

/// Human-readable rule, e.g. `< 10`
#[wasm_bindgen]
pub fn format_threshold(operator: &str, value: f64) -> String {
    shared::format_threshold(&Operator::from(operator), value)
}

/// Validate a data source name; returns the error message, or `undefined` when valid
#[wasm_bindgen]
pub fn validate_data_source_name(name: &str) -> Option<String> {
    shared::validate_data_source_name(name)
        .err()
        .map(str::to_string)
}

/// Validate a `#rrggbb` color
#[wasm_bindgen]
pub fn is_valid_color(color: &str) -> bool {
    shared::validate_hex_color(color).is_ok()
}

/// Weather fields a data source may watch, as `[name, label]` pairs
#[wasm_bindgen]
pub fn available_fields() -> js_sys::Array {
    shared::AVAILABLE_FIELDS
        .iter()
        .map(|(name, label)| {
            let pair = js_sys::Array::new();
            pair.push(&JsValue::from_str(name));
            pair.push(&JsValue::from_str(label));
            JsValue::from(pair)
        })
        .collect()
}
