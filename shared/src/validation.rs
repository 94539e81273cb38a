//! Validation utilities for dashboard settings

use crate::types::available_field_names;

// ============================================================================
// Data Source Validations
// ============================================================================

/// Validate a data source display name (non-blank after trimming)
pub fn validate_data_source_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Data source name must not be empty");
    }
    if name.trim().chars().count() > 80 {
        return Err("Data source name must be at most 80 characters");
    }
    Ok(())
}

/// Validate hex color format (`#rrggbb`)
pub fn validate_hex_color(color: &str) -> Result<(), &'static str> {
    let Some(hex) = color.strip_prefix('#') else {
        return Err("Color must start with '#'");
    };
    if hex.len() != 6 {
        return Err("Color must have 6 hex digits");
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Color must contain only hex digits");
    }
    Ok(())
}

/// Validate that a field is one the weather service can deliver
pub fn validate_field_name(field: &str) -> Result<(), &'static str> {
    if available_field_names().any(|f| f == field) {
        Ok(())
    } else {
        Err("Unknown weather field")
    }
}

/// Validate a threshold value
pub fn validate_threshold_value(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        return Err("Threshold value must be a finite number");
    }
    Ok(())
}
