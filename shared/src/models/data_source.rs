//! Data source models

use serde::{Deserialize, Serialize};

use crate::threshold::{format_threshold, Operator};

/// A named weather field with a threshold rule and display color
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub name: String,
    /// Weather measurement key, e.g. `temperature_2m`
    pub field: String,
    /// Hex color used when the rule matches
    pub color: String,
    pub operator: Operator,
    pub value: f64,
    /// Stored but not consulted by color evaluation
    pub active: bool,
}

impl DataSource {
    /// The entry every new registry starts with: temperatures below 10 in red
    pub fn default_temperature() -> Self {
        Self {
            id: "temperature".to_string(),
            name: "Temperature".to_string(),
            field: "temperature_2m".to_string(),
            color: "#ef4444".to_string(),
            operator: Operator::LessThan,
            value: 10.0,
            active: true,
        }
    }

    /// Rule text shown beside the source, e.g. `< 10`
    pub fn threshold_label(&self) -> String {
        format_threshold(&self.operator, self.value)
    }
}

/// Input for adding a data source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDataSource {
    pub name: String,
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_operator")]
    pub operator: Operator,
    #[serde(default = "default_value")]
    pub value: f64,
}

impl NewDataSource {
    /// A new source with the settings panel's defaults (`temperature_2m < 10`, blue)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: default_field(),
            color: default_color(),
            operator: default_operator(),
            value: default_value(),
        }
    }
}

fn default_field() -> String {
    "temperature_2m".to_string()
}

fn default_color() -> String {
    "#3b82f6".to_string()
}

fn default_operator() -> Operator {
    Operator::LessThan
}

fn default_value() -> f64 {
    10.0
}

/// Partial update of a data source; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourcePatch {
    pub name: Option<String>,
    pub field: Option<String>,
    pub color: Option<String>,
    pub operator: Option<Operator>,
    pub value: Option<f64>,
    pub active: Option<bool>,
}

impl DataSourcePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.field.is_none()
            && self.color.is_none()
            && self.operator.is_none()
            && self.value.is_none()
            && self.active.is_none()
    }

    /// Whether applying this patch can change polygon colors
    pub fn affects_colors(&self) -> bool {
        self.field.is_some() || self.color.is_some() || self.operator.is_some() || self.value.is_some()
    }
}
