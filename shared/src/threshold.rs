//! Threshold rules and color evaluation

use serde::{Deserialize, Serialize};

use crate::models::{DataSource, WeatherReading};
use crate::types::DEFAULT_COLOR;

/// Comparison operator of a threshold rule
///
/// Strings that are not one of the five supported symbols are kept verbatim
/// as [`Operator::Unsupported`] so a settings round-trip never loses them;
/// such rules simply never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    Equal,
    Unsupported(String),
}

impl Operator {
    /// All supported operators in display order
    pub const SUPPORTED: [Operator; 5] = [
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::LessOrEqual,
        Operator::GreaterOrEqual,
        Operator::Equal,
    ];

    pub fn symbol(&self) -> &str {
        match self {
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
            Operator::Equal => "=",
            Operator::Unsupported(raw) => raw,
        }
    }

    /// Label shown in the operator picker
    pub fn label(&self) -> String {
        match self {
            Operator::LessThan => "< (less than)".to_string(),
            Operator::GreaterThan => "> (greater than)".to_string(),
            Operator::LessOrEqual => "≤ (less or equal)".to_string(),
            Operator::GreaterOrEqual => "≥ (greater or equal)".to_string(),
            Operator::Equal => "= (equal to)".to_string(),
            Operator::Unsupported(raw) => format!("{} (unsupported)", raw),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Operator::Unsupported(_))
    }
}

impl From<&str> for Operator {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "<" => Operator::LessThan,
            ">" => Operator::GreaterThan,
            "<=" => Operator::LessOrEqual,
            ">=" => Operator::GreaterOrEqual,
            "=" => Operator::Equal,
            _ => Operator::Unsupported(raw.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        Operator::from(raw.as_str())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.symbol().to_string()
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Evaluate `value <operator> threshold`. Unsupported operators never match.
pub fn matches(value: f64, operator: &Operator, threshold: f64) -> bool {
    match operator {
        Operator::LessThan => value < threshold,
        Operator::GreaterThan => value > threshold,
        Operator::LessOrEqual => value <= threshold,
        Operator::GreaterOrEqual => value >= threshold,
        Operator::Equal => value == threshold,
        Operator::Unsupported(_) => false,
    }
}

/// Human-readable rule, e.g. `< 10`
pub fn format_threshold(operator: &Operator, value: f64) -> String {
    format!("{} {}", operator, value)
}

/// Color of a polygon given its reading and bound data source.
///
/// Falls back to [`DEFAULT_COLOR`] whenever the reading, the data source or
/// the data source's field is missing, and when the rule does not match.
pub fn color_for(reading: Option<&WeatherReading>, data_source: Option<&DataSource>) -> String {
    let (Some(reading), Some(data_source)) = (reading, data_source) else {
        return DEFAULT_COLOR.to_string();
    };

    match reading.get(&data_source.field) {
        Some(value) if matches(value, &data_source.operator, data_source.value) => {
            data_source.color.clone()
        }
        _ => DEFAULT_COLOR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rule(operator: &str, value: f64, color: &str) -> DataSource {
        DataSource {
            id: "temperature".to_string(),
            name: "Temperature".to_string(),
            field: "temperature_2m".to_string(),
            color: color.to_string(),
            operator: Operator::from(operator),
            value,
            active: true,
        }
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!(Operator::from("<"), Operator::LessThan);
        assert_eq!(Operator::from(">="), Operator::GreaterOrEqual);
        assert_eq!(Operator::from("="), Operator::Equal);
        assert_eq!(
            Operator::from("!="),
            Operator::Unsupported("!=".to_string())
        );
    }

    #[test]
    fn test_operator_serde() {
        let json = serde_json::to_string(&Operator::LessOrEqual).unwrap();
        assert_eq!(json, "\"<=\"");

        let op: Operator = serde_json::from_str("\"~\"").unwrap();
        assert!(!op.is_supported());
        assert_eq!(serde_json::to_string(&op).unwrap(), "\"~\"");
    }

    #[test]
    fn test_matches_boundaries() {
        assert!(matches(9.0, &Operator::LessThan, 10.0));
        assert!(!matches(10.0, &Operator::LessThan, 10.0));
        assert!(matches(10.0, &Operator::LessOrEqual, 10.0));
        assert!(matches(10.0, &Operator::GreaterOrEqual, 10.0));
        assert!(!matches(10.0, &Operator::GreaterThan, 10.0));
        assert!(matches(10.0, &Operator::Equal, 10.0));
        assert!(!matches(10.000001, &Operator::Equal, 10.0));
    }

    #[test]
    fn test_cold_rule_colors() {
        let ds = rule("<", 10.0, "#ef4444");

        let cold = WeatherReading::from_pairs([("temperature_2m", 5.0)]);
        assert_eq!(color_for(Some(&cold), Some(&ds)), "#ef4444");

        let warm = WeatherReading::from_pairs([("temperature_2m", 15.0)]);
        assert_eq!(color_for(Some(&warm), Some(&ds)), DEFAULT_COLOR);
    }

    #[test]
    fn test_missing_inputs_use_default_color() {
        let ds = rule("<", 10.0, "#ef4444");
        let reading = WeatherReading::from_pairs([("precipitation", 0.0)]);

        assert_eq!(color_for(None, Some(&ds)), DEFAULT_COLOR);
        assert_eq!(color_for(Some(&reading), None), DEFAULT_COLOR);
        assert_eq!(color_for(Some(&reading), Some(&ds)), DEFAULT_COLOR);
    }

    #[test]
    fn test_unsupported_operator_never_colors() {
        let ds = rule("<>", 10.0, "#ef4444");
        let reading = WeatherReading::from_pairs([("temperature_2m", 5.0)]);
        assert_eq!(color_for(Some(&reading), Some(&ds)), DEFAULT_COLOR);
    }

    #[test]
    fn test_format_threshold() {
        assert_eq!(format_threshold(&Operator::LessThan, 10.0), "< 10");
        assert_eq!(format_threshold(&Operator::GreaterOrEqual, 2.5), ">= 2.5");
    }

    fn finite() -> impl Strategy<Value = f64> {
        -1.0e6f64..1.0e6
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_matches_agrees_with_comparison(value in finite(), threshold in finite()) {
            prop_assert_eq!(matches(value, &Operator::LessThan, threshold), value < threshold);
            prop_assert_eq!(matches(value, &Operator::GreaterThan, threshold), value > threshold);
            prop_assert_eq!(matches(value, &Operator::LessOrEqual, threshold), value <= threshold);
            prop_assert_eq!(matches(value, &Operator::GreaterOrEqual, threshold), value >= threshold);
            prop_assert_eq!(matches(value, &Operator::Equal, threshold), value == threshold);
        }

        #[test]
        fn prop_unknown_operator_is_false(
            value in finite(),
            threshold in finite(),
            raw in "[a-z!~]{1,3}"
        ) {
            prop_assert!(!matches(value, &Operator::from(raw.as_str()), threshold));
        }

        #[test]
        fn prop_absent_field_is_default(value in finite(), threshold in finite()) {
            let ds = rule("<", threshold, "#22c55e");
            let reading = WeatherReading::from_pairs([("wind_speed_10m", value)]);
            prop_assert_eq!(color_for(Some(&reading), Some(&ds)), DEFAULT_COLOR);
            prop_assert_eq!(color_for(None, Some(&ds)), DEFAULT_COLOR);
        }
    }
}
