//! Grading standards and raw grain measurements.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A grading definition from the standards catalog.
///
/// Top-level catalog entries are selected by `name`. Their `standard_data`
/// children are the sub-criteria that get scored against a grain batch;
/// each child is evaluated independently against the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standard {
    pub id: i64,
    #[serde(default)]
    pub key: String,
    pub name: String,
    /// Grain shapes the criterion applies to. Carried, not enforced.
    #[serde(default)]
    pub shape: Vec<String>,
    /// Absent bounds are kept so that only the grading that hits them fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<f64>,
    /// `"GT"` for a strict lower bound, anything else is inclusive.
    #[serde(default)]
    pub condition_min: String,
    /// `"LT"` for a strict upper bound, anything else is inclusive.
    #[serde(default)]
    pub condition_max: String,
    /// Compliance percentage, 0 until scored.
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub standard_data: Vec<Standard>,
}

/// A scored copy of one sub-criterion: the catalog node with `value` filled in.
pub type ScoredCriterion = Standard;

/// How a grain length is compared against `minLength`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowerBound {
    /// `length > minLength`
    Exclusive,
    /// `length >= minLength`
    Inclusive,
}

/// How a grain length is compared against `maxLength`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperBound {
    /// `length < maxLength`
    Exclusive,
    /// `length <= maxLength`
    Inclusive,
}

impl LowerBound {
    pub fn parse(condition: &str) -> Self {
        if condition == "GT" {
            Self::Exclusive
        } else {
            Self::Inclusive
        }
    }

    pub fn admits(self, length: f64, min: f64) -> bool {
        match self {
            Self::Exclusive => length > min,
            Self::Inclusive => length >= min,
        }
    }
}

impl UpperBound {
    pub fn parse(condition: &str) -> Self {
        if condition == "LT" {
            Self::Exclusive
        } else {
            Self::Inclusive
        }
    }

    pub fn admits(self, length: f64, max: f64) -> bool {
        match self {
            Self::Exclusive => length < max,
            Self::Inclusive => length <= max,
        }
    }
}

impl Standard {
    pub fn lower_bound(&self) -> LowerBound {
        LowerBound::parse(&self.condition_min)
    }

    pub fn upper_bound(&self) -> UpperBound {
        UpperBound::parse(&self.condition_max)
    }

    /// Whether a grain of the given length falls inside `[min, max]` under
    /// this criterion's comparison modes.
    pub fn admits(&self, length: f64, min: f64, max: f64) -> bool {
        self.lower_bound().admits(length, min) && self.upper_bound().admits(length, max)
    }
}

/// A grain length as submitted: a number, or whatever else the client sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measurement {
    Value(f64),
    Invalid(Value),
}

/// One raw grain measurement as submitted in an inspection batch.
///
/// Only `length` takes part in scoring. It is optional and accepts any JSON
/// value so that a missing or non-numeric length reaches the scorer and is
/// rejected there instead of failing the whole request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grain {
    #[serde(default)]
    pub length: Option<Measurement>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub shape: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl Grain {
    pub fn with_length(length: f64) -> Self {
        Self {
            length: Some(Measurement::Value(length)),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_json_uses_camel_case() {
        let json = r#"{
            "id": 1,
            "key": "wholegrain",
            "name": "Whole Grain",
            "shape": ["wholegrain", "broken"],
            "minLength": 7,
            "maxLength": 99,
            "conditionMin": "GT",
            "conditionMax": "LT"
        }"#;
        let std: Standard = serde_json::from_str(json).unwrap();
        assert_eq!(std.min_length, Some(7.0));
        assert_eq!(std.max_length, Some(99.0));
        assert_eq!(std.value, 0.0);
        assert!(std.standard_data.is_empty());
        assert_eq!(std.lower_bound(), LowerBound::Exclusive);
        assert_eq!(std.upper_bound(), UpperBound::Exclusive);

        let back = serde_json::to_value(&std).unwrap();
        assert_eq!(back["conditionMin"], "GT");
        assert!(back.get("standardData").is_some());
    }

    #[test]
    fn unknown_conditions_are_inclusive() {
        assert_eq!(LowerBound::parse("GTE"), LowerBound::Inclusive);
        assert_eq!(LowerBound::parse(""), LowerBound::Inclusive);
        assert_eq!(LowerBound::parse("gt"), LowerBound::Inclusive);
        assert_eq!(UpperBound::parse("LTE"), UpperBound::Inclusive);
        assert_eq!(UpperBound::parse("LT"), UpperBound::Exclusive);
    }

    #[test]
    fn bound_edges() {
        assert!(UpperBound::Inclusive.admits(10.0, 10.0));
        assert!(!UpperBound::Exclusive.admits(10.0, 10.0));
        assert!(LowerBound::Inclusive.admits(5.0, 5.0));
        assert!(!LowerBound::Exclusive.admits(5.0, 5.0));
    }

    #[test]
    fn grain_type_field_renamed() {
        let g: Grain =
            serde_json::from_str(r#"{"length": 6.5, "weight": 0.02, "shape": "wholegrain", "type": "white"}"#)
                .unwrap();
        assert_eq!(g.length, Some(Measurement::Value(6.5)));
        assert_eq!(g.kind, "white");

        let missing: Grain = serde_json::from_str(r#"{"shape": "broken"}"#).unwrap();
        assert!(missing.length.is_none());
        let null: Grain = serde_json::from_str(r#"{"length": null}"#).unwrap();
        assert!(null.length.is_none());
    }

    #[test]
    fn non_numeric_length_still_parses() {
        let g: Grain = serde_json::from_str(r#"{"length": "7.2", "shape": "broken"}"#).unwrap();
        assert_eq!(g.length, Some(Measurement::Invalid(Value::from("7.2"))));
    }

    #[test]
    fn missing_bounds_parse_as_none() {
        let std: Standard =
            serde_json::from_str(r#"{"id": 4, "name": "Chalky", "minLength": 2}"#).unwrap();
        assert_eq!(std.min_length, Some(2.0));
        assert!(std.max_length.is_none());
        let back = serde_json::to_value(&std).unwrap();
        assert!(back.get("maxLength").is_none());
    }
}
