//! Display helpers for scored criteria on the inspection result view.

use serde::Serialize;

use crate::model::Standard;

/// Span above which a criterion is treated as open-ended and shown as `>= min`.
const OPEN_ENDED_SPAN: f64 = 50.0;

/// One row of the "Composition" table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionRow {
    pub name: String,
    pub standard: String,
    pub actual: String,
}

/// Human label for a criterion's length bounds.
///
/// `>= 7` when `maxLength - minLength > 50`, otherwise `3.5 - 7`. A missing
/// bound leaves that side open.
pub fn bound_label(criterion: &Standard) -> String {
    match (criterion.min_length, criterion.max_length) {
        (Some(min), Some(max)) if max - min > OPEN_ENDED_SPAN => format!(">= {min}"),
        (Some(min), Some(max)) => format!("{min} - {max}"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => "-".to_string(),
    }
}

/// `60` -> `"60.00 %"`.
pub fn percent_label(value: f64) -> String {
    format!("{value:.2} %")
}

pub fn composition_rows(criteria: &[Standard]) -> Vec<CompositionRow> {
    criteria
        .iter()
        .map(|c| CompositionRow {
            name: c.name.clone(),
            standard: bound_label(c),
            actual: percent_label(c.value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: f64, max: f64) -> Standard {
        Standard {
            id: 1,
            key: "k".into(),
            name: "Whole Grain".into(),
            shape: Vec::new(),
            min_length: Some(min),
            max_length: Some(max),
            condition_min: "GTE".into(),
            condition_max: "LT".into(),
            value: 0.0,
            standard_data: Vec::new(),
        }
    }

    #[test]
    fn open_ended_label() {
        assert_eq!(bound_label(&bounds(7.0, 99.0)), ">= 7");
    }

    #[test]
    fn range_label() {
        assert_eq!(bound_label(&bounds(3.5, 7.0)), "3.5 - 7");
        assert_eq!(bound_label(&bounds(0.0, 3.5)), "0 - 3.5");
    }

    #[test]
    fn missing_bounds_leave_side_open() {
        let mut c = bounds(3.5, 7.0);
        c.max_length = None;
        assert_eq!(bound_label(&c), ">= 3.5");
        c.min_length = None;
        assert_eq!(bound_label(&c), "-");
        c.max_length = Some(7.0);
        assert_eq!(bound_label(&c), "<= 7");
    }

    #[test]
    fn span_of_exactly_fifty_is_a_range() {
        assert_eq!(bound_label(&bounds(0.0, 50.0)), "0 - 50");
        assert_eq!(bound_label(&bounds(0.0, 50.5)), ">= 0");
    }

    #[test]
    fn percent_two_decimals() {
        assert_eq!(percent_label(60.0), "60.00 %");
        assert_eq!(percent_label(33.33), "33.33 %");
        assert_eq!(percent_label(0.0), "0.00 %");
    }

    #[test]
    fn rows_follow_criteria_order() {
        let mut whole = bounds(7.0, 99.0);
        whole.value = 62.5;
        let mut broken = bounds(3.5, 7.0);
        broken.name = "Broken Rice C1".into();
        broken.value = 25.0;

        let rows = composition_rows(&[whole, broken]);
        assert_eq!(
            rows,
            vec![
                CompositionRow {
                    name: "Whole Grain".into(),
                    standard: ">= 7".into(),
                    actual: "62.50 %".into(),
                },
                CompositionRow {
                    name: "Broken Rice C1".into(),
                    standard: "3.5 - 7".into(),
                    actual: "25.00 %".into(),
                },
            ]
        );
    }
}
