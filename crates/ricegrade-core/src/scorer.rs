//! Compliance scoring of a grain batch against one grading standard.
//!
//! For every sub-criterion of the selected standard, counts the grains whose
//! length lies within the criterion's bounds and records that count as a
//! percentage of the batch, rounded to two decimals. Scoring reaches exactly
//! one level below the standard: nested `standardData` is copied as is.
//!
//! The catalog is never touched. Every call returns fresh clones of the
//! criteria with `value` filled in.

use thiserror::Error;

use crate::model::{Grain, Measurement, ScoredCriterion, Standard};

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("grain batch is empty")]
    EmptyBatch,

    #[error("invalid measurement for grain {grain}: {reason}")]
    InvalidMeasurement { grain: usize, reason: String },

    #[error("invalid bounds on criterion {criterion:?}: {reason}")]
    InvalidBounds { criterion: String, reason: String },
}

/// Score every sub-criterion of `standard` against `grains`.
///
/// Output has the same length and order as `standard.standard_data`. Each
/// `value` is in `[0, 100]` with two decimals.
pub fn score(standard: &Standard, grains: &[Grain]) -> Result<Vec<ScoredCriterion>, ScoreError> {
    if grains.is_empty() {
        return Err(ScoreError::EmptyBatch);
    }
    let lengths = grain_lengths(grains)?;

    standard
        .standard_data
        .iter()
        .map(|criterion| {
            let (min, max) = check_bounds(criterion)?;
            let count = lengths
                .iter()
                .filter(|&&len| criterion.admits(len, min, max))
                .count();
            let mut scored = criterion.clone();
            scored.value = round2(count as f64 / lengths.len() as f64 * 100.0);
            Ok(scored)
        })
        .collect()
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn grain_lengths(grains: &[Grain]) -> Result<Vec<f64>, ScoreError> {
    grains
        .iter()
        .enumerate()
        .map(|(i, grain)| match &grain.length {
            None => Err(ScoreError::InvalidMeasurement {
                grain: i,
                reason: "missing length".into(),
            }),
            Some(Measurement::Invalid(raw)) => Err(ScoreError::InvalidMeasurement {
                grain: i,
                reason: format!("length {raw} is not a number"),
            }),
            Some(Measurement::Value(len)) if !len.is_finite() => Err(ScoreError::InvalidMeasurement {
                grain: i,
                reason: format!("length {len} is not a finite number"),
            }),
            Some(Measurement::Value(len)) if *len < 0.0 => Err(ScoreError::InvalidMeasurement {
                grain: i,
                reason: format!("length {len} is negative"),
            }),
            Some(Measurement::Value(len)) => Ok(*len),
        })
        .collect()
}

fn check_bounds(criterion: &Standard) -> Result<(f64, f64), ScoreError> {
    let bound = |label: &str, value: Option<f64>| match value {
        None => Err(ScoreError::InvalidBounds {
            criterion: criterion.name.clone(),
            reason: format!("{label} is missing"),
        }),
        Some(v) if !v.is_finite() => Err(ScoreError::InvalidBounds {
            criterion: criterion.name.clone(),
            reason: format!("{label} {v} is not a finite number"),
        }),
        Some(v) => Ok(v),
    };
    Ok((
        bound("minLength", criterion.min_length)?,
        bound("maxLength", criterion.max_length)?,
    ))
}
