//! Standards catalog: the read-only list of grading standards.
//!
//! Loaded once from a JSON file at process start and shared behind an `Arc`
//! for the process lifetime. There are no mutation operations.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::model::{Grain, ScoredCriterion, Standard};
use crate::scorer::{self, ScoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read standards file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed standards file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum GradeError {
    #[error("standard not found: {0}")]
    StandardNotFound(String),

    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Result of grading a batch against a named standard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grading {
    #[serde(rename = "standardID")]
    pub standard_id: i64,
    pub standard_data: Vec<ScoredCriterion>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    standards: Vec<Standard>,
}

impl Catalog {
    pub fn new(standards: Vec<Standard>) -> Self {
        Self { standards }
    }

    /// Parse a catalog from a JSON array of standards.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let standards: Vec<Standard> = serde_json::from_str(json)?;
        Ok(Self { standards })
    }

    /// Read and parse the catalog file at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        info!(path = %path.display(), count = catalog.len(), "loaded standards catalog");
        Ok(catalog)
    }

    /// Load the catalog, falling back to an empty one when the file is
    /// missing or malformed. The failure is logged, never returned.
    ///
    /// With an empty catalog every lookup reports `StandardNotFound`.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(path = %path.display(), error = %e, "standards catalog unavailable, serving empty catalog");
                Self::default()
            }
        }
    }

    pub fn standards(&self) -> &[Standard] {
        &self.standards
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }

    /// First top-level standard whose `name` equals `name` exactly.
    pub fn find(&self, name: &str) -> Option<&Standard> {
        self.standards.iter().find(|s| s.name == name)
    }

    /// Look up `name` and score `grains` against its sub-criteria.
    pub fn grade(&self, name: &str, grains: &[Grain]) -> Result<Grading, GradeError> {
        let standard = self
            .find(name)
            .ok_or_else(|| GradeError::StandardNotFound(name.to_string()))?;
        let standard_data = scorer::score(standard, grains)?;
        Ok(Grading {
            standard_id: standard.id,
            standard_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"[
        {
            "id": 1,
            "key": "std1",
            "name": "Standard A",
            "shape": [],
            "minLength": 0,
            "maxLength": 0,
            "conditionMin": "",
            "conditionMax": "",
            "standardData": [
                {"id": 11, "key": "whole", "name": "Whole", "shape": ["wholegrain"],
                 "minLength": 5, "maxLength": 10, "conditionMin": "GTE", "conditionMax": "LTE"}
            ]
        },
        {
            "id": 2,
            "key": "std2",
            "name": "Standard B",
            "minLength": 0,
            "maxLength": 0,
            "standardData": []
        },
        {
            "id": 3,
            "key": "dup",
            "name": "Standard A",
            "minLength": 0,
            "maxLength": 0
        }
    ]"#;

    #[test]
    fn find_matches_first_by_name() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.find("Standard A").unwrap().id, 1);
        assert_eq!(catalog.find("Standard B").unwrap().id, 2);
        assert!(catalog.find("standard a").is_none());
    }

    #[test]
    fn grade_returns_standard_id_and_scores() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let grains: Vec<Grain> = [5.0, 7.0, 10.0, 11.0, 4.0]
            .iter()
            .map(|&l| Grain::with_length(l))
            .collect();
        let grading = catalog.grade("Standard A", &grains).unwrap();
        assert_eq!(grading.standard_id, 1);
        assert_eq!(grading.standard_data.len(), 1);
        assert_eq!(grading.standard_data[0].value, 60.0);
        // The shared catalog keeps its unscored values.
        assert_eq!(catalog.find("Standard A").unwrap().standard_data[0].value, 0.0);
    }

    #[test]
    fn unknown_standard_is_distinct_from_empty_result() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let grains = vec![Grain::with_length(6.0)];

        let missing = catalog.grade("Nope", &grains);
        assert_eq!(missing, Err(GradeError::StandardNotFound("Nope".into())));

        let matched_no_criteria = catalog.grade("Standard B", &grains).unwrap();
        assert_eq!(matched_no_criteria.standard_id, 2);
        assert!(matched_no_criteria.standard_data.is_empty());
    }

    #[test]
    fn grade_propagates_empty_batch() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(
            catalog.grade("Standard A", &[]),
            Err(GradeError::Score(ScoreError::EmptyBatch))
        );
    }

    #[test]
    fn bad_criterion_fails_only_its_own_standard() {
        let json = r#"[
            {"id": 1, "name": "A", "standardData": [
                {"id": 11, "name": "Open", "minLength": 5, "conditionMin": "GTE"}
            ]},
            {"id": 2, "name": "B", "standardData": [
                {"id": 21, "name": "Whole", "minLength": 5, "maxLength": 10}
            ]}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        let grains = vec![Grain::with_length(6.0), Grain::with_length(12.0)];

        assert!(matches!(
            catalog.grade("A", &grains),
            Err(GradeError::Score(ScoreError::InvalidBounds { .. }))
        ));
        let graded = catalog.grade("B", &grains).unwrap();
        assert_eq!(graded.standard_id, 2);
        assert_eq!(graded.standard_data[0].value, 50.0);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn load_missing_file_errors() {
        let result = Catalog::load(Path::new("/nonexistent/standards.json"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn load_malformed_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"not": "an array"}"#).unwrap();
        let result = Catalog::load(file.path());
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn load_or_empty_degrades() {
        let catalog = Catalog::load_or_empty(Path::new("/nonexistent/standards.json"));
        assert!(catalog.is_empty());
        assert!(matches!(
            catalog.grade("Standard A", &[Grain::with_length(1.0)]),
            Err(GradeError::StandardNotFound(_))
        ));
    }

    #[test]
    fn bundled_catalog_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/standards.json");
        let catalog = Catalog::load(&path).unwrap();
        assert!(!catalog.is_empty());
        for standard in catalog.standards() {
            assert!(!standard.standard_data.is_empty(), "{} has no criteria", standard.name);
        }
    }
}
