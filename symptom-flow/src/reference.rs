//! Static reference data: the symptom vocabulary, the disease catalog and optional
//! per-symptom severity weights.
//!
//! Reference data is loaded once at startup and shared read-only behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

use crate::error::ReferenceError;

const BUILTIN_REFERENCE: &str = include_str!("../data/reference.yaml");

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disease {
    pub name: String,
    pub description: String,
    pub precautions: Vec<String>,
    /// Symptoms known to accompany this disease. May be empty.
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceData {
    vocabulary: Vec<String>,
    catalog: Vec<Disease>,
    #[serde(default)]
    severity_weights: HashMap<String, u32>,
}

impl ReferenceData {
    pub fn new(
        vocabulary: Vec<String>,
        catalog: Vec<Disease>,
        severity_weights: HashMap<String, u32>,
    ) -> Result<Self, ReferenceError> {
        let data = Self {
            vocabulary,
            catalog,
            severity_weights,
        };
        data.validate()?;
        Ok(data)
    }

    /// The vocabulary and catalog bundled with the crate.
    pub fn builtin() -> Result<Self, ReferenceError> {
        Self::from_yaml_str(BUILTIN_REFERENCE)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ReferenceError> {
        let data: Self = serde_yaml::from_str(yaml)?;
        data.validate()?;
        Ok(data)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let data = Self::from_yaml_str(&yaml)?;
        info!(
            path = %path.display(),
            symptoms = data.vocabulary.len(),
            diseases = data.catalog.len(),
            "Loaded reference data"
        );
        Ok(data)
    }

    fn validate(&self) -> Result<(), ReferenceError> {
        if self.vocabulary.is_empty() {
            return Err(ReferenceError::EmptyVocabulary);
        }
        if self.catalog.is_empty() {
            return Err(ReferenceError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for symptom in &self.vocabulary {
            if !seen.insert(symptom.as_str()) {
                return Err(ReferenceError::DuplicateSymptom(symptom.clone()));
            }
        }

        let mut seen = HashSet::new();
        for disease in &self.catalog {
            if !seen.insert(disease.name.as_str()) {
                return Err(ReferenceError::DuplicateDisease(disease.name.clone()));
            }
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn catalog(&self) -> &[Disease] {
        &self.catalog
    }

    pub fn disease(&self, name: &str) -> Option<&Disease> {
        self.catalog.iter().find(|d| d.name == name)
    }

    pub fn knows_symptom(&self, symptom: &str) -> bool {
        self.vocabulary.iter().any(|s| s == symptom)
    }

    /// Severity weight of a symptom; symptoms without an explicit weight count as 1.
    pub fn severity_weight(&self, symptom: &str) -> u32 {
        self.severity_weights.get(symptom).copied().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_data_loads() {
        let data = ReferenceData::builtin().unwrap();
        assert!(data.knows_symptom("itching"));
        assert!(data.knows_symptom("skin_rash"));
        assert_eq!(data.catalog().len(), 3);
        assert_eq!(data.catalog()[0].name, "Fungal infection");
        assert_eq!(
            data.disease("Allergy").unwrap().precautions[0],
            "Apply calamine"
        );
    }

    #[test]
    fn missing_weights_default_to_one() {
        let data = ReferenceData::builtin().unwrap();
        assert_eq!(data.severity_weight("itching"), 1);
    }

    #[test]
    fn parses_weights_from_yaml() {
        let yaml = r#"
vocabulary: ["itching", "chills"]
catalog:
  - name: "Allergy"
    description: "d"
    precautions: ["p1"]
severity_weights:
  chills: 3
"#;
        let data = ReferenceData::from_yaml_str(yaml).unwrap();
        assert_eq!(data.severity_weight("chills"), 3);
        assert_eq!(data.severity_weight("itching"), 1);
        assert!(data.catalog()[0].symptoms.is_empty());
    }

    #[test]
    fn rejects_duplicate_symptoms() {
        let yaml = r#"
vocabulary: ["itching", "itching"]
catalog:
  - name: "Allergy"
    description: "d"
    precautions: []
"#;
        let err = ReferenceData::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ReferenceError::DuplicateSymptom(s) if s == "itching"));
    }

    #[test]
    fn rejects_empty_catalog() {
        let err = ReferenceData::new(vec!["itching".into()], vec![], HashMap::new()).unwrap_err();
        assert!(matches!(err, ReferenceError::EmptyCatalog));
    }
}
