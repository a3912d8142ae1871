//! Diagnosis records, the severity heuristic and the pluggable disease selection strategies.
//!
//! No classifier is involved: [`RandomSelector`] is a placeholder and
//! [`SymptomOverlapSelector`] only compares symptom lists from the catalog.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::reference::{Disease, ReferenceData};

/// Scores above this are reported as [`SeverityLevel::High`].
pub const HIGH_SEVERITY_SCORE: f64 = 20.0;

pub const CONSULT_ADVICE: &str = "You should take the consultation from doctor.";
pub const PRECAUTION_ADVICE: &str = "It might not be that bad but you should take precautions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
}

impl SeverityLevel {
    /// Advice reported alongside the level by the prediction endpoint.
    pub fn advice(&self) -> &'static str {
        match self {
            SeverityLevel::High => "You should seek immediate medical attention.",
            SeverityLevel::Medium => "You should consult a doctor soon.",
            SeverityLevel::Low => "You can try home remedies, but monitor your condition.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    ConsultDoctor,
    TakePrecautions,
}

impl Verdict {
    pub fn advice(&self) -> &'static str {
        match self {
            Verdict::ConsultDoctor => CONSULT_ADVICE,
            Verdict::TakePrecautions => PRECAUTION_ADVICE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Severity {
    pub score: f64,
    pub level: SeverityLevel,
    pub verdict: Verdict,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub disease: String,
    pub description: String,
    pub precautions: Vec<String>,
    pub severity: Severity,
}

impl Diagnosis {
    pub fn new(disease: &Disease, severity: Severity) -> Self {
        Self {
            disease: disease.name.clone(),
            description: disease.description.clone(),
            precautions: disease.precautions.clone(),
            severity,
        }
    }
}

/// `score = (sum of symptom weights * days) / (symptom count + 1)`
///
/// With unit weights this is `n * days / (n + 1)`. The verdict flips to
/// [`Verdict::ConsultDoctor`] only when the score is strictly above `threshold`.
pub fn assess_severity(
    reference: &ReferenceData,
    symptoms: &[String],
    days: u32,
    threshold: f64,
) -> Severity {
    let weight_sum: u64 = symptoms
        .iter()
        .map(|s| u64::from(reference.severity_weight(s)))
        .sum();
    let score = (weight_sum as f64 * f64::from(days)) / (symptoms.len() as f64 + 1.0);

    let verdict = if score > threshold {
        Verdict::ConsultDoctor
    } else {
        Verdict::TakePrecautions
    };
    let level = match verdict {
        Verdict::ConsultDoctor if score > HIGH_SEVERITY_SCORE => SeverityLevel::High,
        Verdict::ConsultDoctor => SeverityLevel::Medium,
        Verdict::TakePrecautions => SeverityLevel::Low,
    };

    Severity {
        score,
        level,
        verdict,
        advice: verdict.advice().to_string(),
    }
}

/// Chooses the disease reported at the end of a conversation.
pub trait DiseaseSelector: Send + Sync {
    fn select<'a>(
        &self,
        catalog: &'a [Disease],
        symptoms: &[String],
        rng: &mut dyn RngCore,
    ) -> Option<&'a Disease>;
}

/// Uniform pick over the catalog, ignoring the reported symptoms.
pub struct RandomSelector;

impl DiseaseSelector for RandomSelector {
    fn select<'a>(
        &self,
        catalog: &'a [Disease],
        _symptoms: &[String],
        rng: &mut dyn RngCore,
    ) -> Option<&'a Disease> {
        if catalog.is_empty() {
            return None;
        }
        catalog.get(rng.random_range(0..catalog.len()))
    }
}

/// Picks the disease whose catalog symptoms overlap most with the reported ones.
/// Ties keep catalog order; without any overlap the pick is random.
pub struct SymptomOverlapSelector;

impl DiseaseSelector for SymptomOverlapSelector {
    fn select<'a>(
        &self,
        catalog: &'a [Disease],
        symptoms: &[String],
        rng: &mut dyn RngCore,
    ) -> Option<&'a Disease> {
        let mut best: Option<(&Disease, usize)> = None;
        for disease in catalog {
            let overlap = disease
                .symptoms
                .iter()
                .filter(|s| symptoms.contains(s))
                .count();
            if overlap > 0 && best.is_none_or(|(_, count)| overlap > count) {
                best = Some((disease, overlap));
            }
        }

        match best {
            Some((disease, _)) => Some(disease),
            None => RandomSelector.select(catalog, symptoms, rng),
        }
    }
}
