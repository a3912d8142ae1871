//! JSON bodies of the remote-mode endpoints (`/get_symptoms`, `/get_followup_questions`,
//! `/predict`). Shared by the HTTP service and [`crate::HttpBackend`].

use serde::{Deserialize, Serialize};

use crate::diagnosis::{Diagnosis, SeverityLevel};
use crate::matching::display_symptom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomLookupRequest {
    pub symptom: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomLookupResponse {
    pub status: ResponseStatus,
    pub matches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupRequest {
    pub symptom: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupResponse {
    pub status: ResponseStatus,
    pub questions: Vec<String>,
    /// Symptom identifiers behind `questions`, in the same order.
    #[serde(default)]
    pub symptoms: Vec<String>,
}

impl FollowupResponse {
    pub fn from_symptoms(symptoms: Vec<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            questions: symptoms.iter().map(|s| followup_question(s)).collect(),
            symptoms,
        }
    }

    /// Symptom identifiers, recovered from the question text when the server
    /// only sent questions.
    pub fn into_symptoms(self) -> Vec<String> {
        if !self.symptoms.is_empty() {
            return self.symptoms;
        }
        self.questions
            .iter()
            .filter_map(|q| symptom_from_question(q))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub symptoms: Vec<String>,
    pub days: u32,
    /// The symptom the conversation started from. Informs disease selection only;
    /// severity is scored over `symptoms`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_symptom: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveritySummary {
    #[serde(default)]
    pub score: f64,
    pub level: SeverityLevel,
    pub advice: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeveritySummary>,
    #[serde(default)]
    pub precautions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PredictionResponse {
    pub fn success(diagnosis: &Diagnosis) -> Self {
        Self {
            status: ResponseStatus::Success,
            prediction: Some(diagnosis.disease.clone()),
            description: Some(diagnosis.description.clone()),
            severity: Some(SeveritySummary {
                score: diagnosis.severity.score,
                level: diagnosis.severity.level,
                advice: diagnosis.severity.level.advice().to_string(),
            }),
            precautions: diagnosis.precautions.clone(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            prediction: None,
            description: None,
            severity: None,
            precautions: Vec::new(),
            message: Some(message.into()),
        }
    }
}

const QUESTION_PREFIX: &str = "Are you experiencing ";

pub fn followup_question(symptom: &str) -> String {
    format!("{QUESTION_PREFIX}{}? (yes/no)", display_symptom(symptom))
}

fn symptom_from_question(question: &str) -> Option<String> {
    let rest = question.strip_prefix(QUESTION_PREFIX)?;
    let symptom = rest.split('?').next()?.trim();
    if symptom.is_empty() {
        None
    } else {
        Some(symptom.replace(' ', "_"))
    }
}
