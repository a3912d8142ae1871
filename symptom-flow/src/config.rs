use serde::{Deserialize, Serialize};

use crate::session::Stage;

/// How a matched symptom becomes the current symptom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// The first candidate is taken and the others are offered as options.
    Auto,
    /// The user must answer with the number of a candidate.
    Prompted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowupStrategy {
    Random,
    CoOccurrence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseStrategy {
    Random,
    SymptomOverlap,
}

/// Conversation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Start by asking for the user's name.
    pub ask_name: bool,
    pub selection: SelectionMode,
    /// Inclusive bounds on the number of days. `None` accepts any non-negative integer.
    pub days_range: Option<(u32, u32)>,
    pub max_candidates: usize,
    pub followup_count: usize,
    /// Scores strictly above this advise seeing a doctor.
    pub severity_threshold: f64,
    pub followup_strategy: FollowupStrategy,
    pub disease_strategy: DiseaseStrategy,
}

impl EngineConfig {
    /// Name collection, automatic symptom selection, unbounded days.
    pub fn guided() -> Self {
        Self {
            ask_name: true,
            selection: SelectionMode::Auto,
            days_range: None,
            max_candidates: 5,
            followup_count: 5,
            severity_threshold: 13.0,
            followup_strategy: FollowupStrategy::Random,
            disease_strategy: DiseaseStrategy::Random,
        }
    }

    /// No name step, numbered symptom selection, days bounded to a year.
    pub fn clinic() -> Self {
        Self {
            ask_name: false,
            selection: SelectionMode::Prompted,
            days_range: Some((1, 365)),
            ..Self::guided()
        }
    }

    /// Resolves a preset by name (`guided` or `clinic`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "guided" => Some(Self::guided()),
            "clinic" => Some(Self::clinic()),
            _ => None,
        }
    }

    pub fn initial_stage(&self) -> Stage {
        if self.ask_name {
            Stage::Name
        } else {
            Stage::Symptom
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::guided()
    }
}
