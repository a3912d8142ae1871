use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diagnosis::Diagnosis;

/// A named point in the conversation. The ordering is the only allowed direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Name,
    Symptom,
    Days,
    Followup,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Name => "name",
            Stage::Symptom => "symptom",
            Stage::Days => "days",
            Stage::Followup => "followup",
            Stage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Conversation state threaded through [`crate::ConversationEngine::advance`].
///
/// The engine never mutates a session in place: every turn produces a new value,
/// which keeps a failed turn from leaving half-applied state behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub stage: Stage,
    pub user_name: Option<String>,
    pub current_symptom: Option<String>,
    pub candidate_symptoms: Vec<String>,
    pub days: Option<u32>,
    pub followup_symptoms: Vec<String>,
    pub followup_index: usize,
    /// Confirmed follow-up symptoms, in answer order and without duplicates.
    pub experienced_symptoms: Vec<String>,
    pub diagnosis: Option<Diagnosis>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>, initial_stage: Stage) -> Self {
        Self {
            id: id.into(),
            stage: initial_stage,
            user_name: None,
            current_symptom: None,
            candidate_symptoms: Vec::new(),
            days: None,
            followup_symptoms: Vec::new(),
            followup_index: 0,
            experienced_symptoms: Vec::new(),
            diagnosis: None,
            created_at: Utc::now(),
        }
    }

    /// Candidates were offered but the user has not picked one yet.
    pub fn awaiting_selection(&self) -> bool {
        self.stage == Stage::Symptom
            && self.current_symptom.is_none()
            && !self.candidate_symptoms.is_empty()
    }

    /// The follow-up symptom the user is currently being asked about.
    pub fn pending_followup(&self) -> Option<&str> {
        self.followup_symptoms
            .get(self.followup_index)
            .map(String::as_str)
    }

    pub fn followups_remaining(&self) -> usize {
        self.followup_symptoms
            .len()
            .saturating_sub(self.followup_index)
    }

    pub(crate) fn confirm_symptom(&mut self, symptom: &str) {
        if !self.experienced_symptoms.iter().any(|s| s == symptom) {
            self.experienced_symptoms.push(symptom.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered_forward() {
        assert!(Stage::Name < Stage::Symptom);
        assert!(Stage::Symptom < Stage::Days);
        assert!(Stage::Days < Stage::Followup);
        assert!(Stage::Followup < Stage::Complete);
    }

    #[test]
    fn confirm_symptom_ignores_duplicates() {
        let mut session = Session::new("s1", Stage::Followup);
        session.confirm_symptom("chills");
        session.confirm_symptom("chills");
        assert_eq!(session.experienced_symptoms, vec!["chills".to_string()]);
    }

    #[test]
    fn pending_followup_tracks_cursor() {
        let mut session = Session::new("s1", Stage::Followup);
        session.followup_symptoms = vec!["cough".into(), "chills".into()];
        assert_eq!(session.pending_followup(), Some("cough"));
        session.followup_index = 2;
        assert_eq!(session.pending_followup(), None);
        assert_eq!(session.followups_remaining(), 0);
    }
}
