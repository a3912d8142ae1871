use serde::{Deserialize, Serialize};
use symptom_flow::{Diagnosis, InputError, Message, Session, Stage, Turn, TurnStatus};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Omit to start a new conversation
    pub session_id: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    WaitingForInput,
    Completed,
}

impl From<TurnStatus> for ChatStatus {
    fn from(status: TurnStatus) -> Self {
        match status {
            TurnStatus::WaitingForInput => ChatStatus::WaitingForInput,
            TurnStatus::Completed => ChatStatus::Completed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub stage: Stage,
    pub status: ChatStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<InputError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Diagnosis>,
}

impl ChatResponse {
    /// Response for a conversation that has not taken a turn yet.
    pub fn opened(session: &Session, messages: Vec<Message>) -> Self {
        Self {
            session_id: session.id.clone(),
            messages,
            stage: session.stage,
            status: ChatStatus::WaitingForInput,
            rejection: None,
            diagnosis: None,
        }
    }

    pub fn from_turn(turn: Turn, mut preceding: Vec<Message>) -> Self {
        let status = turn.status().into();
        preceding.extend(turn.messages);
        Self {
            session_id: turn.session.id.clone(),
            messages: preceding,
            stage: turn.session.stage,
            status,
            rejection: turn.rejection,
            diagnosis: turn.session.diagnosis,
        }
    }
}
