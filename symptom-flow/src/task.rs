use async_trait::async_trait;

use crate::{
    backend::SymptomBackend,
    config::EngineConfig,
    error::{InputError, Result},
    message::Message,
    session::{Session, Stage},
};

/// Result of running a stage task for one utterance
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// Messages to show the user
    pub messages: Vec<Message>,
    /// Where the conversation goes next
    pub next_action: NextAction,
    /// Set when the utterance was not acceptable for this stage
    pub rejection: Option<InputError>,
}

impl TaskResult {
    pub fn new(messages: Vec<Message>, next_action: NextAction) -> Self {
        Self {
            messages,
            next_action,
            rejection: None,
        }
    }

    /// Stay in the current stage and re-prompt.
    pub fn rejected(rejection: InputError, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::bot(prompt)],
            next_action: NextAction::WaitForInput,
            rejection: Some(rejection),
        }
    }
}

/// Defines what should happen after a task completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Stay in the current stage and wait for the next utterance
    WaitForInput,
    /// Move forward to the given stage
    GoTo(Stage),
    /// The conversation is finished
    End,
}

/// What a task may use besides the session.
pub struct TaskContext<'a> {
    pub backend: &'a dyn SymptomBackend,
    pub config: &'a EngineConfig,
}

/// Handles one stage of the conversation.
///
/// A task receives a private copy of the session. If it returns an error the copy
/// is discarded, so tasks may update fields before calling the backend.
#[async_trait]
pub trait StageTask: Send + Sync {
    /// The stage this task handles
    fn stage(&self) -> Stage;

    async fn run(
        &self,
        session: &mut Session,
        utterance: &str,
        ctx: &TaskContext<'_>,
    ) -> Result<TaskResult>;
}
