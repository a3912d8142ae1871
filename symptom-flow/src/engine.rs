use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    backend::SymptomBackend,
    config::EngineConfig,
    error::{FlowError, InputError, Result},
    message::Message,
    session::{Session, Stage},
    task::{NextAction, StageTask, TaskContext},
    tasks::{CompleteTask, DaysTask, FollowupTask, NameTask, SymptomTask, prompts},
};

/// Outcome of one conversation turn
#[derive(Debug, Clone)]
pub struct Turn {
    /// The session after the turn; callers replace their copy with it
    pub session: Session,
    pub messages: Vec<Message>,
    /// Why the utterance was not accepted, if it was not
    pub rejection: Option<InputError>,
}

impl Turn {
    pub fn status(&self) -> TurnStatus {
        if self.session.stage == Stage::Complete {
            TurnStatus::Completed
        } else {
            TurnStatus::WaitingForInput
        }
    }
}

/// Status of the conversation after a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// Waiting for the next utterance
    WaitingForInput,
    /// The diagnosis has been delivered
    Completed,
}

/// Routes each utterance to the task of the session's current stage and applies
/// the resulting transition.
pub struct ConversationEngine {
    tasks: HashMap<Stage, Arc<dyn StageTask>>,
    backend: Arc<dyn SymptomBackend>,
    config: EngineConfig,
}

impl ConversationEngine {
    /// Engine with the standard stage tasks.
    pub fn new(backend: Arc<dyn SymptomBackend>, config: EngineConfig) -> Self {
        EngineBuilder::new(backend, config)
            .add_task(Arc::new(NameTask))
            .add_task(Arc::new(SymptomTask))
            .add_task(Arc::new(DaysTask))
            .add_task(Arc::new(FollowupTask))
            .add_task(Arc::new(CompleteTask))
            .build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Opening messages for a fresh conversation.
    pub fn welcome(&self) -> Vec<Message> {
        if self.config.ask_name {
            vec![Message::bot(prompts::WELCOME), Message::bot(prompts::ASK_NAME)]
        } else {
            vec![Message::bot(prompts::ASK_SYMPTOM)]
        }
    }

    /// A new session under `id`, with the welcome messages.
    pub fn start(&self, id: impl Into<String>) -> (Session, Vec<Message>) {
        let session = Session::new(id, self.config.initial_stage());
        info!(session_id = %session.id, stage = %session.stage, "Conversation started");
        (session, self.welcome())
    }

    /// A new session with a generated id.
    pub fn start_new(&self) -> (Session, Vec<Message>) {
        self.start(Uuid::new_v4().to_string())
    }

    /// Discards everything accumulated in `session` and starts over under the same id.
    pub fn reset(&self, session: &Session) -> (Session, Vec<Message>) {
        info!(session_id = %session.id, from = %session.stage, "Conversation reset");
        self.start(session.id.clone())
    }

    /// Runs one turn.
    ///
    /// `session` is not modified. Invalid input still succeeds with
    /// [`Turn::rejection`] set and the stage unchanged; an `Err` means the
    /// backend failed and the caller should keep its session and retry.
    pub async fn advance(&self, session: &Session, utterance: &str) -> Result<Turn> {
        let task = self
            .tasks
            .get(&session.stage)
            .ok_or(FlowError::TaskNotFound(session.stage))?;

        let mut next = session.clone();
        let ctx = TaskContext {
            backend: self.backend.as_ref(),
            config: &self.config,
        };
        let result = task.run(&mut next, utterance, &ctx).await?;

        match result.next_action {
            NextAction::WaitForInput => {}
            NextAction::GoTo(target) => {
                if target <= session.stage {
                    return Err(FlowError::InvalidTransition {
                        from: session.stage,
                        to: target,
                    });
                }
                next.stage = target;
            }
            NextAction::End => next.stage = Stage::Complete,
        }

        if let Some(rejection) = &result.rejection {
            warn!(
                session_id = %session.id,
                stage = %session.stage,
                %rejection,
                "Utterance rejected"
            );
        } else if next.stage != session.stage {
            info!(
                session_id = %session.id,
                from = %session.stage,
                to = %next.stage,
                "Stage transition"
            );
        } else {
            debug!(session_id = %session.id, stage = %session.stage, "Stayed in stage");
        }

        Ok(Turn {
            session: next,
            messages: result.messages,
            rejection: result.rejection,
        })
    }
}

/// Builder for engines with custom stage tasks
pub struct EngineBuilder {
    tasks: HashMap<Stage, Arc<dyn StageTask>>,
    backend: Arc<dyn SymptomBackend>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new(backend: Arc<dyn SymptomBackend>, config: EngineConfig) -> Self {
        Self {
            tasks: HashMap::new(),
            backend,
            config,
        }
    }

    /// Registers a task for its stage, replacing any previous one.
    pub fn add_task(mut self, task: Arc<dyn StageTask>) -> Self {
        self.tasks.insert(task.stage(), task);
        self
    }

    pub fn build(self) -> ConversationEngine {
        ConversationEngine {
            tasks: self.tasks,
            backend: self.backend,
            config: self.config,
        }
    }
}
