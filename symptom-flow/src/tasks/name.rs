use async_trait::async_trait;
use tracing::info;

use super::prompts;
use crate::{
    error::{InputError, Result},
    message::Message,
    session::{Session, Stage},
    task::{NextAction, StageTask, TaskContext, TaskResult},
};

/// Records the user's name and asks for the first symptom.
pub struct NameTask;

#[async_trait]
impl StageTask for NameTask {
    fn stage(&self) -> Stage {
        Stage::Name
    }

    async fn run(
        &self,
        session: &mut Session,
        utterance: &str,
        _ctx: &TaskContext<'_>,
    ) -> Result<TaskResult> {
        let name = utterance.trim();
        if name.is_empty() {
            return Ok(TaskResult::rejected(
                InputError::EmptyInput,
                prompts::ASK_NAME_AGAIN,
            ));
        }

        info!(session_id = %session.id, "Recorded user name");
        session.user_name = Some(name.to_string());

        Ok(TaskResult::new(
            vec![Message::bot(prompts::greeting(name))],
            NextAction::GoTo(Stage::Symptom),
        ))
    }
}
