use async_trait::async_trait;

use super::prompts;
use crate::{
    error::Result,
    message::Message,
    session::{Session, Stage},
    task::{NextAction, StageTask, TaskContext, TaskResult},
};

/// Terminal stage: every utterance gets the same reply.
pub struct CompleteTask;

#[async_trait]
impl StageTask for CompleteTask {
    fn stage(&self) -> Stage {
        Stage::Complete
    }

    async fn run(
        &self,
        _session: &mut Session,
        _utterance: &str,
        _ctx: &TaskContext<'_>,
    ) -> Result<TaskResult> {
        Ok(TaskResult::new(
            vec![Message::bot(prompts::COMPLETE)],
            NextAction::WaitForInput,
        ))
    }
}
