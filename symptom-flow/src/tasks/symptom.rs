use async_trait::async_trait;
use tracing::{info, warn};

use super::prompts;
use crate::{
    config::SelectionMode,
    error::{InputError, Result},
    message::Message,
    session::{Session, Stage},
    task::{NextAction, StageTask, TaskContext, TaskResult},
};

/// Matches free text against the vocabulary and settles the primary symptom.
///
/// In [`SelectionMode::Auto`] the first candidate is taken immediately. In
/// [`SelectionMode::Prompted`] the stage is entered twice: once with free text, then
/// with the number of the chosen candidate.
pub struct SymptomTask;

impl SymptomTask {
    fn select(&self, session: &mut Session, utterance: &str) -> TaskResult {
        let len = session.candidate_symptoms.len();
        let index = match utterance.trim().parse::<usize>() {
            Ok(index) if (1..=len).contains(&index) => index,
            _ => {
                warn!(session_id = %session.id, utterance, "Invalid candidate selection");
                return TaskResult::rejected(
                    InputError::InvalidSelection { len },
                    prompts::INVALID_SELECTION,
                );
            }
        };

        let chosen = session.candidate_symptoms[index - 1].clone();
        info!(session_id = %session.id, symptom = %chosen, "Symptom selected");
        session.current_symptom = Some(chosen);

        TaskResult::new(
            vec![Message::bot(prompts::ASK_DAYS)],
            NextAction::GoTo(Stage::Days),
        )
    }
}

#[async_trait]
impl StageTask for SymptomTask {
    fn stage(&self) -> Stage {
        Stage::Symptom
    }

    async fn run(
        &self,
        session: &mut Session,
        utterance: &str,
        ctx: &TaskContext<'_>,
    ) -> Result<TaskResult> {
        if session.awaiting_selection() {
            return Ok(self.select(session, utterance));
        }

        let candidates = ctx.backend.lookup(utterance).await?;
        if candidates.is_empty() {
            warn!(session_id = %session.id, utterance, "No symptom matched");
            return Ok(TaskResult::rejected(InputError::NoMatch, prompts::NO_MATCH));
        }

        info!(
            session_id = %session.id,
            candidates = ?candidates,
            "Matched symptom candidates"
        );
        session.candidate_symptoms = candidates.clone();

        match ctx.config.selection {
            SelectionMode::Auto => {
                session.current_symptom = Some(candidates[0].clone());
                Ok(TaskResult::new(
                    vec![Message::options(candidates), Message::bot(prompts::ASK_DAYS)],
                    NextAction::GoTo(Stage::Days),
                ))
            }
            SelectionMode::Prompted => Ok(TaskResult::new(
                vec![
                    Message::bot(prompts::SELECT_CANDIDATE),
                    Message::bot(prompts::numbered(&candidates)),
                    Message::options(candidates),
                ],
                NextAction::WaitForInput,
            )),
        }
    }
}
