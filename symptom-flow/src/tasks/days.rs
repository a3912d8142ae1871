use async_trait::async_trait;
use tracing::{info, warn};

use super::{diagnose, prompts};
use crate::{
    config::{EngineConfig, SelectionMode},
    error::{InputError, Result},
    matching::normalize,
    message::Message,
    protocol::followup_question,
    session::{Session, Stage},
    task::{NextAction, StageTask, TaskContext, TaskResult},
};

/// Reads how long the symptom has lasted and plans the follow-up questions.
pub struct DaysTask;

/// Accepts a leading integer ("15" or "15 days").
fn parse_days(utterance: &str, config: &EngineConfig) -> std::result::Result<u32, InputError> {
    let token = utterance
        .split_whitespace()
        .next()
        .ok_or(InputError::InvalidNumber)?;
    let value: i64 = token.parse().map_err(|_| InputError::InvalidNumber)?;

    match config.days_range {
        Some((min, max)) => {
            if value < i64::from(min) || value > i64::from(max) {
                return Err(InputError::OutOfRange { min, max });
            }
            Ok(value as u32)
        }
        None => u32::try_from(value).map_err(|_| InputError::InvalidNumber),
    }
}

#[async_trait]
impl StageTask for DaysTask {
    fn stage(&self) -> Stage {
        Stage::Days
    }

    async fn run(
        &self,
        session: &mut Session,
        utterance: &str,
        ctx: &TaskContext<'_>,
    ) -> Result<TaskResult> {
        // an option picked from the candidate list replaces the primary symptom
        if ctx.config.selection == SelectionMode::Auto {
            let picked = normalize(utterance);
            if let Some(candidate) = session
                .candidate_symptoms
                .iter()
                .find(|c| c.to_lowercase() == picked)
            {
                info!(session_id = %session.id, symptom = %candidate, "Symptom re-selected");
                session.current_symptom = Some(candidate.clone());
                return Ok(TaskResult::new(
                    vec![Message::bot(prompts::ASK_DAYS)],
                    NextAction::WaitForInput,
                ));
            }
        }

        let days = match parse_days(utterance, ctx.config) {
            Ok(days) => days,
            Err(rejection) => {
                warn!(session_id = %session.id, utterance, %rejection, "Invalid days input");
                let prompt = match &rejection {
                    InputError::OutOfRange { min, max } => prompts::days_out_of_range(*min, *max),
                    _ => prompts::INVALID_DAYS.to_string(),
                };
                return Ok(TaskResult::rejected(rejection, prompt));
            }
        };
        session.days = Some(days);

        let symptom = session.current_symptom.clone().unwrap_or_default();
        let followups: Vec<String> = ctx
            .backend
            .followups(&symptom)
            .await?
            .into_iter()
            .filter(|s| *s != symptom)
            .collect();
        info!(
            session_id = %session.id,
            days,
            followups = followups.len(),
            "Planned follow-up questions"
        );
        session.followup_symptoms = followups;
        session.followup_index = 0;

        match session.pending_followup() {
            Some(first) => Ok(TaskResult::new(
                vec![Message::bot(followup_question(first))],
                NextAction::GoTo(Stage::Followup),
            )),
            None => {
                let messages = diagnose(session, ctx).await?;
                Ok(TaskResult::new(messages, NextAction::End))
            }
        }
    }
}
