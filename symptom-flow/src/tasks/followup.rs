use async_trait::async_trait;
use tracing::{debug, info};

use super::diagnose;
use crate::{
    error::Result,
    message::Message,
    protocol::followup_question,
    session::{Session, Stage},
    task::{NextAction, StageTask, TaskContext, TaskResult},
};

/// Walks the planned follow-up symptoms one yes/no answer at a time.
pub struct FollowupTask;

fn is_yes(utterance: &str) -> bool {
    utterance.trim().eq_ignore_ascii_case("yes")
}

#[async_trait]
impl StageTask for FollowupTask {
    fn stage(&self) -> Stage {
        Stage::Followup
    }

    async fn run(
        &self,
        session: &mut Session,
        utterance: &str,
        ctx: &TaskContext<'_>,
    ) -> Result<TaskResult> {
        if let Some(symptom) = session.pending_followup().map(str::to_string) {
            let confirmed = is_yes(utterance);
            debug!(session_id = %session.id, %symptom, confirmed, "Follow-up answered");
            if confirmed {
                session.confirm_symptom(&symptom);
            }
            session.followup_index += 1;
        }

        if let Some(next) = session.pending_followup() {
            return Ok(TaskResult::new(
                vec![Message::bot(followup_question(next))],
                NextAction::WaitForInput,
            ));
        }

        info!(
            session_id = %session.id,
            experienced = session.experienced_symptoms.len(),
            "Follow-up questions finished"
        );
        let messages = diagnose(session, ctx).await?;
        Ok(TaskResult::new(messages, NextAction::End))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::tasks::test_support::{FailingBackend, Fixture};

    fn followup_session() -> Session {
        let mut session = Session::new("s", Stage::Followup);
        session.current_symptom = Some("itching".into());
        session.days = Some(10);
        session.followup_symptoms = vec!["cough".into(), "chills".into(), "fatigue".into()];
        session
    }

    #[test]
    fn only_yes_counts() {
        assert!(is_yes("yes"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("y"));
        assert!(!is_yes("no"));
        assert!(!is_yes("maybe"));
    }

    #[tokio::test]
    async fn answers_advance_the_cursor_then_diagnose() {
        let fixture = Fixture::guided();
        let mut session = followup_session();

        let result = FollowupTask.run(&mut session, "yes", &fixture.ctx()).await.unwrap();
        assert_eq!(session.followup_index, 1);
        assert_eq!(result.next_action, NextAction::WaitForInput);
        assert_eq!(
            result.messages[0].text(),
            Some("Are you experiencing chills? (yes/no)")
        );

        FollowupTask.run(&mut session, "whatever", &fixture.ctx()).await.unwrap();
        assert_eq!(session.followup_index, 2);
        assert!(session.diagnosis.is_none());

        let result = FollowupTask.run(&mut session, "Yes", &fixture.ctx()).await.unwrap();
        assert_eq!(session.followup_index, 3);
        assert_eq!(result.next_action, NextAction::End);
        assert_eq!(session.experienced_symptoms, vec!["cough", "fatigue"]);

        let diagnosis = session.diagnosis.as_ref().unwrap();
        // 2 * 10 / 3
        assert!((diagnosis.severity.score - 20.0 / 3.0).abs() < 1e-9);
        assert!(result.messages[0].text().unwrap().starts_with("Based on your symptoms"));
        assert_eq!(result.messages.len(), 5);
    }

    #[tokio::test]
    async fn failed_prediction_is_an_error() {
        let config = EngineConfig::guided();
        let ctx = TaskContext {
            backend: &FailingBackend,
            config: &config,
        };
        let mut session = followup_session();
        session.followup_index = 2;
        assert!(FollowupTask.run(&mut session, "yes", &ctx).await.is_err());
        assert!(session.diagnosis.is_none());
    }
}
