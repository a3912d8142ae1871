// Conversation stage tasks
pub mod complete;
pub mod days;
pub mod followup;
pub mod name;
pub mod symptom;

// Shared prompts and helpers
pub mod prompts;

pub use complete::CompleteTask;
pub use days::DaysTask;
pub use followup::FollowupTask;
pub use name::NameTask;
pub use symptom::SymptomTask;

use tracing::info;

use crate::{
    error::Result,
    message::Message,
    protocol::PredictionRequest,
    session::Session,
    task::TaskContext,
};

/// Requests the prediction, stores it on the session and renders the result messages.
pub(crate) async fn diagnose(session: &mut Session, ctx: &TaskContext<'_>) -> Result<Vec<Message>> {
    let request = PredictionRequest {
        symptoms: session.experienced_symptoms.clone(),
        days: session.days.unwrap_or_default(),
        primary_symptom: session.current_symptom.clone(),
    };
    let diagnosis = ctx.backend.predict(&request).await?;

    info!(
        session_id = %session.id,
        disease = %diagnosis.disease,
        score = diagnosis.severity.score,
        level = ?diagnosis.severity.level,
        "Diagnosis computed"
    );

    let messages = vec![
        Message::bot(format!(
            "Based on your symptoms, you may have {}.",
            diagnosis.disease
        )),
        Message::bot(diagnosis.description.clone()),
        Message::bot(diagnosis.severity.advice.clone()),
        Message::bot("Take following measures:"),
        Message::bot(diagnosis.precautions.join("\n")),
    ];
    session.diagnosis = Some(diagnosis);
    Ok(messages)
}
