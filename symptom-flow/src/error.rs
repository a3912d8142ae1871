use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Stage;

/// Errors that abort a turn. The session handed to the engine is left untouched.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No task registered for stage: {0}")]
    TaskNotFound(Stage),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Reference data error: {0}")]
    Reference(#[from] ReferenceError),
}

/// Problems found while loading or validating the symptom vocabulary and disease catalog.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("failed to read reference data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse reference data: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("symptom vocabulary is empty")]
    EmptyVocabulary,

    #[error("disease catalog is empty")]
    EmptyCatalog,

    #[error("duplicate symptom in vocabulary: {0}")]
    DuplicateSymptom(String),

    #[error("duplicate disease in catalog: {0}")]
    DuplicateDisease(String),
}

/// Recoverable input problems. The stage does not change and the user is re-prompted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputError {
    #[error("empty input")]
    EmptyInput,

    #[error("no matching symptom")]
    NoMatch,

    #[error("selection must be between 1 and {len}")]
    InvalidSelection { len: usize },

    #[error("not a valid number")]
    InvalidNumber,

    #[error("number must be between {min} and {max}")]
    OutOfRange { min: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, FlowError>;
