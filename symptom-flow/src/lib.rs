pub mod backend;
pub mod config;
pub mod diagnosis;
pub mod engine;
pub mod error;
pub mod followup;
#[cfg(feature = "remote")]
pub mod http;
pub mod matching;
pub mod message;
pub mod protocol;
pub mod reference;
pub mod runner;
pub mod session;
pub mod storage;
pub mod task;
pub mod tasks;

// Re-export commonly used types
pub use backend::{LocalBackend, SymptomBackend};
pub use config::{DiseaseStrategy, EngineConfig, FollowupStrategy, SelectionMode};
pub use diagnosis::{
    Diagnosis, DiseaseSelector, RandomSelector, Severity, SeverityLevel, SymptomOverlapSelector,
    Verdict,
};
pub use engine::{ConversationEngine, EngineBuilder, Turn, TurnStatus};
pub use error::{FlowError, InputError, ReferenceError, Result};
pub use followup::{CoOccurrenceFollowups, FollowupPlanner, RandomFollowups};
#[cfg(feature = "remote")]
pub use http::HttpBackend;
pub use message::{Message, MessageContent, MessageKind};
pub use reference::{Disease, ReferenceData};
pub use runner::FlowRunner;
pub use session::{Session, Stage};
pub use storage::{InMemorySessionStorage, SessionStorage};
pub use task::{NextAction, StageTask, TaskContext, TaskResult};
