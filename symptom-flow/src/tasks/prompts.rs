pub const WELCOME: &str =
    "Welcome to the Healthcare Chatbot! I'm here to help diagnose potential health issues based on your symptoms.";
pub const ASK_NAME: &str = "Let's start with your name.";
pub const ASK_SYMPTOM: &str =
    "Hello! I am your healthcare assistant. What symptoms are you experiencing?";
pub const ASK_NAME_AGAIN: &str = "Please tell me your name.";
pub const ASK_DAYS: &str = "From how many days have you been experiencing this symptom?";
pub const SELECT_CANDIDATE: &str = "I found these matching symptoms. Please select one:";
pub const NO_MATCH: &str = "I couldn't find that symptom. Please try another one.";
pub const INVALID_SELECTION: &str = "Please enter a valid number from the list.";
pub const INVALID_DAYS: &str = "Please enter a valid number of days.";
pub const COMPLETE: &str = "The diagnosis is complete. Start a new conversation to continue.";

pub fn greeting(name: &str) -> String {
    format!("Hello, {name}! What symptom are you experiencing?")
}

pub fn days_out_of_range(min: u32, max: u32) -> String {
    format!("Please enter a valid number of days between {min} and {max}.")
}

/// `1. skin_rash\n2. itching`
pub fn numbered(candidates: &[String]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, symptom)| format!("{}. {}", i + 1, symptom))
        .collect::<Vec<_>>()
        .join("\n")
}
