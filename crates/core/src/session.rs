use crate::feedback::{FeedbackRecord, average_scores};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The operation the orchestrator expects next.
///
/// This is informational: the orchestrator does not reject operations
/// called out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewState {
    #[default]
    Init,
    Question,
    Followup,
    Feedback,
    End,
}

impl fmt::Display for InterviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterviewState::Init => write!(f, "init"),
            InterviewState::Question => write!(f, "question"),
            InterviewState::Followup => write!(f, "followup"),
            InterviewState::Feedback => write!(f, "feedback"),
            InterviewState::End => write!(f, "end"),
        }
    }
}

/// Everything one interview session has accumulated.
///
/// Answers and feedback only ever grow; a new profile replaces the whole
/// context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub role: String,
    pub seniority: String,
    pub domain: String,
    pub persona: String,
    pub answers: Vec<String>,
    pub feedback: Vec<FeedbackRecord>,
}

impl SessionContext {
    pub fn new(role: String, seniority: String, domain: String, persona: String) -> Self {
        Self {
            role,
            seniority,
            domain,
            persona,
            answers: Vec::new(),
            feedback: Vec::new(),
        }
    }

    /// Per-axis mean of every score received so far.
    pub fn average_scores(&self) -> BTreeMap<String, f64> {
        average_scores(&self.feedback)
    }
}
