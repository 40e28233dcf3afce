//! Interview Core
//!
//! The conversation-state and prompt/response contract of the interview
//! practice partner. A [`ProfileStore`] is loaded once and shared; each
//! session gets its own [`InterviewOrchestrator`], which talks to a
//! caller-supplied [`Generator`].

pub mod error;
pub mod feedback;
pub mod generator;
pub mod loader;
pub mod orchestrator;
pub mod profile;
pub mod session;
pub mod template;

pub use error::{ConfigError, GenerationError, InterviewError, NotFoundError};
pub use feedback::FeedbackRecord;
pub use generator::{GenerationParams, Generator};
pub use orchestrator::InterviewOrchestrator;
pub use profile::ProfileStore;
pub use session::{InterviewState, SessionContext};
