//! Error Taxonomy
//!
//! Every failure the interview core can report falls into one of three kinds:
//! configuration problems detected at load time, lookups of ids that are not
//! in the catalog, and failures of the text-generation backend. Malformed
//! feedback responses are deliberately absent here; they are absorbed into a
//! `FeedbackRecord` instead of surfacing as an error.

use std::fmt;
use std::path::PathBuf;

/// Malformed or incomplete configuration. Fatal: the system refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed {name}: {reason}")]
    Malformed { name: String, reason: String },
    #[error("Template '{template}' is malformed: {reason}")]
    MalformedTemplate { template: String, reason: String },
    #[error("Template '{template}' references undefined placeholder '{placeholder}'")]
    UnknownPlaceholder {
        template: String,
        placeholder: String,
    },
}

impl ConfigError {
    pub(crate) fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// The kind of catalog entry a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Role,
    Persona,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Role => write!(f, "role"),
            LookupKind::Persona => write!(f, "persona"),
        }
    }
}

/// Lookup of an id that the catalog does not contain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{id}'")]
pub struct NotFoundError {
    pub kind: LookupKind,
    pub id: String,
}

impl NotFoundError {
    pub fn role(id: &str) -> Self {
        Self {
            kind: LookupKind::Role,
            id: id.to_string(),
        }
    }

    pub fn persona(id: &str) -> Self {
        Self {
            kind: LookupKind::Persona,
            id: id.to_string(),
        }
    }
}

/// The generator failed or returned an unusable signal.
///
/// An empty completion is not a failure; backends must only return this
/// error when no completion could be produced at all.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Request(String),
    #[error("Generation backend returned an unusable response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for GenerationError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::Request(err.to_string())
    }
}

/// Umbrella error returned by the orchestrator's operations.
#[derive(Debug, thiserror::Error)]
pub enum InterviewError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        assert_eq!(
            NotFoundError::role("astronaut").to_string(),
            "Unknown role 'astronaut'"
        );
        assert_eq!(
            NotFoundError::persona("grumpy").to_string(),
            "Unknown persona 'grumpy'"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownPlaceholder {
            template: "summary".to_string(),
            placeholder: "salary".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Template 'summary' references undefined placeholder 'salary'"
        );
    }

    #[test]
    fn test_generation_error_is_transparent_in_umbrella() {
        let err: InterviewError = GenerationError::Request("connection refused".into()).into();
        assert_eq!(
            err.to_string(),
            "Generation request failed: connection refused"
        );
        assert!(matches!(err, InterviewError::Generation(_)));

        let err: InterviewError = NotFoundError::persona("mime").into();
        assert!(matches!(err, InterviewError::NotFound(_)));
    }
}
