//! Text Generation Backends
//!
//! The orchestrator depends only on the [`Generator`] trait: a prompt goes in,
//! a completion comes out. This abstraction lets a session run against a local
//! Ollama server, any OpenAI-compatible API, or a deterministic mock, without
//! the interview logic knowing which.

pub mod ollama;
pub mod openai;

use crate::error::{ConfigError, GenerationError};
use crate::profile::normalize_id;
use async_openai::config::OpenAIConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use ollama::OllamaGenerator;
pub use openai::OpenAICompatibleGenerator;

/// Sampling parameters derived from the session's persona.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    /// Upper bound on the completion length, in tokens.
    pub max_tokens: u32,
}

impl GenerationParams {
    /// Used for any persona without its own entry.
    pub const GENERAL: Self = Self {
        temperature: 0.7,
        top_p: 0.9,
        max_tokens: 150,
    };

    pub fn for_persona(persona: &str) -> Self {
        match normalize_id(persona).as_str() {
            "efficient" => Self {
                temperature: 0.3,
                top_p: 0.8,
                max_tokens: 150,
            },
            "empathetic" => Self {
                temperature: 0.7,
                top_p: 0.95,
                max_tokens: 200,
            },
            "direct" => Self {
                temperature: 0.2,
                top_p: 0.7,
                max_tokens: 120,
            },
            "chatty" => Self {
                temperature: 0.9,
                top_p: 1.0,
                max_tokens: 220,
            },
            _ => Self::GENERAL,
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::GENERAL
    }
}

/// A text-completion capability.
///
/// Implementations must report failures as `Err`; an `Ok` empty string is a
/// legitimate (if unhelpful) completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError>;
}

/// A `Generator` that always returns the same reply.
///
/// Useful for exercising a full session offline; its replies are not JSON, so
/// feedback always falls back to the rubric guidance.
#[derive(Debug, Clone)]
pub struct CannedGenerator {
    reply: String,
}

impl CannedGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for CannedGenerator {
    fn default() -> Self {
        Self::new("Tell me about a recent project you are proud of and the hardest problem you solved in it.")
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        Ok(self.reply.clone())
    }
}

/// Supported generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    OpenAI,
    Mock,
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAI),
            "mock" => Ok(Provider::Mock),
            other => Err(format!("'{other}' is not a supported provider (ollama, openai, mock)")),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Ollama => write!(f, "ollama"),
            Provider::OpenAI => write!(f, "openai"),
            Provider::Mock => write!(f, "mock"),
        }
    }
}

/// Everything needed to construct a generator for a given provider.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub provider: Provider,
    pub model: String,
    pub ollama_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
}

/// Builds the generator selected by `settings`.
pub fn build_generator(settings: &GeneratorSettings) -> Result<Arc<dyn Generator>, ConfigError> {
    match settings.provider {
        Provider::Ollama => Ok(Arc::new(OllamaGenerator::new(
            settings.ollama_url.clone(),
            settings.model.clone(),
        ))),
        Provider::OpenAI => {
            let api_key = settings.openai_api_key.as_ref().ok_or_else(|| {
                ConfigError::malformed("generator settings", "an API key is required for 'openai'")
            })?;
            let config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(&settings.openai_base_url);
            Ok(Arc::new(OpenAICompatibleGenerator::new(
                config,
                settings.model.clone(),
            )))
        }
        Provider::Mock => Ok(Arc::new(CannedGenerator::default())),
    }
}
