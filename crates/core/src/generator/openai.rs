use super::{GenerationParams, Generator};
use crate::error::GenerationError;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use tracing::debug;

/// A `Generator` for any OpenAI-compatible chat completions API.
pub struct OpenAICompatibleGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleGenerator {
    /// Creates a new generator.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL of the service.
    /// * `model` - The model identifier to use for chat completions (e.g., "gpt-4o").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl Generator for OpenAICompatibleGenerator {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .temperature(params.temperature)
            .top_p(params.top_p)
            .max_completion_tokens(params.max_tokens)
            .build()?;
        debug!(model = %self.model, prompt_len = prompt.len(), "Sending chat completion request");

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .ok_or_else(|| GenerationError::InvalidResponse("No response choice from LLM".to_string()))?
            .message
            .content
            .clone()
            .ok_or_else(|| GenerationError::InvalidResponse("No content in LLM response".to_string()))
    }
}
