use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::{
    error::AppError,
    utils::{config::AppConfig, prompts::description_rewrite_prompt},
};

/// A single prompt-in, text-out call to a generative model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

/// Talks to any OpenAI compatible chat completions endpoint. Defaults point
/// it at Gemini.
pub struct OpenAiCompatibleGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompatibleGenerator {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(config: &AppConfig, http_client: reqwest::Client) -> Self {
        let client = Client::with_config(
            OpenAIConfig::new()
                .with_api_key(&config.gemini_api_key)
                .with_api_base(&config.generation_base_url),
        )
        .with_http_client(http_client);

        Self::new(client, config.generation_model.clone())
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    #[instrument(skip_all, fields(model = %self.model, prompt_bytes = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessage::from(prompt.to_string()).into()])
            .build()
            .map_err(|e| AppError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::Generation(format!("Generation request failed: {e}")))?;

        debug!(choices = response.choices.len(), "Received completion");

        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::Generation("No content found in model response".into()))
    }
}

/// Rewrites a raw issue description. Failures are returned to the caller,
/// which decides whether to fall back to the raw text.
pub async fn enhance_description(
    generator: &dyn TextGenerator,
    raw_text: &str,
) -> Result<String, AppError> {
    generator
        .generate(&description_rewrite_prompt(raw_text))
        .await
}
