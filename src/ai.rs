use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ReasoningEffort,
    },
};
use async_trait::async_trait;
use tokio::time::{Duration, timeout};

use crate::error::AIError;
use crate::message::{ChatMessage, ChatRole};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

// The transport has its own timeouts, but an explicit bound keeps a wedged
// connection from suspending a generation indefinitely.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(10);
const TEMPERATURE: f32 = 0.9;
const MAX_COMPLETION_TOKENS: u32 = 120;

/// The seam between the generator and the external text-generation service.
/// Tests inject stubs; production uses [`OpenAIPromptModel`].
#[async_trait]
pub trait PromptModel: Send + Sync {
    /// Produces one completion for the given role-tagged conversation.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AIError>;
}

pub struct OpenAIPromptModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIPromptModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, AIError> {
    let request_message = match message.role {
        ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
    };
    Ok(request_message)
}

#[async_trait]
impl PromptModel for OpenAIPromptModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AIError> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .temperature(TEMPERATURE)
            .max_completion_tokens(MAX_COMPLETION_TOKENS)
            .reasoning_effort(ReasoningEffort::Low)
            .messages(messages)
            .build()?;

        let response = timeout(COMPLETION_TIMEOUT, self.client.chat().create(request))
            .await
            .map_err(|_| AIError::Timeout)??;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(AIError::EmptyCompletion)?;

        Ok(content.trim().to_string())
    }
}
