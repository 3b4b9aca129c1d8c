use serde::{Deserialize, Serialize};

use crate::config::AgentSettings;
use crate::error::{ContextError, Result};

/// Minimal chat message for chat-completions payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: String,
    pub content: String,
}

impl AgentMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct AgentClient {
    settings: AgentSettings,
    http: reqwest::Client,
}

impl AgentClient {
    pub fn new(settings: AgentSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ContextError::Agent(format!("failed to build agent http client: {}", e)))?;

        Ok(Self { settings, http })
    }

    pub fn has_api_key(&self) -> bool {
        self.settings.api_key.is_some()
    }

    /// Send one completion request and return the trimmed text of the first choice.
    pub async fn complete(&self, messages: &[AgentMessage], max_tokens: u32) -> Result<String> {
        if messages.is_empty() {
            return Err(ContextError::Agent(
                "agent completion requires at least one message".to_string(),
            ));
        }

        let payload = ChatCompletionsRequest {
            model: self.settings.model.clone(),
            messages: messages.to_vec(),
            max_tokens: Some(max_tokens),
            temperature: Some(0.0),
            stream: Some(false),
        };

        let mut request = self.http.post(self.chat_completions_url()).json(&payload);
        if let Some(api_key) = self.settings.api_key.as_ref() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ContextError::Agent(format!(
                    "agent request timed out after {:?} (model={})",
                    self.settings.timeout, self.settings.model
                ))
            } else {
                ContextError::Agent(format!(
                    "agent request failed (model={}): {}",
                    self.settings.model, e
                ))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ContextError::Agent(format!("failed to read agent response body: {}", e)))?;

        if !status.is_success() {
            return Err(ContextError::Agent(format!(
                "agent endpoint returned HTTP {}: {}",
                status,
                truncate_for_error(&body)
            )));
        }

        let parsed: ChatCompletionsResponse = serde_json::from_str(&body).map_err(|e| {
            ContextError::Agent(format!(
                "invalid JSON from agent endpoint: {} (body={})",
                e,
                truncate_for_error(&body)
            ))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content.into_text())
            .ok_or_else(|| ContextError::Agent("agent response had no content".to_string()))
    }

    fn chat_completions_url(&self) -> String {
        let endpoint = self.settings.endpoint.trim().trim_end_matches('/');
        if endpoint.ends_with("/chat/completions") {
            endpoint.to_string()
        } else if endpoint.ends_with("/v1") {
            format!("{}/chat/completions", endpoint)
        } else {
            format!("{}/v1/chat/completions", endpoint)
        }
    }
}

fn truncate_for_error(value: &str) -> String {
    const LIMIT: usize = 400;
    if value.chars().count() <= LIMIT {
        value.to_string()
    } else {
        let head: String = value.chars().take(LIMIT).collect();
        format!("{}...", head)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<AgentMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: ChatContent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

impl ChatContent {
    fn into_text(self) -> Option<String> {
        let text = match self {
            ChatContent::Text(text) => text.trim().to_string(),
            ChatContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|p| p.text)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChatContentPart {
    #[serde(default)]
    text: Option<String>,
}
