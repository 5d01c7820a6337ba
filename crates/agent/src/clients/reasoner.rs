use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ClientError;
use super::http::HttpJson;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
}

impl TokenCounts {
    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reasoning {
    pub content: String,
    pub tokens: TokenCounts,
}

/// The reasoning runtime behind investigations.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn run(&self, messages: &[ChatMessage]) -> Result<Reasoning, ClientError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiReasoner {
    http: HttpJson,
    model: String,
}

impl OpenAiReasoner {
    pub fn new(http: HttpJson, model: String) -> Self {
        Self { http, model }
    }
}

#[async_trait]
impl Reasoner for OpenAiReasoner {
    async fn run(&self, messages: &[ChatMessage]) -> Result<Reasoning, ClientError> {
        let req = CompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.2,
        };
        let resp: CompletionResponse = self.http.post(&["chat", "completions"], &req).await?;
        let content = resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClientError::Decode("completion has no choices".into()))?;
        let tokens = resp
            .usage
            .map(|u| TokenCounts {
                input: u.prompt_tokens,
                output: u.completion_tokens,
            })
            .unwrap_or_default();
        Ok(Reasoning { content, tokens })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_response_decodes() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "{\"summary\":\"ok\"}"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 30}
        }"#;
        let resp: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.choices[0].message.content, "{\"summary\":\"ok\"}");
        let usage = resp.usage.unwrap();
        assert_eq!(usage.prompt_tokens + usage.completion_tokens, 150);
    }

    #[test]
    fn token_total() {
        let t = TokenCounts { input: 7, output: 5 };
        assert_eq!(t.total(), 12);
    }
}
