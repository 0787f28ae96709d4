//! Blocking client for OpenAI-compatible chat completion endpoints.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use draftloop_core::prompt::{generation_prompt, section_prompt};
use draftloop_core::{
    DraftGenerator, GenerationOptions, RetryPolicy, SectionAnalyzer, SectionMode, ServiceError,
};

use crate::config::Config;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

pub struct ChatClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
    draft_model: String,
    analysis_model: String,
    temperature: f32,
    timeout_secs: u64,
    retry: RetryPolicy,
}

impl ChatClient {
    pub fn new(config: &Config) -> Result<Self, ServiceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            draft_model: config.draft_model.clone(),
            analysis_model: config.analysis_model.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
            retry: config.retry_policy(),
        })
    }

    fn complete(&self, model: &str, content: &str, temperature: Option<f32>) -> Result<String, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ServiceError::Unauthorized("no API key configured".to_string()))?;
        let request = ChatRequest {
            model,
            messages: [Message {
                role: "user",
                content,
            }],
            temperature,
        };

        info!(model, chars = content.len(), "sending chat completion");
        self.retry.run(|| {
            let resp = self
                .http
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .json(&request)
                .send()
                .map_err(|e| self.transport_error(e))?;

            let status = resp.status();
            let body = resp.text().map_err(|e| self.transport_error(e))?;
            debug!(status = status.as_u16(), bytes = body.len(), "chat completion response");
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(ServiceError::Unauthorized(body));
            }
            if !status.is_success() {
                return Err(ServiceError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            parse_reply(&body)
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout_secs)
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

/// Extract the first choice's text from a chat completion body
fn parse_reply(body: &str) -> Result<String, ServiceError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| ServiceError::Malformed("response has no message content".to_string()))
}

impl DraftGenerator for ChatClient {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, ServiceError> {
        let full = generation_prompt(prompt, options);
        self.complete(&self.draft_model, &full, Some(self.temperature))
    }
}

impl SectionAnalyzer for ChatClient {
    fn analyze(&self, text: &str, mode: SectionMode) -> Result<String, ServiceError> {
        self.complete(&self.analysis_model, &section_prompt(text, mode), None)
    }
}
