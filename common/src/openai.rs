use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::settings::AiSettings;

const DEFAULT_USER_AGENT: &str = "Webcraft/1.0";

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Thin client for an OpenAI-compatible chat-completion endpoint.
pub struct OpenAiClient {
    client: Client,
    api_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(settings: &AiSettings) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::USER_AGENT, DEFAULT_USER_AGENT.parse()?);

        if let Some(raw_key) = settings.api_key.as_deref() {
            let key = raw_key.trim();
            if !key.is_empty() {
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    format!("Bearer {}", key).parse()?,
                );
            }
        }

        Ok(Self {
            client: Client::builder().default_headers(headers).build()?,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    /// Sends one completion request and returns the first choice's text.
    /// `messages` follow the chat-completion wire shape; content may be a
    /// plain string or an array of content parts (for image references).
    pub async fn chat_completion(
        &self,
        messages: &[Value],
        json_mode: bool,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        if let Some(max_tokens) = max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let url = format!("{}/chat/completions", self.api_url);
        let response = send_request_with_retry(self.client.post(&url).json(&body), &url).await?;
        let parsed: ChatCompletionResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("completion response contained no content"))
    }
}

async fn send_request_with_retry(req: RequestBuilder, url: &str) -> Result<Response> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        let response = req
            .try_clone()
            .ok_or_else(|| anyhow::anyhow!("failed to clone request"))?
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::OK => return Ok(response),
            StatusCode::TOO_MANY_REQUESTS => {
                if attempts >= 5 {
                    return Err(anyhow::anyhow!(
                        "Rate limit exceeded after {} attempts on {}",
                        attempts,
                        url
                    ));
                }

                let wait_time = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(10);

                tracing::warn!("Rate limit hit, waiting {}s...", wait_time);
                tokio::time::sleep(Duration::from_secs(wait_time)).await;
            }
            _ if status.is_server_error() => {
                if attempts >= 3 {
                    return Err(anyhow::anyhow!("Request failed: {} on {}", status, url));
                }
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempts))).await;
            }
            _ => {
                let detail = response.text().await.unwrap_or_default();
                return Err(anyhow::anyhow!(
                    "Request failed: {} on {}: {}",
                    status,
                    url,
                    detail
                ));
            }
        }
    }
}
