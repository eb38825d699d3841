use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ServiceError;
use crate::models::{ChatMessage, ChatRole};
use crate::openai::OpenAiClient;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComponentAnalysis {
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub framework: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub description: String,
    #[serde(default)]
    pub figma_link: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
    pub target_components: Vec<String>,
    #[serde(default)]
    pub existing_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneratedComponent {
    #[serde(default)]
    pub updated_code: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[async_trait::async_trait]
pub trait AssistantService: Send + Sync {
    async fn analyze_codebase(&self, codebase: &str) -> Result<ComponentAnalysis, ServiceError>;
    async fn generate_component(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedComponent, ServiceError>;
    async fn chat(
        &self,
        messages: &[ChatMessage],
        context: Option<&str>,
    ) -> Result<String, ServiceError>;
    async fn describe_design(&self, base64_image: &str) -> Result<String, ServiceError>;
}

pub struct OpenAiAssistant {
    client: OpenAiClient,
}

impl OpenAiAssistant {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    fn upstream_error(context: &str, err: anyhow::Error) -> ServiceError {
        ServiceError::new(502, format!("{}: {}", context, err))
    }

    fn parse_json_reply<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, ServiceError> {
        serde_json::from_str(raw)
            .map_err(|e| ServiceError::new(502, format!("assistant returned malformed JSON: {}", e)))
    }

    fn role_name(role: ChatRole) -> &'static str {
        match role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    fn image_part(base64_image: &str) -> Value {
        json!({
            "type": "image_url",
            "image_url": { "url": format!("data:image/jpeg;base64,{}", base64_image) }
        })
    }
}

#[async_trait::async_trait]
impl AssistantService for OpenAiAssistant {
    async fn analyze_codebase(&self, codebase: &str) -> Result<ComponentAnalysis, ServiceError> {
        let messages = vec![
            json!({
                "role": "system",
                "content": "You are a React/Next.js code analysis expert. Analyze the provided \
                            codebase and extract information about components, framework, and \
                            provide suggestions for improvements. Respond with JSON in this \
                            format: { 'components': string[], 'framework': string, \
                            'suggestions': string[] }",
            }),
            json!({
                "role": "user",
                "content": format!("Analyze this codebase:\n\n{}", codebase),
            }),
        ];

        let reply = self
            .client
            .chat_completion(&messages, true, None)
            .await
            .map_err(|e| Self::upstream_error("failed to analyze codebase", e))?;
        Self::parse_json_reply(&reply)
    }

    async fn generate_component(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedComponent, ServiceError> {
        let mut user_content = format!(
            "Generate updated React components based on this request:\n\n\
             Description: {}\nTarget Components: {}\n",
            request.description,
            request.target_components.join(", ")
        );
        if let Some(figma_link) = &request.figma_link {
            user_content.push_str(&format!("\nFigma Link: {}", figma_link));
        }
        if let Some(existing_code) = &request.existing_code {
            user_content.push_str(&format!("\nExisting Code:\n{}", existing_code));
        }

        let mut messages = vec![
            json!({
                "role": "system",
                "content": "You are an expert React/Next.js developer. Generate clean, \
                            production-ready code based on user requirements. Always preserve \
                            existing functionality while implementing requested changes. \
                            Respond with JSON in this format: { 'updated_code': string, \
                            'explanation': string, 'questions': string[], \
                            'dependencies': string[] }",
            }),
            json!({ "role": "user", "content": user_content }),
        ];

        for screenshot in &request.screenshots {
            messages.push(json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": "Please also consider this design reference:" },
                    Self::image_part(screenshot),
                ],
            }));
        }

        let reply = self
            .client
            .chat_completion(&messages, true, Some(4000))
            .await
            .map_err(|e| Self::upstream_error("failed to generate code", e))?;
        Self::parse_json_reply(&reply)
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        context: Option<&str>,
    ) -> Result<String, ServiceError> {
        let system = match context {
            Some(context) => format!(
                "You are a helpful AI assistant for Webcraft, a tool that helps users build \
                 websites with AI. Context: {}",
                context
            ),
            None => "You are a helpful AI assistant for Webcraft, a tool that helps users \
                     build websites with AI."
                .to_string(),
        };

        let mut outbound = vec![json!({ "role": "system", "content": system })];
        outbound.extend(messages.iter().map(|m| {
            json!({ "role": Self::role_name(m.role), "content": m.content })
        }));

        self.client
            .chat_completion(&outbound, false, Some(1000))
            .await
            .map_err(|e| Self::upstream_error("failed to chat with assistant", e))
    }

    async fn describe_design(&self, base64_image: &str) -> Result<String, ServiceError> {
        let messages = vec![json!({
            "role": "user",
            "content": [
                {
                    "type": "text",
                    "text": "Analyze this design image and provide detailed description of \
                             the UI elements, layout, colors, typography, and any interactive \
                             components you can identify. Focus on aspects that would be \
                             useful for implementing this design in React/Next.js."
                },
                Self::image_part(base64_image),
            ],
        })];

        self.client
            .chat_completion(&messages, false, Some(500))
            .await
            .map_err(|e| Self::upstream_error("failed to analyze design image", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AiSettings;
    use chrono::Utc;

    fn unreachable_assistant() -> OpenAiAssistant {
        let client = OpenAiClient::new(&AiSettings {
            api_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
        })
        .unwrap();
        OpenAiAssistant::new(client)
    }

    #[tokio::test]
    async fn assistant_surfaces_upstream_failures_as_bad_gateway() {
        let assistant = unreachable_assistant();
        let err = assistant.analyze_codebase("const x = 1;").await.unwrap_err();
        assert_eq!(err.code, 502);

        let messages = [ChatMessage {
            role: ChatRole::User,
            content: "hello".to_string(),
            timestamp: Utc::now(),
        }];
        assert_eq!(assistant.chat(&messages, None).await.unwrap_err().code, 502);
    }

    #[test]
    fn json_replies_tolerate_missing_fields() {
        let analysis: ComponentAnalysis =
            OpenAiAssistant::parse_json_reply(r#"{"framework":"Next.js"}"#).unwrap();
        assert_eq!(analysis.framework, "Next.js");
        assert!(analysis.components.is_empty());

        let generated: GeneratedComponent =
            OpenAiAssistant::parse_json_reply(r#"{"updated_code":"<div />"}"#).unwrap();
        assert_eq!(generated.updated_code, "<div />");
        assert!(generated.questions.is_empty());
    }

    #[test]
    fn malformed_json_replies_are_rejected() {
        let result: Result<ComponentAnalysis, _> =
            OpenAiAssistant::parse_json_reply("not json at all");
        assert_eq!(result.unwrap_err().code, 502);
    }
}
