//! Gemini native provider implementation.
//!
//! Uses the `generateContent` endpoint directly (non-streaming).
//!
//! Features:
//! - `x-goog-api-key` header authentication
//! - System prompt as the top-level `system_instruction` field
//! - Native function calling with `functionCall` / `functionResponse` parts
//!
//! Gemini does not assign ids to function calls; this provider synthesizes
//! one per call and resolves it back to the function name when the tool
//! result is sent on the next request.

use async_trait::async_trait;
use daybook_core::error::ProviderError;
use daybook_core::message::{Message, MessageToolCall, Role};
use daybook_core::provider::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Extract system messages from the message list.
    /// Gemini takes the system prompt as a top-level field, not in contents.
    fn extract_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut non_system: Vec<&Message> = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(&msg.content),
                _ => non_system.push(msg),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system, non_system)
    }

    /// Convert messages to Gemini content objects.
    ///
    /// Tool results are matched back to their function name through the
    /// call ids recorded on earlier assistant messages.
    fn to_api_contents(messages: &[&Message]) -> Vec<GeminiContent> {
        let mut call_names: HashMap<String, String> = HashMap::new();
        let mut result = Vec::new();

        for msg in messages {
            match msg.role {
                Role::User => {
                    result.push(GeminiContent {
                        role: "user".into(),
                        parts: vec![GeminiPart::Text {
                            text: msg.content.clone(),
                        }],
                    });
                }
                Role::Assistant => {
                    let mut parts: Vec<GeminiPart> = Vec::new();
                    if !msg.content.is_empty() {
                        parts.push(GeminiPart::Text {
                            text: msg.content.clone(),
                        });
                    }
                    for tc in &msg.tool_calls {
                        call_names.insert(tc.id.clone(), tc.name.clone());
                        let args: serde_json::Value =
                            serde_json::from_str(&tc.arguments).unwrap_or_default();
                        parts.push(GeminiPart::FunctionCall {
                            function_call: GeminiFunctionCall {
                                name: tc.name.clone(),
                                args,
                            },
                        });
                    }
                    if !parts.is_empty() {
                        result.push(GeminiContent {
                            role: "model".into(),
                            parts,
                        });
                    }
                }
                Role::Tool => {
                    let call_id = msg.tool_call_id.clone().unwrap_or_default();
                    let name = call_names
                        .get(&call_id)
                        .cloned()
                        .unwrap_or_else(|| call_id.clone());
                    result.push(GeminiContent {
                        role: "user".into(),
                        parts: vec![GeminiPart::FunctionResponse {
                            function_response: GeminiFunctionResponse {
                                name,
                                response: serde_json::json!({ "result": msg.content }),
                            },
                        }],
                    });
                }
                Role::System => {} // handled separately
            }
        }

        result
    }

    /// Convert tool definitions to Gemini function declarations.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<GeminiToolGroup> {
        if tools.is_empty() {
            return Vec::new();
        }
        vec![GeminiToolGroup {
            function_declarations: tools
                .iter()
                .map(|t| GeminiFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                })
                .collect(),
        }]
    }

    /// Convert a Gemini API response to our ProviderResponse.
    fn response_to_provider_response(
        resp: GeminiResponse,
        requested_model: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        let candidate = resp.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::ApiError {
                status_code: 200,
                message: "Gemini response contained no candidates".into(),
            }
        })?;

        let mut text_content = String::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.parts {
            match part {
                GeminiPart::Text { text } => {
                    if !text_content.is_empty() {
                        text_content.push('\n');
                    }
                    text_content.push_str(&text);
                }
                GeminiPart::FunctionCall { function_call } => {
                    tool_calls.push(MessageToolCall {
                        id: format!("call_{}", Uuid::new_v4()),
                        name: function_call.name,
                        arguments: serde_json::to_string(&function_call.args)
                            .unwrap_or_default(),
                    });
                }
                GeminiPart::FunctionResponse { .. } => {} // never in a model reply
            }
        }

        let mut message = Message::assistant(text_content);
        message.tool_calls = tool_calls;

        let usage = resp.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(ProviderResponse {
            message,
            usage,
            model: resp
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let (system, messages) = Self::extract_system(&request.messages);
        let contents = Self::to_api_contents(&messages);

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": request.temperature,
            },
        });

        if let Some(max_tokens) = request.max_tokens {
            body["generationConfig"]["maxOutputTokens"] = serde_json::json!(max_tokens);
        }

        if let Some(ref sys) = system {
            body["system_instruction"] = serde_json::json!({
                "parts": [{ "text": sys }]
            });
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        debug!(provider = "gemini", model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GeminiResponse = response.json().await.map_err(|e| {
            ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Gemini response: {e}"),
            }
        })?;

        Self::response_to_provider_response(api_resp, &request.model)
    }
}

// --- Gemini API types ---

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GeminiFunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: GeminiFunctionResponse,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiToolGroup {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
    #[serde(rename = "modelVersion")]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
    #[serde(rename = "totalTokenCount", default)]
    total_token_count: u32,
}
