//! Text generation behind a trait, with an OpenAI-compatible HTTP client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use concierge_core::config::GeneratorConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ChatError;
use crate::types::{CompletionRequest, PromptMessage};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest slice of an error body kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// Produces a reply from a prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Run one completion and return the reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatError>;

    /// Model identifier, for stats and logging.
    fn model(&self) -> &str;

    /// Whether this generator can ever succeed.
    fn is_available(&self) -> bool {
        true
    }
}

/// Pick the generator for a configuration: HTTP when an API key is set,
/// otherwise one that always fails over to local replies.
pub fn from_config(config: &GeneratorConfig) -> Result<Arc<dyn Generator>, ChatError> {
    match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(Arc::new(HttpGenerator::new(config)?)),
        _ => {
            warn!("No generator API key configured; replies will use local fallbacks");
            Ok(Arc::new(DisabledGenerator::new(config.model.clone())))
        }
    }
}

// =============================================================================
// HTTP generator
// =============================================================================

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST {base_url}/chat/completions` with bearer auth.
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpGenerator {
    /// Build a client from configuration. Fails without an API key.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ChatError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ChatError::Upstream("generator API key is not configured".into()))?
            .to_string();

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Upstream(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        info!(endpoint = %endpoint, model = %config.model, "HTTP generator ready");

        Ok(Self {
            client,
            endpoint,
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            stream: false,
        };
        debug!(
            endpoint = %self.endpoint,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(ChatError::Upstream(format!(
                "HTTP {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Upstream(format!("unreadable completion response: {}", e)))?;
        extract_content(parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// First choice's text, trimmed. Missing or blank text is an upstream error.
fn extract_content(response: ChatCompletionResponse) -> Result<String, ChatError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ChatError::Upstream("completion response had no content".into()))
}

// =============================================================================
// Disabled generator
// =============================================================================

/// Stand-in used when no API key is configured. Every call fails.
pub struct DisabledGenerator {
    model: String,
}

impl DisabledGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

#[async_trait]
impl Generator for DisabledGenerator {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, ChatError> {
        Err(ChatError::Upstream("generator is not configured".into()))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        false
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::types::Role;

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                PromptMessage::system("You are helpful."),
                PromptMessage::user("What are your hours?"),
            ],
            max_tokens: 200,
            temperature: 0.8,
            top_p: 0.9,
        }
    }

    fn config_for(base_url: &str) -> GeneratorConfig {
        GeneratorConfig {
            api_key: Some("test-key".to_string()),
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..GeneratorConfig::default()
        }
    }

    /// Serve exactly one HTTP response, returning the raw request text.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(split) = text.find("\r\n\r\n") {
                    let content_length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + content_length {
                        break;
                    }
                }
            }
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    // ---- Configuration ----

    #[test]
    fn test_http_generator_requires_key() {
        let config = GeneratorConfig::default();
        assert!(matches!(
            HttpGenerator::new(&config),
            Err(ChatError::Upstream(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let gen = HttpGenerator::new(&config_for("https://example.test/v1/")).unwrap();
        assert_eq!(gen.endpoint, "https://example.test/v1/chat/completions");
        assert_eq!(gen.model(), "llama-3.1-8b-instant");
    }

    #[test]
    fn test_from_config_without_key_is_disabled() {
        let gen = from_config(&GeneratorConfig::default()).unwrap();
        assert!(!gen.is_available());
        let blank = GeneratorConfig {
            api_key: Some("  ".to_string()),
            ..GeneratorConfig::default()
        };
        assert!(!from_config(&blank).unwrap().is_available());
    }

    #[test]
    fn test_from_config_with_key_is_available() {
        let gen = from_config(&config_for("https://example.test/v1")).unwrap();
        assert!(gen.is_available());
    }

    // ---- Response parsing ----

    #[test]
    fn test_extract_content_trims() {
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  We open at 9.  "}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(parsed).unwrap(), "We open at 9.");
    }

    #[test]
    fn test_extract_content_rejects_empty() {
        let empty: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"   "}}]}"#).unwrap();
        assert!(extract_content(empty).is_err());
        let none: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(extract_content(none).is_err());
        let null: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(extract_content(null).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let req = request();
        let body = ChatCompletionBody {
            model: "m",
            messages: &req.messages,
            max_tokens: 200,
            temperature: 0.8,
            top_p: 0.9,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "What are your hours?");
    }

    // ---- HTTP round trips ----

    #[tokio::test]
    async fn test_complete_success() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"We are open 9am-5pm."}}]}"#,
        )
        .await;
        let gen = HttpGenerator::new(&config_for(&url)).unwrap();
        let reply = gen.complete(&request()).await.unwrap();
        assert_eq!(reply, "We are open 9am-5pm.");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /chat/completions"));
        assert!(raw.to_ascii_lowercase().contains("authorization: bearer test-key"));
        assert!(raw.contains("\"top_p\":0.9"));
    }

    #[tokio::test]
    async fn test_complete_non_success_status() {
        let (url, _server) =
            serve_once("503 Service Unavailable", r#"{"error":"overloaded"}"#).await;
        let gen = HttpGenerator::new(&config_for(&url)).unwrap();
        let err = gen.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ChatError::Upstream(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_complete_unparseable_body() {
        let (url, _server) = serve_once("200 OK", "not json").await;
        let gen = HttpGenerator::new(&config_for(&url)).unwrap();
        assert!(gen.complete(&request()).await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_generator_always_fails() {
        let gen = DisabledGenerator::new("none");
        assert!(gen.complete(&request()).await.is_err());
        assert_eq!(gen.model(), "none");
        assert_eq!(request().messages[1].role, Role::User);
    }
}
