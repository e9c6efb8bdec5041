mod api;

use crate::api::{ErrorResponse, GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use mailsmith_core::credentials::ApiKey;
use mailsmith_core::generator::TextGenerator;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Url(#[from] url::ParseError),
    #[error("Gemini API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Gemini response contained no text")]
    EmptyResponse,
}

pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: Url,
    model: String,
}

impl GeminiGenerator {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = with_trailing_slash(base_url);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> Result<Url, GeminiError> {
        let path = format!("v1beta/models/{}:generateContent", self.model);
        Ok(self.base_url.join(&path)?)
    }

    pub async fn generate_content(&self, api_key: &str, prompt: &str) -> Result<String, GeminiError> {
        let resp = self
            .client
            .post(self.endpoint()?)
            .header(API_KEY_HEADER, api_key)
            .json(&GenerateContentRequest::text(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error) if !error.error.message.is_empty() => error.error.message,
                _ if !body.is_empty() => body,
                _ => status.canonical_reason().unwrap_or_default().to_string(),
            };
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = resp
            .json::<GenerateContentResponse>()
            .await?
            .into_text()
            .ok_or(GeminiError::EmptyResponse)?;
        debug!(model = %self.model, "Gemini returned {} characters", text.len());
        Ok(text)
    }
}

/// `Url::join` replaces the last segment of a base without a trailing slash.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate_text(
        &self,
        credential: &ApiKey,
        prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.generate_content(credential.expose(), prompt).await?)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn generator(server: &MockServer) -> GeminiGenerator {
        GeminiGenerator::new(reqwest::Client::new()).with_base_url(server.uri().parse().unwrap())
    }

    #[tokio::test]
    async fn test_generate_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header(API_KEY_HEADER, "gemini-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "Write a subject"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "Deadline "}, {"text": "Extension Request"}]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator(&server)
            .generate_content("gemini-key", "Write a subject")
            .await
            .unwrap();

        assert_eq!(text, "Deadline Extension Request");
    }

    #[tokio::test]
    async fn test_custom_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": ""}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator(&server)
            .with_model("gemini-2.0-pro")
            .generate_content("gemini-key", "Anything")
            .await
            .unwrap();

        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/gemini{GENERATE_PATH}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Hello"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let base_url = format!("{}/gemini", server.uri()).parse().unwrap();
        let text = GeminiGenerator::new(reqwest::Client::new())
            .with_base_url(base_url)
            .generate_content("gemini-key", "Say hello")
            .await
            .unwrap();

        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let error = generator(&server)
            .generate_content("bad-key", "Anything")
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            GeminiError::Api { status: 400, ref message } if message == "API key not valid. Please pass a valid API key."
        ));
    }

    #[tokio::test]
    async fn test_plain_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let error = generator(&server)
            .generate_content("gemini-key", "Anything")
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Gemini API returned 503: overloaded");
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let error = generator(&server)
            .generate_content("gemini-key", "Anything")
            .await
            .unwrap_err();

        assert!(matches!(error, GeminiError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_text_generator_passes_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header(API_KEY_HEADER, "from-config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Hello"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential: ApiKey = "from-config".parse().unwrap();
        let text = generator(&server)
            .generate_text(&credential, "Say hello")
            .await
            .unwrap();

        assert_eq!(text, "Hello");
    }
}
