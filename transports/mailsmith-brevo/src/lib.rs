mod api;

use crate::api::{CreateSmtpEmail, SendSmtpEmail};
use async_trait::async_trait;
use mailsmith_core::credentials::ApiKey;
use mailsmith_core::provider::{
    EmailProvider, OutboundMessage, ProviderApiError, ProviderError, SentMessage,
};
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.brevo.com/";

const API_KEY_HEADER: &str = "api-key";

/// Brevo (formerly Sendinblue) transactional email API.
pub struct BrevoTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl BrevoTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = with_trailing_slash(base_url);
        self
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
impl EmailProvider for BrevoTransport {
    async fn send(
        &self,
        credential: &ApiKey,
        message: &OutboundMessage,
    ) -> Result<SentMessage, ProviderError> {
        let url = self
            .base_url
            .join("v3/smtp/email")
            .map_err(|e| ProviderError::Transport(e.into()))?;

        let resp = self
            .client
            .post(url)
            .header(API_KEY_HEADER, credential.expose())
            .header(ACCEPT, "application/json")
            .json(&SendSmtpEmail::from(message))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.into()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.ok().filter(|body| !body.is_empty());
            return Err(ProviderError::Api(ProviderApiError {
                status: Some(status.as_u16()),
                reason: status.canonical_reason().map(str::to_owned),
                body,
            }));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.into()))?;
        // Brevo answers 201 with `{"messageId": ...}`; anything else still means accepted
        let created: CreateSmtpEmail = serde_json::from_str(&body).unwrap_or_default();
        debug!(
            recipients = message.to.len(),
            "Brevo accepted message {:?}", created.message_id
        );

        Ok(SentMessage {
            message_id: created.message_id,
        })
    }

    fn name(&self) -> &'static str {
        "brevo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsmith_core::provider::SenderMailbox;
    use mailsmith_core::recipient::RecipientEntry;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(server: &MockServer) -> BrevoTransport {
        BrevoTransport::new(reqwest::Client::new()).with_base_url(server.uri().parse().unwrap())
    }

    fn credential() -> ApiKey {
        "xkeysib-test".parse().unwrap()
    }

    fn message() -> OutboundMessage {
        OutboundMessage {
            sender: SenderMailbox {
                name: "No-Reply".to_string(),
                email: "noreply@mailsmith.test".to_string(),
            },
            to: vec![
                RecipientEntry {
                    email: "a@x.com".to_string(),
                    name: Some("A".to_string()),
                },
                RecipientEntry {
                    email: "b@y.com".to_string(),
                    name: None,
                },
            ],
            subject: "Deadline".to_string(),
            html_content: "<pre>Hi</pre>".to_string(),
            text_content: "Hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/smtp/email"))
            .and(header(API_KEY_HEADER, "xkeysib-test"))
            .and(body_json(json!({
                "sender": {"name": "No-Reply", "email": "noreply@mailsmith.test"},
                "to": [{"email": "a@x.com", "name": "A"}, {"email": "b@y.com"}],
                "subject": "Deadline",
                "htmlContent": "<pre>Hi</pre>",
                "textContent": "Hi"
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"messageId": "<202501011200.123@smtp-relay.mailin.fr>"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sent = transport(&server)
            .send(&credential(), &message())
            .await
            .unwrap();

        assert_eq!(
            sent.message_id.as_deref(),
            Some("<202501011200.123@smtp-relay.mailin.fr>")
        );
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/relay/brevo/v3/smtp/email"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"messageId": "<id@relay>"})))
            .expect(1)
            .mount(&server)
            .await;

        let base_url = format!("{}/relay/brevo", server.uri()).parse().unwrap();
        let sent = BrevoTransport::new(reqwest::Client::new())
            .with_base_url(base_url)
            .send(&credential(), &message())
            .await
            .unwrap();

        assert_eq!(sent.message_id.as_deref(), Some("<id@relay>"));
    }

    #[tokio::test]
    async fn test_send_without_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let sent = transport(&server)
            .send(&credential(), &message())
            .await
            .unwrap();

        assert_eq!(sent.message_id, None);
    }

    #[tokio::test]
    async fn test_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/smtp/email"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"message":"Key not found","code":"unauthorized"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let error = transport(&server)
            .send(&credential(), &message())
            .await
            .unwrap_err();

        let ProviderError::Api(api_error) = error else {
            panic!("unexpected error: {error:?}");
        };
        assert_eq!(api_error.status, Some(401));
        assert_eq!(api_error.reason.as_deref(), Some("Unauthorized"));
        assert_eq!(
            api_error.body.as_deref(),
            Some(r#"{"message":"Key not found","code":"unauthorized"}"#)
        );
    }

    #[tokio::test]
    async fn test_empty_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let error = transport(&server)
            .send(&credential(), &message())
            .await
            .unwrap_err();

        let ProviderError::Api(api_error) = error else {
            panic!("unexpected error: {error:?}");
        };
        assert_eq!(api_error.status, Some(500));
        assert_eq!(api_error.body, None);
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let server = MockServer::start().await;
        let transport = transport(&server);
        drop(server);

        let error = transport
            .send(&credential(), &message())
            .await
            .unwrap_err();

        assert!(matches!(error, ProviderError::Transport(_)));
    }
}
