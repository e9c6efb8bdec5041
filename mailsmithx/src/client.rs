use mailsmith_core::generator::GeneratedEmail;
use mailsmith_core::recipient::RecipientEntry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Url(#[from] url::ParseError),
    #[error("{status}: {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Serialize, Debug)]
pub struct SendPayload {
    pub recipients: Vec<RecipientEntry>,
    pub subject: String,
    pub body: String,
    pub dry_run: bool,
}

#[derive(Deserialize, Debug)]
pub struct SendReply {
    pub message: String,
    #[serde(default)]
    pub brevo_message_id: Option<String>,
}

/// Client for a running Mailsmith server.
pub struct MailsmithClient {
    client: reqwest::Client,
    server: Url,
}

impl MailsmithClient {
    pub fn new(client: reqwest::Client, server: Url) -> Self {
        Self {
            client,
            server: with_trailing_slash(server),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<GeneratedEmail, ClientError> {
        let payload = serde_json::json!({ "prompt": prompt });
        let reply = self.post("generate-email", &payload).await?;
        decode(reply)
    }

    pub async fn send(&self, payload: &SendPayload) -> Result<SendReply, ClientError> {
        let reply = self.post("send-email", payload).await?;
        decode(reply)
    }

    async fn post<T: Serialize>(&self, endpoint: &str, payload: &T) -> Result<Value, ClientError> {
        let resp = self
            .client
            .post(self.server.join(endpoint)?)
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        let data: Value = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));

        if !status.is_success() {
            let message = match data.get("error") {
                Some(Value::String(error)) => error.clone(),
                Some(error) => error.to_string(),
                None => match data {
                    Value::String(text) => text,
                    other => other.to_string(),
                },
            };
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(data)
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

fn decode<T: DeserializeOwned>(reply: Value) -> Result<T, ClientError> {
    Ok(serde_json::from_value(reply)?)
}
