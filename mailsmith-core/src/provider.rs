use crate::credentials::ApiKey;
use crate::recipient::RecipientEntry;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderMailbox {
    pub name: String,
    pub email: String,
}

/// Fully assembled message handed to an [`EmailProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub sender: SenderMailbox,
    pub to: Vec<RecipientEntry>,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: Option<String>,
}

/// Failure reported by the provider's API, reduced to what translation needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderApiError {
    pub status: Option<u16>,
    pub reason: Option<String>,
    pub body: Option<String>,
}

impl fmt::Display for ProviderApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "({status})")?,
            None => f.write_str("(unknown status)")?,
        }
        if let Some(reason) = &self.reason {
            write!(f, " Reason: {reason}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0}")]
    Api(ProviderApiError),
    /// Anything that is not an API response: connection failures, decoding errors.
    #[error("{0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(
        &self,
        credential: &ApiKey,
        message: &OutboundMessage,
    ) -> Result<SentMessage, ProviderError>;

    fn name(&self) -> &'static str;
}
