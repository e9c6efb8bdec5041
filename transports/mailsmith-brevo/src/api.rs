use mailsmith_core::provider::{OutboundMessage, SenderMailbox};
use mailsmith_core::recipient::RecipientEntry;
use serde::{Deserialize, Serialize};

/// Body of `POST /v3/smtp/email`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendSmtpEmail<'a> {
    pub sender: &'a SenderMailbox,
    pub to: &'a [RecipientEntry],
    pub subject: &'a str,
    pub html_content: &'a str,
    pub text_content: &'a str,
}

impl<'a> From<&'a OutboundMessage> for SendSmtpEmail<'a> {
    fn from(message: &'a OutboundMessage) -> Self {
        Self {
            sender: &message.sender,
            to: &message.to,
            subject: &message.subject,
            html_content: &message.html_content,
            text_content: &message.text_content,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateSmtpEmail {
    pub message_id: Option<String>,
}
