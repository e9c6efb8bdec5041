use crate::config::DispatchConfig;
use crate::error::{DispatchError, ValidationError};
use crate::provider::{EmailProvider, OutboundMessage, ProviderError, SenderMailbox};
use crate::recipient::RecipientEntry;
use crate::recorder::{preview_body, DryRunPreview, PreviewSender, Recorder};
use crate::translator::translate;
use std::sync::Arc;

pub const DRY_RUN_MESSAGE: &str = "DRY_RUN enabled: email not sent but request is valid.";
pub const SENT_MESSAGE: &str = "Email sent successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub recipients: Vec<RecipientEntry>,
    pub subject: String,
    pub body: String,
    /// Per-request dry-run override. Combined with the configured default.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { message_id: Option<String> },
    DryRun,
}

impl Delivery {
    pub fn message(&self) -> &'static str {
        match self {
            Delivery::Sent { .. } => SENT_MESSAGE,
            Delivery::DryRun => DRY_RUN_MESSAGE,
        }
    }
}

/// Wraps the body so that HTML clients keep its line breaks and the surrounding font.
///
/// `&`, `<` and `>` are escaped first: the body is plain text, and markup in it
/// is shown literally rather than rendered.
pub fn render_html(body: &str) -> String {
    let mut escaped = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    format!("<pre style=\"font-family:inherit; white-space:pre-wrap\">{escaped}</pre>")
}

pub struct DispatchPolicy {
    config: DispatchConfig,
    provider: Arc<dyn EmailProvider>,
    recorder: Arc<dyn Recorder>,
}

impl DispatchPolicy {
    pub fn new(
        config: DispatchConfig,
        provider: Arc<dyn EmailProvider>,
        recorder: Arc<dyn Recorder>,
    ) -> Self {
        Self {
            config,
            provider,
            recorder,
        }
    }

    pub fn is_dry_run(&self, requested: bool) -> bool {
        self.config.dry_run || requested
    }

    pub async fn dispatch(&self, request: SendRequest) -> Result<Delivery, DispatchError> {
        if request.recipients.is_empty() {
            return Err(ValidationError::NoRecipients.into());
        }
        if request.subject.is_empty() {
            return Err(ValidationError::MissingSubject.into());
        }
        if request.body.is_empty() {
            return Err(ValidationError::MissingBody.into());
        }

        if self.is_dry_run(request.dry_run) {
            self.recorder.record_dry_run(&DryRunPreview {
                sender: PreviewSender {
                    name: self.config.sender.name.clone(),
                    email: self.config.sender.email.clone(),
                },
                to: request.recipients,
                subject: request.subject,
                body: preview_body(&request.body),
            });
            return Ok(Delivery::DryRun);
        }

        let credential = self
            .config
            .credential
            .as_ref()
            .ok_or(ValidationError::MissingProviderCredential)?;
        let sender_email = self
            .config
            .sender
            .email
            .clone()
            .ok_or(ValidationError::MissingSenderEmail)?;

        let recipients = request.recipients.len();
        let message = OutboundMessage {
            sender: SenderMailbox {
                name: self.config.sender.name.clone(),
                email: sender_email,
            },
            to: request.recipients,
            subject: request.subject,
            html_content: render_html(&request.body),
            text_content: request.body,
        };

        let provider = self.provider.name();
        match self.provider.send(credential, &message).await {
            Ok(sent) => {
                self.recorder
                    .record_sent(provider, recipients, sent.message_id.as_deref());
                Ok(Delivery::Sent {
                    message_id: sent.message_id,
                })
            }
            Err(e) => {
                let error = match e {
                    ProviderError::Api(api_error) => {
                        DispatchError::Provider(translate(provider, &api_error))
                    }
                    ProviderError::Transport(e) => DispatchError::Unexpected(e.to_string()),
                };
                self.recorder.record_failed(provider, &error);
                Err(error)
            }
        }
    }
}
