use crate::error::DispatchError;
use crate::recipient::RecipientEntry;
use serde::Serialize;
use tracing::{error, info};

/// Longest body excerpt kept in a dry-run preview, in characters.
pub const PREVIEW_BODY_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewSender {
    pub name: String,
    pub email: Option<String>,
}

/// What would have been sent, had dry-run been off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DryRunPreview {
    pub sender: PreviewSender,
    pub to: Vec<RecipientEntry>,
    pub subject: String,
    pub body: String,
}

/// Truncates to [`PREVIEW_BODY_LIMIT`] characters, marking the cut with `...`.
pub fn preview_body(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_owned(),
    }
}

pub trait Recorder: Send + Sync + 'static {
    fn record_dry_run(&self, preview: &DryRunPreview);
    fn record_sent(&self, provider: &str, recipients: usize, message_id: Option<&str>);
    fn record_failed(&self, provider: &str, error: &DispatchError);
}

pub struct BaseRecorder {}

impl BaseRecorder {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for BaseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder for BaseRecorder {
    fn record_dry_run(&self, preview: &DryRunPreview) {
        let payload = serde_json::to_string(preview).unwrap_or_default();
        info!(recipients = preview.to.len(), "[DRY_RUN] Would send email: {payload}");
    }

    fn record_sent(&self, provider: &str, recipients: usize, message_id: Option<&str>) {
        info!(
            provider,
            recipients,
            message_id = message_id.unwrap_or_default(),
            "Email sent"
        );
    }

    fn record_failed(&self, provider: &str, error: &DispatchError) {
        match error {
            DispatchError::Provider(failure) => error!(
                provider,
                kind = ?error.kind(),
                status = failure.status,
                reason = %failure.reason,
                "Failed to send email: {}",
                failure.details
            ),
            _ => error!(provider, kind = ?error.kind(), "Failed to send email: {error}"),
        }
    }
}
