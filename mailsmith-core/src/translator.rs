//! Translation of provider API failures into client-facing errors.

use crate::json::is_truthy;
use crate::provider::ProviderApiError;
use serde_json::Value;

/// Used when the provider did not report a status.
pub const FALLBACK_STATUS: u16 = 502;

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: &'static str,
    /// Status reported by the provider, or [`FALLBACK_STATUS`].
    pub status: u16,
    pub reason: String,
    /// Parsed response body when it is JSON, otherwise the raw text or the error message.
    pub details: Value,
    /// Status to answer the client with: 400 for provider 4xx, 502 otherwise.
    pub http_status: u16,
}

pub fn translate(provider: &'static str, error: &ProviderApiError) -> ProviderFailure {
    let status = error
        .status
        .filter(|status| *status != 0)
        .unwrap_or(FALLBACK_STATUS);

    let body = error.body.as_deref().filter(|body| !body.is_empty());
    let details = body
        .and_then(|body| serde_json::from_str::<Value>(body).ok())
        .filter(is_truthy)
        .or_else(|| body.map(|body| Value::String(body.to_owned())))
        .unwrap_or_else(|| Value::String(error.to_string()));

    ProviderFailure {
        provider,
        status,
        reason: error.reason.clone().unwrap_or_default(),
        details,
        http_status: client_status(status),
    }
}

/// Provider 4xx responses are the caller's or the configuration's fault.
pub fn client_status(status: u16) -> u16 {
    if (400..500).contains(&status) {
        400
    } else {
        502
    }
}
