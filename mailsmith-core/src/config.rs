//! Read-only configuration handed to the pipeline components at construction.

use crate::credentials::ApiKey;

pub const DEFAULT_SENDER_NAME: &str = "No-Reply";

#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    /// Without a credential every generation call fails with `UpstreamUnavailable`.
    pub credential: Option<ApiKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub name: String,
    /// Verified sender address. Required for live sends only.
    pub email: Option<String>,
}

impl Default for SenderIdentity {
    fn default() -> Self {
        Self {
            name: DEFAULT_SENDER_NAME.to_owned(),
            email: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Process-wide dry-run default. A request may enable dry-run on top of it,
    /// never disable it.
    pub dry_run: bool,
    pub sender: SenderIdentity,
    pub credential: Option<ApiKey>,
}

/// Parses boolean-ish environment values: `1`, `true` and `yes` in any case.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes")
}
