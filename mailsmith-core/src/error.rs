use crate::translator::ProviderFailure;
use thiserror::Error;

/// Client-facing error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    UpstreamUnavailable,
    GenerationFailed,
    Provider,
    Unexpected,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Prompt is required")]
    MissingPrompt,
    #[error("API key is not set")]
    UpstreamUnavailable,
    #[error("{0}")]
    Failed(String),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::MissingPrompt => ErrorKind::Validation,
            GenerationError::UpstreamUnavailable => ErrorKind::UpstreamUnavailable,
            GenerationError::Failed(_) => ErrorKind::GenerationFailed,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            GenerationError::MissingPrompt => 400,
            GenerationError::UpstreamUnavailable | GenerationError::Failed(_) => 500,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No valid recipient emails provided")]
    NoRecipients,
    #[error("subject is required")]
    MissingSubject,
    #[error("body is required")]
    MissingBody,
    #[error("email provider API key is not set")]
    MissingProviderCredential,
    #[error("verified sender email is not set")]
    MissingSenderEmail,
}

impl ValidationError {
    /// Missing settings are the server's fault, not the caller's.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            ValidationError::MissingProviderCredential | ValidationError::MissingSenderEmail
        )
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{} API error", capitalize(.0.provider))]
    Provider(ProviderFailure),
    #[error("{0}")]
    Unexpected(String),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Validation(_) => ErrorKind::Validation,
            DispatchError::Provider(_) => ErrorKind::Provider,
            DispatchError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            DispatchError::Validation(e) if e.is_misconfiguration() => 500,
            DispatchError::Validation(_) => 400,
            DispatchError::Provider(failure) => failure.http_status,
            DispatchError::Unexpected(_) => 500,
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_validation_statuses() {
        assert_eq!(DispatchError::from(ValidationError::NoRecipients).http_status(), 400);
        assert_eq!(DispatchError::from(ValidationError::MissingBody).http_status(), 400);
        assert_eq!(
            DispatchError::from(ValidationError::MissingSenderEmail).http_status(),
            500
        );
    }

    #[test]
    fn test_provider_error_message() {
        let error = DispatchError::Provider(ProviderFailure {
            provider: "brevo",
            status: 401,
            reason: "Unauthorized".to_string(),
            details: Value::Null,
            http_status: 400,
        });

        assert_eq!(error.to_string(), "Brevo API error");
        assert_eq!(error.kind(), ErrorKind::Provider);
        assert_eq!(error.http_status(), 400);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            DispatchError::from(ValidationError::MissingSubject).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            DispatchError::Unexpected("connection reset".to_string()).kind(),
            ErrorKind::Unexpected
        );
        assert_eq!(GenerationError::MissingPrompt.kind(), ErrorKind::Validation);
        assert_eq!(
            GenerationError::UpstreamUnavailable.kind(),
            ErrorKind::UpstreamUnavailable
        );
    }

    #[test]
    fn test_generation_statuses() {
        assert_eq!(GenerationError::MissingPrompt.http_status(), 400);
        assert_eq!(GenerationError::UpstreamUnavailable.http_status(), 500);
        assert_eq!(
            GenerationError::Failed("quota exceeded".to_string()).kind(),
            ErrorKind::GenerationFailed
        );
    }
}
