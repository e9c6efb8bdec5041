use crate::config::GenerationConfig;
use crate::credentials::ApiKey;
use crate::error::GenerationError;
use crate::sanitizer::BodySanitizer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

/// Prompt in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(
        &self,
        credential: &ApiKey,
        prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    fn name(&self) -> &'static str;
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
}

pub const SIGNATURE_LINE: &str = "Regards and thanks,";
pub const MAX_SUBJECT_WORDS: usize = 15;

pub fn subject_instruction(prompt: &str) -> String {
    format!(
        "Write one email subject line that summarizes the whole email described below.

Description: {prompt}

Rules:
- At most {MAX_SUBJECT_WORDS} words
- Precise and specific; no filler or clickbait
- Capture the core message and intent of the email
- Proper capitalization; at most one punctuation mark
- No emojis, brackets or quotation marks

Reply with the subject line only, without any explanation."
    )
}

pub fn body_instruction(prompt: &str, subject: &str) -> String {
    format!(
        "You write professional emails.
Write a concise, well-structured email body for the request below. It must stay consistent with the given subject.

Request: {prompt}
Subject: {subject}

Structure:
1) A natural greeting, for example \"Hi [Recipient Name],\"
2) The main content in 1-3 short paragraphs
3) A closing line
4) The signature \"{SIGNATURE_LINE}\" followed by [Sender Name] on the next line

Rules:
- Correct grammar, spelling and punctuation; courteous, professional tone
- Do not repeat ideas or sentences
- When details are missing, make minimal reasonable assumptions and stay generic
- Plain text only: no markdown, emojis or brackets unless they belong to the content
- No meta commentary or instructions

Reply with the email body only."
    )
}

/// Produces a subject and a body from a free-text description.
///
/// The upstream is called twice, subject first: the body instruction embeds
/// the generated subject.
pub struct ContentGenerator {
    config: GenerationConfig,
    upstream: Arc<dyn TextGenerator>,
    sanitizer: BodySanitizer,
}

impl ContentGenerator {
    pub fn new(config: GenerationConfig, upstream: Arc<dyn TextGenerator>) -> Self {
        Self {
            config,
            upstream,
            sanitizer: BodySanitizer::default(),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: BodySanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub async fn generate(&self, prompt: &str) -> Result<GeneratedEmail, GenerationError> {
        if prompt.is_empty() {
            return Err(GenerationError::MissingPrompt);
        }
        let credential = self
            .config
            .credential
            .as_ref()
            .ok_or(GenerationError::UpstreamUnavailable)?;

        let subject = self.call(credential, &subject_instruction(prompt)).await?;
        let subject = subject.trim().to_owned();
        debug!(generator = self.upstream.name(), "Generated subject: {subject}");

        let raw_body = self
            .call(credential, &body_instruction(prompt, &subject))
            .await?;
        let body = self.sanitizer.sanitize(&subject, raw_body.trim());

        Ok(GeneratedEmail { subject, body })
    }

    async fn call(&self, credential: &ApiKey, instruction: &str) -> Result<String, GenerationError> {
        self.upstream
            .generate_text(credential, instruction)
            .await
            .map_err(|e| GenerationError::Failed(e.to_string()))
    }
}
