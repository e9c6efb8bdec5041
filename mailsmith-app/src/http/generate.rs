use crate::http::error::{ApiError, ErrorBody};
use crate::http::HttpExtensions;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use mailsmith_core::error::GenerationError;
use mailsmith_core::generator::GeneratedEmail;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug)]
pub struct GenerateEmailRequest {
    /// Free-text description of the email to write.
    #[serde(default)]
    pub prompt: Option<String>,
}

#[utoipa::path(
    post,
    path = "/generate-email",
    tag = "email",
    request_body = GenerateEmailRequest,
    responses(
        (status = 200, description = "Subject and body generated", body = GeneratedEmail),
        (status = 400, description = "Prompt is missing", body = ErrorBody),
        (status = 500, description = "Generation is not configured or failed", body = ErrorBody),
    ),
    description = "Generate a subject line, then a body consistent with that subject.

The first line of the generated body is dropped, as it usually repeats the subject."
)]
pub(crate) async fn generate_email(
    Extension(ext): Extension<HttpExtensions>,
    payload: Result<Json<GenerateEmailRequest>, JsonRejection>,
) -> Result<Json<GeneratedEmail>, ApiError> {
    let Json(payload) = payload?;
    let prompt = payload.prompt.ok_or(GenerationError::MissingPrompt)?;

    let email = ext
        .generator
        .generate(&prompt)
        .await
        .inspect_err(|e| warn!(kind = ?e.kind(), "Email generation failed: {e}"))?;
    info!(
        subject_words = email.subject.split_whitespace().count(),
        "Generated email"
    );
    Ok(Json(email))
}
