use crate::http::error::{ApiError, ErrorBody};
use crate::http::HttpExtensions;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use mailsmith_core::dispatch::{Delivery, SendRequest};
use mailsmith_core::json::is_truthy;
use mailsmith_core::recipient::RecipientsInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug)]
pub struct SendEmailRequest {
    /// Comma-separated addresses, or a list of addresses and `{email, name}` objects.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub recipients: Option<Value>,
    /// Used when `recipients` is absent.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub recipient: Option<Value>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Validate and log the email without sending it.
    #[serde(default)]
    #[schema(value_type = bool)]
    pub dry_run: Option<Value>,
}

impl SendEmailRequest {
    fn into_send_request(self) -> SendRequest {
        let recipients = [self.recipients, self.recipient]
            .into_iter()
            .flatten()
            .find(is_truthy)
            .map(RecipientsInput::from)
            .map(|input| input.normalize())
            .unwrap_or_default();

        SendRequest {
            recipients,
            subject: self.subject.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            dry_run: self.dry_run.as_ref().is_some_and(is_truthy),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct SendEmailResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brevo_message_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/send-email",
    tag = "email",
    request_body = SendEmailRequest,
    responses(
        (status = 200, description = "Email sent, or validated in dry-run mode", body = SendEmailResponse),
        (status = 400, description = "Invalid request, or the email provider rejected it", body = ErrorBody),
        (status = 500, description = "Email sending is not configured, or an unexpected failure", body = ErrorBody),
        (status = 502, description = "The email provider failed", body = ErrorBody),
    ),
    description = "Send an email to one or more recipients.

Dry-run is enabled when either the server default or `dry_run` in the request enables it.
In dry-run mode the email is validated and logged, but never handed to the provider."
)]
pub(crate) async fn send_email(
    Extension(ext): Extension<HttpExtensions>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let Json(payload) = payload?;

    let delivery = ext.dispatcher.dispatch(payload.into_send_request()).await?;
    let message = delivery.message().to_string();
    let brevo_message_id = match delivery {
        Delivery::Sent { message_id } => message_id,
        Delivery::DryRun => None,
    };

    Ok(Json(SendEmailResponse {
        message,
        brevo_message_id,
    }))
}
