//! Signature request assembly and submission.
//!
//! The editor never persists anything. On submit it serializes every placed
//! field, together with the receiver, message and expiration, into a
//! [`SignatureRequest`] and hands it whole to a [`SubmissionTarget`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sweatshares_settings::RequestSettings;
use uuid::Uuid;

use crate::error::SubmissionError;
use crate::model::SignatureField;

/// Kind of field being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Signature,
}

/// One placed field as sent to the request service.
///
/// `scale` and the original page size let a consumer re-derive placement
/// without knowing any viewer's zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub page_number: u32,
    pub x_position: f64,
    pub y_position: f64,
    pub width: f64,
    pub height: f64,
    pub field_type: FieldType,
    pub field_label: String,
    pub required: bool,
    pub scale: f64,
    pub original_pdf_width: f64,
    pub original_pdf_height: f64,
}

impl From<&SignatureField> for FieldEntry {
    fn from(field: &SignatureField) -> Self {
        Self {
            page_number: field.page_number,
            x_position: field.rect.x,
            y_position: field.rect.y,
            width: field.rect.width,
            height: field.rect.height,
            field_type: FieldType::Signature,
            field_label: field.label.clone(),
            required: field.required,
            scale: field.scale,
            original_pdf_width: field.page_size.width,
            original_pdf_height: field.page_size.height,
        }
    }
}

/// What the user filled in alongside the fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestDetails {
    pub receiver_id: Option<Uuid>,
    #[serde(default)]
    pub message: Option<String>,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub expires_in_days: Option<u32>,
}

/// A complete signature request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRequest {
    pub document_url: String,
    pub receiver_id: Uuid,
    pub message: Option<String>,
    pub expires_in_days: u32,
    pub expires_at: DateTime<Utc>,
    pub fields: Vec<FieldEntry>,
}

impl SignatureRequest {
    /// Validates `details` and assembles a request from `fields`.
    ///
    /// Checks, in order: receiver chosen, at least one field, message length,
    /// expiration range. The message is sent as typed unless it is entirely
    /// whitespace, in which case it is dropped.
    pub fn build<'a>(
        document_url: &str,
        fields: impl IntoIterator<Item = &'a SignatureField>,
        details: &RequestDetails,
        settings: &RequestSettings,
        now: DateTime<Utc>,
    ) -> Result<Self, SubmissionError> {
        let receiver_id = details.receiver_id.ok_or(SubmissionError::NoReceiver)?;

        let mut fields: Vec<FieldEntry> = fields.into_iter().map(FieldEntry::from).collect();
        if fields.is_empty() {
            return Err(SubmissionError::NoFields);
        }
        fields.sort_by_key(|f| f.page_number);

        let message = details
            .message
            .clone()
            .filter(|m| !m.trim().is_empty());
        if let Some(message) = &message {
            let length = message.chars().count();
            if length > settings.max_message_len {
                return Err(SubmissionError::MessageTooLong {
                    length,
                    max: settings.max_message_len,
                });
            }
        }

        let days = details
            .expires_in_days
            .unwrap_or(settings.default_expiration_days);
        if days == 0 || days > settings.max_expiration_days {
            return Err(SubmissionError::InvalidExpiration {
                days,
                max: settings.max_expiration_days,
            });
        }

        Ok(Self {
            document_url: document_url.to_string(),
            receiver_id,
            message,
            expires_in_days: days,
            expires_at: now + Duration::days(i64::from(days)),
            fields,
        })
    }

    /// Pretty JSON form of the request.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Acknowledgement from the request service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestReceipt {
    pub request_id: Uuid,
}

/// Service that creates signature requests.
#[async_trait]
pub trait SubmissionTarget: Send + Sync {
    async fn create_signature_request(
        &self,
        request: SignatureRequest,
    ) -> Result<RequestReceipt, SubmissionError>;
}
