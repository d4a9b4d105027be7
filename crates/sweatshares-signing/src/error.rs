//! Error types for the signature editor.
//!
//! - [`EditorError`]: field store, navigation and transform failures
//! - [`RenderError`]: recoverable document load/rasterization failures
//! - [`SubmissionError`]: request validation and submission failures
//!
//! Out-of-bounds drags and undersized resizes are clamped, never reported.

use thiserror::Error;

use crate::model::FieldId;

/// Document load or page rasterization failure.
///
/// Always recoverable: the editor keeps placed fields and can retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The document could not be fetched or parsed
    #[error("Failed to load document: {0}")]
    Load(String),

    /// A page failed to rasterize
    #[error("Failed to render page {page}: {reason}")]
    Rasterize {
        /// The page that failed.
        page: u32,
        /// Reason reported by the document source.
        reason: String,
    },

    /// The document source has no such page
    #[error("Page {0} is not available")]
    PageUnavailable(u32),
}

/// Errors raised by editor operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// A field already exists on the page
    #[error("Page {page} already has a signature field")]
    DuplicatePage {
        /// The page that already holds a field.
        page: u32,
    },

    /// No field with this id exists
    #[error("Field not found: {0}")]
    FieldNotFound(FieldId),

    /// Field labels must contain visible characters
    #[error("Field label must not be empty")]
    EmptyLabel,

    /// Render scale must be finite and positive
    #[error("Invalid render scale: {0}")]
    InvalidScale(f64),

    /// The operation needs an open document
    #[error("No document is open")]
    NoDocument,

    /// Rendering failed
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors that block or fail a signature request submission.
///
/// None of these touch the editor state, the user can correct and retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    /// No document is open
    #[error("Open a document before sending a signature request")]
    NoDocument,

    /// No receiver was chosen
    #[error("Select a receiver for the signature request")]
    NoReceiver,

    /// No fields were placed
    #[error("Place at least one signature field")]
    NoFields,

    /// Message exceeds the allowed length
    #[error("Message is {length} characters, the limit is {max}")]
    MessageTooLong {
        /// Length of the supplied message in characters.
        length: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Expiration outside the allowed range
    #[error("Expiration must be between 1 and {max} days, got {days}")]
    InvalidExpiration {
        /// Requested expiration in days.
        days: u32,
        /// Longest accepted expiration.
        max: u32,
    },

    /// The submission target rejected the request
    #[error("Signature request failed: {0}")]
    Target(String),
}

/// Result type alias for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
