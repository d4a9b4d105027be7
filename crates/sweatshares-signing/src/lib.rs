//! # SweatShares Signing
//!
//! Signature field placement for PDF documents. A document is rendered page
//! by page into a scrollable container; the user places at most one
//! signature field per page, then moves, resizes, relabels or deletes it.
//! On submit every field is packaged into a [`SignatureRequest`] together
//! with the receiver, message and expiration.
//!
//! ## Coordinate Spaces
//!
//! - **Viewer space**: pixels, origin at the container's top-left, y down.
//! - **PDF space**: points, origin at the page's bottom-left, y up.
//!
//! Fields are stored only in PDF space, so they do not move on the page when
//! the user zooms, resizes the window or navigates away and back.
//!
//! ## Architecture
//!
//! ```text
//! SignatureEditor (one session)
//!   ├── DocumentSource (load, page sizes, rasterize)
//!   ├── PageRenderer (page, zoom, fit scale, render tickets)
//!   ├── ViewTransform (viewer <-> PDF, derived per event)
//!   ├── InteractionController (create / select / drag / resize / keys)
//!   │     └── FieldStore (one field per page, single selection)
//!   └── SignatureRequest ──▶ SubmissionTarget
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sweatshares_signing::{BlankDocument, PointerEvent, SignatureEditor};
//!
//! let mut editor = SignatureEditor::with_defaults(BlankDocument::letter(2));
//! editor.open("memory://contract.pdf").await?;
//!
//! // Click an empty page to drop a field centered on the pointer.
//! editor.pointer_down(PointerEvent::new(300.0, 400.0));
//! editor.pointer_up(PointerEvent::new(300.0, 400.0));
//! ```

pub mod document;
pub mod editor;
pub mod error;
pub mod field_store;
pub mod interaction;
pub mod model;
pub mod render;
pub mod request;
pub mod viewport;

pub use document::{BlankDocument, DocumentSource};
pub use editor::{PointerEvent, SignatureEditor};
pub use error::{EditorError, EditorResult, RenderError, SubmissionError};
pub use field_store::FieldStore;
pub use interaction::{
    CursorHint, Gesture, HoverTarget, InteractionController, InteractionOutcome, Key, Notice,
    PageContext,
};
pub use model::{
    ContainerSize, Corner, FieldId, PageSize, PdfPoint, PdfRect, SignatureField, ViewerPoint,
    ViewerRect,
};
pub use render::{
    compute_fit_scale, compute_fit_scale_capped, Bitmap, PageRenderer, RenderOutcome,
    RenderRequest, RenderTicket,
};
pub use request::{
    FieldEntry, FieldType, RequestDetails, RequestReceipt, SignatureRequest, SubmissionTarget,
};
pub use viewport::ViewTransform;
