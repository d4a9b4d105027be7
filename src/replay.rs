//! Headless replay of an editor session.
//!
//! A script describes a document (page sizes only), the container it is shown
//! in, a sequence of input events and the request details. Replaying it
//! against a [`BlankDocument`] yields the signature request the session
//! would submit.
//!
//! ```json
//! {
//!   "document_url": "https://vault.example/term-sheet.pdf",
//!   "pages": [{ "width": 612, "height": 792 }],
//!   "container": { "width": 612, "height": 792 },
//!   "events": [
//!     { "type": "pointer_down", "x": 150, "y": 100 },
//!     { "type": "pointer_up", "x": 150, "y": 100 }
//!   ],
//!   "request": { "receiver_id": "6f1c...", "message": "Please sign" }
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use image::Rgba;
use serde::{Deserialize, Serialize};
use sweatshares_settings::EditorSettings;
use sweatshares_signing::{
    Bitmap, BlankDocument, ContainerSize, InteractionOutcome, Key, PageSize, PointerEvent,
    RequestDetails, SignatureEditor, SignatureRequest, ViewerPoint,
};

/// Outline color for field overlays in snapshots.
const OVERLAY: Rgba<u8> = Rgba([37, 99, 235, 255]);

/// A recorded editor session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    pub document_url: String,
    pub pages: Vec<PageSize>,
    #[serde(default)]
    pub container: Option<ContainerSize>,
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
    #[serde(default)]
    pub request: RequestDetails,
}

impl ReplayScript {
    /// Reads a script from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse script {}", path.display()))
    }
}

/// One input event. Pointer events may carry the surface offset at the time
/// of the event; it defaults to the container origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        offset: ViewerPoint,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        offset: ViewerPoint,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        offset: ViewerPoint,
    },
    Key {
        key: Key,
    },
    Wheel {
        delta_y: f64,
        #[serde(default)]
        modifier: bool,
    },
    SetZoom {
        zoom: f64,
    },
    GoToPage {
        page: u32,
    },
    NextPage,
    PreviousPage,
    ResizeContainer {
        width: f64,
        height: f64,
    },
    SetLabel {
        page: u32,
        label: String,
    },
    SetRequired {
        page: u32,
        required: bool,
    },
    DeleteField {
        page: u32,
    },
}

fn pointer(x: f64, y: f64, offset: ViewerPoint) -> PointerEvent {
    PointerEvent {
        position: ViewerPoint::new(x, y),
        surface_offset: offset,
    }
}

/// Opens the scripted document and replays every event.
pub async fn replay_session(
    script: &ReplayScript,
    settings: EditorSettings,
) -> anyhow::Result<SignatureEditor<BlankDocument>> {
    let mut editor = SignatureEditor::new(BlankDocument::new(script.pages.clone()), settings);
    if let Some(container) = script.container {
        editor.resize_container(container.width, container.height);
    }
    editor
        .open(&script.document_url)
        .await
        .with_context(|| format!("failed to open {}", script.document_url))?;

    for (index, event) in script.events.iter().enumerate() {
        let outcome = apply_event(&mut editor, event)?;
        // Navigation, zoom and resize leave the page stale until re-rendered.
        editor
            .render_if_needed()
            .await
            .with_context(|| format!("render failed after event {index}"))?;

        match outcome {
            InteractionOutcome::Nothing => {}
            InteractionOutcome::Notice(notice) => tracing::info!(index, %notice, "notice"),
            InteractionOutcome::Rejected(err) => {
                return Err(err).with_context(|| format!("event {index} rejected"));
            }
            outcome => tracing::debug!(index, ?outcome, "event applied"),
        }
    }

    Ok(editor)
}

fn apply_event(
    editor: &mut SignatureEditor<BlankDocument>,
    event: &ReplayEvent,
) -> anyhow::Result<InteractionOutcome> {
    let outcome = match *event {
        ReplayEvent::PointerDown { x, y, offset } => editor.pointer_down(pointer(x, y, offset)),
        ReplayEvent::PointerMove { x, y, offset } => editor.pointer_move(pointer(x, y, offset)),
        ReplayEvent::PointerUp { x, y, offset } => editor.pointer_up(pointer(x, y, offset)),
        ReplayEvent::Key { key } => editor.key(key),
        ReplayEvent::Wheel { delta_y, modifier } => {
            editor.wheel(delta_y, modifier);
            InteractionOutcome::Nothing
        }
        ReplayEvent::SetZoom { zoom } => {
            editor.set_zoom(zoom);
            InteractionOutcome::Nothing
        }
        ReplayEvent::GoToPage { page } => {
            editor.go_to_page(page);
            InteractionOutcome::Nothing
        }
        ReplayEvent::NextPage => {
            editor.next_page();
            InteractionOutcome::Nothing
        }
        ReplayEvent::PreviousPage => {
            editor.previous_page();
            InteractionOutcome::Nothing
        }
        ReplayEvent::ResizeContainer { width, height } => {
            editor.resize_container(width, height);
            InteractionOutcome::Nothing
        }
        ReplayEvent::SetLabel { page, ref label } => {
            let id = field_on(editor, page)?;
            editor.set_field_label(id, label.as_str())?;
            InteractionOutcome::Nothing
        }
        ReplayEvent::SetRequired { page, required } => {
            let id = field_on(editor, page)?;
            editor.set_field_required(id, required)?;
            InteractionOutcome::Nothing
        }
        ReplayEvent::DeleteField { page } => {
            let id = field_on(editor, page)?;
            editor.delete_field(id)?;
            InteractionOutcome::Removed(id)
        }
    };
    Ok(outcome)
}

fn field_on(
    editor: &SignatureEditor<BlankDocument>,
    page: u32,
) -> anyhow::Result<sweatshares_signing::FieldId> {
    editor
        .fields()
        .find(|f| f.page_number == page)
        .map(|f| f.id)
        .with_context(|| format!("no signature field on page {page}"))
}

/// Replays `script` and builds the request it would submit.
pub async fn run_script(
    script: &ReplayScript,
    settings: EditorSettings,
) -> anyhow::Result<SignatureRequest> {
    let editor = replay_session(script, settings).await?;
    let request = editor.build_request(&script.request)?;
    tracing::info!(
        fields = request.fields.len(),
        expires_at = %request.expires_at,
        "signature request ready"
    );
    Ok(request)
}

/// The rendered current page with the outline of its field, if any.
pub fn snapshot(editor: &SignatureEditor<BlankDocument>) -> Option<Bitmap> {
    let mut bitmap = editor.renderer().surface()?.clone();
    let rect = editor
        .field_on_current_page()
        .and_then(|field| editor.field_viewer_rect(field.id, ViewerPoint::default()));
    if let Some(rect) = rect {
        draw_outline(&mut bitmap, rect.x, rect.y, rect.width, rect.height);
    }
    Some(bitmap)
}

fn draw_outline(bitmap: &mut Bitmap, x: f64, y: f64, width: f64, height: f64) {
    let (w, h) = bitmap.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let clamp_x = |v: f64| (v.round().max(0.0) as u32).min(w - 1);
    let clamp_y = |v: f64| (v.round().max(0.0) as u32).min(h - 1);
    let (left, right) = (clamp_x(x), clamp_x(x + width));
    let (top, bottom) = (clamp_y(y), clamp_y(y + height));

    for px in left..=right {
        bitmap.put_pixel(px, top, OVERLAY);
        bitmap.put_pixel(px, bottom, OVERLAY);
    }
    for py in top..=bottom {
        bitmap.put_pixel(left, py, OVERLAY);
        bitmap.put_pixel(right, py, OVERLAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tags() {
        let events: Vec<ReplayEvent> = serde_json::from_str(
            r#"[
                { "type": "pointer_down", "x": 1, "y": 2 },
                { "type": "pointer_move", "x": 3, "y": 4, "offset": { "x": 0, "y": -40 } },
                { "type": "key", "key": "delete" },
                { "type": "wheel", "delta_y": -1, "modifier": true },
                { "type": "next_page" }
            ]"#,
        )
        .unwrap();

        assert_eq!(
            events[0],
            ReplayEvent::PointerDown {
                x: 1.0,
                y: 2.0,
                offset: ViewerPoint::default()
            }
        );
        assert_eq!(
            events[1],
            ReplayEvent::PointerMove {
                x: 3.0,
                y: 4.0,
                offset: ViewerPoint::new(0.0, -40.0)
            }
        );
        assert_eq!(events[2], ReplayEvent::Key { key: Key::Delete });
        assert_eq!(events[4], ReplayEvent::NextPage);
    }

    #[test]
    fn test_outline_stays_inside_bitmap() {
        let mut bitmap = Bitmap::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        draw_outline(&mut bitmap, -5.0, 2.0, 40.0, 3.0);
        assert_eq!(*bitmap.get_pixel(0, 2), OVERLAY);
        assert_eq!(*bitmap.get_pixel(9, 5), OVERLAY);
        assert_eq!(*bitmap.get_pixel(5, 4), Rgba([255, 255, 255, 255]));
    }
}
