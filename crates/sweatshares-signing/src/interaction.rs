//! Pointer and keyboard interaction with the field on the current page.
//!
//! A press/move/release sequence is resolved into one gesture:
//!
//! ```text
//! Idle ──press on empty page──────────▶ Creating ──release──▶ Idle (field added)
//!   │
//!   ├──press on field body────────────▶ Selecting ──move──▶ Dragging ──release──▶ Idle
//!   │                                       └──release──▶ Idle (field selected)
//!   └──press within tolerance of corner─▶ Resizing ──release──▶ Idle
//! ```
//!
//! Hit-testing happens in viewer space (handle tolerance is in pixels);
//! every mutation goes to the [`FieldStore`] in PDF space. Corner handles
//! win over the body when both match.

use serde::{Deserialize, Serialize};
use sweatshares_settings::FieldSettings;

use crate::error::EditorError;
use crate::field_store::FieldStore;
use crate::model::{Corner, FieldId, PageSize, PdfPoint, PdfRect, ViewerPoint, ViewerRect};
use crate::viewport::ViewTransform;

/// Gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pressed on an empty page; a field is created on release.
    Creating { at: ViewerPoint },
    /// Pressed on a field body, not moved yet.
    Selecting { id: FieldId, grab: PdfPoint },
    /// Moving a field. `grab` is the pointer minus the field origin, in PDF units.
    Dragging { id: FieldId, grab: PdfPoint },
    /// Resizing a field from `corner`.
    Resizing {
        id: FieldId,
        corner: Corner,
        start_rect: PdfRect,
        start_pointer: PdfPoint,
    },
}

/// What lies under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    None,
    Body,
    Corner(Corner),
}

/// Cursor the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Crosshair,
    Move,
    Resize(Corner),
}

/// Messages for the user that don't change any state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Clicked empty space on a page that already has its field.
    FieldAlreadyOnPage { page: u32 },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldAlreadyOnPage { page } => write!(
                f,
                "Page {page} already has a signature field. Move or resize it, or delete it first."
            ),
        }
    }
}

/// Result of handling one input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    Nothing,
    Created(FieldId),
    Selected(FieldId),
    Moved(FieldId),
    Resized(FieldId),
    Removed(FieldId),
    SelectionCleared,
    Notice(Notice),
    /// The store refused the change, e.g. an empty default label.
    Rejected(EditorError),
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    #[serde(other)]
    Other,
}

/// The page under the pointer and how it is currently mapped to the screen.
#[derive(Debug, Clone, Copy)]
pub struct PageContext {
    pub page: u32,
    pub page_size: PageSize,
    pub transform: ViewTransform,
}

/// Resolves pointer and keyboard input into field store mutations.
#[derive(Debug, Clone)]
pub struct InteractionController {
    gesture: Gesture,
    settings: FieldSettings,
}

impl InteractionController {
    pub fn new(settings: FieldSettings) -> Self {
        Self {
            gesture: Gesture::Idle,
            settings,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Abandons any gesture in progress. Mutations already applied stay.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            tracing::debug!(gesture = ?self.gesture, "gesture cancelled");
        }
        self.gesture = Gesture::Idle;
    }

    /// Hit-tests `pos` against a field drawn at `rect`.
    ///
    /// Corners are tested first, per axis within the handle tolerance; when
    /// several qualify (tiny fields) the nearest wins.
    pub fn hit_test(&self, rect: ViewerRect, pos: ViewerPoint) -> HoverTarget {
        let tolerance = self.settings.handle_tolerance_px;
        let nearest = Corner::ALL
            .iter()
            .filter_map(|&corner| {
                let c = rect.corner(corner);
                let (dx, dy) = ((pos.x - c.x).abs(), (pos.y - c.y).abs());
                (dx <= tolerance && dy <= tolerance).then_some((corner, dx * dx + dy * dy))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match nearest {
            Some((corner, _)) => HoverTarget::Corner(corner),
            None if rect.contains(pos) => HoverTarget::Body,
            None => HoverTarget::None,
        }
    }

    /// Hover feedback for the selected field on this page. Never mutates.
    pub fn hover(&self, store: &FieldStore, ctx: &PageContext, pos: ViewerPoint) -> HoverTarget {
        match store.field_on_page(ctx.page) {
            Some(field) if store.is_selected(field.id) => {
                self.hit_test(ctx.transform.pdf_to_viewer(field.rect), pos)
            }
            _ => HoverTarget::None,
        }
    }

    /// Cursor for the current gesture, or for hovering at `pos` when idle.
    pub fn cursor_hint(&self, store: &FieldStore, ctx: &PageContext, pos: ViewerPoint) -> CursorHint {
        match self.gesture {
            Gesture::Resizing { corner, .. } => CursorHint::Resize(corner),
            Gesture::Dragging { .. } | Gesture::Selecting { .. } => CursorHint::Move,
            Gesture::Creating { .. } => CursorHint::Crosshair,
            Gesture::Idle => match self.hover(store, ctx, pos) {
                HoverTarget::Corner(corner) => CursorHint::Resize(corner),
                HoverTarget::Body => CursorHint::Move,
                HoverTarget::None if store.field_on_page(ctx.page).is_none() => {
                    CursorHint::Crosshair
                }
                HoverTarget::None => CursorHint::Default,
            },
        }
    }

    /// Handles a button press.
    pub fn pointer_down(
        &mut self,
        store: &mut FieldStore,
        ctx: &PageContext,
        pos: ViewerPoint,
    ) -> InteractionOutcome {
        // A press while a gesture is active means a release was lost.
        self.cancel();

        let Some(field) = store.field_on_page(ctx.page) else {
            self.gesture = Gesture::Creating { at: pos };
            tracing::debug!(page = ctx.page, "creating field");
            return InteractionOutcome::Nothing;
        };
        let id = field.id;
        let rect = field.rect;

        let pointer = ctx.transform.viewer_point_to_pdf(pos);
        match self.hit_test(ctx.transform.pdf_to_viewer(rect), pos) {
            HoverTarget::Corner(corner) => {
                self.gesture = Gesture::Resizing {
                    id,
                    corner,
                    start_rect: rect,
                    start_pointer: pointer,
                };
            }
            HoverTarget::Body => {
                self.gesture = Gesture::Selecting {
                    id,
                    grab: PdfPoint::new(pointer.x - rect.x, pointer.y - rect.y),
                };
            }
            HoverTarget::None => {
                return InteractionOutcome::Notice(Notice::FieldAlreadyOnPage { page: ctx.page });
            }
        }

        tracing::debug!(gesture = ?self.gesture, "gesture started");
        // Both branches above matched an existing field, so selection succeeds.
        let _ = store.select_field(Some(id));
        InteractionOutcome::Selected(id)
    }

    /// Handles pointer motion with the button held.
    pub fn pointer_move(
        &mut self,
        store: &mut FieldStore,
        ctx: &PageContext,
        pos: ViewerPoint,
    ) -> InteractionOutcome {
        let pointer = ctx.transform.viewer_point_to_pdf(pos);
        match self.gesture {
            Gesture::Idle | Gesture::Creating { .. } => InteractionOutcome::Nothing,
            Gesture::Selecting { id, grab } | Gesture::Dragging { id, grab } => {
                self.gesture = Gesture::Dragging { id, grab };
                match store.move_field(id, pointer.x - grab.x, pointer.y - grab.y) {
                    Ok(_) => {
                        store.note_scale(id, ctx.transform.scale());
                        InteractionOutcome::Moved(id)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "drag target vanished");
                        self.cancel();
                        InteractionOutcome::Nothing
                    }
                }
            }
            Gesture::Resizing {
                id,
                corner,
                start_rect,
                start_pointer,
            } => {
                let start_corner = start_rect.corner(corner);
                let moved = PdfPoint::new(
                    start_corner.x + (pointer.x - start_pointer.x),
                    start_corner.y + (pointer.y - start_pointer.y),
                );
                let proposed = start_rect.with_corner_at(corner, moved);
                let min_size = ctx.transform.viewer_len_to_pdf(self.settings.min_size_px);
                match store.resize_field(id, corner, proposed, min_size) {
                    Ok(_) => {
                        store.note_scale(id, ctx.transform.scale());
                        InteractionOutcome::Resized(id)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "resize target vanished");
                        self.cancel();
                        InteractionOutcome::Nothing
                    }
                }
            }
        }
    }

    /// Handles a button release, finishing the gesture.
    pub fn pointer_up(
        &mut self,
        store: &mut FieldStore,
        ctx: &PageContext,
        _pos: ViewerPoint,
    ) -> InteractionOutcome {
        let gesture = std::mem::take(&mut self.gesture);
        match gesture {
            Gesture::Idle => InteractionOutcome::Nothing,
            Gesture::Creating { at } => {
                let rect = ViewerRect::centered_at(
                    at,
                    self.settings.default_width_px,
                    self.settings.default_height_px,
                );
                match store.add_field(
                    ctx.page,
                    rect,
                    &ctx.transform,
                    ctx.page_size,
                    self.settings.default_label.clone(),
                    self.settings.required_by_default,
                ) {
                    Ok(field) => InteractionOutcome::Created(field.id),
                    Err(EditorError::DuplicatePage { page }) => {
                        InteractionOutcome::Notice(Notice::FieldAlreadyOnPage { page })
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "field creation rejected");
                        InteractionOutcome::Rejected(err)
                    }
                }
            }
            Gesture::Selecting { id, .. } => InteractionOutcome::Selected(id),
            Gesture::Dragging { id, .. } => {
                tracing::debug!(id = %id, "drag finished");
                InteractionOutcome::Moved(id)
            }
            Gesture::Resizing { id, corner, .. } => {
                tracing::debug!(id = %id, %corner, "resize finished");
                InteractionOutcome::Resized(id)
            }
        }
    }

    /// Handles a key press.
    pub fn key(&mut self, store: &mut FieldStore, key: Key) -> InteractionOutcome {
        match key {
            Key::Delete | Key::Backspace => {
                let Some(id) = store.selected_id() else {
                    return InteractionOutcome::Nothing;
                };
                self.cancel();
                match store.remove_field(id) {
                    Some(_) => InteractionOutcome::Removed(id),
                    None => InteractionOutcome::Nothing,
                }
            }
            Key::Escape => {
                self.cancel();
                // Clearing never fails.
                let _ = store.select_field(None);
                InteractionOutcome::SelectionCleared
            }
            Key::Other => InteractionOutcome::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(page: u32, scale: f64) -> PageContext {
        let page_size = PageSize::letter();
        PageContext {
            page,
            page_size,
            transform: ViewTransform::new(
                scale,
                ViewerPoint::new(0.0, 0.0),
                page_size.height * scale,
            )
            .unwrap(),
        }
    }

    fn controller() -> InteractionController {
        InteractionController::new(FieldSettings::default())
    }

    #[test]
    fn test_hit_test_corner_beats_body() {
        let c = controller();
        let rect = ViewerRect::new(100.0, 100.0, 300.0, 150.0);
        // Inside the body and 10px from the se corner.
        assert_eq!(
            c.hit_test(rect, ViewerPoint::new(390.0, 240.0)),
            HoverTarget::Corner(Corner::SouthEast)
        );
        assert_eq!(c.hit_test(rect, ViewerPoint::new(250.0, 175.0)), HoverTarget::Body);
        assert_eq!(c.hit_test(rect, ViewerPoint::new(50.0, 50.0)), HoverTarget::None);
        // Just outside the body but within tolerance of nw.
        assert_eq!(
            c.hit_test(rect, ViewerPoint::new(90.0, 85.0)),
            HoverTarget::Corner(Corner::NorthWest)
        );
    }

    #[test]
    fn test_hit_test_tiny_field_picks_nearest_corner() {
        let c = controller();
        let rect = ViewerRect::new(100.0, 100.0, 10.0, 10.0);
        assert_eq!(
            c.hit_test(rect, ViewerPoint::new(109.0, 101.0)),
            HoverTarget::Corner(Corner::NorthEast)
        );
    }

    #[test]
    fn test_click_on_empty_page_creates_centered_field() {
        let mut c = controller();
        let mut store = FieldStore::new();
        let ctx = ctx(1, 1.0);
        let at = ViewerPoint::new(306.0, 396.0);

        assert_eq!(c.pointer_down(&mut store, &ctx, at), InteractionOutcome::Nothing);
        assert!(matches!(c.gesture(), Gesture::Creating { .. }));
        let outcome = c.pointer_up(&mut store, &ctx, at);
        let InteractionOutcome::Created(id) = outcome else {
            panic!("expected a created field, got {outcome:?}");
        };
        let field = store.get(id).unwrap();
        assert_eq!(field.rect, PdfRect::new(156.0, 321.0, 300.0, 150.0));
        assert_eq!(field.label, "Signature");
        assert!(c.is_idle());
    }

    #[test]
    fn test_default_size_is_viewer_relative() {
        let mut c = controller();
        let mut store = FieldStore::new();
        let ctx = ctx(1, 2.0);
        let at = ViewerPoint::new(400.0, 400.0);
        c.pointer_down(&mut store, &ctx, at);
        c.pointer_up(&mut store, &ctx, at);
        let field = store.field_on_page(1).unwrap();
        assert_eq!(field.rect.width, 150.0);
        assert_eq!(field.rect.height, 75.0);
        assert_eq!(field.scale, 2.0);
    }

    #[test]
    fn test_click_outside_existing_field_is_rejected() {
        let mut c = controller();
        let mut store = FieldStore::new();
        let ctx = ctx(1, 1.0);
        store
            .place_field(1, PdfRect::new(0.0, 0.0, 100.0, 50.0), PageSize::letter(), 1.0, "Signature", true)
            .unwrap();

        let outcome = c.pointer_down(&mut store, &ctx, ViewerPoint::new(500.0, 100.0));
        assert_eq!(
            outcome,
            InteractionOutcome::Notice(Notice::FieldAlreadyOnPage { page: 1 })
        );
        assert!(c.is_idle());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_click_without_move_only_selects() {
        let mut c = controller();
        let mut store = FieldStore::new();
        let ctx = ctx(1, 1.0);
        let field = store
            .place_field(1, PdfRect::new(100.0, 100.0, 200.0, 100.0), PageSize::letter(), 1.0, "Signature", true)
            .unwrap();
        store.select_field(None).unwrap();

        // PDF (200, 150) is viewer (200, 642).
        let at = ViewerPoint::new(200.0, 642.0);
        assert_eq!(c.pointer_down(&mut store, &ctx, at), InteractionOutcome::Selected(field.id));
        assert_eq!(c.pointer_up(&mut store, &ctx, at), InteractionOutcome::Selected(field.id));
        assert_eq!(store.get(field.id).unwrap().rect, field.rect);
        assert!(store.is_selected(field.id));
    }

    #[test]
    fn test_drag_preserves_grab_offset() {
        let mut c = controller();
        let mut store = FieldStore::new();
        let ctx = ctx(1, 1.0);
        let field = store
            .place_field(1, PdfRect::new(100.0, 100.0, 200.0, 100.0), PageSize::letter(), 1.0, "Signature", true)
            .unwrap();

        c.pointer_down(&mut store, &ctx, ViewerPoint::new(200.0, 642.0));
        c.pointer_move(&mut store, &ctx, ViewerPoint::new(230.0, 622.0));
        assert!(matches!(c.gesture(), Gesture::Dragging { .. }));
        c.pointer_up(&mut store, &ctx, ViewerPoint::new(230.0, 622.0));

        let rect = store.get(field.id).unwrap().rect;
        assert!((rect.x - 130.0).abs() < 1e-9);
        assert!((rect.y - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_minimum_follows_scale() {
        let mut c = controller();
        let mut store = FieldStore::new();
        let ctx = ctx(1, 2.0);
        let field = store
            .place_field(1, PdfRect::new(100.0, 100.0, 200.0, 100.0), PageSize::letter(), 2.0, "Signature", true)
            .unwrap();

        // se corner of PDF (300, 100) at scale 2 is viewer (600, 1384).
        let grab = ViewerPoint::new(600.0, 1384.0);
        c.pointer_down(&mut store, &ctx, grab);
        assert!(matches!(
            c.gesture(),
            Gesture::Resizing {
                corner: Corner::SouthEast,
                ..
            }
        ));
        // Collapse toward the nw corner; 50px at scale 2 is 25 PDF units.
        c.pointer_move(&mut store, &ctx, ViewerPoint::new(0.0, 0.0));
        c.pointer_up(&mut store, &ctx, ViewerPoint::new(0.0, 0.0));

        let rect = store.get(field.id).unwrap().rect;
        assert!((rect.width - 25.0).abs() < 1e-9);
        assert!((rect.height - 25.0).abs() < 1e-9);
        assert!((rect.x - 100.0).abs() < 1e-9);
        assert!((rect.top() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_default_label_is_not_a_duplicate() {
        let settings = FieldSettings {
            default_label: "  ".to_string(),
            ..FieldSettings::default()
        };
        let mut c = InteractionController::new(settings);
        let mut store = FieldStore::new();
        let ctx = ctx(1, 1.0);
        let at = ViewerPoint::new(306.0, 396.0);

        c.pointer_down(&mut store, &ctx, at);
        assert_eq!(
            c.pointer_up(&mut store, &ctx, at),
            InteractionOutcome::Rejected(EditorError::EmptyLabel)
        );
        assert!(store.is_empty());
        assert!(c.is_idle());
    }

    #[test]
    fn test_keys() {
        let mut c = controller();
        let mut store = FieldStore::new();
        let field = store
            .place_field(1, PdfRect::new(0.0, 0.0, 100.0, 50.0), PageSize::letter(), 1.0, "Signature", true)
            .unwrap();

        assert_eq!(c.key(&mut store, Key::Escape), InteractionOutcome::SelectionCleared);
        assert_eq!(store.selected_id(), None);
        assert_eq!(c.key(&mut store, Key::Delete), InteractionOutcome::Nothing);
        assert_eq!(store.len(), 1);

        store.select_field(Some(field.id)).unwrap();
        assert_eq!(c.key(&mut store, Key::Backspace), InteractionOutcome::Removed(field.id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_hover_requires_selection_and_never_mutates() {
        let c = controller();
        let mut store = FieldStore::new();
        let ctx = ctx(1, 1.0);
        let field = store
            .place_field(1, PdfRect::new(100.0, 100.0, 200.0, 100.0), PageSize::letter(), 1.0, "Signature", true)
            .unwrap();
        let corner = ViewerPoint::new(100.0, 592.0);

        assert_eq!(c.hover(&store, &ctx, corner), HoverTarget::Corner(Corner::NorthWest));
        assert_eq!(
            c.cursor_hint(&store, &ctx, corner),
            CursorHint::Resize(Corner::NorthWest)
        );
        store.select_field(None).unwrap();
        assert_eq!(c.hover(&store, &ctx, corner), HoverTarget::None);
        assert_eq!(store.get(field.id).unwrap().rect, field.rect);
        assert!(c.is_idle());
    }

    #[test]
    fn test_key_names_deserialize() {
        let key: Key = serde_json::from_str("\"backspace\"").unwrap();
        assert_eq!(key, Key::Backspace);
        let key: Key = serde_json::from_str("\"tab\"").unwrap();
        assert_eq!(key, Key::Other);
    }
}
