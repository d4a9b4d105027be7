//! In-memory store of placed signature fields.
//!
//! Fields are keyed by page number, so two fields on one page cannot be
//! represented. Selection is a single `Option<FieldId>` held beside the
//! fields rather than a flag on each one, so at most one field is ever
//! selected.
//!
//! Every rectangle is kept within its page: moves and resizes past an edge
//! are clamped silently.

use std::collections::BTreeMap;

use crate::error::{EditorError, EditorResult};
use crate::model::{Corner, FieldId, PageSize, PdfRect, SignatureField, ViewerRect};
use crate::viewport::ViewTransform;

#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    fields: BTreeMap<u32, SignatureField>,
    selected: Option<FieldId>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in page order.
    pub fn iter(&self) -> impl Iterator<Item = &SignatureField> {
        self.fields.values()
    }

    pub fn get(&self, id: FieldId) -> Option<&SignatureField> {
        self.fields.values().find(|f| f.id == id)
    }

    fn get_mut(&mut self, id: FieldId) -> EditorResult<&mut SignatureField> {
        self.fields
            .values_mut()
            .find(|f| f.id == id)
            .ok_or(EditorError::FieldNotFound(id))
    }

    /// The field on `page`, if one has been placed.
    pub fn field_on_page(&self, page: u32) -> Option<&SignatureField> {
        self.fields.get(&page)
    }

    pub fn selected_id(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn selected_field(&self) -> Option<&SignatureField> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: FieldId) -> bool {
        self.selected == Some(id)
    }

    /// Places a field given in viewer coordinates.
    ///
    /// The rectangle is converted with `transform`, clamped into the page,
    /// given a fresh id and selected.
    pub fn add_field(
        &mut self,
        page_number: u32,
        viewer_rect: ViewerRect,
        transform: &ViewTransform,
        page_size: PageSize,
        label: impl Into<String>,
        required: bool,
    ) -> EditorResult<SignatureField> {
        let rect = transform.viewer_to_pdf(viewer_rect);
        self.place_field(
            page_number,
            rect,
            page_size,
            transform.scale(),
            label,
            required,
        )
    }

    /// Places a field given directly in PDF coordinates.
    pub fn place_field(
        &mut self,
        page_number: u32,
        rect: PdfRect,
        page_size: PageSize,
        scale: f64,
        label: impl Into<String>,
        required: bool,
    ) -> EditorResult<SignatureField> {
        if self.fields.contains_key(&page_number) {
            tracing::warn!(page = page_number, "rejected second field on page");
            return Err(EditorError::DuplicatePage { page: page_number });
        }
        let label = validate_label(label.into())?;

        let field = SignatureField {
            id: FieldId::new(),
            page_number,
            rect: rect.clamp_within(page_size),
            label,
            required,
            page_size,
            scale,
        };
        tracing::info!(
            id = %field.id,
            page = page_number,
            rect = %field.rect,
            "signature field added"
        );
        self.selected = Some(field.id);
        self.fields.insert(page_number, field.clone());
        Ok(field)
    }

    /// Moves a field's origin to `(x, y)`, clamped to its page.
    pub fn move_field(&mut self, id: FieldId, x: f64, y: f64) -> EditorResult<PdfRect> {
        let field = self.get_mut(id)?;
        let moved = PdfRect::new(x, y, field.rect.width, field.rect.height);
        field.rect = moved.clamp_within(field.page_size);
        Ok(field.rect)
    }

    /// Resizes a field from `corner`.
    ///
    /// The dragged corner goes to where `proposed` has it; the opposite corner
    /// of the current rectangle stays put. Each side is kept at least
    /// `min_size` long (PDF units) and the result is clamped to the page,
    /// with the page bounds winning on pages smaller than `min_size`.
    pub fn resize_field(
        &mut self,
        id: FieldId,
        corner: Corner,
        proposed: PdfRect,
        min_size: f64,
    ) -> EditorResult<PdfRect> {
        let field = self.get_mut(id)?;
        field.rect = resize_rect(field.rect, corner, proposed, min_size, field.page_size);
        Ok(field.rect)
    }

    /// Removes a field, clearing the selection if it pointed at it.
    pub fn remove_field(&mut self, id: FieldId) -> Option<SignatureField> {
        let page = self.fields.values().find(|f| f.id == id)?.page_number;
        let removed = self.fields.remove(&page)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::info!(id = %id, page, "signature field removed");
        Some(removed)
    }

    /// Selects one field, or clears the selection with `None`.
    pub fn select_field(&mut self, id: Option<FieldId>) -> EditorResult<()> {
        if let Some(id) = id {
            if self.get(id).is_none() {
                return Err(EditorError::FieldNotFound(id));
            }
        }
        self.selected = id;
        Ok(())
    }

    pub fn set_label(&mut self, id: FieldId, label: impl Into<String>) -> EditorResult<()> {
        let label = validate_label(label.into())?;
        self.get_mut(id)?.label = label;
        Ok(())
    }

    pub fn set_required(&mut self, id: FieldId, required: bool) -> EditorResult<()> {
        self.get_mut(id)?.required = required;
        Ok(())
    }

    /// Records the render scale of the gesture that last touched the field.
    pub(crate) fn note_scale(&mut self, id: FieldId, scale: f64) {
        if let Ok(field) = self.get_mut(id) {
            field.scale = scale;
        }
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.selected = None;
    }
}

fn validate_label(label: String) -> EditorResult<String> {
    if label.trim().is_empty() {
        return Err(EditorError::EmptyLabel);
    }
    Ok(label)
}

fn resize_rect(
    current: PdfRect,
    corner: Corner,
    proposed: PdfRect,
    min_size: f64,
    page: PageSize,
) -> PdfRect {
    let anchor = current.corner(corner.opposite());
    let target = proposed.corner(corner);
    let min_w = min_size.max(0.0).min(page.width);
    let min_h = min_size.max(0.0).min(page.height);

    let (left, right) = if corner.is_west() {
        let right = anchor.x;
        (target.x.min(right - min_w).max(0.0), right)
    } else {
        let left = anchor.x;
        (left, target.x.max(left + min_w).min(page.width))
    };

    // North is +Y in PDF space.
    let (bottom, top) = if corner.is_north() {
        let bottom = anchor.y;
        (bottom, target.y.max(bottom + min_h).min(page.height))
    } else {
        let top = anchor.y;
        (target.y.min(top - min_h).max(0.0), top)
    };

    PdfRect::new(left, bottom, right - left, top - bottom).clamp_within(page)
}
