//! The signature field placement editor.
//!
//! [`SignatureEditor`] owns one editing session: the document source and
//! handle, the page renderer, the field store and the interaction
//! controller. Hosts forward input events to it and draw overlays from
//! [`SignatureEditor::field_viewer_rect`].
//!
//! Pointer events carry the render surface's offset within its container as
//! read at event time. The view transform is derived for every event from
//! that offset and the scale of the bitmap on screen, and never cached.

use chrono::Utc;
use sweatshares_settings::EditorSettings;

use crate::document::DocumentSource;
use crate::error::{EditorError, EditorResult, SubmissionError};
use crate::field_store::FieldStore;
use crate::interaction::{
    CursorHint, HoverTarget, InteractionController, InteractionOutcome, Key, PageContext,
};
use crate::model::{ContainerSize, FieldId, SignatureField, ViewerPoint, ViewerRect};
use crate::render::{PageRenderer, RenderOutcome};
use crate::request::{RequestDetails, RequestReceipt, SignatureRequest, SubmissionTarget};
use crate::viewport::ViewTransform;

/// Default container size before the host reports one.
const DEFAULT_CONTAINER: ContainerSize = ContainerSize {
    width: 800.0,
    height: 1000.0,
};

/// A pointer position plus the live offset of the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    /// Pointer position relative to the container.
    pub position: ViewerPoint,
    /// Top-left of the render surface relative to the container.
    pub surface_offset: ViewerPoint,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: ViewerPoint::new(x, y),
            surface_offset: ViewerPoint::default(),
        }
    }

    pub fn with_surface_offset(mut self, x: f64, y: f64) -> Self {
        self.surface_offset = ViewerPoint::new(x, y);
        self
    }
}

struct OpenDocument<H> {
    url: String,
    handle: H,
}

/// One editing session over a document.
pub struct SignatureEditor<D: DocumentSource> {
    source: D,
    document: Option<OpenDocument<D::Handle>>,
    renderer: PageRenderer,
    store: FieldStore,
    interaction: InteractionController,
    settings: EditorSettings,
}

impl<D: DocumentSource> std::fmt::Debug for SignatureEditor<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureEditor")
            .field("document", &self.document.as_ref().map(|d| d.url.as_str()))
            .field("renderer", &self.renderer)
            .field("store", &self.store)
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}

impl<D: DocumentSource> SignatureEditor<D> {
    pub fn new(source: D, settings: EditorSettings) -> Self {
        Self {
            source,
            document: None,
            renderer: PageRenderer::new(&settings, DEFAULT_CONTAINER),
            store: FieldStore::new(),
            interaction: InteractionController::new(settings.fields.clone()),
            settings,
        }
    }

    pub fn with_defaults(source: D) -> Self {
        Self::new(source, EditorSettings::default())
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn document_url(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.url.as_str())
    }

    pub fn current_page(&self) -> u32 {
        self.renderer.current_page()
    }

    pub fn total_pages(&self) -> u32 {
        self.renderer.total_pages()
    }

    pub fn zoom(&self) -> f64 {
        self.renderer.zoom()
    }

    // ---- document and rendering ----

    /// Opens a document, discarding any previous session, and renders page 1.
    ///
    /// A render failure is returned as an error but the document stays open,
    /// so [`retry_render`](Self::retry_render) can be used.
    pub async fn open(&mut self, url: &str) -> EditorResult<RenderOutcome> {
        self.close();
        let handle = self.source.load_document(url).await?;
        let pages = self.source.page_count(&handle);
        tracing::info!(url, pages, "document opened");

        self.renderer.reset(pages);
        self.document = Some(OpenDocument {
            url: url.to_string(),
            handle,
        });
        self.render_current_page().await
    }

    /// Rasterizes the current page at the current zoom and container size.
    pub async fn render_current_page(&mut self) -> EditorResult<RenderOutcome> {
        let document = self.document.as_ref().ok_or(EditorError::NoDocument)?;
        let page = self.renderer.current_page();

        let page_size = match self.source.page_size(&document.handle, page) {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!(page, error = %err, "page size lookup failed");
                self.renderer.record_error(err.clone());
                return Err(err.into());
            }
        };

        let request = self.renderer.begin_render(page_size);
        let result = self
            .source
            .render_page(&document.handle, request.page, request.scale)
            .await;

        match self.renderer.finish_render(request.ticket, result) {
            RenderOutcome::Failed(err) => Err(err.into()),
            outcome => Ok(outcome),
        }
    }

    /// Renders only if page, zoom or container changed since the last render.
    pub async fn render_if_needed(&mut self) -> EditorResult<Option<RenderOutcome>> {
        if self.document.is_none() || !self.renderer.needs_render() {
            return Ok(None);
        }
        self.render_current_page().await.map(Some)
    }

    /// Re-renders the current page after a failure. Placed fields are untouched.
    pub async fn retry_render(&mut self) -> EditorResult<RenderOutcome> {
        if let Some(err) = self.renderer.last_error() {
            tracing::info!(error = %err, "retrying page render");
        }
        self.render_current_page().await
    }

    /// Ends the session. All unsubmitted fields are discarded.
    pub fn close(&mut self) {
        if let Some(document) = self.document.take() {
            tracing::info!(
                url = %document.url,
                discarded = self.store.len(),
                "editor session closed"
            );
        }
        self.interaction.cancel();
        self.store.clear();
        self.renderer.reset(0);
    }

    // ---- navigation and zoom ----

    /// Navigates to `page`. Out-of-range pages are ignored.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        let changed = self.renderer.go_to_page(page);
        if changed {
            self.interaction.cancel();
        }
        changed
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.renderer.current_page().saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.renderer.current_page().saturating_sub(1))
    }

    /// Sets the zoom level. Fields keep their PDF geometry.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        self.renderer.set_zoom(zoom)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.renderer.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.renderer.zoom_out()
    }

    /// Zoom gesture: wheel with the zoom modifier held. Scrolling up zooms in.
    pub fn wheel(&mut self, delta_y: f64, modifier: bool) -> bool {
        if !modifier || delta_y == 0.0 {
            return false;
        }
        if delta_y < 0.0 {
            self.zoom_in()
        } else {
            self.zoom_out()
        }
    }

    pub fn resize_container(&mut self, width: f64, height: f64) -> bool {
        self.renderer
            .resize_container(ContainerSize::new(width, height))
    }

    // ---- coordinate mapping ----

    /// Transform for the page on screen, given the surface offset right now.
    ///
    /// Uses the scale of the bitmap actually displayed, so input between a
    /// zoom or resize and the re-render maps onto what the user sees.
    /// `None` until the current page has been rendered.
    pub fn view_transform(&self, surface_offset: ViewerPoint) -> Option<ViewTransform> {
        self.page_context(surface_offset).map(|ctx| ctx.transform)
    }

    fn page_context(&self, surface_offset: ViewerPoint) -> Option<PageContext> {
        let page = self.renderer.current_page();
        if self.renderer.displayed_page() != Some(page) {
            return None;
        }
        let page_size = self.renderer.original_dimensions()?;
        let scale = self.renderer.displayed_scale()?;
        let transform =
            ViewTransform::new(scale, surface_offset, page_size.height * scale).ok()?;
        Some(PageContext {
            page,
            page_size,
            transform,
        })
    }

    /// Where to draw a field's overlay, if it is on the displayed page.
    pub fn field_viewer_rect(&self, id: FieldId, surface_offset: ViewerPoint) -> Option<ViewerRect> {
        let ctx = self.page_context(surface_offset)?;
        let field = self.store.get(id)?;
        (field.page_number == ctx.page).then(|| ctx.transform.pdf_to_viewer(field.rect))
    }

    // ---- input ----

    pub fn pointer_down(&mut self, event: PointerEvent) -> InteractionOutcome {
        match self.page_context(event.surface_offset) {
            Some(ctx) => self
                .interaction
                .pointer_down(&mut self.store, &ctx, event.position),
            None => InteractionOutcome::Nothing,
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> InteractionOutcome {
        match self.page_context(event.surface_offset) {
            Some(ctx) => self
                .interaction
                .pointer_move(&mut self.store, &ctx, event.position),
            None => InteractionOutcome::Nothing,
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> InteractionOutcome {
        match self.page_context(event.surface_offset) {
            Some(ctx) => self
                .interaction
                .pointer_up(&mut self.store, &ctx, event.position),
            None => {
                self.interaction.cancel();
                InteractionOutcome::Nothing
            }
        }
    }

    /// Hover feedback with no button pressed.
    pub fn hover(&self, event: PointerEvent) -> HoverTarget {
        self.page_context(event.surface_offset)
            .map(|ctx| self.interaction.hover(&self.store, &ctx, event.position))
            .unwrap_or(HoverTarget::None)
    }

    pub fn cursor_hint(&self, event: PointerEvent) -> CursorHint {
        self.page_context(event.surface_offset)
            .map(|ctx| {
                self.interaction
                    .cursor_hint(&self.store, &ctx, event.position)
            })
            .unwrap_or(CursorHint::Default)
    }

    pub fn key(&mut self, key: Key) -> InteractionOutcome {
        self.interaction.key(&mut self.store, key)
    }

    // ---- field edits ----

    pub fn fields(&self) -> impl Iterator<Item = &SignatureField> {
        self.store.iter()
    }

    pub fn field_on_current_page(&self) -> Option<&SignatureField> {
        self.store.field_on_page(self.renderer.current_page())
    }

    pub fn selected_field(&self) -> Option<&SignatureField> {
        self.store.selected_field()
    }

    pub fn select_field(&mut self, id: Option<FieldId>) -> EditorResult<()> {
        self.store.select_field(id)
    }

    pub fn set_field_label(&mut self, id: FieldId, label: impl Into<String>) -> EditorResult<()> {
        self.store.set_label(id, label)
    }

    pub fn set_field_required(&mut self, id: FieldId, required: bool) -> EditorResult<()> {
        self.store.set_required(id, required)
    }

    pub fn delete_field(&mut self, id: FieldId) -> EditorResult<SignatureField> {
        self.interaction.cancel();
        self.store
            .remove_field(id)
            .ok_or(EditorError::FieldNotFound(id))
    }

    /// Removes every placed field.
    pub fn clear_fields(&mut self) {
        self.interaction.cancel();
        self.store.clear();
    }

    // ---- submission ----

    /// Validates and assembles the signature request without sending it.
    pub fn build_request(&self, details: &RequestDetails) -> Result<SignatureRequest, SubmissionError> {
        let url = self.document_url().ok_or(SubmissionError::NoDocument)?;
        SignatureRequest::build(
            url,
            self.store.iter(),
            details,
            &self.settings.request,
            Utc::now(),
        )
    }

    /// Validates the request and hands it to `target`. Editor state is
    /// unchanged whatever the outcome.
    pub async fn submit<T: SubmissionTarget>(
        &self,
        target: &T,
        details: &RequestDetails,
    ) -> Result<RequestReceipt, SubmissionError> {
        let request = self.build_request(details).inspect_err(|err| {
            tracing::warn!(error = %err, "signature request blocked");
        })?;
        let fields = request.fields.len();
        let receipt = target.create_signature_request(request).await?;
        tracing::info!(request_id = %receipt.request_id, fields, "signature request created");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlankDocument;

    async fn editor_with_field() -> (SignatureEditor<BlankDocument>, FieldId) {
        let mut editor = SignatureEditor::with_defaults(BlankDocument::letter(1));
        editor.open("memory://nda.pdf").await.unwrap();
        editor.pointer_down(PointerEvent::new(300.0, 300.0));
        let InteractionOutcome::Created(id) = editor.pointer_up(PointerEvent::new(300.0, 300.0))
        else {
            panic!("field not created");
        };
        (editor, id)
    }

    #[tokio::test]
    async fn test_pointer_ignored_without_document() {
        let mut editor = SignatureEditor::with_defaults(BlankDocument::letter(1));
        assert_eq!(
            editor.pointer_down(PointerEvent::new(10.0, 10.0)),
            InteractionOutcome::Nothing
        );
        assert_eq!(editor.hover(PointerEvent::new(10.0, 10.0)), HoverTarget::None);
        assert!(editor.store().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_field() {
        let (mut editor, id) = editor_with_field().await;
        let other = FieldId::new();
        assert_eq!(
            editor.delete_field(other),
            Err(EditorError::FieldNotFound(other))
        );
        assert_eq!(editor.delete_field(id).map(|f| f.id), Ok(id));
        assert!(editor.store().is_empty());
    }

    #[tokio::test]
    async fn test_clear_fields_keeps_document() {
        let (mut editor, _) = editor_with_field().await;
        editor.clear_fields();
        assert!(editor.store().is_empty());
        assert_eq!(editor.document_url(), Some("memory://nda.pdf"));
        assert_eq!(editor.build_request(&RequestDetails {
            receiver_id: Some(uuid::Uuid::new_v4()),
            ..RequestDetails::default()
        }), Err(SubmissionError::NoFields));
    }

    #[tokio::test]
    async fn test_cursor_hint_follows_selection() {
        let (editor, id) = editor_with_field().await;
        let rect = editor.field_viewer_rect(id, ViewerPoint::default()).unwrap();
        let center = PointerEvent::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);
        assert_eq!(editor.cursor_hint(center), CursorHint::Move);
        let corner = PointerEvent::new(rect.x, rect.y);
        assert_eq!(
            editor.cursor_hint(corner),
            CursorHint::Resize(crate::model::Corner::NorthWest)
        );
    }
}
