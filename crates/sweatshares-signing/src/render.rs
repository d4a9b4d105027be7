//! Page render control.
//!
//! Tracks which page is shown, at what zoom, in what container, and which
//! render request is outstanding. Rasterization itself belongs to a
//! [`DocumentSource`](crate::document::DocumentSource); this module only
//! decides the scale, hands out tickets and accepts or drops the results.
//!
//! Only the newest request counts. A result for an older ticket, or for a
//! page the user has since navigated away from, is discarded so an outdated
//! page never replaces a newer one.

use sweatshares_settings::EditorSettings;

use crate::error::RenderError;
use crate::model::{ContainerSize, PageSize};

/// Rasterized page surface.
pub type Bitmap = image::RgbaImage;

/// Upper bound on the fit-to-container scale.
pub const DEFAULT_MAX_FIT_SCALE: f64 = 2.0;

/// Scale that fits a page inside a container, preserving aspect ratio and
/// capped at [`DEFAULT_MAX_FIT_SCALE`].
///
/// `min(container_width / page_width, container_height / page_height, 2.0)`
pub fn compute_fit_scale(
    page_width: f64,
    page_height: f64,
    container_width: f64,
    container_height: f64,
) -> f64 {
    compute_fit_scale_capped(
        page_width,
        page_height,
        container_width,
        container_height,
        DEFAULT_MAX_FIT_SCALE,
    )
}

/// [`compute_fit_scale`] with an explicit cap.
///
/// Degenerate page or container dimensions fall back to `min(1.0, cap)`.
pub fn compute_fit_scale_capped(
    page_width: f64,
    page_height: f64,
    container_width: f64,
    container_height: f64,
    max_scale: f64,
) -> f64 {
    let dims = [page_width, page_height, container_width, container_height];
    if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return 1.0_f64.min(max_scale);
    }
    (container_width / page_width)
        .min(container_height / page_height)
        .min(max_scale)
}

/// Identifies one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTicket(u64);

/// Parameters of an issued render request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub ticket: RenderTicket,
    pub page: u32,
    pub page_size: PageSize,
    /// Fit-to-container scale, before zoom.
    pub fit_scale: f64,
    /// Scale to rasterize at (`fit_scale * zoom`).
    pub scale: f64,
}

/// What happened to a finished render.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The bitmap is now on screen.
    Applied { page: u32, scale: f64 },
    /// A newer request superseded this one; the result was dropped.
    Stale,
    /// Rasterization failed; the error is kept for a retry.
    Failed(RenderError),
}

/// Rendering state of the viewer.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    current_page: u32,
    total_pages: u32,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    default_zoom: f64,
    zoom_step: f64,
    max_fit_scale: f64,
    container: ContainerSize,
    base_scale: f64,
    displayed_scale: Option<f64>,
    original_dimensions: Option<PageSize>,
    displayed_page: Option<u32>,
    surface: Option<Bitmap>,
    next_ticket: u64,
    pending: Option<RenderRequest>,
    last_error: Option<RenderError>,
    needs_render: bool,
}

impl PageRenderer {
    /// Creates a renderer with no document loaded.
    pub fn new(settings: &EditorSettings, container: ContainerSize) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            zoom: settings.zoom.default,
            min_zoom: settings.zoom.min,
            max_zoom: settings.zoom.max,
            default_zoom: settings.zoom.default,
            zoom_step: settings.zoom.step,
            max_fit_scale: settings.render.max_fit_scale,
            container,
            base_scale: 1.0,
            displayed_scale: None,
            original_dimensions: None,
            displayed_page: None,
            surface: None,
            next_ticket: 0,
            pending: None,
            last_error: None,
            needs_render: false,
        }
    }

    /// Resets for a newly opened document of `total_pages` pages.
    pub fn reset(&mut self, total_pages: u32) {
        self.current_page = 1;
        self.total_pages = total_pages;
        self.zoom = self.default_zoom;
        self.base_scale = 1.0;
        self.displayed_scale = None;
        self.original_dimensions = None;
        self.displayed_page = None;
        self.surface = None;
        self.pending = None;
        self.last_error = None;
        self.needs_render = total_pages > 0;
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Current zoom level (1.0 = fit to container).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Fit scale recorded by the last applied render.
    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }

    /// Effective scale (`fit * zoom`) of the bitmap on screen.
    ///
    /// Lags behind [`zoom`](Self::zoom) and the container until the next
    /// render is applied, and keeps its value if that render fails.
    pub fn displayed_scale(&self) -> Option<f64> {
        self.displayed_scale
    }

    /// Unscaled size of the page on screen, once one has been rendered.
    pub fn original_dimensions(&self) -> Option<PageSize> {
        self.original_dimensions
    }

    /// Page whose bitmap is currently on screen.
    pub fn displayed_page(&self) -> Option<u32> {
        self.displayed_page
    }

    pub fn surface(&self) -> Option<&Bitmap> {
        self.surface.as_ref()
    }

    pub fn container(&self) -> ContainerSize {
        self.container
    }

    pub fn max_fit_scale(&self) -> f64 {
        self.max_fit_scale
    }

    pub fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    pub fn pending(&self) -> Option<&RenderRequest> {
        self.pending.as_ref()
    }

    /// True when page, zoom or container changed since the last render request.
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// Navigates to `page`. Out-of-range pages are ignored.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.total_pages || page == self.current_page {
            return false;
        }
        tracing::debug!(from = self.current_page, to = page, "page navigation");
        self.current_page = page;
        self.needs_render = true;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// Sets the zoom level, clamped to the configured range.
    ///
    /// Returns `true` when the zoom actually changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        // Rounded so repeated steps don't drift (1.2000000000000002).
        let zoom = (zoom.clamp(self.min_zoom, self.max_zoom) * 1000.0).round() / 1000.0;
        if (zoom - self.zoom).abs() < 1e-9 {
            return false;
        }
        self.zoom = zoom;
        self.needs_render = self.total_pages > 0;
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom + self.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom - self.zoom_step)
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.set_zoom(self.default_zoom)
    }

    /// Updates the container size. The page must be re-rendered at the new
    /// fit scale to keep filling the container.
    pub fn resize_container(&mut self, container: ContainerSize) -> bool {
        if container == self.container {
            return false;
        }
        self.container = container;
        self.needs_render = self.total_pages > 0;
        true
    }

    /// Fit scale for `page` in the current container.
    pub fn fit_scale_for(&self, page: PageSize) -> f64 {
        compute_fit_scale_capped(
            page.width,
            page.height,
            self.container.width,
            self.container.height,
            self.max_fit_scale,
        )
    }

    /// Issues a render request for the current page. Any earlier outstanding
    /// request becomes stale.
    pub fn begin_render(&mut self, page_size: PageSize) -> RenderRequest {
        self.next_ticket += 1;
        let fit_scale = self.fit_scale_for(page_size);
        let request = RenderRequest {
            ticket: RenderTicket(self.next_ticket),
            page: self.current_page,
            page_size,
            fit_scale,
            scale: fit_scale * self.zoom,
        };
        if let Some(previous) = self.pending.replace(request) {
            tracing::debug!(ticket = previous.ticket.0, "superseded render request");
        }
        self.needs_render = false;
        tracing::debug!(
            ticket = request.ticket.0,
            page = request.page,
            scale = request.scale,
            "render requested"
        );
        request
    }

    /// Accepts the result of a render request.
    pub fn finish_render(
        &mut self,
        ticket: RenderTicket,
        result: Result<Bitmap, RenderError>,
    ) -> RenderOutcome {
        let request = match self.pending {
            Some(request) if request.ticket == ticket => request,
            _ => {
                tracing::warn!(ticket = ticket.0, "dropping stale render result");
                return RenderOutcome::Stale;
            }
        };
        self.pending = None;

        if request.page != self.current_page {
            tracing::warn!(
                page = request.page,
                current = self.current_page,
                "dropping render of a page no longer shown"
            );
            self.needs_render = true;
            return RenderOutcome::Stale;
        }

        match result {
            Ok(bitmap) => {
                self.base_scale = request.fit_scale;
                self.displayed_scale = Some(request.scale);
                self.original_dimensions = Some(request.page_size);
                self.displayed_page = Some(request.page);
                self.surface = Some(bitmap);
                self.last_error = None;
                RenderOutcome::Applied {
                    page: request.page,
                    scale: request.scale,
                }
            }
            Err(err) => {
                tracing::warn!(page = request.page, error = %err, "page render failed");
                self.record_error(err.clone());
                RenderOutcome::Failed(err)
            }
        }
    }

    /// Records a failure that happened before a render could be issued
    /// (e.g. the page size lookup failed).
    pub fn record_error(&mut self, err: RenderError) {
        self.last_error = Some(err);
        self.needs_render = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(pages: u32) -> PageRenderer {
        let mut r = PageRenderer::new(&EditorSettings::default(), ContainerSize::new(800.0, 600.0));
        r.reset(pages);
        r
    }

    #[test]
    fn test_fit_scale_picks_tighter_axis() {
        // 600/792 < 800/612
        let s = compute_fit_scale(612.0, 792.0, 800.0, 600.0);
        assert!((s - 600.0 / 792.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_scale_capped_for_small_pages() {
        assert_eq!(compute_fit_scale(100.0, 100.0, 1000.0, 1000.0), 2.0);
        assert_eq!(compute_fit_scale_capped(100.0, 100.0, 1000.0, 1000.0, 3.0), 3.0);
    }

    #[test]
    fn test_fit_scale_degenerate_inputs() {
        assert_eq!(compute_fit_scale(0.0, 792.0, 800.0, 600.0), 1.0);
        assert_eq!(compute_fit_scale(612.0, 792.0, 0.0, 600.0), 1.0);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut r = renderer(3);
        assert!(!r.previous_page());
        assert!(!r.go_to_page(0));
        assert!(!r.go_to_page(4));
        assert!(r.next_page());
        assert!(r.go_to_page(3));
        assert!(!r.next_page());
        assert_eq!(r.current_page(), 3);
    }

    #[test]
    fn test_zoom_clamped_and_stepped() {
        let mut r = renderer(1);
        for _ in 0..40 {
            r.zoom_in();
        }
        assert_eq!(r.zoom(), 3.0);
        for _ in 0..40 {
            r.zoom_out();
        }
        assert_eq!(r.zoom(), 0.5);
        r.reset_zoom();
        r.zoom_in();
        r.zoom_in();
        assert_eq!(r.zoom(), 1.2);
    }

    #[test]
    fn test_applied_render_records_dimensions() {
        let mut r = renderer(1);
        let request = r.begin_render(PageSize::letter());
        assert!(!r.needs_render());
        let outcome = r.finish_render(request.ticket, Ok(Bitmap::new(4, 4)));
        assert_eq!(
            outcome,
            RenderOutcome::Applied {
                page: 1,
                scale: request.scale
            }
        );
        assert_eq!(r.original_dimensions(), Some(PageSize::letter()));
        assert!((r.base_scale() - 600.0 / 792.0).abs() < 1e-12);
        assert!(r.surface().is_some());
        assert_eq!(r.displayed_scale(), Some(request.scale));
    }

    #[test]
    fn test_displayed_scale_waits_for_render() {
        let mut r = renderer(1);
        let first = r.begin_render(PageSize::letter());
        r.finish_render(first.ticket, Ok(Bitmap::new(1, 1)));

        r.set_zoom(2.0);
        assert_eq!(r.displayed_scale(), Some(first.scale));

        let failed = r.begin_render(PageSize::letter());
        r.finish_render(failed.ticket, Err(RenderError::PageUnavailable(1)));
        assert_eq!(r.displayed_scale(), Some(first.scale));

        let applied = r.begin_render(PageSize::letter());
        r.finish_render(applied.ticket, Ok(Bitmap::new(1, 1)));
        assert!((r.displayed_scale().unwrap() - first.scale * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_superseded_ticket_is_stale() {
        let mut r = renderer(2);
        let first = r.begin_render(PageSize::letter());
        r.go_to_page(2);
        let second = r.begin_render(PageSize::new(400.0, 400.0));

        assert_eq!(
            r.finish_render(first.ticket, Ok(Bitmap::new(1, 1))),
            RenderOutcome::Stale
        );
        assert_eq!(r.displayed_page(), None);

        let outcome = r.finish_render(second.ticket, Ok(Bitmap::new(1, 1)));
        assert!(matches!(outcome, RenderOutcome::Applied { page: 2, .. }));
        assert_eq!(r.original_dimensions(), Some(PageSize::new(400.0, 400.0)));
    }

    #[test]
    fn test_navigation_during_render_drops_result() {
        let mut r = renderer(2);
        let request = r.begin_render(PageSize::letter());
        r.go_to_page(2);
        assert_eq!(
            r.finish_render(request.ticket, Ok(Bitmap::new(1, 1))),
            RenderOutcome::Stale
        );
        assert!(r.needs_render());
    }

    #[test]
    fn test_failure_is_kept_for_retry() {
        let mut r = renderer(1);
        let request = r.begin_render(PageSize::letter());
        let err = RenderError::Rasterize {
            page: 1,
            reason: "bad stream".to_string(),
        };
        let outcome = r.finish_render(request.ticket, Err(err.clone()));
        assert_eq!(outcome, RenderOutcome::Failed(err.clone()));
        assert_eq!(r.last_error(), Some(&err));
        assert!(r.needs_render());

        let retry = r.begin_render(PageSize::letter());
        r.finish_render(retry.ticket, Ok(Bitmap::new(1, 1)));
        assert_eq!(r.last_error(), None);
    }
}
