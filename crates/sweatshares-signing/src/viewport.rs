//! Coordinate transformation between viewer space and PDF space.
//!
//! Viewer coordinates are container pixels (0,0 at top-left, +Y down). PDF
//! coordinates are unscaled page units (0,0 at bottom-left, +Y up). The
//! rasterized page sits inside a scrollable container, so pointer positions
//! are first made relative to the render surface's top-left corner.
//!
//! A [`ViewTransform`] is a snapshot of `(scale, surface offset, surface
//! height)`. Build a fresh one for every pointer event with
//! [`ViewTransform::derive`]; holding on to one across zoom, page or
//! container changes maps the pointer to the wrong place.

use std::fmt;

use crate::error::{EditorError, EditorResult};
use crate::model::{ContainerSize, PageSize, PdfPoint, PdfRect, ViewerPoint, ViewerRect};
use crate::render::compute_fit_scale_capped;

/// Scale and placement of a rendered page within its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f64,
    surface_offset: ViewerPoint,
    surface_height_px: f64,
}

impl ViewTransform {
    /// Creates a transform from an effective scale, the surface's offset
    /// within the container and the surface height in pixels.
    pub fn new(
        scale: f64,
        surface_offset: ViewerPoint,
        surface_height_px: f64,
    ) -> EditorResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(EditorError::InvalidScale(scale));
        }
        Ok(Self {
            scale,
            surface_offset,
            surface_height_px,
        })
    }

    /// Derives the transform for a page rendered to fit `container` at `zoom`.
    ///
    /// Effective scale is `fit_scale * zoom`; the surface is the page at that
    /// scale, so its height is `page.height * scale`.
    pub fn derive(
        page: PageSize,
        container: ContainerSize,
        zoom: f64,
        max_fit_scale: f64,
        surface_offset: ViewerPoint,
    ) -> EditorResult<Self> {
        let fit = compute_fit_scale_capped(
            page.width,
            page.height,
            container.width,
            container.height,
            max_fit_scale,
        );
        let scale = fit * zoom;
        Self::new(scale, surface_offset, page.height * scale)
    }

    /// Effective scale (viewer pixels per PDF unit).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn surface_offset(&self) -> ViewerPoint {
        self.surface_offset
    }

    pub fn surface_height_px(&self) -> f64 {
        self.surface_height_px
    }

    /// Surface height expressed in PDF units.
    pub fn surface_height_pdf(&self) -> f64 {
        self.surface_height_px / self.scale
    }

    /// Converts a viewer rectangle to PDF space.
    ///
    /// Formula:
    /// ```text
    /// pdf_x = (viewer_x - offset_x) / scale
    /// pdf_h = viewer_h / scale
    /// pdf_y = surface_h / scale - (viewer_y - offset_y) / scale - pdf_h   // Flip Y-axis
    /// ```
    pub fn viewer_to_pdf(&self, rect: ViewerRect) -> PdfRect {
        let rel_x = rect.x - self.surface_offset.x;
        let rel_y = rect.y - self.surface_offset.y;
        let width = rect.width / self.scale;
        let height = rect.height / self.scale;
        let x = rel_x / self.scale;
        let y = self.surface_height_pdf() - rel_y / self.scale - height;
        PdfRect::new(x, y, width, height)
    }

    /// Converts a PDF rectangle to viewer space. Exact inverse of
    /// [`viewer_to_pdf`](Self::viewer_to_pdf).
    ///
    /// Formula:
    /// ```text
    /// viewer_x = pdf_x * scale + offset_x
    /// viewer_y = surface_h - (pdf_y + pdf_h) * scale + offset_y   // Flip Y-axis
    /// ```
    pub fn pdf_to_viewer(&self, rect: PdfRect) -> ViewerRect {
        let x = rect.x * self.scale + self.surface_offset.x;
        let y = self.surface_height_px - (rect.y + rect.height) * self.scale
            + self.surface_offset.y;
        ViewerRect::new(x, y, rect.width * self.scale, rect.height * self.scale)
    }

    /// Converts a viewer point to PDF space.
    pub fn viewer_point_to_pdf(&self, point: ViewerPoint) -> PdfPoint {
        let pdf = self.viewer_to_pdf(ViewerRect::new(point.x, point.y, 0.0, 0.0));
        PdfPoint::new(pdf.x, pdf.y)
    }

    /// Converts a PDF point to viewer space.
    pub fn pdf_point_to_viewer(&self, point: PdfPoint) -> ViewerPoint {
        let viewer = self.pdf_to_viewer(PdfRect::new(point.x, point.y, 0.0, 0.0));
        ViewerPoint::new(viewer.x, viewer.y)
    }

    /// Converts a viewer-pixel length to PDF units.
    pub fn viewer_len_to_pdf(&self, px: f64) -> f64 {
        px / self.scale
    }

    /// Converts a PDF length to viewer pixels.
    pub fn pdf_len_to_viewer(&self, len: f64) -> f64 {
        len * self.scale
    }
}

impl fmt::Display for ViewTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scale: {:.3}x | Offset: ({:.1}, {:.1}) | Surface height: {:.1}px",
            self.scale, self.surface_offset.x, self.surface_offset.y, self.surface_height_px
        )
    }
}
