//! Document source abstraction.
//!
//! The editor never parses PDFs itself. A [`DocumentSource`] loads a document
//! from a URL, reports page count and page sizes, and rasterizes pages at a
//! requested scale. Timeouts and retries of the underlying fetch belong to
//! the implementation.

use async_trait::async_trait;
use image::Rgba;

use crate::error::RenderError;
use crate::model::PageSize;
use crate::render::Bitmap;

/// Trait abstracting PDF loading and rasterization.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Loaded document handle.
    type Handle: Send + Sync;

    /// Fetches and parses the document at `url`.
    async fn load_document(&self, url: &str) -> Result<Self::Handle, RenderError>;

    /// Number of pages in the document.
    fn page_count(&self, handle: &Self::Handle) -> u32;

    /// Unscaled size of a 1-indexed page.
    fn page_size(&self, handle: &Self::Handle, page: u32) -> Result<PageSize, RenderError>;

    /// Rasterizes a 1-indexed page at `scale`.
    async fn render_page(
        &self,
        handle: &Self::Handle,
        page: u32,
        scale: f64,
    ) -> Result<Bitmap, RenderError>;
}

/// In-memory document of blank pages.
///
/// Renders white bitmaps of the scaled page size. Used for headless session
/// replay where only the geometry matters.
#[derive(Debug, Clone, Default)]
pub struct BlankDocument {
    pages: Vec<PageSize>,
}

impl BlankDocument {
    pub fn new(pages: Vec<PageSize>) -> Self {
        Self { pages }
    }

    /// `count` US Letter pages.
    pub fn letter(count: usize) -> Self {
        Self::new(vec![PageSize::letter(); count])
    }

    fn page(&self, page: u32) -> Result<PageSize, RenderError> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .copied()
            .ok_or(RenderError::PageUnavailable(page))
    }
}

#[async_trait]
impl DocumentSource for BlankDocument {
    type Handle = ();

    async fn load_document(&self, url: &str) -> Result<Self::Handle, RenderError> {
        if self.pages.is_empty() {
            return Err(RenderError::Load(format!("{url} has no pages")));
        }
        Ok(())
    }

    fn page_count(&self, _handle: &Self::Handle) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    fn page_size(&self, _handle: &Self::Handle, page: u32) -> Result<PageSize, RenderError> {
        self.page(page)
    }

    async fn render_page(
        &self,
        _handle: &Self::Handle,
        page: u32,
        scale: f64,
    ) -> Result<Bitmap, RenderError> {
        let size = self.page(page)?;
        let width = pixels(size.width * scale);
        let height = pixels(size.height * scale);
        Ok(Bitmap::from_pixel(width, height, Rgba([255, 255, 255, 255])))
    }
}

fn pixels(len: f64) -> u32 {
    // Saturating float-to-int cast; NaN maps to 0 and is raised to 1.
    (len.ceil() as u32).max(1)
}
