//! Geometry and field types.
//!
//! Two coordinate spaces are in play:
//! - **PDF space**: origin at the bottom-left of the page, +Y up, unscaled
//!   units (what a PDF renderer reports at scale 1.0).
//! - **Viewer space**: origin at the top-left of the container, +Y down,
//!   screen pixels.
//!
//! Only PDF-space geometry is ever stored.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point in PDF space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfPoint {
    pub x: f64,
    pub y: f64,
}

impl PdfPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in PDF space. `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PdfRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge (+Y up).
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> PdfPoint {
        PdfPoint::new(self.x, self.y)
    }

    /// Position of a corner. North is the top edge, which in PDF space is
    /// the larger Y.
    pub fn corner(&self, corner: Corner) -> PdfPoint {
        match corner {
            Corner::NorthWest => PdfPoint::new(self.x, self.top()),
            Corner::NorthEast => PdfPoint::new(self.right(), self.top()),
            Corner::SouthWest => PdfPoint::new(self.x, self.y),
            Corner::SouthEast => PdfPoint::new(self.right(), self.y),
        }
    }

    /// Moves one corner to `point`, keeping the opposite corner where it is.
    ///
    /// The result is not normalized: dragging a corner past its opposite
    /// yields a negative width or height.
    pub fn with_corner_at(&self, corner: Corner, point: PdfPoint) -> Self {
        let anchor = self.corner(corner.opposite());
        let (x, width) = if corner.is_west() {
            (point.x, anchor.x - point.x)
        } else {
            (anchor.x, point.x - anchor.x)
        };
        let (y, height) = if corner.is_north() {
            (anchor.y, point.y - anchor.y)
        } else {
            (point.y, anchor.y - point.y)
        };
        Self::new(x, y, width, height)
    }

    /// Shrinks the rectangle to fit the page if needed, then shifts it so it
    /// lies entirely within `[0, width] x [0, height]`.
    pub fn clamp_within(&self, page: PageSize) -> Self {
        let width = self.width.max(0.0).min(page.width);
        let height = self.height.max(0.0).min(page.height);
        let x = self.x.min(page.width - width).max(0.0);
        let y = self.y.min(page.height - height).max(0.0);
        Self::new(x, y, width, height)
    }

    /// True when the rectangle lies within the page, allowing `epsilon` of
    /// floating-point slack.
    pub fn is_within(&self, page: PageSize, epsilon: f64) -> bool {
        self.x >= -epsilon
            && self.y >= -epsilon
            && self.right() <= page.width + epsilon
            && self.top() <= page.height + epsilon
    }
}

impl fmt::Display for PdfRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}) {:.2}x{:.2}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// A point in viewer (screen) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewerPoint {
    pub x: f64,
    pub y: f64,
}

impl ViewerPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in viewer space. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewerRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewerRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `width` x `height` rectangle centered on `center`.
    pub fn centered_at(center: ViewerPoint, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    /// Position of a corner. North is the top edge, which on screen is the
    /// smaller Y.
    pub fn corner(&self, corner: Corner) -> ViewerPoint {
        match corner {
            Corner::NorthWest => ViewerPoint::new(self.x, self.y),
            Corner::NorthEast => ViewerPoint::new(self.x + self.width, self.y),
            Corner::SouthWest => ViewerPoint::new(self.x, self.y + self.height),
            Corner::SouthEast => ViewerPoint::new(self.x + self.width, self.y + self.height),
        }
    }

    pub fn contains(&self, point: ViewerPoint) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Unscaled page dimensions in PDF units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// US Letter, 612x792 points.
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }
}

/// Size of the scrollable container the page is rendered into, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Resize handle positions, named by compass direction as seen on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    #[serde(rename = "nw")]
    NorthWest,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "sw")]
    SouthWest,
    #[serde(rename = "se")]
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    /// The diagonally opposite corner, which stays fixed during a resize.
    pub fn opposite(self) -> Self {
        match self {
            Self::NorthWest => Self::SouthEast,
            Self::NorthEast => Self::SouthWest,
            Self::SouthWest => Self::NorthEast,
            Self::SouthEast => Self::NorthWest,
        }
    }

    pub fn is_north(self) -> bool {
        matches!(self, Self::NorthWest | Self::NorthEast)
    }

    pub fn is_west(self) -> bool {
        matches!(self, Self::NorthWest | Self::SouthWest)
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NorthWest => write!(f, "nw"),
            Self::NorthEast => write!(f, "ne"),
            Self::SouthWest => write!(f, "sw"),
            Self::SouthEast => write!(f, "se"),
        }
    }
}

/// Opaque signature field identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(Uuid);

impl FieldId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A signature field placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureField {
    pub id: FieldId,
    /// 1-indexed page number.
    pub page_number: u32,
    /// Placement in PDF space.
    pub rect: PdfRect,
    pub label: String,
    pub required: bool,
    /// Unscaled size of the page the field sits on.
    pub page_size: PageSize,
    /// Effective render scale of the last gesture that placed or edited the field.
    pub scale: f64,
}
