//! Detection output types shared across the pipeline.

/// Coarse shape category assigned by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Wallet,
    Handbag,
    Backpack,
}

impl Category {
    /// Lowercase label used for logging and recommendation lookup.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Wallet => "wallet",
            Category::Handbag => "handbag",
            Category::Backpack => "backpack",
        }
    }

    /// Synthetic confidence range for this category.
    ///
    /// The classifier has no model behind it; confidence is sampled from these
    /// ranges to mimic per-category detector behaviour.
    pub fn confidence_range(&self) -> (f64, f64) {
        match self {
            Category::Wallet => (0.75, 0.90),
            Category::Handbag => (0.72, 0.88),
            Category::Backpack => (0.80, 0.95),
        }
    }
}

/// Axis-aligned bounding rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width over height. Returns 0.0 for a degenerate box.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Grow the box by `padding` pixels on every side, clamped to the frame.
    ///
    /// The padded box never leaves `[0, frame_width) x [0, frame_height)`.
    pub fn padded(&self, padding: u32, frame_width: u32, frame_height: u32) -> Self {
        let x = self.x.saturating_sub(padding);
        let y = self.y.saturating_sub(padding);
        let width = (self.width + 2 * padding).min(frame_width.saturating_sub(x));
        let height = (self.height + 2 * padding).min(frame_height.saturating_sub(y));
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the box lies entirely inside a `frame_width` x `frame_height` frame.
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.x + self.width <= frame_width && self.y + self.height <= frame_height
    }
}

/// Connected edge region extracted from a frame, before filtering.
///
/// `area` is the pixel area covered by the region's active chunks, the
/// heuristic stand-in for a filled contour area.
#[derive(Clone, Copy, Debug)]
pub struct Contour {
    pub bounds: BoundingBox,
    pub area: u32,
}

/// One classified shape in a gated frame.
#[derive(Clone, Debug)]
pub struct Detection {
    pub category: Category,
    /// Synthetic confidence, always within `category.confidence_range()`.
    pub confidence: f64,
    /// Padded bounding box, clamped to frame bounds.
    pub bbox: BoundingBox,
    /// Area of the source contour in pixels.
    pub area: u32,
}
