//! Contain-fit coordinate mapping.
//!
//! Hotspot positions are stored as percentages of the *rendered image*, but
//! pointer events and overlay placement work in percentages of the
//! *container*. When the image is drawn with "contain" fitting it is
//! letterboxed, so the two spaces differ by a scale and an offset per axis.
//! Everything here is a pure function of the measured sizes.

use serde::{Deserialize, Serialize};

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative or not a number.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// A point expressed in percent (0..=100 per axis) of some reference box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pct {
    pub x: f64,
    pub y: f64,
}

impl Pct {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert a pixel offset inside a box of `size` into percent of it.
    /// A degenerate box maps everything to the origin.
    pub fn from_pixels(x: f64, y: f64, size: Size) -> Self {
        if size.is_degenerate() {
            return Self::default();
        }
        Self {
            x: x / size.width * 100.0,
            y: y / size.height * 100.0,
        }
    }

    /// Clamp both axes into `[0, 100]`.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_pct(self.x),
            y: clamp_pct(self.y),
        }
    }

    pub fn distance_to(&self, other: &Pct) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Clamp a percentage into `[0, 100]`; NaN becomes 0.
pub fn clamp_pct(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Where the rendered image content sits inside its container.
///
/// `scale_*` is rendered size / container size (in `(0, 1]`), `offset_*` is
/// the letterbox margin on one side as percent of the container (in `[0, 50)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDimensions {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ImageDimensions {
    /// The mapping used before the container has been laid out.
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Compute the contain-fit mapping of an image of natural size `image`
    /// inside `container`.
    ///
    /// Returns the identity mapping when either size is degenerate; callers
    /// recompute on the next layout pass.
    pub fn contain(container: Size, image: Size) -> Self {
        if container.is_degenerate() || image.is_degenerate() {
            return Self::identity();
        }

        let image_ratio = image.width / image.height;
        let container_ratio = container.width / container.height;

        let (rendered_w, rendered_h) = if image_ratio > container_ratio {
            // Width-constrained: bars above and below
            (container.width, container.width / image_ratio)
        } else {
            // Height-constrained: bars left and right
            (container.height * image_ratio, container.height)
        };

        Self {
            scale_x: rendered_w / container.width,
            scale_y: rendered_h / container.height,
            offset_x: (container.width - rendered_w) / 2.0 / container.width * 100.0,
            offset_y: (container.height - rendered_h) / 2.0 / container.height * 100.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Image percent → container percent.
    pub fn to_container(&self, image_pct: Pct) -> Pct {
        Pct {
            x: image_pct.x * self.scale_x + self.offset_x,
            y: image_pct.y * self.scale_y + self.offset_y,
        }
    }

    /// Container percent → image percent, clamped into the image.
    pub fn to_image(&self, container_pct: Pct) -> Pct {
        Pct {
            x: clamp_pct((container_pct.x - self.offset_x) / self.scale_x),
            y: clamp_pct((container_pct.y - self.offset_y) / self.scale_y),
        }
    }
}

impl Default for ImageDimensions {
    fn default() -> Self {
        Self::identity()
    }
}
