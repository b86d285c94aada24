//! Debounced recomputation of the contain-fit mapping.
//!
//! The host reports container resizes and background changes as they
//! happen; the tracker waits for layout to settle before measuring and
//! recomputing [`ImageDimensions`]. Overlapping requests simply push the
//! deadline back, and the latest measurement always wins.

use std::time::Duration;
use web_time::Instant;

use crate::constants::DEFAULT_LAYOUT_DEBOUNCE;
use crate::geometry::{ImageDimensions, Size};

/// Capability to measure the container the background is rendered into.
pub trait ContainerMeasure {
    /// Current container size in pixels. Zero means "not laid out yet".
    fn measure(&self) -> Size;
}

impl ContainerMeasure for Size {
    fn measure(&self) -> Size {
        *self
    }
}

/// State of the background image's natural size.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ImageState {
    /// No background; the mapping is the identity.
    None,
    /// Decode in progress; keep the previous mapping until it completes.
    Decoding,
    Ready(Size),
}

/// Tracks when the geometry mapping has to be recomputed.
#[derive(Debug)]
pub struct LayoutTracker {
    debounce: Duration,
    /// Time of the most recent change that still needs a recompute.
    pending_since: Option<Instant>,
    image: ImageState,
    container: Size,
    dimensions: ImageDimensions,
}

impl LayoutTracker {
    pub fn new() -> Self {
        Self {
            debounce: DEFAULT_LAYOUT_DEBOUNCE,
            pending_since: None,
            image: ImageState::None,
            container: Size::default(),
            dimensions: ImageDimensions::identity(),
        }
    }

    /// Set the debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Current mapping. May be the identity while layout is pending.
    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    /// Container size seen at the last recompute.
    pub fn container(&self) -> Size {
        self.container
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// The container was resized.
    pub fn notify_resize(&mut self, now: Instant) {
        self.pending_since = Some(now);
        log::trace!("Layout: resize observed");
    }

    /// A new background is being decoded. The current mapping is kept until
    /// [`LayoutTracker::image_decoded`] is called.
    pub fn begin_image_decode(&mut self) {
        self.image = ImageState::Decoding;
        log::trace!("Layout: background decode started");
    }

    /// Background decode finished. `None` means there is no usable image.
    pub fn image_decoded(&mut self, natural: Option<Size>, now: Instant) {
        self.image = match natural {
            Some(size) => ImageState::Ready(size),
            None => ImageState::None,
        };
        self.pending_since = Some(now);
        log::debug!("Layout: background natural size {:?}", natural);
    }

    /// Recompute if the debounce delay has elapsed since the last change.
    ///
    /// Returns the new mapping when a recompute happened. A container that
    /// still measures as zero keeps the request pending so the next layout
    /// pass retries.
    pub fn poll(&mut self, now: Instant, measure: &impl ContainerMeasure) -> Option<ImageDimensions> {
        let since = self.pending_since?;
        if now.saturating_duration_since(since) < self.debounce {
            return None;
        }
        if self.image == ImageState::Decoding {
            return None;
        }

        let container = measure.measure();
        self.container = container;
        self.dimensions = match self.image {
            ImageState::Ready(natural) => ImageDimensions::contain(container, natural),
            ImageState::None | ImageState::Decoding => ImageDimensions::identity(),
        };

        if container.is_degenerate() {
            // Not laid out yet; try again on the next poll
            self.pending_since = Some(now);
        } else {
            self.pending_since = None;
        }

        log::debug!(
            "Layout: container {:.0}x{:.0} -> {:?}",
            container.width,
            container.height,
            self.dimensions
        );
        Some(self.dimensions)
    }
}

impl Default for LayoutTracker {
    fn default() -> Self {
        Self::new()
    }
}
