//! Runtime-independent pointer events.
//!
//! The host translates whatever its UI toolkit delivers into these. Positions
//! are in percent of the canvas container, not of the image.

use crate::geometry::Pct;
use crate::model::HotspotId;

/// Identifies one pointing device (mouse, pen, finger).
pub type PointerId = u32;

/// Pointer event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// Emitted after a down/up pair on the same element.
    Click,
}

/// What was under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// The background canvas, not on any hotspot
    Canvas,
    /// A hotspot dot
    Hotspot(HotspotId),
    /// The puzzle-assignment popup
    Popup,
    /// Anywhere else on the page
    Outside,
}

/// A pointer event delivered to the builder canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub kind: PointerKind,
    pub target: PointerTarget,
    /// Position in container percent.
    pub position: Pct,
}

impl PointerEvent {
    pub fn new(pointer_id: PointerId, kind: PointerKind, target: PointerTarget, position: Pct) -> Self {
        Self {
            pointer_id,
            kind,
            target,
            position,
        }
    }

    /// Primary-pointer press.
    pub fn down(target: PointerTarget, position: Pct) -> Self {
        Self::new(0, PointerKind::Down, target, position)
    }

    /// Primary-pointer move.
    pub fn moved(target: PointerTarget, position: Pct) -> Self {
        Self::new(0, PointerKind::Move, target, position)
    }

    /// Primary-pointer release.
    pub fn up(target: PointerTarget, position: Pct) -> Self {
        Self::new(0, PointerKind::Up, target, position)
    }

    /// Primary-pointer click.
    pub fn click(target: PointerTarget, position: Pct) -> Self {
        Self::new(0, PointerKind::Click, target, position)
    }
}

/// Side effects the host has to carry out after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEffect {
    /// Route every event of this pointer to the canvas until released.
    CapturePointer(PointerId),
    /// Stop routing; tear down document-level listeners.
    ReleasePointer(PointerId),
    OpenAssignPopup(HotspotId),
    CloseAssignPopup,
    HotspotCreated(HotspotId),
    HotspotMoved(HotspotId),
    HotspotRemoved(HotspotId),
}
