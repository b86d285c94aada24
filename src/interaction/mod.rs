//! Builder canvas pointer handling.
//!
//! [`InteractionController`] turns [`PointerEvent`]s into hotspot creation,
//! dragging and the click-to-assign popup. It holds only its state tag; all
//! data lives in the [`Room`] passed to each call.

mod event;

pub use event::{InteractionEffect, PointerEvent, PointerId, PointerKind, PointerTarget};

use thiserror::Error;

use crate::constants::MIN_DRAG_DISTANCE;
use crate::geometry::{ImageDimensions, Pct};
use crate::model::{HotspotId, PuzzleDraft, PuzzleId};
use crate::store::{Room, StoreError};

/// Errors from the assignment popup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    /// Assign was called while no popup was open
    #[error("No hotspot is waiting for a puzzle")]
    NothingPending,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Popup open for a hotspot awaiting a puzzle link.
    PendingAssign {
        hotspot_id: HotspotId,
        /// The hotspot was created by the click that opened the popup.
        created: bool,
    },
    /// A hotspot follows the captured pointer.
    Dragging(Drag),
}

/// An in-progress hotspot drag.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub hotspot_id: HotspotId,
    pub pointer_id: PointerId,
    /// Pointer position minus hotspot position, in container percent.
    pub grab_offset: Pct,
    /// Where the pointer went down.
    pub origin: Pct,
    /// Moved past [`MIN_DRAG_DISTANCE`] at some point.
    pub moved: bool,
}

/// Pointer state machine for the builder canvas.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    /// Swallow the click synthesized after a real drag.
    suppress_click: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    /// Hotspot shown in the assignment popup, if any.
    pub fn pending_hotspot(&self) -> Option<&HotspotId> {
        match &self.state {
            InteractionState::PendingAssign { hotspot_id, .. } => Some(hotspot_id),
            _ => None,
        }
    }

    /// Hotspot currently being dragged, if any.
    pub fn dragging_hotspot(&self) -> Option<&HotspotId> {
        match &self.state {
            InteractionState::Dragging(drag) => Some(&drag.hotspot_id),
            _ => None,
        }
    }

    /// Feed one pointer event. `dims` maps the event's container position
    /// into image space.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        room: &mut Room,
        dims: &ImageDimensions,
    ) -> Vec<InteractionEffect> {
        match self.state.clone() {
            InteractionState::Idle => self.handle_idle(event, room, dims),
            InteractionState::PendingAssign {
                hotspot_id,
                created,
            } => self.handle_pending(event, room, hotspot_id, created),
            InteractionState::Dragging(drag) => {
                if event.pointer_id != drag.pointer_id {
                    return Vec::new();
                }
                match event.kind {
                    PointerKind::Move => self.drag_to(drag, event.position, room, dims),
                    PointerKind::Up => {
                        log::debug!(
                            "Drag of hotspot {} ended (moved: {})",
                            drag.hotspot_id,
                            drag.moved
                        );
                        self.suppress_click = drag.moved;
                        self.state = InteractionState::Idle;
                        vec![InteractionEffect::ReleasePointer(drag.pointer_id)]
                    }
                    PointerKind::Down | PointerKind::Click => Vec::new(),
                }
            }
        }
    }

    fn handle_idle(
        &mut self,
        event: &PointerEvent,
        room: &mut Room,
        dims: &ImageDimensions,
    ) -> Vec<InteractionEffect> {
        match (&event.kind, &event.target) {
            (PointerKind::Down, PointerTarget::Hotspot(id)) => {
                self.suppress_click = false;
                let Some(hotspot) = room.hotspots.get(id) else {
                    return Vec::new();
                };
                let anchor = dims.to_container(hotspot.position);
                self.state = InteractionState::Dragging(Drag {
                    hotspot_id: id.clone(),
                    pointer_id: event.pointer_id,
                    grab_offset: Pct::new(event.position.x - anchor.x, event.position.y - anchor.y),
                    origin: event.position,
                    moved: false,
                });
                log::debug!("Drag of hotspot {} started", id);
                vec![InteractionEffect::CapturePointer(event.pointer_id)]
            }
            (PointerKind::Down, _) => {
                self.suppress_click = false;
                Vec::new()
            }
            (PointerKind::Click, _) if self.suppress_click => {
                self.suppress_click = false;
                log::trace!("Click after drag swallowed");
                Vec::new()
            }
            (PointerKind::Click, PointerTarget::Canvas) => {
                let id = room.hotspots.create(dims.to_image(event.position));
                self.open_popup(id.clone(), true);
                vec![
                    InteractionEffect::HotspotCreated(id.clone()),
                    InteractionEffect::OpenAssignPopup(id),
                ]
            }
            (PointerKind::Click, PointerTarget::Hotspot(id)) if room.hotspots.contains(id) => {
                self.open_popup(id.clone(), false);
                vec![InteractionEffect::OpenAssignPopup(id.clone())]
            }
            _ => Vec::new(),
        }
    }

    fn handle_pending(
        &mut self,
        event: &PointerEvent,
        room: &mut Room,
        hotspot_id: HotspotId,
        created: bool,
    ) -> Vec<InteractionEffect> {
        if event.kind != PointerKind::Click {
            return Vec::new();
        }
        match &event.target {
            PointerTarget::Popup => Vec::new(),
            PointerTarget::Hotspot(id) if *id == hotspot_id => Vec::new(),
            PointerTarget::Hotspot(id) if room.hotspots.contains(id) => {
                let mut effects = self.dismiss(room, hotspot_id, created);
                self.open_popup(id.clone(), false);
                effects.push(InteractionEffect::OpenAssignPopup(id.clone()));
                effects
            }
            _ => self.dismiss(room, hotspot_id, created),
        }
    }

    fn drag_to(
        &mut self,
        mut drag: Drag,
        pointer: Pct,
        room: &mut Room,
        dims: &ImageDimensions,
    ) -> Vec<InteractionEffect> {
        let target = Pct::new(pointer.x - drag.grab_offset.x, pointer.y - drag.grab_offset.y);
        let position = dims.to_image(target);
        if !room.hotspots.move_to(&drag.hotspot_id, position) {
            // Hotspot vanished under the pointer
            self.state = InteractionState::Idle;
            return vec![InteractionEffect::ReleasePointer(drag.pointer_id)];
        }
        log::trace!(
            "Hotspot {} dragged to ({:.2}%, {:.2}%)",
            drag.hotspot_id,
            position.x,
            position.y
        );
        drag.moved = drag.moved || pointer.distance_to(&drag.origin) > MIN_DRAG_DISTANCE;
        let hotspot_id = drag.hotspot_id.clone();
        self.state = InteractionState::Dragging(drag);
        vec![InteractionEffect::HotspotMoved(hotspot_id)]
    }

    fn open_popup(&mut self, hotspot_id: HotspotId, created: bool) {
        log::debug!("Assign popup opened for hotspot {} (new: {})", hotspot_id, created);
        self.state = InteractionState::PendingAssign {
            hotspot_id,
            created,
        };
    }

    /// Close the popup; an abandoned fresh hotspot goes with it.
    fn dismiss(
        &mut self,
        room: &mut Room,
        hotspot_id: HotspotId,
        created: bool,
    ) -> Vec<InteractionEffect> {
        self.state = InteractionState::Idle;
        let mut effects = Vec::new();
        let abandoned = created
            && room
                .hotspots
                .get(&hotspot_id)
                .is_some_and(|h| !h.is_linked());
        if abandoned && room.hotspots.remove(&hotspot_id).is_some() {
            log::debug!("Abandoned hotspot {} removed", hotspot_id);
            effects.push(InteractionEffect::HotspotRemoved(hotspot_id));
        }
        effects.push(InteractionEffect::CloseAssignPopup);
        effects
    }

    /// Cancel the popup as if the author clicked away (e.g. Escape).
    pub fn cancel(&mut self, room: &mut Room) -> Vec<InteractionEffect> {
        match self.state.clone() {
            InteractionState::PendingAssign {
                hotspot_id,
                created,
            } => self.dismiss(room, hotspot_id, created),
            _ => Vec::new(),
        }
    }

    /// Link the pending hotspot to an existing puzzle and close the popup.
    /// On error the popup stays open.
    pub fn assign_existing(
        &mut self,
        room: &mut Room,
        puzzle_id: &PuzzleId,
    ) -> Result<HotspotId, InteractionError> {
        let hotspot_id = self
            .pending_hotspot()
            .cloned()
            .ok_or(InteractionError::NothingPending)?;
        room.link_hotspot(&hotspot_id, puzzle_id)?;
        self.state = InteractionState::Idle;
        Ok(hotspot_id)
    }

    /// Create a puzzle from the inline form and link the pending hotspot to it.
    ///
    /// A draft that fails validation leaves both the stores and the popup as
    /// they were, so the author can fix the form.
    pub fn assign_new(
        &mut self,
        room: &mut Room,
        draft: PuzzleDraft,
    ) -> Result<(HotspotId, PuzzleId), InteractionError> {
        let hotspot_id = self
            .pending_hotspot()
            .cloned()
            .ok_or(InteractionError::NothingPending)?;
        if !room.hotspots.contains(&hotspot_id) {
            return Err(StoreError::UnknownHotspot(hotspot_id).into());
        }
        let puzzle_id = room.puzzles.create_or_update(draft)?;
        room.link_hotspot(&hotspot_id, &puzzle_id)?;
        self.state = InteractionState::Idle;
        Ok((hotspot_id, puzzle_id))
    }

    /// Unlink the pending hotspot and close the popup, keeping the hotspot.
    pub fn assign_none(&mut self, room: &mut Room) -> Result<HotspotId, InteractionError> {
        let hotspot_id = self
            .pending_hotspot()
            .cloned()
            .ok_or(InteractionError::NothingPending)?;
        room.unlink_hotspot(&hotspot_id)?;
        self.state = InteractionState::Idle;
        Ok(hotspot_id)
    }

    /// Drop any state that refers to a hotspot deleted elsewhere.
    pub fn forget(&mut self, hotspot_id: &HotspotId) -> Vec<InteractionEffect> {
        match &self.state {
            InteractionState::PendingAssign { hotspot_id: id, .. } if id == hotspot_id => {
                self.state = InteractionState::Idle;
                vec![InteractionEffect::CloseAssignPopup]
            }
            InteractionState::Dragging(drag) if drag.hotspot_id == *hotspot_id => {
                let pointer_id = drag.pointer_id;
                self.state = InteractionState::Idle;
                vec![InteractionEffect::ReleasePointer(pointer_id)]
            }
            _ => Vec::new(),
        }
    }

    /// Return to `Idle`, releasing anything held. Used when leaving builder mode.
    pub fn reset(&mut self, room: &mut Room) -> Vec<InteractionEffect> {
        self.suppress_click = false;
        match self.state.clone() {
            InteractionState::Idle => Vec::new(),
            InteractionState::PendingAssign {
                hotspot_id,
                created,
            } => self.dismiss(room, hotspot_id, created),
            InteractionState::Dragging(drag) => {
                self.state = InteractionState::Idle;
                vec![InteractionEffect::ReleasePointer(drag.pointer_id)]
            }
        }
    }
}
