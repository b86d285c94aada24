//! The builder/player session.
//!
//! [`Session`] owns the room graph and every controller that works on it.
//! Hosts forward input to it and render from its accessors; there is no
//! other shared state.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use web_time::Instant;

use crate::geometry::ImageDimensions;
use crate::image_source;
use crate::interaction::{InteractionController, InteractionEffect, InteractionError, PointerEvent};
use crate::layout::{ContainerMeasure, LayoutTracker};
use crate::model::{Answer, HotspotId, PuzzleDraft, PuzzleId};
use crate::payload::SaveResponse;
use crate::play::{AnswerOutcome, PlayEngine, PlayState};
use crate::store::{Room, StoreError};
use crate::sync::{PersistenceSync, RoomBackend, SyncError};

/// Which screen the session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Builder,
    Play,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Builder => "builder",
            Mode::Play => "play",
        })
    }
}

/// A destructive action waiting for the author to confirm it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    DeleteHotspot(HotspotId),
    DeletePuzzle(PuzzleId),
    /// Delete the saved room on the server.
    DeleteRoom(String),
}

/// Errors surfaced to the author.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Only available in {expected} mode")]
    WrongMode { expected: Mode },

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Nothing to confirm")]
    NothingToConfirm,
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Everything one author (or player) is working on.
#[derive(Debug)]
pub struct Session<B> {
    room: Room,
    mode: Mode,
    layout: LayoutTracker,
    interaction: InteractionController,
    play: PlayEngine,
    sync: PersistenceSync<B>,
    confirmation: Option<Confirmation>,
}

impl<B: RoomBackend> Session<B> {
    /// Start with an empty, unsaved room.
    pub fn new(backend: B) -> Self {
        Self::with_room(backend, Room::new())
    }

    pub fn with_room(backend: B, room: Room) -> Self {
        let mut session = Self {
            room: Room::new(),
            mode: Mode::Builder,
            layout: LayoutTracker::new(),
            interaction: InteractionController::new(),
            play: PlayEngine::new(),
            sync: PersistenceSync::new(backend),
            confirmation: None,
        };
        session.replace_room(room, Instant::now());
        session
    }

    /// Replace the layout tracker, e.g. to apply a configured debounce.
    pub fn with_layout(mut self, layout: LayoutTracker) -> Self {
        self.layout = layout;
        let background = self.room.settings.background_image.clone();
        self.decode_background(background.as_deref(), Instant::now());
        self
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn play(&self) -> &PlayEngine {
        &self.play
    }

    pub fn play_state(&self) -> PlayState {
        self.play.state()
    }

    pub fn sync(&self) -> &PersistenceSync<B> {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut PersistenceSync<B> {
        &mut self.sync
    }

    pub fn layout(&self) -> &LayoutTracker {
        &self.layout
    }

    /// Current container ↔ image mapping.
    pub fn dimensions(&self) -> ImageDimensions {
        self.layout.dimensions()
    }

    pub fn pending_confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    fn require(&self, expected: Mode) -> Result<()> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(SessionError::WrongMode { expected })
        }
    }

    // Layout

    pub fn notify_resize(&mut self, now: Instant) {
        self.layout.notify_resize(now);
    }

    /// Recompute the mapping once the debounce has elapsed.
    pub fn poll_layout(
        &mut self,
        now: Instant,
        measure: &impl ContainerMeasure,
    ) -> Option<ImageDimensions> {
        self.layout.poll(now, measure)
    }

    fn decode_background(&mut self, url: Option<&str>, now: Instant) {
        let Some(url) = url else {
            self.layout.image_decoded(None, now);
            return;
        };
        self.layout.begin_image_decode();
        let natural = match image_source::natural_size_of_data_url(url) {
            Ok(size) => Some(size),
            Err(e) => {
                log::warn!("Background image unusable, using identity mapping: {}", e);
                None
            }
        };
        self.layout.image_decoded(natural, now);
    }

    // Settings

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidSetting("room name must not be empty".into()));
        }
        self.room.settings.name = name.to_string();
        Ok(())
    }

    pub fn set_global_minutes(&mut self, minutes: u32) -> Result<()> {
        if minutes == 0 {
            return Err(SessionError::InvalidSetting(
                "timer must be at least one minute".into(),
            ));
        }
        self.room.settings.global_minutes = minutes;
        Ok(())
    }

    /// Set or clear the background image (a data URL).
    pub fn set_background(&mut self, data_url: Option<String>, now: Instant) {
        self.decode_background(data_url.as_deref(), now);
        self.room.settings.background_image = data_url;
    }

    // Builder

    /// Forward a canvas pointer event.
    pub fn pointer(&mut self, event: &PointerEvent) -> Result<Vec<InteractionEffect>> {
        self.require(Mode::Builder)?;
        let dims = self.layout.dimensions();
        Ok(self.interaction.handle(event, &mut self.room, &dims))
    }

    pub fn assign_existing(&mut self, puzzle_id: &PuzzleId) -> Result<HotspotId> {
        self.require(Mode::Builder)?;
        Ok(self.interaction.assign_existing(&mut self.room, puzzle_id)?)
    }

    pub fn assign_new(&mut self, draft: PuzzleDraft) -> Result<(HotspotId, PuzzleId)> {
        self.require(Mode::Builder)?;
        Ok(self.interaction.assign_new(&mut self.room, draft)?)
    }

    pub fn assign_none(&mut self) -> Result<HotspotId> {
        self.require(Mode::Builder)?;
        Ok(self.interaction.assign_none(&mut self.room)?)
    }

    /// Close the assignment popup as if clicking away.
    pub fn cancel_popup(&mut self) -> Vec<InteractionEffect> {
        self.interaction.cancel(&mut self.room)
    }

    /// Create or edit a puzzle from the puzzle form.
    pub fn save_puzzle(&mut self, draft: PuzzleDraft) -> Result<PuzzleId> {
        self.require(Mode::Builder)?;
        Ok(self.room.puzzles.create_or_update(draft)?)
    }

    /// Ask for confirmation of a destructive action. Replaces any earlier
    /// unanswered request.
    pub fn request(&mut self, confirmation: Confirmation) {
        log::debug!("Confirmation requested: {:?}", confirmation);
        self.confirmation = Some(confirmation);
    }

    /// The author declined.
    pub fn dismiss(&mut self) -> Option<Confirmation> {
        self.confirmation.take()
    }

    /// The author confirmed; carry the action out. On error the request is
    /// dropped and nothing changed.
    pub fn confirm(&mut self) -> Result<Confirmation> {
        let confirmation = self
            .confirmation
            .take()
            .ok_or(SessionError::NothingToConfirm)?;
        match &confirmation {
            Confirmation::DeleteHotspot(id) => {
                self.require(Mode::Builder)?;
                self.room.delete_hotspot(id)?;
                self.interaction.forget(id);
                self.refresh_play();
            }
            Confirmation::DeletePuzzle(id) => {
                self.require(Mode::Builder)?;
                self.room.delete_puzzle(id)?;
                self.refresh_play();
            }
            Confirmation::DeleteRoom(room_id) => {
                self.sync.delete(room_id)?;
                if self.room.settings.room_id.as_deref() == Some(room_id.as_str()) {
                    self.room.settings.room_id = None;
                }
            }
        }
        Ok(confirmation)
    }

    // Persistence

    /// Save the whole room. The in-flight guard rejects overlapping saves.
    pub fn save(&mut self) -> Result<SaveResponse> {
        Ok(self.sync.save(&mut self.room)?)
    }

    /// Replace the current room with a stored one. Local state is kept when
    /// the load fails.
    pub fn load(&mut self, room_id: &str, now: Instant) -> Result<()> {
        let room = self.sync.load(room_id)?;
        self.replace_room(room, now);
        Ok(())
    }

    fn replace_room(&mut self, room: Room, now: Instant) {
        self.interaction.reset(&mut self.room);
        self.play.stop();
        self.confirmation = None;
        self.mode = Mode::Builder;
        self.room = room;
        let background = self.room.settings.background_image.clone();
        self.decode_background(background.as_deref(), now);
    }

    // Play

    /// Switch to play mode, starting or resuming the countdown.
    pub fn enter_play(&mut self) -> Vec<InteractionEffect> {
        let effects = self.interaction.reset(&mut self.room);
        self.mode = Mode::Play;
        self.play.enter(&self.room.settings);
        self.refresh_play();
        effects
    }

    /// Re-evaluate completion after the room graph changed. Edits made
    /// between play sessions can leave every remaining puzzle solved.
    fn refresh_play(&mut self) {
        self.play.prune(&self.room.hotspots);
        self.play.check_win(&self.room.hotspots);
    }

    /// Back to the builder; the countdown is suspended.
    pub fn leave_play(&mut self) {
        self.play.leave();
        self.mode = Mode::Builder;
    }

    pub fn pause(&mut self) -> Result<()> {
        self.require(Mode::Play)?;
        self.play.pause();
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.require(Mode::Play)?;
        self.play.resume();
        self.refresh_play();
        Ok(())
    }

    pub fn restart(&mut self) -> Result<()> {
        self.require(Mode::Play)?;
        self.play.restart(&self.room.settings);
        Ok(())
    }

    /// Let wall time pass. Returns the number of timer ticks that ran.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.mode != Mode::Play {
            return 0;
        }
        self.play.advance(elapsed)
    }

    /// Check raw player input against the hotspot's puzzle.
    pub fn submit_answer(&mut self, hotspot_id: &HotspotId, input: &str) -> Result<AnswerOutcome> {
        self.require(Mode::Play)?;
        let answer = match self.room.puzzle_for(hotspot_id) {
            Some(puzzle) => puzzle.rule.parse_answer(input),
            None => Answer::Text(input.to_string()),
        };
        Ok(self.play.submit_answer(&self.room, hotspot_id, &answer))
    }

    /// Solved flag per hotspot, in hotspot order.
    pub fn completion(&self) -> Vec<bool> {
        self.play.completion(&self.room.hotspots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RoomApi;
    use crate::geometry::{Pct, Size};
    use crate::interaction::PointerTarget;
    use crate::sync::LocalBackend;
    use room_db::Database;

    const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn session() -> Session<LocalBackend> {
        Session::new(LocalBackend::new(RoomApi::new(Database::in_memory())))
    }

    fn click(session: &mut Session<LocalBackend>, target: PointerTarget, x: f64, y: f64) {
        session
            .pointer(&PointerEvent::click(target, Pct::new(x, y)))
            .unwrap();
    }

    #[test]
    fn test_build_play_and_win() {
        let mut s = session();
        click(&mut s, PointerTarget::Canvas, 30.0, 30.0);
        let (hid, _) = s
            .assign_new(PuzzleDraft::mcq("2+2?", ["3", "4"], 1))
            .unwrap();
        click(&mut s, PointerTarget::Canvas, 60.0, 60.0);
        s.cancel_popup();
        assert_eq!(s.room().hotspots.len(), 1);

        s.enter_play();
        assert!(s.pointer(&PointerEvent::click(PointerTarget::Canvas, Pct::new(1.0, 1.0))).is_err());
        assert_eq!(
            s.submit_answer(&hid, "0").unwrap(),
            AnswerOutcome::Incorrect { clue: None }
        );
        assert_eq!(
            s.submit_answer(&hid, " 1 ").unwrap(),
            AnswerOutcome::Correct { won: true }
        );
        assert_eq!(s.completion(), vec![true]);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut s = session();
        let pid = s.save_puzzle(PuzzleDraft::short("Year?", "1985")).unwrap();
        click(&mut s, PointerTarget::Canvas, 30.0, 30.0);
        let hid = s.assign_existing(&pid).unwrap();

        s.request(Confirmation::DeletePuzzle(pid.clone()));
        assert_eq!(s.dismiss(), Some(Confirmation::DeletePuzzle(pid.clone())));
        assert!(s.room().puzzles.contains(&pid));
        assert!(matches!(s.confirm(), Err(SessionError::NothingToConfirm)));

        s.request(Confirmation::DeletePuzzle(pid.clone()));
        s.confirm().unwrap();
        assert!(!s.room().puzzles.contains(&pid));
        assert!(s.room().hotspots.get(&hid).unwrap().puzzle_id.is_none());

        s.request(Confirmation::DeleteHotspot(hid.clone()));
        s.confirm().unwrap();
        assert!(s.room().hotspots.is_empty());
    }

    fn two_puzzle_room(s: &mut Session<LocalBackend>) -> (HotspotId, HotspotId) {
        click(s, PointerTarget::Canvas, 30.0, 30.0);
        let (a, _) = s.assign_new(PuzzleDraft::short("Year?", "1985")).unwrap();
        click(s, PointerTarget::Canvas, 60.0, 60.0);
        let (b, _) = s.assign_new(PuzzleDraft::short("Code?", "0451")).unwrap();
        (a, b)
    }

    #[test]
    fn test_deleting_last_unsolved_hotspot_wins_on_return() {
        let mut s = session();
        let (a, b) = two_puzzle_room(&mut s);

        s.enter_play();
        assert_eq!(
            s.submit_answer(&a, "1985").unwrap(),
            AnswerOutcome::Correct { won: false }
        );
        s.leave_play();

        s.request(Confirmation::DeleteHotspot(b));
        s.confirm().unwrap();
        s.enter_play();

        assert_eq!(s.play_state(), PlayState::Won { seconds_left: 300 });
        assert_eq!(s.completion(), vec![true]);
    }

    #[test]
    fn test_deleting_unsolved_puzzle_wins_on_reentry() {
        let mut s = session();
        let (a, b) = two_puzzle_room(&mut s);
        let b_puzzle = s.room().hotspots.get(&b).unwrap().puzzle_id.clone().unwrap();

        s.enter_play();
        s.submit_answer(&a, "1985").unwrap();
        s.pause().unwrap();
        s.leave_play();

        s.request(Confirmation::DeletePuzzle(b_puzzle));
        s.confirm().unwrap();
        assert!(!s.room().hotspots.get(&b).unwrap().is_linked());

        s.enter_play();
        assert!(matches!(s.play_state(), PlayState::Won { .. }));
        assert_eq!(s.submit_answer(&a, "1985").unwrap(), AnswerOutcome::NotRunning);
    }

    #[test]
    fn test_graph_deletes_need_builder_mode() {
        let mut s = session();
        let (a, _) = two_puzzle_room(&mut s);
        s.enter_play();

        s.request(Confirmation::DeleteHotspot(a.clone()));
        assert!(matches!(
            s.confirm(),
            Err(SessionError::WrongMode {
                expected: Mode::Builder
            })
        ));
        assert!(s.room().hotspots.contains(&a));
        assert!(s.pending_confirmation().is_none());
    }

    #[test]
    fn test_leaving_play_keeps_time() {
        let mut s = session();
        s.set_global_minutes(1).unwrap();
        s.enter_play();
        assert_eq!(s.advance(Duration::from_secs(10)), 10);

        s.leave_play();
        assert_eq!(s.advance(Duration::from_secs(10)), 0);
        s.enter_play();
        assert_eq!(s.play_state(), PlayState::Running { seconds_left: 50 });
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut s = session();
        assert!(matches!(
            s.set_global_minutes(0),
            Err(SessionError::InvalidSetting(_))
        ));
        assert!(s.set_name("   ").is_err());
        assert_eq!(s.room().settings.global_minutes, 5);
    }

    #[test]
    fn test_background_drives_layout() {
        let mut s = session();
        let t0 = Instant::now();
        s.set_background(Some(PIXEL_PNG.to_string()), t0);

        let dims = s
            .poll_layout(t0 + Duration::from_secs(1), &Size::new(200.0, 100.0))
            .unwrap();
        assert!((dims.scale_x - 0.5).abs() < 1e-9);
        assert!((dims.offset_x - 25.0).abs() < 1e-9);

        s.set_background(Some("data:image/png;base64,AAAA".to_string()), t0);
        let dims = s
            .poll_layout(t0 + Duration::from_secs(1), &Size::new(200.0, 100.0))
            .unwrap();
        assert!(dims.is_identity());
    }

    #[test]
    fn test_save_load_and_delete_room() {
        let mut s = session();
        s.set_name("Vault").unwrap();
        click(&mut s, PointerTarget::Canvas, 30.0, 30.0);
        s.assign_new(PuzzleDraft::short("Code?", "0451")).unwrap();
        let saved = s.save().unwrap();

        s.load(&saved.room_id, Instant::now()).unwrap();
        assert_eq!(s.room().settings.name, "Vault");
        assert_eq!(s.room().hotspots.linked_count(), 1);

        assert!(s.load("missing", Instant::now()).is_err());
        assert_eq!(s.room().settings.name, "Vault");

        s.request(Confirmation::DeleteRoom(saved.room_id.clone()));
        s.confirm().unwrap();
        assert!(!s.room().settings.is_saved());
        assert!(matches!(
            s.load(&saved.room_id, Instant::now()),
            Err(SessionError::Sync(SyncError::NotFound(_)))
        ));
    }
}
