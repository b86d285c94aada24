//! Play mode: countdown, per-hotspot completion and win detection.

use std::collections::HashSet;
use std::time::Duration;

use crate::constants::TICK_INTERVAL;
use crate::model::{Answer, HotspotId, Settings};
use crate::store::{HotspotStore, Room};

/// Play-mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    /// Never started (or reset by a new room).
    #[default]
    Stopped,
    Running { seconds_left: u32 },
    /// Timer halted by the player or by switching back to the builder.
    Paused { seconds_left: u32 },
    /// Every linked hotspot solved.
    Won { seconds_left: u32 },
    TimedOut,
}

impl PlayState {
    /// Seconds on the clock, if one is showing.
    pub fn seconds_left(&self) -> u32 {
        match *self {
            PlayState::Running { seconds_left }
            | PlayState::Paused { seconds_left }
            | PlayState::Won { seconds_left } => seconds_left,
            PlayState::Stopped | PlayState::TimedOut => 0,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, PlayState::Running { .. })
    }

    /// Won or timed out; only a restart leaves these.
    pub fn is_finished(&self) -> bool {
        matches!(self, PlayState::Won { .. } | PlayState::TimedOut)
    }
}

/// Result of submitting an answer for a hotspot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Hotspot marked complete; `won` is set when this completed the room.
    Correct { won: bool },
    /// Wrong answer, with the puzzle's clue if it has one.
    Incorrect { clue: Option<String> },
    AlreadySolved,
    /// Hotspot is decorative.
    NoPuzzle,
    /// The timer is not running.
    NotRunning,
    UnknownHotspot,
}

/// Turns elapsed wall time into whole timer ticks.
#[derive(Debug, Clone, Default)]
struct TickTimer {
    carry: Duration,
}

impl TickTimer {
    /// Add elapsed time and return how many ticks are due.
    fn advance(&mut self, elapsed: Duration) -> u32 {
        self.carry += elapsed;
        let mut ticks = 0;
        while self.carry >= TICK_INTERVAL {
            self.carry -= TICK_INTERVAL;
            ticks += 1;
        }
        ticks
    }

    fn reset(&mut self) {
        self.carry = Duration::ZERO;
    }
}

/// Play-mode state machine.
///
/// Completion is keyed by hotspot id, so deleting or reordering hotspots
/// never moves a solved flag onto a different hotspot.
#[derive(Debug, Clone, Default)]
pub struct PlayEngine {
    state: PlayState,
    solved: HashSet<HotspotId>,
    timer: TickTimer,
}

impl PlayEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Switch into play mode.
    ///
    /// A fresh engine starts the countdown, a paused one resumes. Finished
    /// games stay finished until [`PlayEngine::restart`].
    pub fn enter(&mut self, settings: &Settings) {
        match self.state {
            PlayState::Stopped => self.start(settings),
            PlayState::Paused { .. } => self.resume(),
            PlayState::Running { .. } | PlayState::Won { .. } | PlayState::TimedOut => {}
        }
    }

    /// Switch back to the builder. Time and completion are kept.
    pub fn leave(&mut self) {
        if self.state.is_running() {
            log::debug!("Leaving play mode, timer suspended");
        }
        self.pause();
    }

    pub fn pause(&mut self) {
        if let PlayState::Running { seconds_left } = self.state {
            self.state = PlayState::Paused { seconds_left };
            self.timer.reset();
        }
    }

    pub fn resume(&mut self) {
        if let PlayState::Paused { seconds_left } = self.state {
            self.state = PlayState::Running { seconds_left };
            self.timer.reset();
        }
    }

    /// Full countdown, no completion, running.
    pub fn restart(&mut self, settings: &Settings) {
        self.start(settings);
    }

    /// Forget everything, e.g. after loading another room.
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.solved.clear();
        self.timer.reset();
    }

    fn start(&mut self, settings: &Settings) {
        let seconds_left = settings.timer_seconds();
        self.solved.clear();
        self.timer.reset();
        self.state = if seconds_left == 0 {
            PlayState::TimedOut
        } else {
            PlayState::Running { seconds_left }
        };
        log::info!("Play started with {}", format_clock(seconds_left));
    }

    /// Feed elapsed wall time; runs every tick that became due. Returns the
    /// number of ticks run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.state.is_running() {
            return 0;
        }
        let due = self.timer.advance(elapsed);
        let mut ran = 0;
        for _ in 0..due {
            if !self.tick() {
                break;
            }
            ran += 1;
        }
        ran
    }

    /// One timer period. Returns false when the timer is not running.
    pub fn tick(&mut self) -> bool {
        let PlayState::Running { seconds_left } = self.state else {
            return false;
        };
        let seconds_left = seconds_left.saturating_sub(1);
        log::trace!("Tick: {}", format_clock(seconds_left));
        if seconds_left == 0 {
            log::info!("Time is up");
            self.state = PlayState::TimedOut;
            self.timer.reset();
        } else {
            self.state = PlayState::Running { seconds_left };
        }
        true
    }

    /// Check an answer for a hotspot and record completion.
    pub fn submit_answer(
        &mut self,
        room: &Room,
        hotspot_id: &HotspotId,
        answer: &Answer,
    ) -> AnswerOutcome {
        if !self.state.is_running() {
            return AnswerOutcome::NotRunning;
        }
        if !room.hotspots.contains(hotspot_id) {
            return AnswerOutcome::UnknownHotspot;
        }
        if self.solved.contains(hotspot_id) {
            return AnswerOutcome::AlreadySolved;
        }
        let Some(puzzle) = room.puzzle_for(hotspot_id) else {
            return AnswerOutcome::NoPuzzle;
        };

        if !puzzle.rule.accepts(answer) {
            log::debug!("Wrong answer for hotspot {}", hotspot_id);
            return AnswerOutcome::Incorrect {
                clue: puzzle.clue.clone(),
            };
        }

        self.solved.insert(hotspot_id.clone());
        log::debug!("Hotspot {} solved", hotspot_id);
        let won = self.check_win(&room.hotspots);
        AnswerOutcome::Correct { won }
    }

    /// Transition to `Won` if every linked hotspot is solved. Rooms with no
    /// linked hotspots are never won.
    pub fn check_win(&mut self, hotspots: &HotspotStore) -> bool {
        let PlayState::Running { seconds_left } = self.state else {
            return false;
        };
        let mut linked = hotspots.iter().filter(|h| h.is_linked()).peekable();
        if linked.peek().is_none() {
            return false;
        }
        if linked.all(|h| self.solved.contains(&h.id)) {
            log::info!("Room solved with {} left", format_clock(seconds_left));
            self.state = PlayState::Won { seconds_left };
            self.timer.reset();
            return true;
        }
        false
    }

    pub fn is_solved(&self, hotspot_id: &HotspotId) -> bool {
        self.solved.contains(hotspot_id)
    }

    /// Completion flag per hotspot, in hotspot order.
    pub fn completion(&self, hotspots: &HotspotStore) -> Vec<bool> {
        hotspots.iter().map(|h| self.solved.contains(&h.id)).collect()
    }

    /// Drop completion entries for hotspots that no longer exist.
    pub fn prune(&mut self, hotspots: &HotspotStore) {
        self.solved.retain(|id| hotspots.contains(id));
    }

    /// Clock text for the current state.
    pub fn clock(&self) -> String {
        format_clock(self.state.seconds_left())
    }
}

/// Format seconds as `mm:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Pct;
    use crate::model::{PuzzleDraft, PuzzleId};

    fn settings(minutes: u32) -> Settings {
        Settings {
            global_minutes: minutes,
            ..Default::default()
        }
    }

    fn link(room: &mut Room, draft: PuzzleDraft) -> (HotspotId, PuzzleId) {
        let pid = room.puzzles.create_or_update(draft).unwrap();
        let hid = room.hotspots.create(Pct::new(50.0, 50.0));
        room.link_hotspot(&hid, &pid).unwrap();
        (hid, pid)
    }

    #[test]
    fn test_enter_starts_countdown() {
        let mut engine = PlayEngine::new();
        engine.enter(&settings(2));
        assert_eq!(engine.state(), PlayState::Running { seconds_left: 120 });
        assert_eq!(engine.clock(), "02:00");
    }

    #[test]
    fn test_ticks_reach_timeout() {
        let mut engine = PlayEngine::new();
        engine.enter(&settings(1));

        assert_eq!(engine.advance(Duration::from_millis(59_500)), 59);
        assert_eq!(engine.state(), PlayState::Running { seconds_left: 1 });

        // The half second carried over completes the last tick
        assert_eq!(engine.advance(Duration::from_millis(500)), 1);
        assert_eq!(engine.state(), PlayState::TimedOut);
        assert!(!engine.tick());
        assert_eq!(engine.advance(Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_mcq_scenario() {
        let mut room = Room::new();
        let (hid, _) = link(&mut room, PuzzleDraft::mcq("2+2?", ["3", "4"], 1));
        let mut engine = PlayEngine::new();
        engine.enter(&room.settings);

        let outcome = engine.submit_answer(&room, &hid, &Answer::Choice(0));
        assert_eq!(outcome, AnswerOutcome::Incorrect { clue: None });
        assert_eq!(engine.completion(&room.hotspots), vec![false]);
        assert!(engine.state().is_running());

        let outcome = engine.submit_answer(&room, &hid, &Answer::Choice(1));
        assert_eq!(outcome, AnswerOutcome::Correct { won: true });
        assert_eq!(engine.completion(&room.hotspots), vec![true]);
    }

    #[test]
    fn test_wrong_answer_returns_clue() {
        let mut room = Room::new();
        let (hid, _) = link(
            &mut room,
            PuzzleDraft::short("Year?", "1985").with_clue("Check the calendar"),
        );
        let mut engine = PlayEngine::new();
        engine.enter(&room.settings);

        assert_eq!(
            engine.submit_answer(&room, &hid, &Answer::Text("1984".into())),
            AnswerOutcome::Incorrect {
                clue: Some("Check the calendar".into())
            }
        );
    }

    #[test]
    fn test_unlinked_hotspot_never_blocks_win() {
        let mut room = Room::new();
        let (a, _) = link(&mut room, PuzzleDraft::short("A?", "a"));
        let decorative = room.hotspots.create(Pct::new(10.0, 10.0));
        let (c, _) = link(&mut room, PuzzleDraft::short("C?", "c"));
        let mut engine = PlayEngine::new();
        engine.enter(&room.settings);

        assert_eq!(
            engine.submit_answer(&room, &decorative, &Answer::Text("x".into())),
            AnswerOutcome::NoPuzzle
        );
        assert_eq!(
            engine.submit_answer(&room, &a, &Answer::Text("A".into())),
            AnswerOutcome::Correct { won: false }
        );
        assert_eq!(
            engine.submit_answer(&room, &c, &Answer::Text(" c ".into())),
            AnswerOutcome::Correct { won: true }
        );
        assert!(matches!(engine.state(), PlayState::Won { .. }));
        assert_eq!(engine.completion(&room.hotspots), vec![true, false, true]);
    }

    #[test]
    fn test_no_linked_hotspots_never_wins() {
        let mut room = Room::new();
        room.hotspots.create(Pct::new(10.0, 10.0));
        let mut engine = PlayEngine::new();
        engine.enter(&room.settings);

        assert!(!engine.check_win(&room.hotspots));
        assert!(engine.state().is_running());
    }

    #[test]
    fn test_completion_is_monotonic() {
        let mut room = Room::new();
        let (a, _) = link(&mut room, PuzzleDraft::short("A?", "a"));
        link(&mut room, PuzzleDraft::short("B?", "b"));
        let mut engine = PlayEngine::new();
        engine.enter(&room.settings);

        engine.submit_answer(&room, &a, &Answer::Text("a".into()));
        assert_eq!(
            engine.submit_answer(&room, &a, &Answer::Text("wrong".into())),
            AnswerOutcome::AlreadySolved
        );
        assert!(engine.is_solved(&a));
    }

    #[test]
    fn test_leave_and_reenter_preserves_progress() {
        let mut room = Room::new();
        let (a, _) = link(&mut room, PuzzleDraft::short("A?", "a"));
        link(&mut room, PuzzleDraft::short("B?", "b"));
        let mut engine = PlayEngine::new();
        engine.enter(&room.settings);
        engine.advance(Duration::from_secs(30));
        engine.submit_answer(&room, &a, &Answer::Text("a".into()));

        engine.leave();
        assert_eq!(engine.state(), PlayState::Paused { seconds_left: 270 });
        assert_eq!(engine.advance(Duration::from_secs(60)), 0);
        assert_eq!(
            engine.submit_answer(&room, &a, &Answer::Text("a".into())),
            AnswerOutcome::NotRunning
        );

        engine.enter(&room.settings);
        assert_eq!(engine.state(), PlayState::Running { seconds_left: 270 });
        assert!(engine.is_solved(&a));
    }

    #[test]
    fn test_finished_game_stays_finished_until_restart() {
        let mut room = Room::new();
        let (a, _) = link(&mut room, PuzzleDraft::short("A?", "a"));
        let mut engine = PlayEngine::new();
        engine.enter(&settings(1));
        engine.advance(Duration::from_secs(60));
        assert_eq!(engine.state(), PlayState::TimedOut);

        engine.leave();
        engine.enter(&settings(1));
        assert_eq!(engine.state(), PlayState::TimedOut);

        engine.restart(&settings(1));
        assert_eq!(engine.state(), PlayState::Running { seconds_left: 60 });
        assert!(!engine.is_solved(&a));
    }

    #[test]
    fn test_restart_clears_completion() {
        let mut room = Room::new();
        let (a, _) = link(&mut room, PuzzleDraft::short("A?", "a"));
        let mut engine = PlayEngine::new();
        engine.enter(&room.settings);
        engine.submit_answer(&room, &a, &Answer::Text("a".into()));
        assert!(engine.state().is_finished());

        engine.restart(&room.settings);
        assert_eq!(engine.completion(&room.hotspots), vec![false]);
        assert_eq!(engine.state(), PlayState::Running { seconds_left: 300 });
    }

    #[test]
    fn test_deleted_hotspot_does_not_shift_completion() {
        let mut room = Room::new();
        let (a, _) = link(&mut room, PuzzleDraft::short("A?", "a"));
        let (b, _) = link(&mut room, PuzzleDraft::short("B?", "b"));
        let (c, _) = link(&mut room, PuzzleDraft::short("C?", "c"));
        let mut engine = PlayEngine::new();
        engine.enter(&room.settings);
        engine.submit_answer(&room, &b, &Answer::Text("b".into()));

        room.delete_hotspot(&a).unwrap();
        engine.prune(&room.hotspots);

        assert_eq!(engine.completion(&room.hotspots), vec![true, false]);
        assert!(!engine.is_solved(&c));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(45 * 60), "45:00");
        assert_eq!(format_clock(100 * 60 + 1), "100:01");
    }
}
