use std::time::Instant;

use crate::countdown::Countdown;
use crate::dialog::DialogKind;
use crate::scene::{Item, Scene};

/// Explicit round state. Exactly one dialog is open in every phase except
/// `Running`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Running,
    Paused,
    Won,
    Lost,
}

/// The game controller: owns the scene, the clock, and every transition.
///
/// All operations are total; invalid inputs (wrong item, redundant pause,
/// button press with no dialog open) are silent no-ops.
#[derive(Debug)]
pub struct GameSession {
    scene: Scene,
    phase: Phase,
    current: usize,
    points: usize,
    time_limit: u64,
    time_remaining: u64,
    dialog: Option<DialogKind>,
    countdown: Countdown,
}

impl GameSession {
    /// A fresh session sits in `Intro` with the intro dialog open and the
    /// clock untouched; nothing moves until the start button.
    pub fn new(scene: Scene, time_limit: u64) -> Self {
        Self {
            scene,
            phase: Phase::Intro,
            current: 0,
            points: 0,
            time_limit,
            time_remaining: time_limit,
            dialog: Some(DialogKind::Intro),
            countdown: Countdown::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn points(&self) -> usize {
        self.points
    }

    pub fn total(&self) -> usize {
        self.scene.len()
    }

    pub fn time_limit(&self) -> u64 {
        self.time_limit
    }

    pub fn time_remaining(&self) -> u64 {
        self.time_remaining
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.time_limit - self.time_remaining
    }

    pub fn dialog(&self) -> Option<DialogKind> {
        self.dialog
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Won | Phase::Lost)
    }

    /// Index of the next required item while a round is underway.
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Running | Phase::Paused => Some(self.current),
            _ => None,
        }
    }

    fn current_item(&self) -> Option<&Item> {
        self.scene.get(self.current)
    }

    /// What to click next. Blank outside `Running` (the hint clears
    /// whenever a dialog is up).
    pub fn hint(&self) -> Option<&str> {
        match self.phase {
            Phase::Running => self.current_item().map(|i| i.hint.as_str()),
            _ => None,
        }
    }

    /// Start the round from the intro. No-op in any other phase.
    pub fn start(&mut self, now: Instant) {
        if self.phase != Phase::Intro {
            return;
        }
        self.current = 0;
        self.phase = Phase::Running;
        self.countdown.arm(now);
    }

    /// One whole second of game time. Pure transition: no-op unless
    /// `Running`, so ticks delivered after a pause or a finished round are
    /// swallowed.
    pub fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.lose();
        }
    }

    /// Apply every tick that has come due at `now`.
    pub fn advance(&mut self, now: Instant) {
        for _ in 0..self.countdown.poll(now) {
            self.tick();
        }
    }

    /// A click lands. Only the current item reacts; everything else -
    /// wrong item, hidden item, click while paused or over - is ignored.
    pub fn on_item_clicked(&mut self, id: &str) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(item) = self.current_item() else {
            return;
        };
        if item.id != id {
            return;
        }

        self.scene.hide(self.current);
        self.points += 1;

        if self.current + 1 < self.scene.len() {
            self.current += 1;
        } else {
            self.win();
        }
    }

    fn win(&mut self) {
        self.countdown.cancel();
        self.phase = Phase::Won;
        self.dialog = Some(DialogKind::Win);
    }

    fn lose(&mut self) {
        self.countdown.cancel();
        self.phase = Phase::Lost;
        self.dialog = Some(DialogKind::Lose);
    }

    /// Suspend the clock. Idempotent: only `Running` reacts, and the
    /// countdown schedule is cancelled exactly once.
    pub fn pause(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.countdown.cancel();
        self.phase = Phase::Paused;
    }

    /// Resume the clock from wherever it stopped. Idempotent counterpart of
    /// `pause`.
    pub fn unpause(&mut self, now: Instant) {
        if self.phase != Phase::Paused {
            return;
        }
        self.countdown.arm(now);
        self.phase = Phase::Running;
    }

    pub fn on_pause_requested(&mut self) {
        self.open_dialog(DialogKind::Pause);
    }

    pub fn on_help_requested(&mut self) {
        self.open_dialog(DialogKind::Help);
    }

    /// Opening pauses as a side effect. Blocked whenever any dialog is
    /// already up, which also covers the intro and the end-of-round states.
    fn open_dialog(&mut self, kind: DialogKind) {
        if self.dialog.is_some() || self.phase != Phase::Running {
            return;
        }
        self.pause();
        self.dialog = Some(kind);
    }

    /// The single button of whichever dialog is open. Intro starts the
    /// round, pause/help resume it, win/lose reset and restart immediately.
    pub fn on_dialog_button(&mut self, now: Instant) {
        let Some(kind) = self.dialog.take() else {
            return;
        };

        match kind {
            DialogKind::Intro => self.start(now),
            DialogKind::Help | DialogKind::Pause => self.unpause(now),
            DialogKind::Win | DialogKind::Lose => {
                self.reset();
                self.dialog = None;
                self.start(now);
            }
        }
    }

    /// Back to a fresh round: items visible, score zeroed, clock refilled.
    /// Whatever dialog was open stays open.
    pub fn reset(&mut self) {
        self.countdown.cancel();
        self.scene.show_all();
        self.points = 0;
        self.current = 0;
        self.time_remaining = self.time_limit;
        self.phase = Phase::Intro;
    }
}
