//! Board state machine: selection, flip resolution, pause and countdown.
//!
//! The board never reads time on its own schedule. Callers feed it input
//! events and call [`Board::tick`] regularly; every time-driven transition
//! (pair resolution, countdown expiry) happens inside `tick`.

use crate::clock::{Clock, SystemClock};
use crate::config::StartConfig;
use crate::deck::{SymbolDeck, SymbolId};
use crate::error::{ConfigError, StoreError};
use crate::stats::{Conclusion, FlipKind, Reported, StatsStore};
use crate::timer::{Scheduler, TimerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Time a selected pair stays face-up before it is resolved
pub const RESOLVE_DELAY: Duration = Duration::from_millis(400);

/// A tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the board
    pub id: usize,
    pub symbol: SymbolId,
}

/// Session outcome. Everything but `InProgress` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
    Abandoned,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::InProgress => "in_progress",
            Outcome::Won => "won",
            Outcome::Lost => "lost",
            Outcome::Abandoned => "abandoned",
        }
    }
}

/// Why a click did not change the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    Paused,
    AlreadyMatched,
    AlreadySelected,
    /// A pair is already face-up and waiting to resolve
    SelectionFull,
    OutOfRange,
    Finished,
}

/// Result of [`Board::select_tile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectOutcome {
    Ignored(IgnoreReason),
    /// First tile of a pair turned face-up
    Flipped,
    /// Second tile turned face-up; the pair resolves after [`RESOLVE_DELAY`]
    PairPending,
}

/// Timers owned by a board. Declaration order breaks ties: a resolution due
/// at the same instant as the countdown runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKind {
    Resolve(usize, usize),
    Countdown,
}

/// Serializable view of the board for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<Tile>,
    /// Face-up, unresolved tiles in click order
    pub selection: Vec<usize>,
    /// Matched tile indices, ascending
    pub matched: Vec<usize>,
    pub paused: bool,
    pub remaining_ms: u64,
    pub elapsed_ms: u64,
    pub outcome: Outcome,
    /// Index of the unpaired tile on odd boards
    pub filler: Option<usize>,
    pub difficulty_key: String,
    pub new_best: bool,
}

/// One game session
pub struct Board<C: Clock = SystemClock> {
    config: StartConfig,
    tiles: Vec<Tile>,
    /// Face-up unresolved tiles, never more than two
    selection: Vec<usize>,
    matched: BTreeSet<usize>,
    paused: bool,
    outcome: Outcome,
    clock: C,
    /// Clock reading at creation
    started_at: Duration,
    /// Clock reading at the terminal transition
    ended_at: Option<Duration>,
    timers: Scheduler<TimerKind>,
    /// Pending countdown; `None` while paused or finished
    countdown: Option<TimerId>,
    /// Countdown budget left when the countdown is not running
    frozen_remaining: Duration,
    stats: StatsStore,
    warnings: Vec<StoreError>,
    new_best: bool,
}

impl Board<SystemClock> {
    /// Start a custom board on the wall clock with a freshly seeded deck
    pub fn start(
        tile_count: usize,
        time_limit_secs: u64,
        stats: StatsStore,
    ) -> Result<Self, ConfigError> {
        let config = StartConfig::custom(tile_count, time_limit_secs)?;
        Ok(Self::new(config, &mut SymbolDeck::new(), SystemClock::new(), stats))
    }
}

impl<C: Clock> Board<C> {
    /// Deal a new board and start its countdown.
    ///
    /// Reports the session as started, so every board must eventually reach
    /// a terminal outcome for the in-flight counter to balance.
    pub fn new(config: StartConfig, deck: &mut SymbolDeck, clock: C, stats: StatsStore) -> Self {
        let tiles = deck
            .generate(config.tile_count())
            .into_iter()
            .enumerate()
            .map(|(id, symbol)| Tile { id, symbol })
            .collect();
        let started_at = clock.now();

        let mut board = Self {
            frozen_remaining: config.time_limit(),
            config,
            tiles,
            selection: Vec::with_capacity(2),
            matched: BTreeSet::new(),
            paused: false,
            outcome: Outcome::InProgress,
            clock,
            started_at,
            ended_at: None,
            timers: Scheduler::new(),
            countdown: None,
            stats,
            warnings: Vec::new(),
            new_best: false,
        };

        let report = board.stats.session_started();
        board.absorb(report);
        board.countdown = Some(
            board
                .timers
                .schedule(started_at + board.config.time_limit(), TimerKind::Countdown),
        );
        log::info!(
            "session started: {} tiles, {}s, key {}",
            board.config.tile_count(),
            board.config.time_limit().as_secs(),
            board.config.difficulty_key()
        );
        board
    }

    /// Turn a tile face-up
    pub fn select_tile(&mut self, index: usize) -> SelectOutcome {
        let now = self.clock.now();
        self.drain(now);
        let reason = if self.outcome.is_terminal() {
            Some(IgnoreReason::Finished)
        } else if self.paused {
            Some(IgnoreReason::Paused)
        } else if index >= self.tiles.len() {
            Some(IgnoreReason::OutOfRange)
        } else if self.matched.contains(&index) {
            Some(IgnoreReason::AlreadyMatched)
        } else if self.selection.contains(&index) {
            Some(IgnoreReason::AlreadySelected)
        } else if self.selection.len() >= 2 {
            Some(IgnoreReason::SelectionFull)
        } else {
            None
        };
        if let Some(reason) = reason {
            log::debug!("ignored click on {}: {:?}", index, reason);
            return SelectOutcome::Ignored(reason);
        }

        self.selection.push(index);
        log::debug!("flipped tile {} ({})", index, self.tiles[index].symbol);
        match self.selection[..] {
            [a, b] => {
                let due = now + RESOLVE_DELAY;
                self.timers.schedule(due, TimerKind::Resolve(a, b));
                SelectOutcome::PairPending
            }
            _ => SelectOutcome::Flipped,
        }
    }

    /// Flip the pause flag and return the new value.
    ///
    /// Pausing freezes the remaining time; resuming restarts the countdown
    /// from it. A pending pair still resolves while paused.
    pub fn toggle_pause(&mut self) -> bool {
        let now = self.clock.now();
        self.drain(now);
        if self.outcome.is_terminal() {
            return self.paused;
        }
        if self.paused {
            self.paused = false;
            self.countdown = Some(
                self.timers
                    .schedule(now + self.frozen_remaining, TimerKind::Countdown),
            );
            log::debug!("resumed with {:?} left", self.frozen_remaining);
        } else {
            self.frozen_remaining = self.remaining_at(now);
            if let Some(id) = self.countdown.take() {
                self.timers.cancel(id);
            }
            self.paused = true;
            log::debug!("paused with {:?} left", self.frozen_remaining);
        }
        self.paused
    }

    /// Give up on the session. Returns `None` when it already ended.
    ///
    /// A countdown that already ran out wins over the abandon.
    pub fn abandon(&mut self) -> Option<Outcome> {
        let now = self.clock.now();
        self.drain(now);
        if self.outcome.is_terminal() {
            return None;
        }
        self.paused = false;
        self.selection.clear();
        self.finish(Outcome::Abandoned, now);
        Some(self.outcome)
    }

    /// Run every timer that is due, earliest first. Returns the terminal
    /// outcome if one was reached during this call.
    pub fn tick(&mut self) -> Option<Outcome> {
        let now = self.clock.now();
        self.drain(now)
    }

    /// Fire the timers due at `now`. Every entry point runs this first, so a
    /// late caller sees the same board as one that ticked on time.
    fn drain(&mut self, now: Duration) -> Option<Outcome> {
        if self.outcome.is_terminal() {
            return None;
        }
        while let Some((_, kind)) = self.timers.pop_due(now) {
            match kind {
                TimerKind::Resolve(a, b) => self.resolve(a, b, now),
                TimerKind::Countdown => {
                    self.countdown = None;
                    self.frozen_remaining = Duration::ZERO;
                    self.time_expired(now);
                }
            }
            if self.outcome.is_terminal() {
                return Some(self.outcome);
            }
        }
        None
    }

    fn resolve(&mut self, a: usize, b: usize, now: Duration) {
        self.selection.clear();
        if self.tiles[a].symbol == self.tiles[b].symbol {
            self.matched.insert(a);
            self.matched.insert(b);
            log::debug!("matched tiles {} and {}", a, b);
            let report = self.stats.bump_flip(FlipKind::Matched);
            self.absorb(report);
        } else {
            log::debug!("tiles {} and {} differ", a, b);
            let report = self.stats.bump_flip(FlipKind::Wrong);
            self.absorb(report);
        }

        if self.is_cleared() {
            self.finish(Outcome::Won, now);
        }
    }

    fn time_expired(&mut self, now: Duration) {
        if self.outcome.is_terminal() || self.paused {
            return;
        }
        self.finish(Outcome::Lost, now);
    }

    /// Terminal transition: cancel timers, then report to the stats store
    fn finish(&mut self, outcome: Outcome, now: Duration) {
        self.frozen_remaining = self.remaining_at(now);
        self.timers.cancel_all();
        self.countdown = None;
        self.outcome = outcome;
        self.ended_at = Some(now);

        let conclusion = match outcome {
            Outcome::Won => {
                let elapsed_ms = self.elapsed().as_millis() as u64;
                let report = self
                    .stats
                    .record_time(self.config.difficulty_key(), elapsed_ms);
                self.new_best = self.absorb(report);
                Conclusion::Won
            }
            Outcome::Lost => Conclusion::Lost,
            Outcome::Abandoned => Conclusion::Abandoned,
            Outcome::InProgress => return,
        };
        let report = self.stats.session_concluded(conclusion);
        self.absorb(report);
        log::info!(
            "session {} after {:?}",
            outcome.as_str(),
            self.elapsed()
        );
    }

    /// Keep a storage warning for the caller and pass the value through
    fn absorb<T>(&mut self, report: Reported<T>) -> T {
        if let Some(err) = report.warning {
            log::warn!("stats not persisted: {}", err);
            self.warnings.push(err);
        }
        report.value
    }

    fn remaining_at(&self, now: Duration) -> Duration {
        match self.countdown.and_then(|id| self.timers.due_at(id)) {
            Some(due) => due.saturating_sub(now),
            None => self.frozen_remaining,
        }
    }

    fn is_cleared(&self) -> bool {
        self.matched.len() == self.config.pair_count() * 2
    }

    /// Countdown time left; frozen while paused and after the session ends
    pub fn remaining(&self) -> Duration {
        self.remaining_at(self.clock.now())
    }

    /// Time since the board was dealt, paused time included
    pub fn elapsed(&self) -> Duration {
        let end = self.ended_at.unwrap_or_else(|| self.clock.now());
        end.saturating_sub(self.started_at)
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &StartConfig {
        &self.config
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.matched.contains(&index)
    }

    /// Selected or matched
    pub fn is_face_up(&self, index: usize) -> bool {
        self.matched.contains(&index) || self.selection.contains(&index)
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched.len() / 2
    }

    /// Index of the unpaired tile, if the board has one
    pub fn filler(&self) -> Option<usize> {
        if !self.config.has_filler() {
            return None;
        }
        let filler = SymbolDeck::filler_for(self.config.pair_count());
        self.tiles.iter().position(|t| t.symbol == filler)
    }

    /// Whether a win set a new best time for this board's difficulty
    pub fn is_new_best(&self) -> bool {
        self.new_best
    }

    pub fn stats(&self) -> &StatsStore {
        &self.stats
    }

    /// Storage warnings gathered since the last call
    pub fn take_warnings(&mut self) -> Vec<StoreError> {
        std::mem::take(&mut self.warnings)
    }

    /// Clock reading at which the next timer fires, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tiles: self.tiles.clone(),
            selection: self.selection.clone(),
            matched: self.matched.iter().copied().collect(),
            paused: self.paused,
            remaining_ms: self.remaining().as_millis() as u64,
            elapsed_ms: self.elapsed().as_millis() as u64,
            outcome: self.outcome,
            filler: self.filler(),
            difficulty_key: self.config.difficulty_key().to_string(),
            new_best: self.new_best,
        }
    }
}
