//! Timer scheduling for the round engine.
//!
//! The engine never sleeps. Every wait (countdown seconds, flight ticks,
//! the post-crash pause, the crash shake) is a timer registered with a
//! [`Scheduler`]; the driver pops due timers in deadline order and hands them
//! back to the engine. [`VirtualScheduler`] keeps its own clock so tests and
//! the simulator advance time deterministically.
//!
//! ## Usage
//!
//! ```rust
//! use shadowflight_execution::scheduler::{Scheduler, TimerKind, VirtualScheduler};
//!
//! let mut scheduler = VirtualScheduler::new();
//! let tick = scheduler.schedule_after(50, TimerKind::Tick);
//! scheduler.schedule_after(1_000, TimerKind::Countdown);
//!
//! assert_eq!(scheduler.pop_due(100), Some((tick, TimerKind::Tick)));
//! assert_eq!(scheduler.now_ms(), 50);
//! assert_eq!(scheduler.pop_due(100), None);
//! ```

use std::collections::{BTreeMap, HashMap};

use shadowflight_types::{GameConfig, RoundPhase};

/// Milliseconds per countdown step.
pub const COUNTDOWN_STEP_MS: u64 = 1_000;

/// Identifies a scheduled timer so it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// What a timer drives when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// One second of the pre-flight countdown.
    Countdown,
    /// One multiplier advance.
    Tick,
    /// End of the crashed display window.
    PostRound,
    /// End of the crash shake effect.
    Shake,
}

/// Source of timer scheduling.
pub trait Scheduler {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Register a timer that fires `delay_ms` from now.
    fn schedule_after(&mut self, delay_ms: u64, kind: TimerKind) -> TimerHandle;

    /// Cancel a pending timer. Returns `false` if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Remove and return the earliest timer due at or before `until_ms`,
    /// moving the clock to its deadline.
    fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, TimerKind)>;

    /// Move the clock forward to `ms` without firing anything.
    fn advance_to(&mut self, ms: u64);

    /// Number of pending timers.
    fn pending(&self) -> usize;
}

/// Deterministic scheduler with a manually advanced clock.
///
/// Timers with equal deadlines fire in registration order.
#[derive(Clone, Debug, Default)]
pub struct VirtualScheduler {
    now_ms: u64,
    next_id: u64,
    queue: BTreeMap<(u64, u64), TimerKind>,
    deadlines: HashMap<u64, u64>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at `now_ms`.
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms,
            ..Self::default()
        }
    }

    /// Deadline of the next pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }
}

impl Scheduler for VirtualScheduler {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn schedule_after(&mut self, delay_ms: u64, kind: TimerKind) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = self.now_ms.saturating_add(delay_ms);
        self.queue.insert((deadline, id), kind);
        self.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle.0) {
            Some(deadline) => self.queue.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }

    fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, TimerKind)> {
        let (&(deadline, id), _) = self.queue.iter().next()?;
        if deadline > until_ms {
            return None;
        }
        let kind = self.queue.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.now_ms = self.now_ms.max(deadline);
        Some((TimerHandle(id), kind))
    }

    fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Phase durations in milliseconds.
///
/// Betting waits on the player and the flight ends on a crash, so neither has
/// a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseTimings {
    pub countdown_ms: u64,
    pub tick_ms: u64,
    pub post_round_ms: u64,
    pub shake_ms: u64,
}

impl PhaseTimings {
    /// Fixed duration of a phase, if it has one.
    pub fn duration_for_phase(&self, phase: RoundPhase) -> Option<u64> {
        match phase {
            RoundPhase::Betting => None,
            RoundPhase::Countdown => Some(self.countdown_ms),
            RoundPhase::InProgress => None,
            RoundPhase::Crashed => Some(self.post_round_ms),
        }
    }

    /// Delay before a timer of `kind` fires.
    pub fn delay_for(&self, kind: TimerKind) -> u64 {
        match kind {
            TimerKind::Countdown => COUNTDOWN_STEP_MS,
            TimerKind::Tick => self.tick_ms,
            TimerKind::PostRound => self.post_round_ms,
            TimerKind::Shake => self.shake_ms,
        }
    }
}

impl From<&GameConfig> for PhaseTimings {
    fn from(config: &GameConfig) -> Self {
        Self {
            countdown_ms: config.countdown_ms(),
            tick_ms: config.game_loop_interval_ms,
            post_round_ms: config.post_round_delay_ms,
            shake_ms: config.shake_duration_ms,
        }
    }
}
