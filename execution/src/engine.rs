//! Round engine.
//!
//! Drives the `Betting -> Countdown -> InProgress -> Crashed -> Betting` cycle.
//! The engine owns the balance, the difficulty factor, the round context and
//! the history ledger; callers only mutate them through [`RoundEngine::place_bet`],
//! [`RoundEngine::cash_out`] and the timers the engine itself registered.
//!
//! ## Ordering
//!
//! Within one tick the crash check runs against the advanced multiplier
//! before any drain is computed; once a round has crashed no further drain or
//! frame is produced for it.
//!
//! ## Timers
//!
//! The engine keeps at most one live handle per [`TimerKind`] and cancels it
//! before re-arming. A popped timer whose handle is not the live one is
//! ignored, so a stale callback never touches a round that has moved on.
//!
//! The engine is single-writer: every mutation takes `&mut self`. Share it
//! across threads only behind a mutex or an actor that owns it.

use std::collections::HashMap;

use shadowflight_types::{
    ChallengeLevel, ConfigError, EngineCapabilities, EngineEvent, FlightFrame, GameConfig,
    HistoryEntry, RoundPhase,
};
use tracing::{debug, trace};

use crate::bet::{validate_stake, BetRejected};
use crate::difficulty::DifficultyController;
use crate::flight::{
    compute_flight, next_multiplier, FlightDynamics, FlightParams, RISE_RATE_MAX, RISE_RATE_MIN,
};
use crate::ledger::HistoryLedger;
use crate::rng::GameRng;
use crate::sampler::sample_crash_point;
use crate::scheduler::{PhaseTimings, Scheduler, TimerHandle, TimerKind, VirtualScheduler};

/// Per-round state, created at takeoff.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundContext {
    pub bet_amount: f64,
    pub crash_multiplier: f64,
    pub is_safe_zone: bool,
    pub rise_rate: f64,
    pub multiplier: f64,
    pub effective_multiplier: f64,
    pub has_cashed_out: bool,
    pub cashed_out_at: Option<f64>,
    pub was_warning: bool,
    pub dynamics: Option<FlightDynamics>,
}

/// Result of advancing a round by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// The multiplier reached the crash point and was clamped to it.
    Crashed,
    /// Still flying.
    Flying {
        dynamics: FlightDynamics,
        warning_onset: bool,
    },
}

impl RoundContext {
    pub fn new(bet_amount: f64, crash_multiplier: f64, is_safe_zone: bool, rise_rate: f64) -> Self {
        Self {
            bet_amount,
            crash_multiplier,
            is_safe_zone,
            rise_rate,
            multiplier: 1.0,
            effective_multiplier: 1.0,
            has_cashed_out: false,
            cashed_out_at: None,
            was_warning: false,
            dynamics: None,
        }
    }

    /// Advance the multiplier one tick.
    ///
    /// Depends only on the context and the round-constant inputs.
    pub fn step(&mut self, difficulty: f64, config: &GameConfig) -> TickOutcome {
        let next = next_multiplier(self.multiplier, self.rise_rate);
        if next >= self.crash_multiplier {
            self.multiplier = self.crash_multiplier;
            return TickOutcome::Crashed;
        }

        let dynamics = compute_flight(
            next,
            &FlightParams {
                crash_multiplier: self.crash_multiplier,
                is_safe_zone: self.is_safe_zone,
                difficulty,
                drain_exponent: config.drain_exponent,
                crash_point_max: config.crash_point_max,
            },
        );
        let warning_onset = dynamics.is_warning && !self.was_warning;
        self.was_warning = dynamics.is_warning;
        self.multiplier = next;
        self.effective_multiplier = dynamics.effective_multiplier;
        self.dynamics = Some(dynamics);
        TickOutcome::Flying {
            dynamics,
            warning_onset,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.was_warning
    }
}

/// Fixed outcome for the next takeoff, bypassing the random draws.
#[cfg(any(test, feature = "mocks"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundOverride {
    pub crash_multiplier: f64,
    pub is_safe_zone: bool,
    pub rise_rate: f64,
}

/// A timer the engine handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired {
    pub kind: TimerKind,
    /// Phase entered as a result, if any.
    pub entered: Option<RoundPhase>,
}

pub struct RoundEngine<S: Scheduler = VirtualScheduler> {
    config: GameConfig,
    capabilities: EngineCapabilities,
    timings: PhaseTimings,
    scheduler: S,
    rng: GameRng,
    phase: RoundPhase,
    balance: f64,
    bet_amount: f64,
    countdown_remaining: u32,
    round: Option<RoundContext>,
    difficulty: DifficultyController,
    ledger: HistoryLedger,
    timers: HashMap<TimerKind, TimerHandle>,
    events: Vec<EngineEvent>,
    #[cfg(any(test, feature = "mocks"))]
    overrides: std::collections::VecDeque<RoundOverride>,
}

impl<S: Scheduler> RoundEngine<S> {
    pub fn new(
        config: GameConfig,
        capabilities: EngineCapabilities,
        scheduler: S,
        rng: GameRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            timings: PhaseTimings::from(&config),
            difficulty: DifficultyController::new(&config),
            ledger: HistoryLedger::new(config.simple_history_cap),
            balance: config.initial_balance,
            bet_amount: config.min_bet,
            countdown_remaining: config.countdown_seconds,
            config,
            capabilities,
            scheduler,
            rng,
            phase: RoundPhase::Betting,
            round: None,
            timers: HashMap::new(),
            events: Vec::new(),
            #[cfg(any(test, feature = "mocks"))]
            overrides: std::collections::VecDeque::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn capabilities(&self) -> EngineCapabilities {
        self.capabilities
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Stake of the current or most recent round.
    pub fn bet_amount(&self) -> f64 {
        self.bet_amount
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty.factor()
    }

    pub fn challenge_level(&self) -> ChallengeLevel {
        self.difficulty.challenge_level()
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut HistoryLedger {
        &mut self.ledger
    }

    pub fn multiplier(&self) -> f64 {
        self.round.as_ref().map_or(1.0, |round| round.multiplier)
    }

    pub fn effective_multiplier(&self) -> f64 {
        self.round.as_ref().map_or(1.0, |round| round.effective_multiplier)
    }

    pub fn is_safe_zone(&self) -> bool {
        self.round.as_ref().is_some_and(|round| round.is_safe_zone)
    }

    pub fn is_warning(&self) -> bool {
        self.phase == RoundPhase::InProgress && self.round.as_ref().is_some_and(RoundContext::is_warning)
    }

    pub fn has_cashed_out(&self) -> bool {
        self.round.as_ref().is_some_and(|round| round.has_cashed_out)
    }

    /// Crash point of the current round, hidden until it has crashed.
    pub fn revealed_crash_multiplier(&self) -> Option<f64> {
        match self.phase {
            RoundPhase::Crashed => self.round.as_ref().map(|round| round.crash_multiplier),
            _ => None,
        }
    }

    /// What cashing out right now would credit.
    pub fn potential_payout(&self) -> Option<f64> {
        match (self.phase, self.round.as_ref()) {
            (RoundPhase::InProgress, Some(round)) if !round.has_cashed_out => {
                Some(round.bet_amount * round.effective_multiplier)
            }
            _ => None,
        }
    }

    /// Presentation snapshot of the current flight.
    pub fn frame(&self) -> Option<FlightFrame> {
        let round = self.round.as_ref()?;
        let dynamics = round.dynamics?;
        Some(FlightFrame {
            phase: self.phase,
            multiplier: round.multiplier,
            effective_multiplier: round.effective_multiplier,
            is_safe_zone: round.is_safe_zone,
            is_warning: dynamics.is_warning,
            plane_y: dynamics.plane_y,
            shadow_y: dynamics.shadow_y,
            proximity: dynamics.proximity,
        })
    }

    /// Take the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Force the outcome of upcoming takeoffs, in order.
    #[cfg(any(test, feature = "mocks"))]
    pub fn push_override(&mut self, round: RoundOverride) {
        self.overrides.push_back(round);
    }

    /// Overwrite the in-flight effective multiplier.
    #[cfg(any(test, feature = "mocks"))]
    pub fn force_effective_multiplier(&mut self, multiplier: f64) {
        if let Some(round) = self.round.as_mut() {
            round.effective_multiplier = multiplier;
        }
    }

    /// Commit a stake and start the countdown.
    ///
    /// The stake is clamped rather than rejected; the balance is debited
    /// immediately. Outside `Betting` nothing changes.
    pub fn place_bet(&mut self, requested: f64) -> Result<f64, BetRejected> {
        if self.phase != RoundPhase::Betting {
            return Err(BetRejected::NotBetting);
        }
        let amount = validate_stake(requested, self.balance, &self.config)?;

        self.balance -= amount;
        self.bet_amount = amount;
        self.phase = RoundPhase::Countdown;
        self.countdown_remaining = self.config.countdown_seconds;
        self.arm(TimerKind::Countdown);
        debug!(amount, balance = self.balance, "bet placed");
        self.push_event(EngineEvent::BetPlaced {
            amount,
            balance: self.balance,
        });
        Ok(amount)
    }

    /// Take the current effective payout.
    ///
    /// Returns the amount credited, or `None` when not flying or already
    /// cashed out this round.
    pub fn cash_out(&mut self) -> Option<f64> {
        if self.phase != RoundPhase::InProgress {
            return None;
        }
        let round = self.round.as_mut()?;
        if round.has_cashed_out {
            return None;
        }
        let multiplier = round.effective_multiplier;
        let amount = round.bet_amount * multiplier;
        round.has_cashed_out = true;
        round.cashed_out_at = Some(multiplier);
        self.balance += amount;
        debug!(amount, multiplier, balance = self.balance, "cashed out");
        self.push_event(EngineEvent::CashedOut { amount, multiplier });
        Some(amount)
    }

    /// Handle the earliest timer due at or before `until_ms`.
    ///
    /// Returns `None` once nothing more is due.
    pub fn fire_next_due(&mut self, until_ms: u64) -> Option<Fired> {
        loop {
            let (handle, kind) = self.scheduler.pop_due(until_ms)?;
            if self.timers.get(&kind) != Some(&handle) {
                trace!(?kind, "ignoring stale timer");
                continue;
            }
            self.timers.remove(&kind);
            let entered = self.on_timer(kind);
            return Some(Fired { kind, entered });
        }
    }

    /// Fire everything due within the next `ms` and move the clock forward.
    pub fn advance(&mut self, ms: u64) -> Vec<Fired> {
        let until = self.scheduler.now_ms().saturating_add(ms);
        let mut fired = Vec::new();
        while let Some(next) = self.fire_next_due(until) {
            fired.push(next);
        }
        self.scheduler.advance_to(until);
        fired
    }

    /// Move the clock to `ms` without firing; used after draining due timers.
    pub fn settle_clock(&mut self, ms: u64) {
        self.scheduler.advance_to(ms);
    }

    fn on_timer(&mut self, kind: TimerKind) -> Option<RoundPhase> {
        match kind {
            TimerKind::Countdown => self.on_countdown(),
            TimerKind::Tick => self.on_tick(),
            TimerKind::PostRound => self.on_post_round(),
            TimerKind::Shake => {
                self.push_event(EngineEvent::ShakeEnded);
                None
            }
        }
    }

    fn on_countdown(&mut self) -> Option<RoundPhase> {
        if self.phase != RoundPhase::Countdown {
            return None;
        }
        if self.countdown_remaining <= 1 {
            self.countdown_remaining = 0;
            self.take_off();
            return Some(RoundPhase::InProgress);
        }
        self.countdown_remaining -= 1;
        self.push_event(EngineEvent::CountdownTick {
            remaining: self.countdown_remaining,
        });
        self.arm(TimerKind::Countdown);
        None
    }

    fn take_off(&mut self) {
        self.disarm(TimerKind::Countdown);
        let (is_safe_zone, crash_multiplier, rise_rate) = self.draw_round();
        self.round = Some(RoundContext::new(
            self.bet_amount,
            crash_multiplier,
            is_safe_zone,
            rise_rate,
        ));
        self.phase = RoundPhase::InProgress;
        debug!(
            is_safe_zone,
            difficulty = self.difficulty.factor(),
            "takeoff"
        );
        self.push_event(EngineEvent::Takeoff { is_safe_zone });
        self.arm(TimerKind::Tick);
    }

    #[cfg(any(test, feature = "mocks"))]
    fn forced_round(&mut self) -> Option<(bool, f64, f64)> {
        self.overrides
            .pop_front()
            .map(|forced| (forced.is_safe_zone, forced.crash_multiplier, forced.rise_rate))
    }

    #[cfg(not(any(test, feature = "mocks")))]
    fn forced_round(&mut self) -> Option<(bool, f64, f64)> {
        None
    }

    fn draw_round(&mut self) -> (bool, f64, f64) {
        if let Some(forced) = self.forced_round() {
            return forced;
        }

        let is_safe_zone =
            self.capabilities.safe_zone && self.rng.chance(self.config.safe_zone_chance);
        let crash_multiplier =
            sample_crash_point(&mut self.rng, is_safe_zone, self.difficulty.factor());
        let rise_rate = self.rng.uniform(RISE_RATE_MIN, RISE_RATE_MAX);
        (is_safe_zone, crash_multiplier, rise_rate)
    }

    fn on_tick(&mut self) -> Option<RoundPhase> {
        if self.phase != RoundPhase::InProgress {
            return None;
        }
        let difficulty = self.difficulty.factor();
        let outcome = self.round.as_mut()?.step(difficulty, &self.config);
        match outcome {
            TickOutcome::Crashed => {
                self.crash();
                Some(RoundPhase::Crashed)
            }
            TickOutcome::Flying {
                dynamics,
                warning_onset,
            } => {
                self.push_event(EngineEvent::DrainLevel {
                    percentage: dynamics.drain_percentage,
                });
                if warning_onset {
                    self.push_event(EngineEvent::WarningOnset);
                }
                if let Some(frame) = self.frame() {
                    self.push_event(EngineEvent::Frame(frame));
                }
                self.arm(TimerKind::Tick);
                None
            }
        }
    }

    fn crash(&mut self) {
        self.disarm(TimerKind::Tick);
        self.phase = RoundPhase::Crashed;
        let Some(round) = self.round.as_ref() else {
            return;
        };
        let (bet_amount, cashed_out_at, crash_multiplier) =
            (round.bet_amount, round.cashed_out_at, round.crash_multiplier);

        let difficulty = self.difficulty.on_round_end(cashed_out_at.is_some());
        let id = self.ledger.allocate_id();
        let entry = HistoryEntry::settle(id, bet_amount, cashed_out_at, crash_multiplier);
        debug!(
            crash_multiplier,
            cashed_out_at,
            profit = entry.profit,
            difficulty,
            "crashed"
        );
        self.ledger.record(entry);
        self.push_event(EngineEvent::Crashed { crash_multiplier });
        self.arm(TimerKind::PostRound);
        self.arm(TimerKind::Shake);
    }

    fn on_post_round(&mut self) -> Option<RoundPhase> {
        if self.phase != RoundPhase::Crashed {
            return None;
        }
        self.phase = RoundPhase::Betting;
        self.countdown_remaining = self.config.countdown_seconds;
        self.push_event(EngineEvent::RoundReset);
        Some(RoundPhase::Betting)
    }

    fn arm(&mut self, kind: TimerKind) {
        self.disarm(kind);
        let handle = self
            .scheduler
            .schedule_after(self.timings.delay_for(kind), kind);
        self.timers.insert(kind, handle);
    }

    fn disarm(&mut self, kind: TimerKind) {
        if let Some(handle) = self.timers.remove(&kind) {
            self.scheduler.cancel(handle);
        }
    }
}

impl RoundEngine<VirtualScheduler> {
    /// Engine on a virtual clock with default tunables.
    pub fn with_seed(seed: u64) -> Result<Self, ConfigError> {
        Self::new(
            GameConfig::default(),
            EngineCapabilities::default(),
            VirtualScheduler::new(),
            GameRng::from_seed(seed),
        )
    }
}
