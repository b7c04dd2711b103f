use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use shadowflight_execution::{HistoryStore, LedgerStats, Scheduler, ShadowFlight};
use shadowflight_types::{AutoPlayStopReason, ChallengeLevel, EngineEvent, RoundPhase};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::strategy::CashOutStrategy;

/// What the bot plays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunPlan {
    pub rounds: u32,
    pub bet: f64,
    pub stop_on_profit: Option<f64>,
    pub stop_on_loss: Option<f64>,
    pub strategy: CashOutStrategy,
}

/// Outcome of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub rounds_played: u32,
    pub cash_outs: u32,
    pub starting_balance: f64,
    pub final_balance: f64,
    pub net_profit: f64,
    pub stop_reason: Option<AutoPlayStopReason>,
    pub final_difficulty: f64,
    pub challenge_level: ChallengeLevel,
    pub simulated_ms: u64,
    /// Newest first.
    pub recent_crashes: Vec<f64>,
    /// Over the whole stored history, including earlier runs.
    pub history: LedgerStats,
}

/// Plays a [`RunPlan`] against a game, one engine tick at a time.
pub struct Runner<S: Scheduler, H: HistoryStore> {
    game: ShadowFlight<S, H>,
    plan: RunPlan,
    seed: u64,
    starting_balance: f64,
    started_at_ms: u64,
    rounds_played: u32,
    rounds_placed: u32,
    cash_outs: u32,
    stop_reason: Option<AutoPlayStopReason>,
    finished: bool,
}

impl<S: Scheduler, H: HistoryStore> Runner<S, H> {
    pub fn new(game: ShadowFlight<S, H>, plan: RunPlan, seed: u64) -> Self {
        let starting_balance = game.balance();
        let started_at_ms = game.engine().now_ms();
        Self {
            game,
            plan,
            seed,
            starting_balance,
            started_at_ms,
            rounds_played: 0,
            rounds_placed: 0,
            cash_outs: 0,
            stop_reason: None,
            finished: false,
        }
    }

    pub fn game(&self) -> &ShadowFlight<S, H> {
        &self.game
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Place the first bet, through auto-play when the engine allows it.
    pub fn start(&mut self) -> anyhow::Result<()> {
        self.game.select_bet(self.plan.bet);
        if self.game.engine().capabilities().auto_play {
            self.game
                .activate_auto_play(self.plan.rounds, self.plan.stop_on_profit, self.plan.stop_on_loss)
                .context("activate auto-play")?;
        } else {
            self.place_manual_bet();
        }
        Ok(())
    }

    /// Advance one engine tick and react to what happened.
    pub fn step(&mut self) -> bool {
        if self.finished {
            return true;
        }
        let tick = self.game.engine().config().game_loop_interval_ms;
        self.game.advance(tick);

        for event in self.game.drain_events() {
            match event {
                EngineEvent::Crashed { crash_multiplier } => {
                    self.rounds_played += 1;
                    info!(
                        round = self.rounds_played,
                        crash_multiplier,
                        balance = self.game.balance(),
                        "round settled"
                    );
                }
                EngineEvent::CashedOut { amount, multiplier } => {
                    self.cash_outs += 1;
                    debug!(amount, multiplier, "bot cashed out");
                }
                EngineEvent::AutoPlayStopped { reason } => self.stop_reason = Some(reason),
                _ => {}
            }
        }

        if self.plan.strategy.should_cash_out(self.game.engine()) {
            self.game.cash_out();
        }

        if self.game.phase() == RoundPhase::Betting {
            if self.game.engine().capabilities().auto_play {
                self.finished = !self.game.autoplay().is_active();
            } else {
                self.place_manual_bet();
            }
        }
        self.finished
    }

    /// Run on the virtual clock until the plan is done.
    pub fn run_virtual(mut self) -> RunSummary {
        while !self.step() {}
        self.summary()
    }

    /// Run paced against wall-clock time; `speed` simulated milliseconds pass
    /// per real millisecond.
    pub async fn run_realtime(mut self, speed: f64) -> RunSummary {
        let tick = self.game.engine().config().game_loop_interval_ms;
        let period = Duration::from_secs_f64((tick as f64 / speed / 1_000.0).max(0.001));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if self.step() {
                break;
            }
        }
        self.summary()
    }

    fn place_manual_bet(&mut self) {
        if self.rounds_placed >= self.plan.rounds {
            self.finish(AutoPlayStopReason::RoundsExhausted);
            return;
        }
        match self.game.place_bet(self.plan.bet) {
            Ok(_) => self.rounds_placed += 1,
            Err(err) => {
                debug!(?err, "manual bet rejected");
                self.finish(AutoPlayStopReason::InsufficientBalance);
            }
        }
    }

    fn finish(&mut self, reason: AutoPlayStopReason) {
        self.stop_reason.get_or_insert(reason);
        self.finished = true;
    }

    pub fn summary(&self) -> RunSummary {
        let engine = self.game.engine();
        RunSummary {
            seed: self.seed,
            rounds_played: self.rounds_played,
            cash_outs: self.cash_outs,
            starting_balance: self.starting_balance,
            final_balance: engine.balance(),
            net_profit: engine.balance() - self.starting_balance,
            stop_reason: self.stop_reason,
            final_difficulty: engine.difficulty(),
            challenge_level: engine.challenge_level(),
            simulated_ms: engine.now_ms().saturating_sub(self.started_at_ms),
            recent_crashes: engine.ledger().simple().map(|item| item.multiplier).collect(),
            history: engine.ledger().stats(),
        }
    }
}
