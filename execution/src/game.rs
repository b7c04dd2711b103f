//! Game session wiring the round engine, auto-play and history persistence.

use shadowflight_types::{ConfigError, EngineCapabilities, EngineEvent, GameConfig, RoundPhase};
use tracing::{debug, warn};

use crate::autoplay::{AutoPlayController, AutoPlayRefused, AutoPlaySettings, AutoPlayStep};
use crate::bet::{clamp_bet, max_bet, parse_bet_input, quick_bet, BetRejected};
use crate::engine::{Fired, RoundEngine};
use crate::ledger::HistoryLedger;
use crate::rng::GameRng;
use crate::scheduler::{Scheduler, VirtualScheduler};
use crate::store::{HistoryStore, NullStore};

/// A player's game: one engine, one auto-play controller, one history store.
pub struct ShadowFlight<S: Scheduler = VirtualScheduler, H: HistoryStore = NullStore> {
    engine: RoundEngine<S>,
    autoplay: AutoPlayController,
    store: H,
    selected_bet: f64,
}

impl<S: Scheduler, H: HistoryStore> ShadowFlight<S, H> {
    /// Build the game and restore persisted history.
    ///
    /// A store that fails to load leaves the history empty.
    pub fn new(
        config: GameConfig,
        capabilities: EngineCapabilities,
        scheduler: S,
        rng: GameRng,
        mut store: H,
    ) -> Result<Self, ConfigError> {
        let mut engine = RoundEngine::new(config, capabilities, scheduler, rng)?;
        match store.load() {
            Ok(entries) => {
                debug!(entries = entries.len(), "history restored");
                engine.ledger_mut().restore(entries);
            }
            Err(err) => warn!(?err, "failed to load history, starting empty"),
        }
        let selected_bet = engine.config().min_bet;
        Ok(Self {
            engine,
            autoplay: AutoPlayController::new(),
            store,
            selected_bet,
        })
    }

    pub fn engine(&self) -> &RoundEngine<S> {
        &self.engine
    }

    /// Direct engine access for drivers that need it (e.g. forcing rounds in tests).
    pub fn engine_mut(&mut self) -> &mut RoundEngine<S> {
        &mut self.engine
    }

    pub fn autoplay(&self) -> &AutoPlayController {
        &self.autoplay
    }

    pub fn ledger(&self) -> &HistoryLedger {
        self.engine.ledger()
    }

    pub fn store(&self) -> &H {
        &self.store
    }

    pub fn phase(&self) -> RoundPhase {
        self.engine.phase()
    }

    pub fn balance(&self) -> f64 {
        self.engine.balance()
    }

    /// Stake used by [`ShadowFlight::place_selected_bet`] and auto-play.
    pub fn selected_bet(&self) -> f64 {
        self.selected_bet
    }

    pub fn select_bet(&mut self, amount: f64) -> f64 {
        self.selected_bet = clamp_bet(amount, self.engine.balance(), self.engine.config());
        self.selected_bet
    }

    pub fn select_bet_input(&mut self, input: &str) -> f64 {
        self.selected_bet = parse_bet_input(input, self.engine.balance(), self.engine.config());
        self.selected_bet
    }

    pub fn add_quick_bet(&mut self, increment: f64) -> f64 {
        self.selected_bet = quick_bet(self.selected_bet, increment, self.engine.config());
        self.selected_bet
    }

    pub fn select_max_bet(&mut self) -> f64 {
        self.selected_bet = max_bet(self.engine.balance(), self.engine.config());
        self.selected_bet
    }

    pub fn place_bet(&mut self, amount: f64) -> Result<f64, BetRejected> {
        let placed = self.engine.place_bet(amount)?;
        self.selected_bet = placed;
        Ok(placed)
    }

    pub fn place_selected_bet(&mut self) -> Result<f64, BetRejected> {
        self.place_bet(self.selected_bet)
    }

    pub fn cash_out(&mut self) -> Option<f64> {
        self.engine.cash_out()
    }

    /// Start auto-play with the selected stake and place its first bet.
    pub fn activate_auto_play(
        &mut self,
        rounds: u32,
        stop_on_profit: Option<f64>,
        stop_on_loss: Option<f64>,
    ) -> Result<AutoPlayStep, AutoPlayRefused> {
        let settings = AutoPlaySettings {
            rounds,
            bet_amount: self.selected_bet,
            stop_on_profit,
            stop_on_loss,
        };
        self.autoplay.activate(&self.engine, settings)?;
        Ok(self.autoplay.on_betting(&mut self.engine))
    }

    pub fn deactivate_auto_play(&mut self) -> bool {
        self.autoplay.deactivate(&mut self.engine)
    }

    /// Empty the detailed history and persist the empty sequence.
    pub fn clear_history(&mut self) {
        self.engine.ledger_mut().clear();
        self.persist();
    }

    /// Fire every timer due within the next `ms`, running auto-play on each
    /// return to betting.
    pub fn advance(&mut self, ms: u64) -> Vec<Fired> {
        let until = self.engine.now_ms().saturating_add(ms);
        let mut fired = Vec::new();
        while let Some(next) = self.engine.fire_next_due(until) {
            match next.entered {
                Some(RoundPhase::Crashed) => self.persist(),
                Some(RoundPhase::Betting) => {
                    self.autoplay.on_betting(&mut self.engine);
                }
                _ => {}
            }
            fired.push(next);
        }
        self.engine.settle_clock(until);
        fired
    }

    /// Run until the engine is back in `Betting` or `limit_ms` has elapsed.
    pub fn run_until_betting(&mut self, limit_ms: u64) -> u64 {
        let start = self.engine.now_ms();
        let step = self.engine.config().game_loop_interval_ms;
        while self.engine.phase() != RoundPhase::Betting
            && self.engine.now_ms().saturating_sub(start) < limit_ms
        {
            self.advance(step);
        }
        self.engine.now_ms().saturating_sub(start)
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.engine.drain_events()
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(self.engine.ledger().detailed()) {
            warn!(?err, "failed to save history");
        }
    }
}

impl ShadowFlight<VirtualScheduler, NullStore> {
    /// Game on a virtual clock with default tunables and no persistence.
    pub fn with_seed(seed: u64) -> Result<Self, ConfigError> {
        Self::new(
            GameConfig::default(),
            EngineCapabilities::default(),
            VirtualScheduler::new(),
            GameRng::from_seed(seed),
            NullStore,
        )
    }
}
