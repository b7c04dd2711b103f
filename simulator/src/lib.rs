//! Headless shadowflight driver.
//!
//! Plays bot sessions against the round engine on a virtual or paced clock,
//! persists round history to SQLite, and reports return-to-player figures.

use anyhow::Context;
use serde::Serialize;
use shadowflight_execution::rtp::{simulate, RtpReport, SimulatedRtp};
use shadowflight_execution::{GameRng, HistoryStore, NullStore, ShadowFlight, StoreError, VirtualScheduler};
use shadowflight_types::{GameConfig, HistoryEntry};
use tracing::info;

mod config;
pub use config::{Pacing, SettingsError, SimulatorConfig};
mod history_persistence;
pub use history_persistence::SqliteHistoryStore;
mod runner;
pub use runner::{RunPlan, RunSummary, Runner};
mod strategy;
pub use strategy::CashOutStrategy;

/// History backend chosen at startup.
pub enum SimulatorStore {
    Sqlite(SqliteHistoryStore),
    Ephemeral(NullStore),
}

impl SimulatorStore {
    pub fn open(config: &SimulatorConfig) -> anyhow::Result<Self> {
        match &config.history_path {
            Some(path) => {
                let store = SqliteHistoryStore::open(path)
                    .with_context(|| format!("open history store {}", path.display()))?;
                info!(path = %path.display(), "history persistence enabled");
                Ok(Self::Sqlite(store))
            }
            None => Ok(Self::Ephemeral(NullStore)),
        }
    }
}

impl HistoryStore for SimulatorStore {
    fn load(&mut self) -> Result<Vec<HistoryEntry>, StoreError> {
        match self {
            Self::Sqlite(store) => store.load(),
            Self::Ephemeral(store) => store.load(),
        }
    }

    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        match self {
            Self::Sqlite(store) => store.save(entries),
            Self::Ephemeral(store) => store.save(entries),
        }
    }
}

/// Build a runner for `config` on the virtual clock.
pub fn build_runner(
    config: &SimulatorConfig,
    seed: u64,
) -> anyhow::Result<Runner<VirtualScheduler, SimulatorStore>> {
    config.validate().context("invalid simulator config")?;
    let store = SimulatorStore::open(config)?;
    let game = ShadowFlight::new(
        config.game.clone(),
        config.capabilities(),
        VirtualScheduler::new(),
        GameRng::from_seed(seed),
        store,
    )
    .context("build game")?;
    let plan = RunPlan {
        rounds: config.rounds,
        bet: config.bet,
        stop_on_profit: config.stop_on_profit,
        stop_on_loss: config.stop_on_loss,
        strategy: CashOutStrategy::from_target(config.cash_out_at),
    };
    Ok(Runner::new(game, plan, seed))
}

/// Play the configured session to completion.
pub async fn run_session(config: &SimulatorConfig, seed: u64) -> anyhow::Result<RunSummary> {
    let mut runner = build_runner(config, seed)?;
    runner.start()?;
    let summary = match config.pacing {
        Pacing::Virtual => runner.run_virtual(),
        Pacing::Realtime => runner.run_realtime(config.speed).await,
    };
    info!(
        rounds = summary.rounds_played,
        final_balance = summary.final_balance,
        net_profit = summary.net_profit,
        stop_reason = ?summary.stop_reason,
        "session finished"
    );
    Ok(summary)
}

/// Analytic report plus a Monte Carlo check for one difficulty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RtpAnalysis {
    pub report: RtpReport,
    pub simulated: Vec<SimulatedRtp>,
}

pub fn analyze_rtp(
    config: &GameConfig,
    difficulties: &[f64],
    targets: &[f64],
    rounds: u64,
    seed: u64,
) -> Vec<RtpAnalysis> {
    let mut rng = GameRng::from_seed(seed);
    difficulties
        .iter()
        .map(|difficulty| RtpAnalysis {
            report: RtpReport::new(config, *difficulty, targets),
            simulated: targets
                .iter()
                .map(|target| simulate(&mut rng, config, *difficulty, *target, rounds))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_persists_history() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimulatorConfig {
            rounds: 3,
            history_path: Some(dir.path().join("history.db")),
            ..SimulatorConfig::default()
        };

        let first = run_session(&config, 11).await.unwrap();
        assert_eq!(first.rounds_played, 3);
        assert_eq!(first.history.rounds, 3);

        let second = run_session(&config, 12).await.unwrap();
        assert_eq!(second.history.rounds, 6);

        let store = SqliteHistoryStore::open(&dir.path().join("history.db")).unwrap();
        assert_eq!(store.count().unwrap(), 6);
    }

    #[test]
    fn test_same_seed_same_summary() {
        let config = SimulatorConfig {
            rounds: 5,
            ..SimulatorConfig::default()
        };
        let play = |seed| {
            let mut runner = build_runner(&config, seed).unwrap();
            runner.start().unwrap();
            runner.run_virtual()
        };
        assert_eq!(play(5), play(5));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulatorConfig {
            rounds: 0,
            ..SimulatorConfig::default()
        };
        let err = build_runner(&config, 1).err().unwrap();
        assert!(format!("{err:#}").contains("rounds must be > 0"));
    }

    #[test]
    fn test_analyze_rtp() {
        let analyses = analyze_rtp(&GameConfig::default(), &[1.0, 1.5], &[1.5, 2.0], 500, 4);
        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses[0].simulated.len(), 2);
        assert!(analyses[1].report.expected_crash_point < analyses[0].report.expected_crash_point);
    }
}
