use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shadowflight_simulator::{analyze_rtp, run_session, Pacing, SimulatorConfig};
use shadowflight_types::{GameConfig, DIFFICULTY_MAX, DIFFICULTY_MIN};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, Level};

fn init_tracing(level: &str) -> Result<()> {
    let level = Level::from_str(level).context("invalid log level")?;
    tracing_subscriber::fmt().with_max_level(level).init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "shadowflight-simulator", about = "Play shadowflight rounds headlessly.")]
struct Args {
    /// YAML file with simulator and game settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a bot session (default).
    Run(RunArgs),
    /// Report return-to-player figures derived from the crash table.
    Rtp(RtpArgs),
}

#[derive(clap::Args, Debug, Default)]
struct RunArgs {
    /// Seed for the round RNG (drawn from entropy when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rounds to play.
    #[arg(long)]
    rounds: Option<u32>,

    /// Stake per round.
    #[arg(long)]
    bet: Option<f64>,

    /// Effective multiplier at which the bot cashes out.
    #[arg(long, conflicts_with = "hold")]
    cash_out_at: Option<f64>,

    /// Never cash out; ride every round to the crash.
    #[arg(long, default_value_t = false)]
    hold: bool,

    /// Stop once profit reaches this amount.
    #[arg(long)]
    stop_on_profit: Option<f64>,

    /// Stop once loss reaches this amount.
    #[arg(long)]
    stop_on_loss: Option<f64>,

    /// Path to SQLite database for round history (disabled when omitted).
    #[arg(long)]
    history_path: Option<PathBuf>,

    /// Clock pacing.
    #[arg(long, value_enum)]
    pacing: Option<Pacing>,

    /// Simulated milliseconds per real millisecond when pacing is realtime.
    #[arg(long)]
    speed: Option<f64>,

    /// Disable auto-play and safe-zone rounds.
    #[arg(long, default_value_t = false)]
    classic: bool,
}

#[derive(clap::Args, Debug)]
struct RtpArgs {
    /// Difficulty factors to report (defaults to the minimum, neutral and maximum).
    #[arg(long, value_delimiter = ',')]
    difficulty: Vec<f64>,

    /// Cash-out targets to price.
    #[arg(long, value_delimiter = ',', default_values_t = [1.5, 2.0, 3.0, 5.0, 10.0])]
    target: Vec<f64>,

    /// Monte Carlo rounds per target (0 skips the simulation).
    #[arg(long, default_value_t = 100_000)]
    samples: u64,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn load_base_config(args: &Args) -> Result<SimulatorConfig> {
    let mut config = match &args.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn build_config(mut config: SimulatorConfig, run: &RunArgs) -> Result<SimulatorConfig> {
    config.seed = run.seed.or(config.seed);
    config.rounds = run.rounds.unwrap_or(config.rounds);
    config.bet = run.bet.unwrap_or(config.bet);
    if run.hold {
        config.cash_out_at = None;
    } else if run.cash_out_at.is_some() {
        config.cash_out_at = run.cash_out_at;
    }
    config.stop_on_profit = run.stop_on_profit.or(config.stop_on_profit);
    config.stop_on_loss = run.stop_on_loss.or(config.stop_on_loss);
    if run.history_path.is_some() {
        config.history_path = run.history_path.clone();
    }
    config.pacing = run.pacing.unwrap_or(config.pacing);
    config.speed = run.speed.unwrap_or(config.speed);
    config.classic |= run.classic;
    config.validate().context("invalid simulator config")?;
    Ok(config)
}

fn difficulties(requested: &[f64]) -> Vec<f64> {
    if requested.is_empty() {
        vec![DIFFICULTY_MIN, 1.0, DIFFICULTY_MAX]
    } else {
        requested.to_vec()
    }
}

async fn run_command(base: SimulatorConfig, run: &RunArgs) -> Result<()> {
    let config = build_config(base, run)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, rounds = config.rounds, bet = config.bet, "starting session");
    let summary = run_session(&config, seed).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();
    let base = load_base_config(&args)?;

    // Create logger
    init_tracing(&base.log_level)?;

    match &args.command {
        Some(Command::Rtp(rtp)) => {
            let game: &GameConfig = &base.game;
            game.validate().context("invalid game config")?;
            let analyses = analyze_rtp(
                game,
                &difficulties(&rtp.difficulty),
                &rtp.target,
                rtp.samples,
                rtp.seed,
            );
            println!("{}", serde_json::to_string_pretty(&analyses)?);
        }
        Some(Command::Run(run)) => run_command(base, run).await?,
        None => run_command(base, &RunArgs::default()).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &Args) -> &RunArgs {
        match &args.command {
            Some(Command::Run(run)) => run,
            other => panic!("expected run command, got {other:?}"),
        }
    }

    #[test]
    fn parses_run_overrides() {
        let args = Args::parse_from([
            "simulator",
            "run",
            "--seed",
            "7",
            "--rounds",
            "12",
            "--bet",
            "25",
            "--cash-out-at",
            "1.5",
            "--pacing",
            "realtime",
            "--stop-on-loss",
            "100",
        ]);
        let config = build_config(SimulatorConfig::default(), run_args(&args)).expect("config should parse");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.rounds, 12);
        assert_eq!(config.bet, 25.0);
        assert_eq!(config.cash_out_at, Some(1.5));
        assert_eq!(config.pacing, Pacing::Realtime);
        assert_eq!(config.stop_on_loss, Some(100.0));
    }

    #[test]
    fn hold_clears_cash_out_target() {
        let args = Args::parse_from(["simulator", "run", "--hold", "--classic"]);
        let config = build_config(SimulatorConfig::default(), run_args(&args)).unwrap();
        assert_eq!(config.cash_out_at, None);
        assert!(config.classic);
    }

    #[test]
    fn rejects_zero_rounds() {
        let args = Args::parse_from(["simulator", "run", "--rounds", "0"]);
        let err = build_config(SimulatorConfig::default(), run_args(&args)).unwrap_err();
        assert!(format!("{err:#}").contains("rounds must be > 0"), "unexpected error: {err:#}");
    }

    #[test]
    fn parses_rtp_lists() {
        let args = Args::parse_from(["simulator", "rtp", "--difficulty", "0.8,1.2", "--samples", "0"]);
        match args.command {
            Some(Command::Rtp(rtp)) => {
                assert_eq!(difficulties(&rtp.difficulty), vec![0.8, 1.2]);
                assert_eq!(rtp.target, vec![1.5, 2.0, 3.0, 5.0, 10.0]);
                assert_eq!(rtp.samples, 0);
            }
            other => panic!("expected rtp command, got {other:?}"),
        }
        assert_eq!(difficulties(&[]), vec![DIFFICULTY_MIN, 1.0, DIFFICULTY_MAX]);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::parse_from(["simulator", "run", "--log-level", "debug"]);
        let config = load_base_config(&args).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(Level::from_str(&config.log_level).is_ok());
    }
}
