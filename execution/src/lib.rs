//! Shadowflight execution layer.
//!
//! This crate contains the round engine and everything it is built from: the
//! crash point sampler, the difficulty controller, the flight and drain model,
//! auto-play, the history ledger and the persistence seam.
//!
//! ## Determinism requirements
//! - Do not read wall-clock time inside the engine; all waiting goes through a [`Scheduler`].
//! - Do not use ambient randomness; every draw comes from the injected [`GameRng`].
//! - A given seed, config and sequence of player actions always yields the same rounds.
//!
//! The primary entrypoint is [`ShadowFlight`].
//!
//! ## Minimal session (example)
//! ```rust
//! use shadowflight_execution::ShadowFlight;
//! use shadowflight_types::RoundPhase;
//!
//! let mut game = ShadowFlight::with_seed(7).unwrap();
//! game.place_bet(10.0).unwrap();
//! assert_eq!(game.phase(), RoundPhase::Countdown);
//!
//! // Countdown, flight and the post-crash pause all run on the virtual clock.
//! game.run_until_betting(24 * 60 * 60 * 1_000);
//! assert_eq!(game.phase(), RoundPhase::Betting);
//! assert_eq!(game.ledger().len(), 1);
//! ```

pub mod autoplay;
pub mod bet;
pub mod difficulty;
pub mod engine;
pub mod flight;
pub mod game;
pub mod ledger;
pub mod rng;
pub mod rtp;
pub mod sampler;
pub mod scheduler;
pub mod store;


pub use autoplay::{AutoPlayController, AutoPlayRefused, AutoPlaySession, AutoPlaySettings, AutoPlayStep};
pub use bet::{clamp_bet, max_bet, parse_bet_input, quick_bet, validate_stake, BetRejected};
pub use difficulty::DifficultyController;
pub use engine::{Fired, RoundContext, RoundEngine, TickOutcome};
#[cfg(any(test, feature = "mocks"))]
pub use engine::RoundOverride;
pub use game::ShadowFlight;
pub use ledger::{HistoryLedger, LedgerStats};
pub use rng::GameRng;
pub use rtp::{RtpReport, SimulatedRtp, TargetRtp};
pub use sampler::sample_crash_point;
pub use scheduler::{PhaseTimings, Scheduler, TimerHandle, TimerKind, VirtualScheduler};
pub use store::{HistoryStore, MemoryStore, NullStore, StoreError};
