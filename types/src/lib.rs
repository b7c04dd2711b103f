//! Shadowflight shared types.
//!
//! Defines the round phases, history records, engine events and configuration
//! consumed by the execution layer and the simulator.

mod config;
mod constants;
mod events;
mod history;
mod round;

pub use config::*;
pub use constants::*;
pub use events::*;
pub use history::*;
pub use round::*;

#[cfg(test)]
mod tests;
