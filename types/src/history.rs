use serde::{Deserialize, Serialize};

/// Crash multipliers below this are shown as "low" in the history strip.
pub const LOW_CRASH_THRESHOLD: f64 = 2.0;

/// Settled outcome of a single round.
///
/// Immutable once created. Field names serialize in camelCase so stored
/// histories stay readable by the browser client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub bet_amount: f64,
    pub cashed_out_at: Option<f64>,
    pub crash_multiplier: f64,
    pub profit: f64,
}

impl HistoryEntry {
    /// Build an entry, deriving `profit` from the stake and cash-out multiplier.
    pub fn settle(id: u64, bet_amount: f64, cashed_out_at: Option<f64>, crash_multiplier: f64) -> Self {
        let profit = match cashed_out_at {
            Some(multiplier) => bet_amount * multiplier - bet_amount,
            None => -bet_amount,
        };
        Self {
            id,
            bet_amount,
            cashed_out_at,
            crash_multiplier,
            profit,
        }
    }

    pub fn won(&self) -> bool {
        self.cashed_out_at.is_some()
    }

    /// Amount credited back to the balance (zero on a loss).
    pub fn payout(&self) -> f64 {
        self.cashed_out_at
            .map(|multiplier| self.bet_amount * multiplier)
            .unwrap_or(0.0)
    }
}

/// Compact crash-only record for the recent-crashes strip.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleHistoryItem {
    pub id: u64,
    pub multiplier: f64,
}

impl SimpleHistoryItem {
    pub fn is_low(&self) -> bool {
        self.multiplier < LOW_CRASH_THRESHOLD
    }
}
