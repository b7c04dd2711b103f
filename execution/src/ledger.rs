//! Round history.
//!
//! Two newest-first sequences: a compact strip of recent crash multipliers
//! capped at a handful of entries, and the uncapped detailed record that is
//! handed to persistence. Entries are never edited after they are recorded.

use std::collections::VecDeque;

use serde::Serialize;
use shadowflight_types::{HistoryEntry, SimpleHistoryItem};

/// Aggregate figures over the detailed history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LedgerStats {
    pub rounds: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_wagered: f64,
    pub total_returned: f64,
    pub net_profit: f64,
    pub best_cash_out: Option<f64>,
    pub highest_crash: Option<f64>,
}

impl LedgerStats {
    /// Fraction of wagered stake paid back, if anything was wagered.
    pub fn return_ratio(&self) -> Option<f64> {
        (self.total_wagered > 0.0).then(|| self.total_returned / self.total_wagered)
    }
}

#[derive(Clone, Debug)]
pub struct HistoryLedger {
    simple: VecDeque<SimpleHistoryItem>,
    simple_cap: usize,
    detailed: Vec<HistoryEntry>,
    next_id: u64,
}

impl HistoryLedger {
    pub fn new(simple_cap: usize) -> Self {
        Self {
            simple: VecDeque::with_capacity(simple_cap),
            simple_cap,
            detailed: Vec::new(),
            next_id: 1,
        }
    }

    /// Replace the detailed history with previously persisted entries.
    ///
    /// Entries are expected newest-first. Ids continue after the largest one
    /// restored.
    pub fn restore(&mut self, entries: Vec<HistoryEntry>) {
        let max_id = entries.iter().map(|entry| entry.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id.saturating_add(1));
        self.detailed = entries;
    }

    /// Reserve the id for the next recorded entry.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Prepend a settled round to both sequences.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.simple.push_front(SimpleHistoryItem {
            id: entry.id,
            multiplier: entry.crash_multiplier,
        });
        self.simple.truncate(self.simple_cap);
        self.detailed.insert(0, entry);
    }

    /// Empty the detailed history. The recent-crash strip is kept.
    pub fn clear(&mut self) {
        self.detailed.clear();
    }

    pub fn simple(&self) -> impl Iterator<Item = &SimpleHistoryItem> {
        self.simple.iter()
    }

    pub fn detailed(&self) -> &[HistoryEntry] {
        &self.detailed
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.detailed.first()
    }

    pub fn len(&self) -> usize {
        self.detailed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detailed.is_empty()
    }

    pub fn stats(&self) -> LedgerStats {
        let mut stats = LedgerStats::default();
        for entry in &self.detailed {
            stats.rounds += 1;
            stats.total_wagered += entry.bet_amount;
            stats.total_returned += entry.payout();
            stats.net_profit += entry.profit;
            match entry.cashed_out_at {
                Some(multiplier) => {
                    stats.wins += 1;
                    stats.best_cash_out = Some(stats.best_cash_out.map_or(multiplier, |best| best.max(multiplier)));
                }
                None => stats.losses += 1,
            }
            stats.highest_crash = Some(
                stats
                    .highest_crash
                    .map_or(entry.crash_multiplier, |high| high.max(entry.crash_multiplier)),
            );
        }
        stats
    }
}
