//! In-memory stats recorder.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::Serialize;

use crate::{Counter, StatsRecorder};

/// A point-in-time copy of every counter.
///
/// Serializes with the counters' external names:
/// `{ "gamesPlayed": 3, "ongoingGames": 1, "piecesCaptured": 17 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub games_played: i64,
    pub ongoing_games: i64,
    pub pieces_captured: i64,
}

/// A [`StatsRecorder`] that keeps counters in atomics.
///
/// Counters start at zero and are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStats {
    counters: [AtomicI64; Counter::ALL.len()],
}

impl MemoryStats {
    /// Creates a recorder with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value of `counter`.
    pub fn get(&self, counter: Counter) -> i64 {
        self.slot(counter).load(Ordering::Relaxed)
    }

    /// Overwrites `counter` with `value` and returns it.
    pub fn set(&self, counter: Counter, value: i64) -> i64 {
        self.slot(counter).store(value, Ordering::Relaxed);
        tracing::trace!(%counter, value, "counter set");
        value
    }

    /// Returns a copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            games_played: self.get(Counter::GamesPlayed),
            ongoing_games: self.get(Counter::OngoingGames),
            pieces_captured: self.get(Counter::PiecesCaptured),
        }
    }

    fn slot(&self, counter: Counter) -> &AtomicI64 {
        &self.counters[counter.index()]
    }
}

impl StatsRecorder for MemoryStats {
    fn increment(&self, counter: Counter) -> i64 {
        let value = self.slot(counter).fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(%counter, value, "counter incremented");
        value
    }

    fn decrement(&self, counter: Counter) -> i64 {
        let value = self.slot(counter).fetch_sub(1, Ordering::Relaxed) - 1;
        tracing::trace!(%counter, value, "counter decremented");
        value
    }
}
