//! Process-wide game counters for Gambit.
//!
//! Sessions report milestones (a game started, a piece was taken, a game
//! ended) to a [`StatsRecorder`]. Where the numbers end up is the
//! recorder's business; [`MemoryStats`] keeps them in atomics so any
//! task can read a consistent [`StatsSnapshot`].

mod counter;
mod memory;

pub use counter::Counter;
pub use memory::{MemoryStats, StatsSnapshot};

/// Receives counter updates from sessions.
///
/// `Send + Sync + 'static` because one recorder is shared by every
/// session in the process.
pub trait StatsRecorder: Send + Sync + 'static {
    /// Adds one to `counter` and returns the new value.
    fn increment(&self, counter: Counter) -> i64;

    /// Subtracts one from `counter` and returns the new value.
    fn decrement(&self, counter: Counter) -> i64;
}
