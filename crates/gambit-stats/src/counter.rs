//! The counters sessions report.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A process-wide counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Counter {
    /// Games that reached InProgress since startup. Never decremented.
    GamesPlayed,
    /// Games currently InProgress.
    OngoingGames,
    /// Pieces captured across all games.
    PiecesCaptured,
}

impl Counter {
    /// Every counter, in a fixed order.
    pub const ALL: [Counter; 3] = [
        Counter::GamesPlayed,
        Counter::OngoingGames,
        Counter::PiecesCaptured,
    ];

    /// The counter's external name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GamesPlayed => "gamesPlayed",
            Self::OngoingGames => "ongoingGames",
            Self::PiecesCaptured => "piecesCaptured",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::GamesPlayed => 0,
            Self::OngoingGames => 1,
            Self::PiecesCaptured => 2,
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
