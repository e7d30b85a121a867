//! The `RulesEngine` trait: everything a session needs from the rules.

use std::fmt;

/// A kind of chess piece, independent of colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        };
        f.write_str(name)
    }
}

/// The result of a move the engine accepted and applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// The piece that moved.
    pub piece: PieceKind,
    /// The piece taken by this move, if any (including en passant).
    pub captured: Option<PieceKind>,
    /// The piece a pawn turned into, if this move promoted.
    pub promotion: Option<PieceKind>,
    /// The move in standard algebraic notation, for logs.
    pub san: String,
}

impl AppliedMove {
    /// Returns `true` if the move took a piece.
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// A rule outcome that ends the game.
///
/// At most one condition is reported at a time. When several hold at
/// once the engine reports the first in declaration order, which is the
/// priority sessions rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalCondition {
    /// The side to move is in check and has no legal move. The player
    /// who just moved wins.
    Checkmate,
    /// The side to move is not in check and has no legal move.
    Stalemate,
    /// Neither side can possibly mate.
    InsufficientMaterial,
    /// Fifty full moves without a capture or pawn move.
    FiftyMoveRule,
    /// The same position has occurred three times.
    ThreefoldRepetition,
}

impl TerminalCondition {
    /// Returns `true` if the condition has a winner. Only checkmate does;
    /// everything else is a draw.
    pub fn is_decisive(self) -> bool {
        matches!(self, Self::Checkmate)
    }
}

/// Validates and applies moves for one game, and reports when it ends.
///
/// One engine instance is bound to one session for its whole life and
/// owns the board. `Default` produces the starting position.
pub trait RulesEngine: Default + Send + 'static {
    /// Validates the move from `from` to `to` (algebraic square names)
    /// and applies it if legal.
    ///
    /// A pawn reaching the last rank always becomes a queen. Returns
    /// `None` if the move is illegal, a square name is malformed, or
    /// there is no piece on `from`; the position is unchanged then.
    fn apply_move(&mut self, from: &str, to: &str) -> Option<AppliedMove>;

    /// Returns the condition that ends the game in the current
    /// position, if any.
    fn terminal_condition(&self) -> Option<TerminalCondition>;

    /// Returns `true` if the game has ended.
    fn is_game_over(&self) -> bool {
        self.terminal_condition().is_some()
    }
}
