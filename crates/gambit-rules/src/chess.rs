//! Standard chess rules backed by `shakmaty`.

use std::collections::HashMap;

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{
    CastlingMode, Chess, EnPassantMode, Position, Rank, Role, Square,
};

use crate::{AppliedMove, PieceKind, RulesEngine, RulesError, TerminalCondition};

/// Plies without a capture or pawn move after which the game is drawn.
const FIFTY_MOVE_PLIES: u32 = 100;

/// How many times a position must occur for a repetition draw.
const REPETITION_LIMIT: u32 = 3;

/// A standard chess game.
///
/// Besides the position itself, the engine counts how often each
/// position has occurred, since `shakmaty` positions carry no history.
#[derive(Debug, Clone)]
pub struct ChessRules {
    position: Chess,
    /// Occurrence count per position, keyed by FEN without move counters.
    seen: HashMap<String, u32>,
}

impl ChessRules {
    /// Creates a game at the standard starting position.
    pub fn new() -> Self {
        Self::with_position(Chess::default())
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| RulesError::InvalidFen(format!("{e}")))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidPosition(format!("{e}")))?;
        Ok(Self::with_position(position))
    }

    fn with_position(position: Chess) -> Self {
        let mut rules = Self {
            position,
            seen: HashMap::new(),
        };
        rules.record_position();
        rules
    }

    /// The current position as a FEN string.
    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal)
            .to_string()
    }

    /// Plies since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.position.halfmoves()
    }

    /// How many times the current position has occurred.
    pub fn repetitions(&self) -> u32 {
        self.seen.get(&self.position_key()).copied().unwrap_or(0)
    }

    /// FEN minus the halfmove and fullmove fields: two positions with the
    /// same key are the same for repetition purposes.
    fn position_key(&self) -> String {
        let fen = self.fen();
        match fen.rsplitn(3, ' ').nth(2) {
            Some(key) => key.to_string(),
            None => fen,
        }
    }

    fn record_position(&mut self) {
        *self.seen.entry(self.position_key()).or_insert(0) += 1;
    }
}

impl Default for ChessRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ChessRules {
    fn apply_move(&mut self, from: &str, to: &str) -> Option<AppliedMove> {
        let from: Square = from.parse().ok()?;
        let to: Square = to.parse().ok()?;
        let piece = self.position.board().piece_at(from)?;

        // Promotion is never the client's choice: always a queen.
        let promotion = (piece.role == Role::Pawn
            && matches!(to.rank(), Rank::First | Rank::Eighth))
        .then_some(Role::Queen);

        let m = UciMove::Normal {
            from,
            to,
            promotion,
        }
        .to_move(&self.position)
        .ok()?;
        if !self.position.is_legal(&m) {
            return None;
        }

        let applied = AppliedMove {
            piece: m.role().into(),
            captured: m.capture().map(PieceKind::from),
            promotion: m.promotion().map(PieceKind::from),
            san: San::from_move(&self.position, &m).to_string(),
        };

        self.position.play_unchecked(&m);
        self.record_position();
        tracing::trace!(san = %applied.san, "move applied");

        Some(applied)
    }

    fn terminal_condition(&self) -> Option<TerminalCondition> {
        if self.position.is_checkmate() {
            Some(TerminalCondition::Checkmate)
        } else if self.position.is_stalemate() {
            Some(TerminalCondition::Stalemate)
        } else if self.position.is_insufficient_material() {
            Some(TerminalCondition::InsufficientMaterial)
        } else if self.halfmove_clock() >= FIFTY_MOVE_PLIES {
            Some(TerminalCondition::FiftyMoveRule)
        } else if self.repetitions() >= REPETITION_LIMIT {
            Some(TerminalCondition::ThreefoldRepetition)
        } else {
            None
        }
    }
}

impl From<Role> for PieceKind {
    fn from(role: Role) -> Self {
        match role {
            Role::Pawn => Self::Pawn,
            Role::Knight => Self::Knight,
            Role::Bishop => Self::Bishop,
            Role::Rook => Self::Rook,
            Role::Queen => Self::Queen,
            Role::King => Self::King,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(fen: &str) -> ChessRules {
        ChessRules::from_fen(fen).expect("valid FEN")
    }

    fn play(rules: &mut ChessRules, moves: &[(&str, &str)]) {
        for (from, to) in moves {
            rules
                .apply_move(from, to)
                .unwrap_or_else(|| panic!("{from}{to} should be legal"));
        }
    }

    #[test]
    fn test_starting_position_is_not_over() {
        let rules = ChessRules::new();
        assert!(!rules.is_game_over());
        assert_eq!(rules.halfmove_clock(), 0);
        assert_eq!(rules.repetitions(), 1);
    }

    #[test]
    fn test_apply_legal_move() {
        let mut rules = ChessRules::new();
        let applied = rules.apply_move("e2", "e4").expect("e4 is legal");
        assert_eq!(applied.piece, PieceKind::Pawn);
        assert_eq!(applied.san, "e4");
        assert!(!applied.is_capture());
        assert!(
            rules
                .fen()
                .starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b")
        );
    }

    #[test]
    fn test_illegal_moves_leave_position_unchanged() {
        let mut rules = ChessRules::new();
        let before = rules.fen();

        assert!(rules.apply_move("e2", "e5").is_none(), "three squares");
        assert!(rules.apply_move("e7", "e5").is_none(), "wrong colour");
        assert!(rules.apply_move("e3", "e4").is_none(), "empty source");
        assert!(rules.apply_move("z9", "e4").is_none(), "bad square name");
        assert!(rules.apply_move("", "").is_none());

        assert_eq!(rules.fen(), before);
    }

    #[test]
    fn test_capture_is_reported() {
        let mut rules = ChessRules::new();
        play(&mut rules, &[("e2", "e4"), ("d7", "d5")]);
        let applied = rules.apply_move("e4", "d5").expect("exd5 is legal");
        assert_eq!(applied.captured, Some(PieceKind::Pawn));
        assert_eq!(applied.san, "exd5");
    }

    #[test]
    fn test_en_passant_counts_as_capture() {
        let fen = "rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3";
        let mut rules = at(fen);
        let applied = rules.apply_move("f5", "e6").expect("en passant");
        assert_eq!(applied.captured, Some(PieceKind::Pawn));
    }

    #[test]
    fn test_castling_from_king_squares() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        let mut rules = at(fen);
        let applied = rules.apply_move("e1", "g1").expect("O-O is legal");
        assert_eq!(applied.san, "O-O");
        assert_eq!(applied.piece, PieceKind::King);
    }

    #[test]
    fn test_white_pawn_always_promotes_to_queen() {
        let mut rules = at("8/P7/8/8/8/8/8/4K2k w - - 0 1");
        let applied = rules.apply_move("a7", "a8").expect("promotion is legal");
        assert_eq!(applied.promotion, Some(PieceKind::Queen));
        assert!(rules.fen().starts_with("Q7/"));
    }

    #[test]
    fn test_black_pawn_always_promotes_to_queen() {
        let mut rules = at("4k3/8/8/8/8/8/p7/4K3 b - - 0 1");
        let applied = rules.apply_move("a2", "a1").expect("promotion is legal");
        assert_eq!(applied.promotion, Some(PieceKind::Queen));
        assert!(rules.fen().contains("/q3K3 "));
    }

    #[test]
    fn test_checkmate_fools_mate() {
        let mut rules = ChessRules::new();
        play(
            &mut rules,
            &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")],
        );
        assert_eq!(
            rules.terminal_condition(),
            Some(TerminalCondition::Checkmate)
        );
        assert!(rules.apply_move("e2", "e4").is_none(), "no moves after mate");
    }

    #[test]
    fn test_stalemate() {
        let rules = at("8/8/8/8/8/6q1/5k2/7K w - - 0 1");
        assert_eq!(
            rules.terminal_condition(),
            Some(TerminalCondition::Stalemate)
        );
    }

    #[test]
    fn test_insufficient_material() {
        let rules = at("8/8/8/4k3/8/8/8/4K3 w - - 0 1");
        assert_eq!(
            rules.terminal_condition(),
            Some(TerminalCondition::InsufficientMaterial)
        );
    }

    #[test]
    fn test_fifty_move_rule_after_hundredth_quiet_ply() {
        let mut rules = at("8/8/8/4k3/8/8/8/4K2R w K - 99 80");
        assert_eq!(rules.terminal_condition(), None);
        play(&mut rules, &[("h1", "h2")]);
        assert_eq!(rules.halfmove_clock(), 100);
        assert_eq!(
            rules.terminal_condition(),
            Some(TerminalCondition::FiftyMoveRule)
        );
    }

    #[test]
    fn test_threefold_repetition() {
        let mut rules = ChessRules::new();
        let shuffle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];

        play(&mut rules, &shuffle);
        assert_eq!(rules.repetitions(), 2);
        assert_eq!(rules.terminal_condition(), None);

        play(&mut rules, &shuffle);
        assert_eq!(rules.repetitions(), 3);
        assert_eq!(
            rules.terminal_condition(),
            Some(TerminalCondition::ThreefoldRepetition)
        );
    }

    #[test]
    fn test_from_fen_rejects_garbage() {
        assert!(matches!(
            ChessRules::from_fen("not a fen"),
            Err(RulesError::InvalidFen(_))
        ));
    }
}
