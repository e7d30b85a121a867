//! A single two-player game.
//!
//! The session owns the rules engine and both player handles. It has no
//! task of its own: the [`MatchMaker`](crate::MatchMaker) calls into it
//! for every event, one at a time, so nothing here needs locking.

use std::sync::Arc;

use gambit_protocol::{
    ChatData, ClientCommand, Envelope, GameOverReason, MoveData, ServerMessage,
        Winner,
};
use gambit_rules::{RulesEngine, TerminalCondition};
use gambit_stats::{Counter, StatsRecorder};

use crate::{PlayerHandle, Seat, SessionError, SessionId, SessionStatus};

/// Called once when a session is destroyed, with the session's id.
pub type DestroyHook = Box<dyn FnOnce(&SessionId) + Send>;

/// One game between White and Black.
pub struct Session<R: RulesEngine> {
    id: SessionId,
    status: SessionStatus,
    white: PlayerHandle,
    black: Option<PlayerHandle>,
    /// Accepted moves so far. Even means White is to move.
    turn_index: u32,
    rules: R,
    stats: Arc<dyn StatsRecorder>,
    on_destroy: Option<DestroyHook>,
    destroyed: bool,
}

impl<R: RulesEngine> Session<R> {
    /// Creates a session at the starting position with `white` seated.
    pub fn new(
        id: SessionId,
        white: PlayerHandle,
        stats: Arc<dyn StatsRecorder>,
    ) -> Self {
        Self::with_rules(id, white, R::default(), stats)
    }

    /// Creates a session around an existing rules engine.
    ///
    /// White still moves first regardless of the engine's side to move,
    /// so `rules` should have White to move.
    pub fn with_rules(
        id: SessionId,
        white: PlayerHandle,
        rules: R,
        stats: Arc<dyn StatsRecorder>,
    ) -> Self {
        tracing::debug!(
            session_id = %id,
            conn_id = %white.id(),
            "white seated"
        );
        Self {
            id,
            status: SessionStatus::AwaitingOpponent,
            white,
            black: None,
            turn_index: 0,
            rules,
            stats,
            on_destroy: None,
            destroyed: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Number of moves accepted so far.
    pub fn turn_index(&self) -> u32 {
        self.turn_index
    }

    /// The seat allowed to move next.
    pub fn seat_to_move(&self) -> Seat {
        Seat::to_move(self.turn_index)
    }

    /// The player in `seat`, if seated.
    pub fn player(&self, seat: Seat) -> Option<&PlayerHandle> {
        match seat {
            Seat::White => Some(&self.white),
            Seat::Black => self.black.as_ref(),
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Returns `true` once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Registers the hook to run on destruction, replacing any earlier one.
    pub fn set_destroy_hook(&mut self, hook: DestroyHook) {
        self.on_destroy = Some(hook);
    }

    /// Seats `black` and starts the game.
    ///
    /// Counts a game played and an ongoing game, then tells White it
    /// moves first and Black that it doesn't.
    ///
    /// # Errors
    /// Returns [`SessionError::NotJoinable`] if the session isn't
    /// awaiting an opponent. Nothing changes in that case.
    pub fn join_second_player(
        &mut self,
        black: PlayerHandle,
    ) -> Result<(), SessionError> {
        if !self.status.is_joinable() {
            return Err(SessionError::NotJoinable {
                id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = self.status.transition(SessionStatus::InProgress)?;

        tracing::info!(
            session_id = %self.id,
            white = %self.white.id(),
            black = %black.id(),
            "game started"
        );
        self.black = Some(black);

        self.stats.increment(Counter::GamesPlayed);
        self.stats.increment(Counter::OngoingGames);

        self.send_to(Seat::White, ServerMessage::GameReady { your_turn: true });
        self.send_to(
            Seat::Black,
            ServerMessage::GameReady { your_turn: false },
        );
        Ok(())
    }

    /// Interprets a decoded frame from the player in `from`.
    ///
    /// Moves and chat are dispatched; anything else, including a
    /// payload of the wrong shape, is logged and ignored.
    pub fn handle_incoming_message(&mut self, envelope: Envelope, from: Seat) {
        match ClientCommand::from_envelope(envelope) {
            Ok(ClientCommand::Move(data)) => self.handle_move(data, from),
            Ok(ClientCommand::Chat(data)) => self.handle_chat(data, from),
            Ok(other) => {
                tracing::debug!(
                    session_id = %self.id,
                    seat = %from,
                    command = other.name(),
                    "command ignored"
                );
            }
            Err(e) => {
                tracing::debug!(
                    session_id = %self.id,
                    seat = %from,
                    error = %e,
                    "bad payload dropped"
                );
            }
        }
    }

    /// Applies a move by the player in `from`.
    ///
    /// The move is dropped silently unless the game is in progress, it
    /// is `from`'s turn, and the rules accept it. An accepted move is
    /// relayed verbatim to the opponent; then captures are counted and
    /// the game ends if the new position is terminal.
    pub fn handle_move(&mut self, data: MoveData, from: Seat) {
        if !self.status.is_active() {
            tracing::debug!(
                session_id = %self.id,
                status = %self.status,
                "move outside a running game"
            );
            return;
        }
        if from != self.seat_to_move() {
            tracing::debug!(
                session_id = %self.id,
                seat = %from,
                "move out of turn"
            );
            return;
        }
        let Some(applied) = self.rules.apply_move(&data.from, &data.to) else {
            tracing::debug!(
                session_id = %self.id,
                seat = %from,
                from = %data.from,
                to = %data.to,
                "illegal move"
            );
            return;
        };

        tracing::debug!(
            session_id = %self.id,
            seat = %from,
            san = %applied.san,
            "move played"
        );
        self.send_to(from.other(), ServerMessage::OpponentMove(data));
        self.turn_index += 1;

        if applied.is_capture() {
            self.stats.increment(Counter::PiecesCaptured);
        }

        if let Some(condition) = self.rules.terminal_condition() {
            self.finish(condition, from);
        }
    }

    /// Relays a chat line from `from` to the other seat.
    ///
    /// Ignored while awaiting an opponent and when the text is blank.
    pub fn handle_chat(&mut self, data: ChatData, from: Seat) {
        if self.status == SessionStatus::AwaitingOpponent {
            tracing::debug!(
                session_id = %self.id,
                "chat before the game started"
            );
            return;
        }
        if data.is_blank() {
            return;
        }
        self.send_to(from.other(), ServerMessage::Chat { text: data.text });
    }

    /// Handles the player in `seat` disconnecting.
    ///
    /// Mid-game, the remaining player wins by `opponent-quit`. In every
    /// status the session is destroyed.
    pub fn on_connection_closed(&mut self, seat: Seat) {
        if self.status.is_active() {
            tracing::info!(
                session_id = %self.id,
                seat = %seat,
                "player quit mid-game"
            );
            self.stats.decrement(Counter::OngoingGames);
            self.announce_game_over(
                GameOverReason::OpponentQuit,
                Some(seat.other()),
            );
        }
        self.destroy();
    }

    /// Marks the session Completed and runs the destroy hook.
    ///
    /// Idempotent: only the first call has an effect. Returns `true` if
    /// this call did the work.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        if !self.status.is_terminal() {
            self.set_status(SessionStatus::Completed);
        }
        tracing::debug!(
            session_id = %self.id,
            turns = self.turn_index,
            "session destroyed"
        );
        if let Some(hook) = self.on_destroy.take() {
            hook(&self.id);
        }
        true
    }

    /// Ends a running game on a rule outcome reached by `mover`'s move.
    fn finish(&mut self, condition: TerminalCondition, mover: Seat) {
        let reason = game_over_reason(condition);
        tracing::info!(
            session_id = %self.id,
            %reason,
            seat = %mover,
            "game over"
        );

        self.set_status(SessionStatus::Completed);
        self.stats.decrement(Counter::OngoingGames);

        let winner = condition.is_decisive().then_some(mover);
        self.announce_game_over(reason, winner);
        self.destroy();
    }

    /// Sends `game-over` to the seated players.
    ///
    /// With a winner, the winner hears `you` and the loser `opponent`,
    /// except that a player who quit is told nothing. Without one, both
    /// hear `draw`.
    fn announce_game_over(&self, reason: GameOverReason, winner: Option<Seat>) {
        match winner {
            Some(seat) => {
                self.send_to(
                    seat,
                    ServerMessage::GameOver {
                        reason,
                        winner: Winner::You,
                    },
                );
                if reason != GameOverReason::OpponentQuit {
                    self.send_to(
                        seat.other(),
                        ServerMessage::GameOver {
                            reason,
                            winner: Winner::Opponent,
                        },
                    );
                }
            }
            None => {
                for seat in Seat::BOTH {
                    self.send_to(
                        seat,
                        ServerMessage::GameOver {
                            reason,
                            winner: Winner::Draw,
                        },
                    );
                }
            }
        }
    }

    fn set_status(&mut self, target: SessionStatus) {
        match self.status.transition(target) {
            Ok(next) => self.status = next,
            Err(e) => tracing::warn!(
                session_id = %self.id,
                error = %e,
                "status unchanged"
            ),
        }
    }

    fn send_to(&self, seat: Seat, msg: ServerMessage) {
        if let Some(player) = self.player(seat) {
            player.send(msg);
        }
    }
}

impl<R: RulesEngine> std::fmt::Debug for Session<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("white", &self.white.id())
            .field("black", &self.black.as_ref().map(PlayerHandle::id))
            .field("turn_index", &self.turn_index)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

fn game_over_reason(condition: TerminalCondition) -> GameOverReason {
    match condition {
        TerminalCondition::Checkmate => GameOverReason::Checkmate,
        TerminalCondition::Stalemate => GameOverReason::Stalemate,
        TerminalCondition::InsufficientMaterial => {
            GameOverReason::InsufficientMaterial
        }
        TerminalCondition::FiftyMoveRule => GameOverReason::FiftyMoveRule,
        TerminalCondition::ThreefoldRepetition => {
            GameOverReason::ThreefoldRepetition
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
