//! Core protocol types for Gambit's wire format.
//!
//! Inbound frames are decoded in two steps: first into an [`Envelope`]
//! (any command name, opaque `data`), then into a [`ClientCommand`].
//! Splitting the steps keeps "not JSON at all" apart from "a command we
//! don't know", which are logged differently and must never be fatal.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level frame: `{ "command": "move", "data": { ... } }`.
///
/// `data` stays an untyped JSON value here; it only gets a shape once the
/// command is known. A missing `data` (as sent with `start-game`)
/// decodes to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The command name, e.g. `"move"` or `"chat"`.
    pub command: String,

    /// The command's payload.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Envelope {
    /// Builds an envelope from a command name and payload.
    pub fn new(command: impl Into<String>, data: Value) -> Self {
        Self {
            command: command.into(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A move between two squares in algebraic notation (`"e2"` → `"e4"`).
///
/// Used both inbound (`move`) and outbound (`opponent-move`). Extra
/// fields a client sends along, such as a promotion choice, are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub from: String,
    pub to: String,
}

impl MoveData {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatData {
    pub text: String,
}

impl ChatData {
    /// Returns `true` if the text is empty once every whitespace
    /// character is removed. Blank chat lines are never relayed.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

// ---------------------------------------------------------------------------
// ClientCommand: what a client can ask for
// ---------------------------------------------------------------------------

/// A decoded client → server command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// `start-game`: pair me with an opponent. Carries no data.
    StartGame,
    /// `move`: move a piece.
    Move(MoveData),
    /// `chat`: send a line of text to the opponent.
    Chat(ChatData),
    /// Any command name the server doesn't know. Kept instead of
    /// rejected so callers can log and ignore it.
    Unknown(String),
}

impl ClientCommand {
    /// Interprets an envelope as a client command.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidData`] if the command is known but
    /// its `data` has the wrong shape.
    pub fn from_envelope(envelope: Envelope) -> Result<Self, ProtocolError> {
        let Envelope { command, data } = envelope;
        match command.as_str() {
            "start-game" => Ok(Self::StartGame),
            "move" => payload(&command, data).map(Self::Move),
            "chat" => payload(&command, data).map(Self::Chat),
            _ => Ok(Self::Unknown(command)),
        }
    }

    /// The wire name of this command.
    pub fn name(&self) -> &str {
        match self {
            Self::StartGame => "start-game",
            Self::Move(_) => "move",
            Self::Chat(_) => "chat",
            Self::Unknown(name) => name,
        }
    }
}

impl TryFrom<Envelope> for ClientCommand {
    type Error = ProtocolError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        Self::from_envelope(envelope)
    }
}

fn payload<T: serde::de::DeserializeOwned>(
    command: &str,
    data: Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|source| ProtocolError::InvalidData {
        command: command.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Game over: reason and winner
// ---------------------------------------------------------------------------

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    #[serde(rename = "50-move-rule")]
    FiftyMoveRule,
    ThreefoldRepetition,
    OpponentQuit,
}

impl GameOverReason {
    /// The wire name of this reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::InsufficientMaterial => "insufficient-material",
            Self::FiftyMoveRule => "50-move-rule",
            Self::ThreefoldRepetition => "threefold-repetition",
            Self::OpponentQuit => "opponent-quit",
        }
    }
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome from the receiving player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Draw,
    You,
    Opponent,
}

// ---------------------------------------------------------------------------
// ServerMessage: what the server sends
// ---------------------------------------------------------------------------

/// A server → client message.
///
/// `#[serde(tag = "command", content = "data")]` makes each variant
/// serialize as a full envelope:
///   `{ "command": "game-ready", "data": { "yourTurn": true } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Both players are seated; tells each whether they move first.
    GameReady {
        #[serde(rename = "yourTurn")]
        your_turn: bool,
    },

    /// The opponent made a (validated) move.
    OpponentMove(MoveData),

    /// The game is over.
    GameOver {
        reason: GameOverReason,
        winner: Winner,
    },

    /// A chat line from the opponent.
    Chat { text: String },
}

impl ServerMessage {
    /// The wire name of this message's command.
    pub fn command(&self) -> &'static str {
        match self {
            Self::GameReady { .. } => "game-ready",
            Self::OpponentMove(_) => "opponent-move",
            Self::GameOver { .. } => "game-over",
            Self::Chat { .. } => "chat",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client matches on exact JSON shapes, so these tests pin
    //! the serialized form rather than round-tripping.

    use serde_json::json;

    use super::*;

    fn envelope(raw: &str) -> Envelope {
        serde_json::from_str(raw).unwrap()
    }

    fn parse(raw: &str) -> Result<ClientCommand, ProtocolError> {
        ClientCommand::from_envelope(envelope(raw))
    }

    fn to_json(msg: ServerMessage) -> Value {
        serde_json::to_value(msg).unwrap()
    }

    // =====================================================================
    // Envelope / ClientCommand
    // =====================================================================

    #[test]
    fn test_envelope_without_data_decodes_to_null() {
        let env = envelope(r#"{"command":"start-game"}"#);
        assert_eq!(env.command, "start-game");
        assert!(env.data.is_null());
    }

    #[test]
    fn test_client_command_start_game() {
        let cmd = parse(r#"{"command":"start-game"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::StartGame);
    }

    #[test]
    fn test_client_command_move_ignores_promotion_field() {
        let cmd = parse(
            r#"{"command":"move","data":{"from":"a7","to":"a8","promotion":"n"}}"#,
        )
        .unwrap();
        assert_eq!(cmd, ClientCommand::Move(MoveData::new("a7", "a8")));
    }

    #[test]
    fn test_client_command_move_missing_square_is_invalid_data() {
        let result = parse(r#"{"command":"move","data":{"from":"e2"}}"#);
        match result {
            Err(ProtocolError::InvalidData { command, .. }) => {
                assert_eq!(command, "move")
            }
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn test_client_command_chat_with_non_string_text_is_invalid_data() {
        let result = parse(r#"{"command":"chat","data":{"text":42}}"#);
        assert!(matches!(result, Err(ProtocolError::InvalidData { .. })));
    }

    #[test]
    fn test_client_command_unknown_is_kept() {
        let raw = r#"{"command":"resign","data":{}}"#;
        let cmd = ClientCommand::try_from(envelope(raw)).unwrap();
        assert_eq!(cmd, ClientCommand::Unknown("resign".into()));
        assert_eq!(cmd.name(), "resign");
    }

    #[test]
    fn test_chat_data_is_blank() {
        assert!(ChatData { text: String::new() }.is_blank());
        assert!(ChatData { text: " \t\n ".into() }.is_blank());
        assert!(!ChatData { text: "  gg ".into() }.is_blank());
    }

    // =====================================================================
    // ServerMessage JSON shapes
    // =====================================================================

    #[test]
    fn test_server_message_game_ready_json_format() {
        assert_eq!(
            to_json(ServerMessage::GameReady { your_turn: true }),
            json!({ "command": "game-ready", "data": { "yourTurn": true } })
        );
    }

    #[test]
    fn test_server_message_opponent_move_json_format() {
        let msg = ServerMessage::OpponentMove(MoveData::new("e2", "e4"));
        assert_eq!(
            to_json(msg),
            json!({
                "command": "opponent-move",
                "data": { "from": "e2", "to": "e4" }
            })
        );
    }

    #[test]
    fn test_server_message_game_over_json_format() {
        let json = to_json(ServerMessage::GameOver {
            reason: GameOverReason::FiftyMoveRule,
            winner: Winner::Draw,
        });
        assert_eq!(
            json,
            json!({
                "command": "game-over",
                "data": { "reason": "50-move-rule", "winner": "draw" }
            })
        );
    }

    #[test]
    fn test_server_message_chat_json_format() {
        assert_eq!(
            to_json(ServerMessage::Chat { text: "gg".into() }),
            json!({ "command": "chat", "data": { "text": "gg" } })
        );
    }

    #[test]
    fn test_server_message_command_matches_serialized_tag() {
        let messages = [
            ServerMessage::GameReady { your_turn: false },
            ServerMessage::OpponentMove(MoveData::new("g1", "f3")),
            ServerMessage::GameOver {
                reason: GameOverReason::OpponentQuit,
                winner: Winner::You,
            },
            ServerMessage::Chat { text: "hi".into() },
        ];
        for msg in messages {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["command"], msg.command());
        }
    }

    #[test]
    fn test_game_over_reason_wire_names_match_display() {
        let reasons = [
            GameOverReason::Checkmate,
            GameOverReason::Stalemate,
            GameOverReason::InsufficientMaterial,
            GameOverReason::FiftyMoveRule,
            GameOverReason::ThreefoldRepetition,
            GameOverReason::OpponentQuit,
        ];
        for reason in reasons {
            let json = serde_json::to_value(reason).unwrap();
            assert_eq!(json, reason.to_string());
        }
    }
}
