//! Inbound and outbound event types.
//!
//! The transport layer parses client messages into [`InboundEvent`] values
//! and delivers every [`Outgoing`] notice the orchestrator returns. Keeping
//! both directions as closed enums means an unhandled event kind is a compile
//! error, not a silently dropped message.

use crate::state::rules::{Color, MoveDescriptor};
use crate::state::session::TerminationReason;
use crate::state::ParticipantId;

/// Events arriving from a participant's connection.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Request to be queued for an opponent
    FindGame,

    /// Move submission for a session
    Move {
        session_id: String,
        mv: MoveDescriptor,
    },

    /// Resign the current game
    Resign { session_id: String },

    /// Ask for a rematch after the game ended
    Rematch { session_id: String },

    /// Connection closed; raised by the transport, not the client
    Disconnect,
}

/// Events the orchestrator asks the transport to deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Waiting in the matchmaking queue
    QueueStatus { message: String },

    /// A session started; per-participant color plus initial position
    GameStart {
        session_id: String,
        color: Color,
        position: String,
    },

    /// The board changed; sent to both participants
    PositionUpdate { position: String, history: String },

    /// The submitted move was not accepted; sent only to the submitter
    MoveRejected { reason: String },

    /// The game ended
    GameOver { reason: TerminationReason },

    /// The opponent offered a rematch
    RematchOffered,

    /// Both sides agreed; fresh game with swapped colors
    RematchStart { color: Color, position: String },

    /// The opponent's connection ended
    OpponentLeft,
}

impl OutboundEvent {
    /// Wire event name, as the client protocol expects it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QueueStatus { .. } => "status",
            Self::GameStart { .. } => "gameStart",
            Self::PositionUpdate { .. } => "boardUpdate",
            Self::MoveRejected { .. } => "invalidMove",
            Self::GameOver { .. } => "gameOver",
            Self::RematchOffered => "rematchOffered",
            Self::RematchStart { .. } => "rematchStart",
            Self::OpponentLeft => "opponentDisconnected",
        }
    }

    /// JSON payload for the transport to send alongside the event name.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::QueueStatus { message } => serde_json::json!({
                "message": message
            }),
            Self::GameStart {
                session_id,
                color,
                position,
            } => serde_json::json!({
                "session_id": session_id,
                "color": color.as_str(),
                "position": position
            }),
            Self::PositionUpdate { position, history } => serde_json::json!({
                "position": position,
                "history": history
            }),
            Self::MoveRejected { reason } => serde_json::json!({
                "reason": reason
            }),
            Self::GameOver { reason } => serde_json::json!({
                "reason": reason.as_str(),
                "winner": reason.winner().map(|c| c.as_str()),
                "message": reason.outcome_text()
            }),
            Self::RematchOffered => serde_json::json!({}),
            Self::RematchStart { color, position } => serde_json::json!({
                "color": color.as_str(),
                "position": position
            }),
            Self::OpponentLeft => serde_json::json!({}),
        }
    }
}

/// An outbound event addressed to one participant.
///
/// A session-wide broadcast is simply one `Outgoing` per participant; the
/// orchestrator resolves membership so the transport never has to.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub to: ParticipantId,
    pub event: OutboundEvent,
}

impl Outgoing {
    pub fn new(to: ParticipantId, event: OutboundEvent) -> Self {
        Self { to, event }
    }
}
