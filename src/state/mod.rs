//! State management module for the Gambit session orchestrator.
//!
//! This module provides the core state types and managers:
//!
//! - `rules` - Rules engine adapter seam (legality and terminal-state oracle)
//! - `queue` - FIFO matchmaking queue
//! - `session` - Per-session state machine (turns, termination, rematch)
//! - `registry` - Session lookup by id and by participant
//! - `event` - Closed inbound/outbound event enums
//! - `orchestrator` - Event dispatch façade
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Orchestrator                              │
//! │                                                                  │
//! │  ┌───────────────┐   ┌─────────────────────────────────────┐    │
//! │  │  MatchQueue   │   │          SessionRegistry            │    │
//! │  │               │   │                                     │    │
//! │  │ waiting       │   │ session_id  → Session               │    │
//! │  │ participants  │   │ participant → session_id            │    │
//! │  │ (FIFO)        │   │                                     │    │
//! │  └───────────────┘   │  ┌───────────────────────────────┐  │    │
//! │                      │  │ Session                       │  │    │
//! │                      │  │   Active ──▶ Over ──▶ Active  │  │    │
//! │                      │  │   board (via RulesEngine)     │  │    │
//! │                      │  └───────────────────────────────┘  │    │
//! │                      └─────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//!           ▲                                        │
//!   InboundEvent (transport)                Vec<Outgoing> (transport)
//! ```
//!
//! Everything here is synchronous single-owner state: each inbound event runs
//! to completion under `&mut self`, so per-session transitions are serialized
//! by construction. A multi-threaded embedding wraps the orchestrator in its
//! own lock or actor.

pub mod event;
pub mod orchestrator;
pub mod queue;
pub mod registry;
pub mod rules;
pub mod session;

/// Opaque per-connection identifier, assigned by the transport layer.
///
/// Participants are transient: the id exists only while the connection does,
/// and is referenced (never owned) by the queue, sessions and registry.
pub type ParticipantId = i64;

// Re-export commonly used types
pub use event::{InboundEvent, OutboundEvent, Outgoing};
pub use orchestrator::Orchestrator;
pub use queue::MatchQueue;
pub use registry::SessionRegistry;
pub use rules::{Color, MoveDescriptor, MoveParseError, RulesEngine, TerminalKind};
pub use session::{
    MoveOutcome, MoveRejection, RematchOutcome, Session, SessionStatus, TerminationReason,
};
