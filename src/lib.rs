//! Gambit Session Orchestrator
//!
//! This crate provides the session orchestration state for the Gambit chess
//! server: matchmaking, per-session turn enforcement, and the
//! disconnect/rematch protocol.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Matchmaking Queue** - FIFO pairing of participants waiting for an
//!   opponent.
//!
//! - **Session State Machine** - Two participants bound to opposite colors
//!   around one board, with `Active`/`Over` lifecycle, turn ownership, and
//!   rematch renegotiation.
//!
//! - **Session Registry** - Indexed lookup of sessions by id and by
//!   participant, consistent at every transition.
//!
//! - **Orchestrator** - The façade turning inbound events into the outbound
//!   notices the transport must deliver.
//!
//! # Design Principles
//!
//! 1. **Rules stay external** - Move legality and terminal-state detection go
//!    through the [`state::RulesEngine`] trait; this crate never inspects a
//!    board itself.
//!
//! 2. **Closed event sets** - Inbound and outbound events are exhaustively
//!    matched enums, so an unhandled event kind fails at compile time.
//!
//! 3. **No networking** - This crate is pure state, no WebSocket or HTTP. The
//!    transport layer feeds events in and delivers notices out.
//!
//! 4. **Nothing here is fatal** - Out-of-context events are dropped (and
//!    logged); rule violations only ever bounce back to the submitter.
//!
//! # Example
//!
//! ```rust
//! use gambit_state::state::{
//!     Color, InboundEvent, MoveDescriptor, Orchestrator, OutboundEvent, RulesEngine,
//!     TerminalKind,
//! };
//!
//! // A toy rules engine; the real server plugs in an adapter around the
//! // actual chess library.
//! struct AlwaysLegal;
//!
//! impl RulesEngine for AlwaysLegal {
//!     type Board = Vec<String>;
//!
//!     fn new_game(&self) -> Vec<String> {
//!         Vec::new()
//!     }
//!     fn side_to_move(&self, board: &Vec<String>) -> Color {
//!         if board.len() % 2 == 0 { Color::White } else { Color::Black }
//!     }
//!     fn try_apply(&self, board: &mut Vec<String>, mv: &MoveDescriptor) -> bool {
//!         board.push(mv.to_string());
//!         true
//!     }
//!     fn terminal(&self, _board: &Vec<String>) -> Option<TerminalKind> {
//!         None
//!     }
//!     fn position(&self, board: &Vec<String>) -> String {
//!         format!("after {} plies", board.len())
//!     }
//!     fn history(&self, board: &Vec<String>) -> String {
//!         board.join(" ")
//!     }
//!     fn reset(&self, board: &mut Vec<String>) {
//!         board.clear();
//!     }
//! }
//!
//! let mut orchestrator = Orchestrator::new(AlwaysLegal);
//!
//! // Two participants search; the second enqueue forms the pairing
//! orchestrator.handle(1, InboundEvent::FindGame);
//! let notices = orchestrator.handle(2, InboundEvent::FindGame);
//! assert!(matches!(notices[0].event, OutboundEvent::GameStart { .. }));
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
