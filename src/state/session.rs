//! Session state machine.
//!
//! A session pairs two participants around one board for one (possibly
//! rematched) game. The board handle is owned exclusively by the session and
//! mutated only through it; the orchestrator never touches a board directly.
//!
//! # State Diagram
//!
//! ```text
//!          submit_move (legal, non-terminal)
//!               ┌─────┐
//!               ▼     │
//!           ┌────────────┐  terminal move / resign / leave   ┌──────┐
//!           │   Active   │──────────────────────────────────▶│ Over │
//!           └────────────┘                                   └──┬───┘
//!               ▲                                               │
//!               └───────────────────────────────────────────────┘
//!                        both participants vote rematch
//!                        (board reset, colors swapped)
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::state::rules::{Color, MoveDescriptor, RulesEngine, TerminalKind};
use crate::state::ParticipantId;

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Game in progress, moves accepted
    #[default]
    Active,
    /// Game concluded, only rematch votes accepted
    Over,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Over => "over",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Why a session ended. Set exactly when status becomes `Over`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    Checkmate { winner: Color },
    Stalemate,
    Draw,
    Resignation { winner: Color },
    OpponentDisconnected { winner: Color },
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkmate { .. } => "checkmate",
            Self::Stalemate => "stalemate",
            Self::Draw => "draw",
            Self::Resignation { .. } => "resignation",
            Self::OpponentDisconnected { .. } => "opponent_disconnected",
        }
    }

    /// Winning color, if the outcome has one.
    pub fn winner(&self) -> Option<Color> {
        match self {
            Self::Checkmate { winner }
            | Self::Resignation { winner }
            | Self::OpponentDisconnected { winner } => Some(*winner),
            Self::Stalemate | Self::Draw => None,
        }
    }

    /// Human-readable outcome line for clients.
    pub fn outcome_text(&self) -> String {
        match self {
            Self::Checkmate { winner } => {
                format!("Checkmate! {} wins.", winner.display_name())
            }
            Self::Stalemate => "Stalemate! Draw.".to_string(),
            Self::Draw => "Draw.".to_string(),
            Self::Resignation { winner } => {
                format!("{} wins by resignation.", winner.display_name())
            }
            Self::OpponentDisconnected { winner } => {
                format!("{} wins. Opponent left the game.", winner.display_name())
            }
        }
    }

    pub fn from_terminal(kind: TerminalKind) -> Self {
        match kind {
            TerminalKind::Checkmate { winner } => Self::Checkmate { winner },
            TerminalKind::Stalemate => Self::Stalemate,
            TerminalKind::Draw => Self::Draw,
        }
    }
}

/// Why a move submission was not applied.
///
/// Everything except `SessionOver` is reported back to the submitter;
/// `SessionOver` marks a stale submission that is dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    SessionOver,
    NotParticipant,
    NotYourTurn,
    IllegalMove,
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionOver => write!(f, "The game is already over"),
            Self::NotParticipant => write!(f, "Not a participant in this game"),
            Self::NotYourTurn => write!(f, "It's not your turn"),
            Self::IllegalMove => write!(f, "Illegal move"),
        }
    }
}

impl std::error::Error for MoveRejection {}

/// Result of a successful move submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Serialized position after the move.
    pub position: String,

    /// Serialized move history after the move.
    pub history: String,

    /// Termination the move produced, if the position is terminal.
    pub terminated: Option<TerminationReason>,
}

/// Result of a rematch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RematchOutcome {
    /// Vote recorded; the opponent has not voted yet.
    Offered { opponent: ParticipantId },
    /// Both voted; the session has been reset with swapped colors.
    Restarted,
    /// Request ignored (session active, duplicate vote, unknown participant,
    /// or the opponent already left).
    Ignored,
}

/// One pairing of two participants around one board.
#[derive(Debug)]
pub struct Session<B> {
    id: String,
    white: ParticipantId,
    black: ParticipantId,
    board: B,
    status: SessionStatus,
    reason: Option<TerminationReason>,
    rematch_votes: HashSet<ParticipantId>,
    departed: HashSet<ParticipantId>,

    /// When the session was created
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// When the current game ended (cleared on rematch reset)
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl<B> Session<B> {
    /// Create a new active session. `white` has the first move.
    pub fn new(id: String, white: ParticipantId, black: ParticipantId, board: B) -> Self {
        Self {
            id,
            white,
            black,
            board,
            status: SessionStatus::Active,
            reason: None,
            rematch_votes: HashSet::new(),
            departed: HashSet::new(),
            created_at: chrono::Utc::now(),
            ended_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Reason the current game ended. `None` while active.
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.reason
    }

    /// Both participants, white first.
    pub fn participants(&self) -> [ParticipantId; 2] {
        [self.white, self.black]
    }

    pub fn has_participant(&self, participant: ParticipantId) -> bool {
        participant == self.white || participant == self.black
    }

    /// Color bound to a participant.
    pub fn color_of(&self, participant: ParticipantId) -> Option<Color> {
        if participant == self.white {
            Some(Color::White)
        } else if participant == self.black {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Participant bound to a color.
    pub fn participant_for(&self, color: Color) -> ParticipantId {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// The other participant.
    pub fn opponent_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        if participant == self.white {
            Some(self.black)
        } else if participant == self.black {
            Some(self.white)
        } else {
            None
        }
    }

    /// Check if a participant has left the session (disconnected or moved on
    /// to a new search).
    pub fn has_departed(&self, participant: ParticipantId) -> bool {
        self.departed.contains(&participant)
    }

    /// Check if both participants have left.
    pub fn is_abandoned(&self) -> bool {
        self.departed.contains(&self.white) && self.departed.contains(&self.black)
    }

    /// Count of recorded rematch votes.
    pub fn rematch_vote_count(&self) -> usize {
        self.rematch_votes.len()
    }

    /// Serialized current position.
    pub fn position<R>(&self, rules: &R) -> String
    where
        R: RulesEngine<Board = B>,
    {
        rules.position(&self.board)
    }

    /// Submit a move for `participant`.
    ///
    /// The move is applied only if the session is active, the participant's
    /// color is the side to move, and the rules engine accepts it. On any
    /// rejection the board and status are unchanged.
    pub fn submit_move<R>(
        &mut self,
        rules: &R,
        participant: ParticipantId,
        mv: &MoveDescriptor,
    ) -> Result<MoveOutcome, MoveRejection>
    where
        R: RulesEngine<Board = B>,
    {
        if self.status != SessionStatus::Active {
            return Err(MoveRejection::SessionOver);
        }

        let color = self
            .color_of(participant)
            .ok_or(MoveRejection::NotParticipant)?;

        if rules.side_to_move(&self.board) != color {
            return Err(MoveRejection::NotYourTurn);
        }

        if !rules.try_apply(&mut self.board, mv) {
            return Err(MoveRejection::IllegalMove);
        }

        let terminated = rules.terminal(&self.board).map(TerminationReason::from_terminal);
        if let Some(reason) = terminated {
            self.finish(reason);
        }

        Ok(MoveOutcome {
            position: rules.position(&self.board),
            history: rules.history(&self.board),
            terminated,
        })
    }

    /// Resign the game. The opponent wins.
    ///
    /// Returns `None` (no state change) if the session is not active or the
    /// participant is not part of it.
    pub fn resign(&mut self, participant: ParticipantId) -> Option<TerminationReason> {
        if self.status != SessionStatus::Active {
            return None;
        }

        let color = self.color_of(participant)?;
        let reason = TerminationReason::Resignation {
            winner: color.opposite(),
        };
        self.finish(reason);
        Some(reason)
    }

    /// Record that a participant left the session, either because their
    /// connection closed or because a new game search superseded it.
    ///
    /// Ends the game in the opponent's favor if it was still running; in that
    /// case the termination reason is returned so the survivor can be
    /// notified.
    pub fn leave(&mut self, participant: ParticipantId) -> Option<TerminationReason> {
        if !self.has_participant(participant) {
            return None;
        }

        self.departed.insert(participant);
        // A vote from a gone peer can never complete a rematch
        self.rematch_votes.remove(&participant);

        if self.status == SessionStatus::Active {
            let winner = self.color_of(participant)?.opposite();
            let reason = TerminationReason::OpponentDisconnected { winner };
            self.finish(reason);
            return Some(reason);
        }

        None
    }

    /// Record a rematch vote.
    ///
    /// When both participants have voted the session resets in place: fresh
    /// board, swapped colors, status back to active. Votes while the game is
    /// still running are ignored.
    pub fn request_rematch<R>(&mut self, rules: &R, participant: ParticipantId) -> RematchOutcome
    where
        R: RulesEngine<Board = B>,
    {
        if self.status != SessionStatus::Over {
            return RematchOutcome::Ignored;
        }
        if self.departed.contains(&participant) {
            return RematchOutcome::Ignored;
        }

        let opponent = match self.opponent_of(participant) {
            Some(opponent) => opponent,
            None => return RematchOutcome::Ignored,
        };
        if self.departed.contains(&opponent) {
            return RematchOutcome::Ignored;
        }

        if !self.rematch_votes.insert(participant) {
            return RematchOutcome::Ignored;
        }

        if self.rematch_votes.contains(&opponent) {
            self.reset_for_rematch(rules);
            RematchOutcome::Restarted
        } else {
            RematchOutcome::Offered { opponent }
        }
    }

    fn finish(&mut self, reason: TerminationReason) {
        self.status = SessionStatus::Over;
        self.reason = Some(reason);
        self.ended_at = Some(chrono::Utc::now());
    }

    fn reset_for_rematch<R>(&mut self, rules: &R)
    where
        R: RulesEngine<Board = B>,
    {
        std::mem::swap(&mut self.white, &mut self.black);
        rules.reset(&mut self.board);
        self.status = SessionStatus::Active;
        self.reason = None;
        self.rematch_votes.clear();
        self.ended_at = None;
    }

    /// Convert session state to a JSON snapshot (board serialization is the
    /// rules engine's job and not included here).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "session_id": self.id,
            "status": self.status.as_str(),
            "white": self.white,
            "black": self.black,
            "reason": self.reason.map(|r| r.as_str()),
            "rematch_votes": self.rematch_votes.len(),
            "created_at": self.created_at,
            "ended_at": self.ended_at
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::rules::scripted::{ScriptedBoard, ScriptedRules};

    const ALICE: ParticipantId = 1;
    const BOB: ParticipantId = 2;

    fn make_session() -> Session<ScriptedBoard> {
        Session::new("game-0".to_string(), ALICE, BOB, ScriptedBoard::default())
    }

    fn mv(from: &str, to: &str) -> MoveDescriptor {
        MoveDescriptor::parse(from, to, None).unwrap()
    }

    #[test]
    fn test_new_session() {
        let session = make_session();

        assert!(session.is_active());
        assert_eq!(session.termination_reason(), None);
        assert_eq!(session.color_of(ALICE), Some(Color::White));
        assert_eq!(session.color_of(BOB), Some(Color::Black));
        assert_eq!(session.color_of(99), None);
        assert_eq!(session.opponent_of(ALICE), Some(BOB));
        assert_eq!(session.participants(), [ALICE, BOB]);
    }

    #[test]
    fn test_legal_move_alternates_turns() {
        let rules = ScriptedRules;
        let mut session = make_session();

        let outcome = session.submit_move(&rules, ALICE, &mv("e2", "e4")).unwrap();
        assert_eq!(outcome.terminated, None);
        assert_eq!(outcome.history, "e2e4");
        assert!(session.is_active());

        let outcome = session.submit_move(&rules, BOB, &mv("e7", "e5")).unwrap();
        assert_eq!(outcome.history, "e2e4 e7e5");
    }

    #[test]
    fn test_wrong_turn_rejected_without_state_change() {
        let rules = ScriptedRules;
        let mut session = make_session();
        let before = session.position(&rules);

        // Black tries to move first
        let err = session.submit_move(&rules, BOB, &mv("e7", "e5")).unwrap_err();
        assert_eq!(err, MoveRejection::NotYourTurn);
        assert_eq!(session.position(&rules), before);
        assert!(session.is_active());
    }

    #[test]
    fn test_illegal_move_rejected() {
        let rules = ScriptedRules;
        let mut session = make_session();

        let err = session.submit_move(&rules, ALICE, &mv("e2", "e2")).unwrap_err();
        assert_eq!(err, MoveRejection::IllegalMove);
        assert!(session.is_active());
    }

    #[test]
    fn test_outsider_rejected() {
        let rules = ScriptedRules;
        let mut session = make_session();

        let err = session.submit_move(&rules, 99, &mv("e2", "e4")).unwrap_err();
        assert_eq!(err, MoveRejection::NotParticipant);
    }

    #[test]
    fn test_terminal_move_ends_session() {
        let rules = ScriptedRules;
        let mut session = make_session();

        let outcome = session.submit_move(&rules, ALICE, &mv("h7", "h8")).unwrap();
        assert_eq!(
            outcome.terminated,
            Some(TerminationReason::Checkmate {
                winner: Color::White
            })
        );
        assert!(!session.is_active());
        assert_eq!(
            session.termination_reason(),
            Some(TerminationReason::Checkmate {
                winner: Color::White
            })
        );
        assert!(session.ended_at.is_some());

        // Late move is dropped silently, never Over -> Over via move
        let err = session.submit_move(&rules, BOB, &mv("e7", "e5")).unwrap_err();
        assert_eq!(err, MoveRejection::SessionOver);
    }

    #[test]
    fn test_stalemate_ends_session_without_winner() {
        let rules = ScriptedRules;
        let mut session = make_session();

        let outcome = session.submit_move(&rules, ALICE, &mv("a7", "a8")).unwrap();
        assert_eq!(outcome.terminated, Some(TerminationReason::Stalemate));
        assert!(!session.is_active());
        assert_eq!(session.termination_reason(), Some(TerminationReason::Stalemate));
        assert_eq!(TerminationReason::Stalemate.winner(), None);
    }

    #[test]
    fn test_resign() {
        let mut session = make_session();

        let reason = session.resign(BOB).unwrap();
        assert_eq!(
            reason,
            TerminationReason::Resignation {
                winner: Color::White
            }
        );
        assert!(!session.is_active());

        // Resigning a finished game does nothing
        assert_eq!(session.resign(ALICE), None);
    }

    #[test]
    fn test_leave_active_session() {
        let mut session = make_session();

        let reason = session.leave(ALICE).unwrap();
        assert_eq!(
            reason,
            TerminationReason::OpponentDisconnected {
                winner: Color::Black
            }
        );
        assert!(!session.is_active());
        assert!(session.has_departed(ALICE));
        assert!(!session.is_abandoned());

        // Second leave reports nothing new
        assert_eq!(session.leave(BOB), None);
        assert!(session.is_abandoned());
    }

    #[test]
    fn test_leave_unknown_participant_ignored() {
        let mut session = make_session();
        assert_eq!(session.leave(99), None);
        assert!(session.is_active());
    }

    #[test]
    fn test_rematch_while_active_ignored() {
        let rules = ScriptedRules;
        let mut session = make_session();

        assert_eq!(
            session.request_rematch(&rules, ALICE),
            RematchOutcome::Ignored
        );
        assert_eq!(session.rematch_vote_count(), 0);
    }

    #[test]
    fn test_rematch_offer_then_restart() {
        let rules = ScriptedRules;
        let mut session = make_session();
        session.submit_move(&rules, ALICE, &mv("h7", "h8")).unwrap();

        assert_eq!(
            session.request_rematch(&rules, ALICE),
            RematchOutcome::Offered { opponent: BOB }
        );
        assert!(!session.is_active());

        // Duplicate vote ignored
        assert_eq!(
            session.request_rematch(&rules, ALICE),
            RematchOutcome::Ignored
        );

        assert_eq!(
            session.request_rematch(&rules, BOB),
            RematchOutcome::Restarted
        );
        assert!(session.is_active());
        assert_eq!(session.termination_reason(), None);
        assert_eq!(session.rematch_vote_count(), 0);
        assert_eq!(session.ended_at, None);

        // Colors swapped, board back to the initial position
        assert_eq!(session.color_of(ALICE), Some(Color::Black));
        assert_eq!(session.color_of(BOB), Some(Color::White));
        assert_eq!(session.position(&rules), rules.position(&rules.new_game()));

        // Bob now has the first move
        assert!(session.submit_move(&rules, ALICE, &mv("e2", "e4")).is_err());
        assert!(session.submit_move(&rules, BOB, &mv("e2", "e4")).is_ok());
    }

    #[test]
    fn test_rematch_with_departed_opponent_ignored() {
        let rules = ScriptedRules;
        let mut session = make_session();
        session.leave(ALICE);

        assert_eq!(
            session.request_rematch(&rules, BOB),
            RematchOutcome::Ignored
        );
        assert_eq!(session.rematch_vote_count(), 0);
    }

    #[test]
    fn test_outcome_text() {
        assert_eq!(
            TerminationReason::Checkmate {
                winner: Color::White
            }
            .outcome_text(),
            "Checkmate! White wins."
        );
        assert_eq!(TerminationReason::Stalemate.outcome_text(), "Stalemate! Draw.");
        assert_eq!(
            TerminationReason::Resignation {
                winner: Color::Black
            }
            .outcome_text(),
            "Black wins by resignation."
        );
    }

    #[test]
    fn test_to_json_snapshot() {
        use pretty_assertions::assert_eq;

        let mut session = make_session();
        session.resign(ALICE);

        let json = session.to_json();
        assert_eq!(json["session_id"], "game-0");
        assert_eq!(json["status"], "over");
        assert_eq!(json["reason"], "resignation");
        assert_eq!(json["white"], ALICE);
        assert_eq!(json["black"], BOB);
    }
}
