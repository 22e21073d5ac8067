//! Rules engine adapter seam.
//!
//! The orchestrator never decides move legality itself. Everything about the
//! game rules (whose turn it is, whether a move is legal, whether a position
//! is terminal) goes through the [`RulesEngine`] trait, implemented by an
//! adapter around the real rules library. This crate only ships the seam and
//! the state machinery around it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side colors.
///
/// The wire format (`"w"` / `"b"`) matches the client protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::White => "w",
            Self::Black => "b",
        }
    }

    /// Display name used in outcome messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
        }
    }

    pub fn opposite(&self) -> Color {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal position categories reported by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    /// The side that delivered mate wins.
    Checkmate { winner: Color },
    Stalemate,
    /// Any other draw by rule (insufficient material, repetition, fifty-move).
    Draw,
}

/// A move as submitted by a participant: source and destination squares plus
/// an optional promotion piece.
///
/// Validated at the boundary so the rules engine only ever sees well-formed
/// squares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    /// Source square, e.g. "e2".
    pub from: String,

    /// Destination square, e.g. "e4".
    pub to: String,

    /// Promotion piece, one of `q`, `r`, `b`, `n`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
}

impl MoveDescriptor {
    /// Build a validated move descriptor.
    pub fn parse(from: &str, to: &str, promotion: Option<char>) -> Result<Self, MoveParseError> {
        let mv = Self {
            from: from.to_string(),
            to: to.to_string(),
            promotion,
        };
        mv.validate()?;
        Ok(mv)
    }

    /// Check square and promotion syntax. Called after deserializing from the
    /// transport as well.
    pub fn validate(&self) -> Result<(), MoveParseError> {
        if !Self::is_square(&self.from) {
            return Err(MoveParseError::BadSquare(self.from.clone()));
        }
        if !Self::is_square(&self.to) {
            return Err(MoveParseError::BadSquare(self.to.clone()));
        }
        if let Some(p) = self.promotion {
            if !matches!(p, 'q' | 'r' | 'b' | 'n') {
                return Err(MoveParseError::BadPromotion(p));
            }
        }
        Ok(())
    }

    fn is_square(s: &str) -> bool {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => {
                ('a'..='h').contains(&file) && ('1'..='8').contains(&rank)
            }
            _ => false,
        }
    }
}

impl fmt::Display for MoveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}

/// Malformed move descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    BadSquare(String),
    BadPromotion(char),
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadSquare(s) => write!(f, "Not a board square: {:?}", s),
            Self::BadPromotion(p) => write!(f, "Not a promotion piece: {:?}", p),
        }
    }
}

impl std::error::Error for MoveParseError {}

/// Adapter over the external rules oracle.
///
/// `Board` is an opaque handle; only the owning [`Session`](crate::state::Session)
/// mutates it.
pub trait RulesEngine {
    type Board;

    /// Fresh board at the initial position.
    fn new_game(&self) -> Self::Board;

    /// Which color moves next.
    fn side_to_move(&self, board: &Self::Board) -> Color;

    /// Apply `mv` if it is legal. Returns `false` (board untouched) otherwise.
    fn try_apply(&self, board: &mut Self::Board, mv: &MoveDescriptor) -> bool;

    /// Terminal category for the current position, if the game is over.
    fn terminal(&self, board: &Self::Board) -> Option<TerminalKind>;

    /// Serialized position for clients (FEN in the chess adapter).
    fn position(&self, board: &Self::Board) -> String;

    /// Serialized move history for clients.
    fn history(&self, board: &Self::Board) -> String;

    /// Put the board back to the initial position.
    fn reset(&self, board: &mut Self::Board);
}

#[cfg(test)]
pub(crate) mod scripted {
    //! Minimal scripted rules engine for state-machine tests.
    //!
    //! Not a chess implementation. Conventions:
    //! - sides alternate, White first
    //! - a move with `from == to` is illegal
    //! - a move to `h8` is checkmate by the mover
    //! - a move to `a8` is stalemate

    use super::*;

    #[derive(Debug, Default)]
    pub struct ScriptedRules;

    #[derive(Debug, Clone, Default)]
    pub struct ScriptedBoard {
        pub moves: Vec<String>,
        pub terminal: Option<TerminalKind>,
    }

    impl RulesEngine for ScriptedRules {
        type Board = ScriptedBoard;

        fn new_game(&self) -> ScriptedBoard {
            ScriptedBoard::default()
        }

        fn side_to_move(&self, board: &ScriptedBoard) -> Color {
            if board.moves.len() % 2 == 0 {
                Color::White
            } else {
                Color::Black
            }
        }

        fn try_apply(&self, board: &mut ScriptedBoard, mv: &MoveDescriptor) -> bool {
            if mv.from == mv.to {
                return false;
            }
            let mover = self.side_to_move(board);
            board.moves.push(mv.to_string());
            board.terminal = match mv.to.as_str() {
                "h8" => Some(TerminalKind::Checkmate { winner: mover }),
                "a8" => Some(TerminalKind::Stalemate),
                _ => None,
            };
            true
        }

        fn terminal(&self, board: &ScriptedBoard) -> Option<TerminalKind> {
            board.terminal
        }

        fn position(&self, board: &ScriptedBoard) -> String {
            format!("pos-{}-{}", board.moves.len(), self.side_to_move(board))
        }

        fn history(&self, board: &ScriptedBoard) -> String {
            board.moves.join(" ")
        }

        fn reset(&self, board: &mut ScriptedBoard) {
            board.moves.clear();
            board.terminal = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::{ScriptedBoard, ScriptedRules};
    use super::*;

    #[test]
    fn test_color_basics() {
        assert_eq!(Color::White.as_str(), "w");
        assert_eq!(Color::Black.as_str(), "b");
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Black.opposite(), Color::White);
    }

    #[test]
    fn test_move_descriptor_valid() {
        let mv = MoveDescriptor::parse("e2", "e4", None).unwrap();
        assert_eq!(mv.to_string(), "e2e4");

        let mv = MoveDescriptor::parse("e7", "e8", Some('q')).unwrap();
        assert_eq!(mv.to_string(), "e7e8q");
    }

    #[test]
    fn test_move_descriptor_bad_square() {
        assert!(matches!(
            MoveDescriptor::parse("e9", "e4", None),
            Err(MoveParseError::BadSquare(_))
        ));
        assert!(matches!(
            MoveDescriptor::parse("e2", "i4", None),
            Err(MoveParseError::BadSquare(_))
        ));
        assert!(matches!(
            MoveDescriptor::parse("e22", "e4", None),
            Err(MoveParseError::BadSquare(_))
        ));
        assert!(matches!(
            MoveDescriptor::parse("", "e4", None),
            Err(MoveParseError::BadSquare(_))
        ));
    }

    #[test]
    fn test_move_descriptor_bad_promotion() {
        assert!(matches!(
            MoveDescriptor::parse("e7", "e8", Some('k')),
            Err(MoveParseError::BadPromotion('k'))
        ));
    }

    #[test]
    fn test_move_descriptor_json_round_trip() {
        let mv = MoveDescriptor::parse("g7", "g8", Some('n')).unwrap();
        let json = serde_json::to_string(&mv).unwrap();
        let back: MoveDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mv);
        back.validate().unwrap();
    }

    #[test]
    fn test_scripted_rules_alternate_sides() {
        let rules = ScriptedRules;
        let mut board = rules.new_game();

        assert_eq!(rules.side_to_move(&board), Color::White);
        assert!(rules.try_apply(&mut board, &MoveDescriptor::parse("e2", "e4", None).unwrap()));
        assert_eq!(rules.side_to_move(&board), Color::Black);
        assert!(rules.terminal(&board).is_none());
    }

    #[test]
    fn test_scripted_rules_terminal_and_reset() {
        let rules = ScriptedRules;
        let mut board = ScriptedBoard::default();

        assert!(rules.try_apply(&mut board, &MoveDescriptor::parse("h7", "h8", None).unwrap()));
        assert_eq!(
            rules.terminal(&board),
            Some(TerminalKind::Checkmate {
                winner: Color::White
            })
        );

        rules.reset(&mut board);
        assert!(rules.terminal(&board).is_none());
        assert_eq!(rules.history(&board), "");
    }
}
