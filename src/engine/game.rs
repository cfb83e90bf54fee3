//! Stateful game controller wrapping Position.
//!
//! `Game` owns the current position, the move history with SAN records, and
//! the repetition-key list used for threefold detection. Terminal-state
//! evaluation is stateless given the position and that history.

use tracing::debug;

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::san;
use crate::engine::types::{Color, EngineError, GameState, Move};
use crate::engine::zobrist;

// =========================================================================
// MoveRecord
// =========================================================================

/// A recorded move in the game history.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    /// The move that was played.
    pub mv: Move,
    /// SAN for the move, computed in the position it was played from.
    pub san: String,
}

// =========================================================================
// Game
// =========================================================================

/// A game in progress: current position plus the history needed for
/// repetition and clock-based draws.
pub struct Game {
    position: Position,
    /// Repetition key of every position reached, the initial one included.
    keys: Vec<u64>,
    records: Vec<MoveRecord>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    /// A fresh game from the standard starting position.
    pub fn new() -> Self {
        Game::from_position(Position::start())
    }

    /// A game starting from a parsed position string.
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        Ok(Game::from_position(Position::from_fen(fen)?))
    }

    pub fn from_position(position: Position) -> Self {
        let key = zobrist::repetition_key(&position);
        Game {
            position,
            keys: vec![key],
            records: Vec::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(&self.position)
    }

    /// Validate and play a move. The move must match a generated legal move
    /// (scores on the flags are ignored for matching).
    pub fn make_move(&mut self, mv: Move) -> Result<&MoveRecord, EngineError> {
        let legal = movegen::legal_moves(&self.position);
        let Some(&matched) = legal.iter().find(|m| m.same_move(mv)) else {
            return Err(EngineError::IllegalMove(mv.to_coordinate()));
        };

        let san = san::to_san_with(&self.position, matched, &legal);
        debug!(mv = %matched, san = %san, "playing move");

        self.position = self.position.successor(matched);
        self.keys.push(zobrist::repetition_key(&self.position));
        self.records.push(MoveRecord { mv: matched, san });
        Ok(self.records.last().unwrap())
    }

    /// Parse move text (SAN or coordinate form) and play it.
    pub fn make_move_text(&mut self, text: &str) -> Result<&MoveRecord, EngineError> {
        let mv = san::parse(&self.position, text)?;
        self.make_move(mv)
    }

    /// Terminal-state classification of the current position plus history.
    pub fn state(&self) -> GameState {
        game_state(&self.position, &self.keys)
    }
}

/// Stateless terminal-state evaluation: `keys` are the repetition keys of
/// every position reached so far, the current one last.
pub fn game_state(pos: &Position, keys: &[u64]) -> GameState {
    let legal = movegen::legal_moves(pos);
    if legal.is_empty() {
        return if movegen::is_in_check(pos, pos.turn()) {
            // The side to move has been mated.
            match pos.turn() {
                Color::White => GameState::BlackWon,
                Color::Black => GameState::WhiteWon,
            }
        } else {
            GameState::DrawByStalemate
        };
    }

    if pos.halfmove_clock() >= 50 {
        return GameState::DrawByFiftyMoves;
    }

    if let Some(&current) = keys.last() {
        let repeats = keys.iter().filter(|&&k| k == current).count();
        if repeats >= 3 {
            return GameState::DrawByThreefold;
        }
    }

    GameState::Ongoing
}

// =========================================================================
// Tests
// =========================================================================
