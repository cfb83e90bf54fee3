pub mod attacks;
pub mod board;
pub mod cache;
pub mod game;
pub mod movegen;
pub mod san;
pub mod types;
pub mod zobrist;

pub use board::{Position, Sneak};
pub use cache::EncounterCache;
pub use game::Game;
pub use movegen::legal_moves;
pub use types::*;
