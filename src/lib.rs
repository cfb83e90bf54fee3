//! Chess position engine.
//!
//! The `engine` module owns the board model: a value-like [`Position`]
//! with pure successor derivation, legal move generation, attack and
//! control analysis, an incrementally maintained nearest-piece cache,
//! SAN rendering/parsing, and a stateful [`Game`] with draw detection.
//! The `ai` module builds a bounded candidate-move search on top of it,
//! runnable synchronously or on a background thread with cooperative
//! cancellation.

pub mod ai;
pub mod config;
pub mod engine;

pub use ai::{Engine, SearchLimits};
pub use config::EngineConfig;
pub use engine::{Game, Position};
