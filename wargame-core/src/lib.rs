//! AI Wargame Core - Game engine and AI
//!
//! This crate provides the core game logic for the wargame:
//! - Board geometry (square grid, labelled coordinates)
//! - Unit types with damage and repair tables
//! - Game state, move legality and resolution
//! - Position heuristics (e0, e1, e2)
//! - Minimax and alpha-beta search with a time budget

pub mod board;
pub mod units;
pub mod game;
pub mod rules;
pub mod eval;
pub mod stats;
pub mod ai;
pub mod options;
pub mod error;

// Re-exports for convenient access
pub use board::{Coord, Move, DEFAULT_DIM};
pub use units::{Player, Unit, UnitType, MAX_HEALTH};
pub use game::{initial_layout, GameState};
pub use eval::{evaluate, Heuristic, Score, MAX_HEURISTIC_SCORE, MIN_HEURISTIC_SCORE};
pub use stats::Stats;
pub use ai::SearchAI;
pub use options::{GameType, Options};
pub use error::{GameError, OptionsError};
