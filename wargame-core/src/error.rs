//! Error types for rules and configuration

use thiserror::Error;

use crate::board::{Move, MAX_DIM, MIN_DIM};
use crate::options::MIN_MAX_DEPTH;

/// Rejected game actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid move {} to {}", .0.src, .0.dst)]
    IllegalMove(Move),
}

/// Invalid game options
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("board dimension {0} outside {}..={}", MIN_DIM, MAX_DIM)]
    DimOutOfRange(i8),

    #[error("max depth must be at least {} (got {0})", MIN_MAX_DEPTH)]
    MaxDepthTooSmall(u32),

    #[error("min depth {min} exceeds max depth {max}")]
    DepthBoundsInverted { min: u32, max: u32 },

    #[error("time budget must be positive (got {0}s)")]
    NonPositiveTime(f64),

    #[error("unknown heuristic e{0} (expected 0, 1 or 2)")]
    UnknownHeuristic(u8),
}
