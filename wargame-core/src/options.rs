//! Game options - board size, search limits, and who plays which side

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::board::{DEFAULT_DIM, MAX_DIM, MIN_DIM};
use crate::error::OptionsError;
use crate::eval::Heuristic;
use crate::units::Player;

/// Smallest usable search depth. The root call is depth 1, so a limit of 1
/// cuts off before any candidate is expanded and never yields a move.
pub const MIN_MAX_DEPTH: u32 = 2;

/// Which factions are driven by a human (keyboard or broker)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    AttackerVsDefender,
    AttackerVsComp,
    CompVsDefender,
    #[default]
    CompVsComp,
}

impl GameType {
    /// Whether `player` is human-controlled in this game type
    pub fn is_human(self, player: Player) -> bool {
        match self {
            GameType::AttackerVsDefender => true,
            GameType::AttackerVsComp => player == Player::Attacker,
            GameType::CompVsDefender => player == Player::Defender,
            GameType::CompVsComp => false,
        }
    }
}

/// Match configuration, shared by every state cloned during search
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub dim: i8,
    /// Search stops expanding when the depth counter (starting at 1) reaches this
    pub max_depth: u32,
    pub min_depth: u32,
    /// Seconds per computer move
    pub max_time: f64,
    pub game_type: GameType,
    pub alpha_beta: bool,
    /// Reaching this many turns is a Defender win. None = unlimited.
    pub max_turns: Option<u32>,
    pub randomize_moves: bool,
    pub broker: Option<String>,
    pub heuristic: Heuristic,
    /// Seed for candidate shuffling. None = entropy.
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            max_depth: 4,
            min_depth: 2,
            max_time: 5.0,
            game_type: GameType::CompVsComp,
            alpha_beta: true,
            max_turns: Some(100),
            randomize_moves: false,
            broker: None,
            heuristic: Heuristic::E0,
            seed: None,
        }
    }
}

impl Options {
    /// Load from JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: Options = serde_json::from_str(&content)?;
        Ok(options)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(MIN_DIM..=MAX_DIM).contains(&self.dim) {
            return Err(OptionsError::DimOutOfRange(self.dim));
        }
        if self.max_depth < MIN_MAX_DEPTH {
            return Err(OptionsError::MaxDepthTooSmall(self.max_depth));
        }
        if self.min_depth > self.max_depth {
            return Err(OptionsError::DepthBoundsInverted {
                min: self.min_depth,
                max: self.max_depth,
            });
        }
        if self.max_time <= 0.0 || !self.max_time.is_finite() {
            return Err(OptionsError::NonPositiveTime(self.max_time));
        }
        Ok(())
    }
}
