//! Position evaluation. Positive scores favor the Attacker.

use serde::{Deserialize, Serialize};

use crate::board::Coord;
use crate::error::OptionsError;
use crate::game::GameState;
use crate::units::{Player, UnitType, MAX_HEALTH};

/// Heuristic score. Fractional for the health-weighted evaluators.
pub type Score = f64;

/// Bounds used to seed the search
pub const MAX_HEURISTIC_SCORE: Score = 2_000_000_000.0;
pub const MIN_HEURISTIC_SCORE: Score = -2_000_000_000.0;

/// Evaluator selection. Serialized as its number (0, 1, 2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Heuristic {
    /// Material count
    #[default]
    E0,
    /// Health-weighted material
    E1,
    /// Health-weighted material plus Command escorts and FastAttacker/Support distances
    E2,
}

impl TryFrom<u8> for Heuristic {
    type Error = OptionsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Heuristic::E0),
            1 => Ok(Heuristic::E1),
            2 => Ok(Heuristic::E2),
            other => Err(OptionsError::UnknownHeuristic(other)),
        }
    }
}

impl From<Heuristic> for u8 {
    fn from(h: Heuristic) -> u8 {
        match h {
            Heuristic::E0 => 0,
            Heuristic::E1 => 1,
            Heuristic::E2 => 2,
        }
    }
}

/// Evaluate with the selected heuristic
pub fn evaluate(state: &GameState, heuristic: Heuristic) -> Score {
    match heuristic {
        Heuristic::E0 => e0(state),
        Heuristic::E1 => e1(state),
        Heuristic::E2 => e2(state),
    }
}

/// Health as a fraction of full health
fn health_ratio(health: u8) -> Score {
    Score::from(health) / Score::from(MAX_HEALTH)
}

/// e0: ±9999 per Command unit, ±3 per other unit
pub fn e0(state: &GameState) -> Score {
    let mut score = 0.0;
    for (_, unit) in state.units() {
        let value = if unit.is_command() { 9999.0 } else { 3.0 };
        match unit.player {
            Player::Attacker => score += value,
            Player::Defender => score -= value,
        }
    }
    score
}

/// e1: material weighted by remaining health, with faction-specific unit values
pub fn e1(state: &GameState) -> Score {
    let mut score = 0.0;
    for (_, unit) in state.units() {
        let ratio = health_ratio(unit.health);
        match unit.player {
            Player::Attacker => {
                let weight = match unit.unit_type {
                    UnitType::Command => 999.0,
                    UnitType::FastAttacker => 9.0,
                    UnitType::Standard => 7.0,
                    _ => 3.0,
                };
                score += weight * ratio;
            }
            Player::Defender => {
                let weight = match unit.unit_type {
                    UnitType::Command => 999.0,
                    UnitType::Support | UnitType::Standard => 8.0,
                    _ => 3.0,
                };
                score -= weight * ratio;
            }
        }
    }
    score
}

/// e2: weighted material, Command escort terms, and distance terms pulling
/// Attacker FastAttackers toward the Defender Command and Defender Supports
/// toward the Attacker Command.
///
/// Terms are accumulated in board order; the float sums depend on it.
pub fn e2(state: &GameState) -> Score {
    let mut score = 0.0;
    let mut attacker_command = None;
    let mut defender_command = None;
    let mut fast_attackers = SeenPair::default();
    let mut supports = SeenPair::default();

    for (coord, unit) in state.units() {
        let ratio = health_ratio(unit.health);
        match (unit.player, unit.unit_type) {
            (Player::Attacker, UnitType::Command) => {
                score += 999.0 * ratio;
                attacker_command = Some(coord);
                let mut escorts = 0;
                for _ in friendly_neighbors(state, coord, Player::Attacker) {
                    escorts += 1;
                    score += 3.0 * (Score::from(MAX_HEALTH) / Score::from(unit.health));
                    if escorts == 4 {
                        score += 5.0;
                    }
                }
            }
            (Player::Attacker, UnitType::FastAttacker) => {
                score += 9.0 * ratio;
                fast_attackers.push(coord);
            }
            (Player::Attacker, UnitType::Standard) => score += 7.0 * ratio,
            (Player::Attacker, _) => score += 3.0 * ratio,
            (Player::Defender, UnitType::Command) => {
                score -= 999.0 * ratio;
                defender_command = Some(coord);
                let mut escorts = 0;
                for _ in friendly_neighbors(state, coord, Player::Defender) {
                    escorts += 1;
                    score -= 40.0;
                    if escorts == 2 {
                        score -= 50.0;
                    }
                }
            }
            (Player::Defender, UnitType::Support) => {
                score -= 50.0 * ratio;
                supports.push(coord);
            }
            (Player::Defender, _) => score -= 40.0 * ratio,
        }
    }

    if let Some(target) = defender_command {
        if let Some(farthest) = fast_attackers.farthest_from(target) {
            score += 100.0 / farthest;
        }
        if let Some(last) = fast_attackers.last() {
            score = score + 100.0 / distance(last, target) - 9.0;
        }
    }

    if let Some(target) = attacker_command {
        if let Some(farthest) = supports.farthest_from(target) {
            score -= 50.0 / farthest;
        }
        if let Some(last) = supports.last() {
            score = score - 50.0 / distance(last, target) + 9.0;
        }
    }

    score
}

fn friendly_neighbors(
    state: &GameState,
    coord: Coord,
    player: Player,
) -> impl Iterator<Item = Coord> + '_ {
    coord
        .adjacent()
        .into_iter()
        .filter(move |&c| matches!(state.get(c), Some(unit) if unit.player == player))
}

fn distance(a: Coord, b: Coord) -> Score {
    Score::from(a.manhattan_distance(b))
}

/// First and last occurrence of a unit type in board order
#[derive(Default)]
struct SeenPair {
    first: Option<Coord>,
    second: Option<Coord>,
}

impl SeenPair {
    fn push(&mut self, coord: Coord) {
        if self.first.is_some() {
            self.second = Some(coord);
        } else {
            self.first = Some(coord);
        }
    }

    /// The later of the two if there are two, else the only one
    fn last(&self) -> Option<Coord> {
        self.second.or(self.first)
    }

    /// Larger of the two distances to `target`, only when both exist
    fn farthest_from(&self, target: Coord) -> Option<Score> {
        match (self.first, self.second) {
            (Some(a), Some(b)) => Some(
                a.manhattan_distance(target)
                    .max(b.manhattan_distance(target))
                    .into(),
            ),
            _ => None,
        }
    }
}
