//! Factions, unit types, and the fixed combat tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health of a fresh unit, and the ceiling for repairs
pub const MAX_HEALTH: u8 = 9;

/// Number of unit types (dimension of the combat tables)
pub const UNIT_TYPE_COUNT: usize = 5;

/// Faction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Attacker = 0,
    Defender = 1,
}

impl Player {
    /// The other faction
    pub fn next(self) -> Self {
        match self {
            Player::Attacker => Player::Defender,
            Player::Defender => Player::Attacker,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Attacker => "Attacker",
            Player::Defender => "Defender",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit type. Discriminants index the combat tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    /// Losing it loses the game
    Command = 0,
    /// Repairs allies, moves freely
    Support = 1,
    /// Hits hard, moves freely
    FastAttacker = 2,
    Standard = 3,
    /// Soaks damage
    Barrier = 4,
}

impl UnitType {
    pub const ALL: [UnitType; UNIT_TYPE_COUNT] = [
        UnitType::Command,
        UnitType::Support,
        UnitType::FastAttacker,
        UnitType::Standard,
        UnitType::Barrier,
    ];

    /// Display letter (A=AI, T=Tech, V=Virus, P=Program, F=Firewall)
    pub fn letter(self) -> char {
        match self {
            UnitType::Command => 'A',
            UnitType::Support => 'T',
            UnitType::FastAttacker => 'V',
            UnitType::Standard => 'P',
            UnitType::Barrier => 'F',
        }
    }

    /// Units that ignore engagement and faction direction when moving to an empty cell
    pub fn moves_freely(self) -> bool {
        matches!(self, UnitType::Support | UnitType::FastAttacker)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Damage dealt, indexed [attacker][target]
pub static DAMAGE_TABLE: [[u8; UNIT_TYPE_COUNT]; UNIT_TYPE_COUNT] = [
    [3, 3, 3, 3, 1], // Command
    [1, 1, 6, 1, 1], // Support
    [9, 6, 1, 6, 1], // FastAttacker
    [3, 3, 3, 3, 1], // Standard
    [1, 1, 1, 1, 1], // Barrier
];

/// Health repaired, indexed [repairer][target]
pub static REPAIR_TABLE: [[u8; UNIT_TYPE_COUNT]; UNIT_TYPE_COUNT] = [
    [0, 1, 1, 0, 0], // Command
    [3, 0, 0, 3, 3], // Support
    [0, 0, 0, 0, 0], // FastAttacker
    [0, 0, 0, 0, 0], // Standard
    [0, 0, 0, 0, 0], // Barrier
];

/// A unit on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub player: Player,
    pub unit_type: UnitType,
    pub health: u8,
}

impl Unit {
    /// Fresh unit at full health
    pub const fn new(player: Player, unit_type: UnitType) -> Self {
        Self {
            player,
            unit_type,
            health: MAX_HEALTH,
        }
    }

    pub const fn with_health(player: Player, unit_type: UnitType, health: u8) -> Self {
        Self {
            player,
            unit_type,
            health: if health > MAX_HEALTH { MAX_HEALTH } else { health },
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_command(&self) -> bool {
        self.unit_type == UnitType::Command
    }

    /// Apply a health delta, clamped into [0, MAX_HEALTH]
    pub fn mod_health(&mut self, delta: i32) {
        let health = (i32::from(self.health) + delta).clamp(0, i32::from(MAX_HEALTH));
        self.health = health as u8;
    }

    /// Damage this unit deals to `target`, never more than the target has left
    pub fn damage_amount(&self, target: &Unit) -> u8 {
        DAMAGE_TABLE[self.unit_type.index()][target.unit_type.index()].min(target.health)
    }

    /// Health this unit restores on `target`, never past MAX_HEALTH
    pub fn repair_amount(&self, target: &Unit) -> u8 {
        REPAIR_TABLE[self.unit_type.index()][target.unit_type.index()]
            .min(MAX_HEALTH - target.health)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faction = match self.player {
            Player::Attacker => 'a',
            Player::Defender => 'd',
        };
        write!(f, "{}{}{}", faction, self.unit_type.letter(), self.health)
    }
}
