//! Game state: board, turn bookkeeping, and end-of-game detection

use std::fmt;
use std::sync::Arc;

use crate::board::{Coord, Move};
use crate::options::Options;
use crate::units::{Player, Unit, UnitType};

// ============================================================================
// INITIAL DEPLOYMENT
// ============================================================================

/// Fixed opening formation for a `dim × dim` board.
/// Defender holds the top-left corner, Attacker the bottom-right.
pub fn initial_layout(dim: i8) -> Vec<(Coord, Unit)> {
    let md = dim - 1;
    let defender = |unit_type| Unit::new(Player::Defender, unit_type);
    let attacker = |unit_type| Unit::new(Player::Attacker, unit_type);

    vec![
        (Coord::new(0, 0), defender(UnitType::Command)),
        (Coord::new(1, 0), defender(UnitType::Support)),
        (Coord::new(0, 1), defender(UnitType::Support)),
        (Coord::new(2, 0), defender(UnitType::Barrier)),
        (Coord::new(0, 2), defender(UnitType::Barrier)),
        (Coord::new(1, 1), defender(UnitType::Standard)),
        (Coord::new(md, md), attacker(UnitType::Command)),
        (Coord::new(md - 1, md), attacker(UnitType::FastAttacker)),
        (Coord::new(md, md - 1), attacker(UnitType::FastAttacker)),
        (Coord::new(md - 2, md), attacker(UnitType::Standard)),
        (Coord::new(md, md - 2), attacker(UnitType::Standard)),
        (Coord::new(md - 1, md - 1), attacker(UnitType::Barrier)),
    ]
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (clone to explore a branch).
///
/// Cloning copies the board, flags and counters; the options are shared.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Row-major `dim × dim` cells
    board: Vec<Option<Unit>>,
    dim: i8,

    next_player: Player,
    turns_played: u32,

    options: Arc<Options>,

    /// Cleared when the faction's Command unit is removed, never set again
    attacker_has_command: bool,
    defender_has_command: bool,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// New match with the standard deployment
    pub fn new(options: Options) -> Self {
        Self::with_shared_options(Arc::new(options))
    }

    pub fn with_shared_options(options: Arc<Options>) -> Self {
        let layout = initial_layout(options.dim);
        Self::from_units(options, &layout)
    }

    /// Build a position from explicit placements. Dead units and
    /// off-board placements are skipped.
    pub fn from_units(options: Arc<Options>, units: &[(Coord, Unit)]) -> Self {
        let dim = options.dim;
        let cells = usize::try_from(dim).unwrap_or(0).pow(2);
        let mut state = Self {
            board: vec![None; cells],
            dim,
            next_player: Player::Attacker,
            turns_played: 0,
            options,
            attacker_has_command: false,
            defender_has_command: false,
        };

        for &(coord, unit) in units {
            if unit.is_alive() {
                state.set(coord, Some(unit));
            }
        }

        // The only full scan of the flags; afterwards only removal touches them
        for unit in state.board.iter().flatten() {
            if unit.is_command() {
                match unit.player {
                    Player::Attacker => state.attacker_has_command = true,
                    Player::Defender => state.defender_has_command = true,
                }
            }
        }

        state
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn shared_options(&self) -> Arc<Options> {
        Arc::clone(&self.options)
    }

    pub fn dim(&self) -> i8 {
        self.dim
    }

    pub fn next_player(&self) -> Player {
        self.next_player
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn has_command(&self, player: Player) -> bool {
        match player {
            Player::Attacker => self.attacker_has_command,
            Player::Defender => self.defender_has_command,
        }
    }

    pub fn is_valid_coord(&self, coord: Coord) -> bool {
        coord.is_valid(self.dim)
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.is_valid_coord(coord) {
            Some(coord.row as usize * self.dim as usize + coord.col as usize)
        } else {
            None
        }
    }

    /// Unit at coord; None when empty or off-board
    pub fn get(&self, coord: Coord) -> Option<&Unit> {
        self.index(coord).and_then(|i| self.board[i].as_ref())
    }

    fn get_mut(&mut self, coord: Coord) -> Option<&mut Unit> {
        match self.index(coord) {
            Some(i) => self.board[i].as_mut(),
            None => None,
        }
    }

    /// Off-board coordinates read as empty
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    /// Replace cell contents; ignored for off-board coordinates
    pub fn set(&mut self, coord: Coord, unit: Option<Unit>) {
        if let Some(i) = self.index(coord) {
            self.board[i] = unit;
        }
    }

    /// Iterate units on board, row-major
    pub fn units(&self) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        Move::from_dim(self.dim)
            .iter_rectangle()
            .filter_map(move |coord| self.get(coord).map(|&unit| (coord, unit)))
    }

    /// Iterate units of one faction, row-major
    pub fn player_units(&self, player: Player) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        self.units().filter(move |(_, unit)| unit.player == player)
    }

    // ========================================================================
    // HEALTH & REMOVAL
    // ========================================================================

    /// Remove the unit at coord if its health is gone
    pub fn remove_dead(&mut self, coord: Coord) {
        let dead = match self.get(coord) {
            Some(unit) if !unit.is_alive() => *unit,
            _ => return,
        };

        self.set(coord, None);
        if dead.is_command() {
            match dead.player {
                Player::Attacker => self.attacker_has_command = false,
                Player::Defender => self.defender_has_command = false,
            }
        }
    }

    /// Apply a health delta to the unit at coord (if any), removing it at zero
    pub fn mod_health(&mut self, coord: Coord, delta: i32) {
        if let Some(unit) = self.get_mut(coord) {
            unit.mod_health(delta);
            self.remove_dead(coord);
        }
    }

    // ========================================================================
    // TURNS & RESULT
    // ========================================================================

    /// Hand the move to the other faction
    pub fn next_turn(&mut self) {
        self.next_player = self.next_player.next();
        self.turns_played += 1;
    }

    /// Winner, if the game is over.
    /// The turn limit is a Defender win regardless of material.
    pub fn winner(&self) -> Option<Player> {
        if let Some(max_turns) = self.options.max_turns {
            if self.turns_played >= max_turns {
                return Some(Player::Defender);
            }
        }
        match (self.attacker_has_command, self.defender_has_command) {
            (true, true) => None,
            (true, false) => Some(Player::Attacker),
            (false, _) => Some(Player::Defender),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner().is_some()
    }
}

// ============================================================================
// RENDERING
// ============================================================================

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Next player: {}", self.next_player)?;
        writeln!(f, "Turns played: {}", self.turns_played)?;

        write!(f, "\n   ")?;
        for col in 0..self.dim {
            write!(f, "{:^3} ", Coord::new(0, col).col_label())?;
        }
        writeln!(f)?;

        for row in 0..self.dim {
            write!(f, "{}: ", Coord::new(row, 0).row_label())?;
            for col in 0..self.dim {
                match self.get(Coord::new(row, col)) {
                    Some(unit) => write!(f, "{:^3} ", unit.to_string())?,
                    None => write!(f, " .  ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
