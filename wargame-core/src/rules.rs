//! Move legality, candidate generation, and move resolution

use crate::board::{Coord, Move};
use crate::error::GameError;
use crate::game::GameState;
use crate::units::Player;

/// Health lost by every unit caught in a self-destruct blast
const SELF_DESTRUCT_DAMAGE: i32 = 2;

impl GameState {
    // ========================================================================
    // LEGALITY
    // ========================================================================

    /// Legality for whoever is to move
    pub fn is_valid_move(&self, mv: Move) -> bool {
        self.is_valid_move_for(mv, self.next_player())
    }

    /// Legality of `mv` played by `player`, whether or not it is their turn
    pub fn is_valid_move_for(&self, mv: Move, player: Player) -> bool {
        if !self.is_valid_coord(mv.src) || !self.is_valid_coord(mv.dst) {
            return false;
        }
        let unit = match self.get(mv.src) {
            Some(unit) if unit.player == player => *unit,
            _ => return false,
        };

        if mv.is_self_destruct() {
            return true;
        }
        if !mv.src.adjacent().contains(&mv.dst) {
            return false;
        }

        match self.get(mv.dst) {
            None => {
                if unit.unit_type.moves_freely() {
                    return true;
                }
                if self.is_engaged(mv.src, player) {
                    return false;
                }
                is_forward(mv, player)
            }
            Some(target) if target.player == player => unit.repair_amount(target) > 0,
            Some(_) => true,
        }
    }

    /// Whether an enemy of `player` sits next to coord
    fn is_engaged(&self, coord: Coord, player: Player) -> bool {
        coord
            .adjacent()
            .iter()
            .any(|&c| matches!(self.get(c), Some(other) if other.player != player))
    }

    // ========================================================================
    // CANDIDATES
    // ========================================================================

    /// Legal moves for whoever is to move
    pub fn move_candidates(&self) -> Vec<Move> {
        self.move_candidates_for(self.next_player())
    }

    /// Every legal move for `player`: per unit (row-major) the legal adjacent
    /// destinations, then its self-destruct. Empty once the game is over.
    pub fn move_candidates_for(&self, player: Player) -> Vec<Move> {
        if self.is_finished() {
            return Vec::new();
        }

        let mut moves = Vec::new();
        for (src, _) in self.player_units(player) {
            for dst in src.adjacent() {
                let mv = Move::new(src, dst);
                if self.is_valid_move_for(mv, player) {
                    moves.push(mv);
                }
            }
            moves.push(Move::new(src, src));
        }
        moves
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    /// Validate and play `mv` for whoever is to move. Does not advance the turn.
    pub fn perform_move(&mut self, mv: Move) -> Result<String, GameError> {
        self.perform_move_for(mv, self.next_player())
    }

    /// Validate and play `mv` for `player`, returning a description of what happened
    pub fn perform_move_for(&mut self, mv: Move, player: Player) -> Result<String, GameError> {
        if !self.is_valid_move_for(mv, player) {
            return Err(GameError::IllegalMove(mv));
        }
        Ok(self.resolve_move(mv, player))
    }

    /// Apply an already-legal move
    pub(crate) fn resolve_move(&mut self, mv: Move, player: Player) -> String {
        let src_unit = match self.get(mv.src) {
            Some(unit) => *unit,
            None => return format!("{} has no unit at {}", player, mv.src),
        };

        if mv.is_self_destruct() {
            self.mod_health(mv.src, -i32::from(src_unit.health));
            for coord in mv.src.iter_range(1) {
                self.mod_health(coord, -SELF_DESTRUCT_DAMAGE);
            }
            return format!("{} has self destructed unit {}", player, mv.src);
        }

        match self.get(mv.dst).copied() {
            None => {
                self.set(mv.dst, Some(src_unit));
                self.set(mv.src, None);
                format!("{} has moved {} to {}", player, mv.src, mv.dst)
            }
            Some(target) if target.player == player => {
                let amount = src_unit.repair_amount(&target);
                self.mod_health(mv.dst, i32::from(amount));
                format!("{} has moved {} to repair {}", player, mv.src, mv.dst)
            }
            Some(target) => {
                // Both sides hit at once, from pre-attack health
                let dealt = src_unit.damage_amount(&target);
                let taken = target.damage_amount(&src_unit);
                self.mod_health(mv.dst, -i32::from(dealt));
                self.mod_health(mv.src, -i32::from(taken));
                format!("{} has moved {} to damage {}", player, mv.src, mv.dst)
            }
        }
    }
}

/// Attacker advances up or left, Defender down or right
fn is_forward(mv: Move, player: Player) -> bool {
    let step = (mv.dst.row - mv.src.row, mv.dst.col - mv.src.col);
    match player {
        Player::Attacker => step == (-1, 0) || step == (0, -1),
        Player::Defender => step == (1, 0) || step == (0, 1),
    }
}

// ============================================================================
// TESTS
// ============================================================================
