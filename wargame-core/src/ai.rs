//! Minimax and alpha-beta search under a wall-clock budget

use std::time::Instant;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::board::Move;
use crate::eval::{evaluate, Score, MAX_HEURISTIC_SCORE, MIN_HEURISTIC_SCORE};
use crate::game::GameState;
use crate::options::Options;
use crate::stats::Stats;
use crate::units::Player;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Siblings stop being explored this long before the budget runs out
const TIME_MARGIN_SECS: f64 = 0.1;

/// Search depth of the root call
const ROOT_DEPTH: u32 = 1;

// ============================================================================
// SEARCH AI
// ============================================================================

/// Computer player. Search limits, heuristic and variant come from the
/// state's options; the AI itself only owns the shuffling RNG.
pub struct SearchAI {
    rng: ChaCha8Rng,
}

impl SearchAI {
    pub fn new(options: &Options) -> Self {
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Run the configured search for the player to move.
    /// Returns the static score of the chosen child and the chosen move.
    pub fn run_algorithm(&mut self, state: &GameState, stats: &mut Stats) -> (Score, Option<Move>) {
        self.search_from(state, stats, Instant::now())
    }

    fn search_from(
        &mut self,
        state: &GameState,
        stats: &mut Stats,
        start: Instant,
    ) -> (Score, Option<Move>) {
        let mut search = Search {
            options: state.options(),
            start,
            rng: &mut self.rng,
            stats,
        };
        let player = state.next_player();
        if search.options.alpha_beta {
            search.alpha_beta(
                state,
                ROOT_DEPTH,
                player,
                MIN_HEURISTIC_SCORE,
                MAX_HEURISTIC_SCORE,
            )
        } else {
            search.minimax(state, ROOT_DEPTH, player)
        }
    }

    /// Pick a move for the player to move, with a diagnostic report.
    ///
    /// Overrunning the full time budget forfeits: the mover's Command unit
    /// is destroyed and no move is returned.
    pub fn suggest_move(&mut self, state: &mut GameState, stats: &mut Stats) -> (Option<Move>, String) {
        let start = Instant::now();
        let (score, best_move) = self.search_from(state, stats, start);
        let elapsed = start.elapsed().as_secs_f64();

        if elapsed > state.options().max_time {
            let player = state.next_player();
            forfeit(state, player);
            tracing::debug!("{} search overran its budget ({:.3}s)", player, elapsed);
            return (None, "Computer timed out!".to_string());
        }

        stats.total_seconds += elapsed;
        tracing::debug!(
            "search done: score={} move={:?} evals={} in {:.3}s",
            score,
            best_move.map(|mv| mv.to_string()),
            stats.total_evaluations(),
            elapsed
        );

        (best_move, format_report(score, stats, elapsed))
    }
}

/// Destroy `player`'s Command unit
fn forfeit(state: &mut GameState, player: Player) {
    let command = state
        .player_units(player)
        .find(|(_, unit)| unit.is_command());
    if let Some((coord, unit)) = command {
        state.mod_health(coord, -i32::from(unit.health));
    }
}

// ============================================================================
// RECURSION
// ============================================================================

struct Search<'a> {
    options: &'a Options,
    start: Instant,
    rng: &'a mut ChaCha8Rng,
    stats: &'a mut Stats,
}

impl Search<'_> {
    fn evaluate(&self, state: &GameState) -> Score {
        evaluate(state, self.options.heuristic)
    }

    /// Depth limit reached, or the game is decided on the live turn counter
    fn is_cutoff(&self, state: &GameState, depth: u32) -> bool {
        depth >= self.options.max_depth || state.is_finished()
    }

    fn out_of_time(&self) -> bool {
        self.start.elapsed().as_secs_f64() >= self.options.max_time - TIME_MARGIN_SECS
    }

    fn candidates(&mut self, state: &GameState, depth: u32, player: Player) -> Vec<Move> {
        let mut moves = state.move_candidates_for(player);
        if self.options.randomize_moves {
            moves.shuffle(&mut *self.rng);
        }
        self.stats.record(depth, moves.len());
        moves
    }

    /// Static score of the chosen child, not the backed-up value
    fn conclude(&self, state: &GameState, best: Option<(Move, GameState)>) -> (Score, Option<Move>) {
        match best {
            Some((mv, child)) => (self.evaluate(&child), Some(mv)),
            None => (self.evaluate(state), None),
        }
    }

    fn minimax(&mut self, state: &GameState, depth: u32, player: Player) -> (Score, Option<Move>) {
        if self.is_cutoff(state, depth) {
            return (self.evaluate(state), None);
        }

        let moves = self.candidates(state, depth, player);
        let mut best_score = worst_score(player);
        let mut best = None;

        for mv in moves {
            let mut child = state.clone();
            child.resolve_move(mv, player);
            let (score, _) = self.minimax(&child, depth + 1, player.next());

            if improves(player, score, best_score) {
                best_score = score;
                best = Some((mv, child));
            }

            if self.out_of_time() {
                break;
            }
        }

        self.conclude(state, best)
    }

    fn alpha_beta(
        &mut self,
        state: &GameState,
        depth: u32,
        player: Player,
        mut alpha: Score,
        mut beta: Score,
    ) -> (Score, Option<Move>) {
        if self.is_cutoff(state, depth) {
            return (self.evaluate(state), None);
        }

        let moves = self.candidates(state, depth, player);
        let mut best_score = worst_score(player);
        let mut best = None;

        for mv in moves {
            let mut child = state.clone();
            child.resolve_move(mv, player);
            let (score, _) = self.alpha_beta(&child, depth + 1, player.next(), alpha, beta);

            if improves(player, score, best_score) {
                best_score = score;
                best = Some((mv, child));
            }

            match player {
                Player::Attacker => alpha = alpha.max(best_score),
                Player::Defender => beta = beta.min(best_score),
            }
            if beta <= alpha {
                break;
            }

            if self.out_of_time() {
                break;
            }
        }

        self.conclude(state, best)
    }
}

/// Attacker maximizes, Defender minimizes
fn improves(player: Player, score: Score, best: Score) -> bool {
    match player {
        Player::Attacker => score > best,
        Player::Defender => score < best,
    }
}

fn worst_score(player: Player) -> Score {
    match player {
        Player::Attacker => MIN_HEURISTIC_SCORE,
        Player::Defender => MAX_HEURISTIC_SCORE,
    }
}

// ============================================================================
// REPORTING
// ============================================================================

fn format_report(score: Score, stats: &Stats, elapsed: f64) -> String {
    let by_depth = stats.by_depth();
    let total = stats.total_evaluations();

    let counts: String = by_depth
        .iter()
        .map(|(depth, count)| format!("{}:{} ", depth, count))
        .collect();
    let percents: String = if total > 0 {
        by_depth
            .iter()
            .map(|(depth, count)| format!("{}:{:.1}% ", depth, *count as f64 * 100.0 / total as f64))
            .collect()
    } else {
        String::new()
    };

    let mut report = format!(
        "Heuristic score: {}\n\nEvals per depth: {}\n\nPercent evals per depth: {}\n\nCumulative evals: {}\n\n",
        score, counts, percents, total
    );
    if let Some(k_per_sec) = stats.throughput_k_per_sec() {
        report.push_str(&format!("Eval perf.: {:.1}k/s\n\n", k_per_sec));
    }
    report.push_str(&format!("Elapsed time: {:.1}s", elapsed));
    report
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Coord;
    use crate::eval::{e0, Heuristic};
    use crate::units::{Unit, UnitType};
    use std::sync::Arc;

    fn options(max_depth: u32, alpha_beta: bool) -> Options {
        Options {
            max_depth,
            min_depth: 1,
            max_time: 60.0,
            alpha_beta,
            ..Default::default()
        }
    }

    fn position(options: Options, units: &[(i8, i8, Player, UnitType, u8)]) -> GameState {
        let placed: Vec<_> = units
            .iter()
            .map(|&(r, c, p, t, h)| (Coord::new(r, c), Unit::with_health(p, t, h)))
            .collect();
        GameState::from_units(Arc::new(options), &placed)
    }

    #[test]
    fn test_ai_returns_legal_move() {
        let mut game = GameState::new(options(3, true));
        let mut stats = Stats::new();
        let mut ai = SearchAI::with_seed(42);

        let (mv, report) = ai.suggest_move(&mut game, &mut stats);
        let mv = mv.expect("search should pick a move");
        assert!(game.is_valid_move(mv));
        assert!(report.starts_with("Heuristic score: "));
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        for heuristic in [Heuristic::E0, Heuristic::E1, Heuristic::E2] {
            let mut results = Vec::new();
            let mut totals = Vec::new();
            for alpha_beta in [false, true] {
                let game = GameState::new(Options {
                    heuristic,
                    ..options(3, alpha_beta)
                });
                let mut stats = Stats::new();
                let mut ai = SearchAI::with_seed(7);
                results.push(ai.run_algorithm(&game, &mut stats));
                totals.push(stats.total_evaluations());
            }
            assert_eq!(results[0], results[1], "{:?}", heuristic);
            assert!(totals[1] <= totals[0]);
        }
    }

    #[test]
    fn test_attacker_takes_command() {
        let game = position(
            options(2, true),
            &[
                (0, 0, Player::Defender, UnitType::Command, 9),
                (1, 0, Player::Attacker, UnitType::FastAttacker, 9),
                (4, 4, Player::Attacker, UnitType::Command, 9),
            ],
        );
        let mut ai = SearchAI::with_seed(1);
        let (score, mv) = ai.run_algorithm(&game, &mut Stats::new());
        assert_eq!(mv, Some(Move::from_quad(1, 0, 0, 0)));
        assert_eq!(score, 9999.0 + 3.0);
    }

    #[test]
    fn test_defender_minimizes() {
        let mut game = position(
            options(2, false),
            &[
                (0, 0, Player::Defender, UnitType::Command, 9),
                (3, 4, Player::Defender, UnitType::Standard, 9),
                (4, 4, Player::Attacker, UnitType::Command, 3),
            ],
        );
        game.next_turn();
        let mut ai = SearchAI::with_seed(1);
        let (score, mv) = ai.run_algorithm(&game, &mut Stats::new());
        assert_eq!(mv, Some(Move::from_quad(3, 4, 4, 4)));
        assert_eq!(score, -9999.0 - 3.0);
    }

    #[test]
    fn test_cutoff_at_root() {
        let game = GameState::new(options(1, true));
        let mut stats = Stats::new();
        let (score, mv) = SearchAI::with_seed(1).run_algorithm(&game, &mut stats);
        assert_eq!(mv, None);
        assert_eq!(score, e0(&game));
        assert_eq!(stats.total_evaluations(), 0);
    }

    #[test]
    fn test_finished_game_yields_no_move() {
        let mut game = GameState::new(options(4, true));
        game.mod_health(Coord::new(0, 0), -9);
        let (score, mv) = SearchAI::with_seed(1).run_algorithm(&game, &mut Stats::new());
        assert_eq!(mv, None);
        assert_eq!(score, e0(&game));
    }

    #[test]
    fn test_stats_accumulate_across_searches() {
        let game = GameState::new(options(2, true));
        let mut stats = Stats::new();
        let mut ai = SearchAI::with_seed(1);
        ai.run_algorithm(&game, &mut stats);
        assert_eq!(stats.by_depth(), vec![(1, 12)]);
        ai.run_algorithm(&game, &mut stats);
        assert_eq!(stats.by_depth(), vec![(1, 24)]);
    }

    #[test]
    fn test_deadline_stops_sibling_loop() {
        // Budget below the margin: every sibling loop stops after its first child
        let game = GameState::new(Options {
            max_time: 0.05,
            ..options(3, false)
        });
        let mut stats = Stats::new();
        let (_, mv) = SearchAI::with_seed(1).run_algorithm(&game, &mut stats);
        assert_eq!(mv, Some(Move::from_quad(2, 4, 1, 4)));
        assert_eq!(stats.by_depth(), vec![(1, 12), (2, 12)]);
    }

    #[test]
    fn test_timeout_forfeits_command() {
        let mut game = GameState::new(Options {
            max_time: 1e-9,
            ..options(3, true)
        });
        let mut stats = Stats::new();
        let (mv, report) = SearchAI::with_seed(1).suggest_move(&mut game, &mut stats);
        assert_eq!(mv, None);
        assert_eq!(report, "Computer timed out!");
        assert!(!game.has_command(Player::Attacker));
        assert_eq!(game.winner(), Some(Player::Defender));
        assert_eq!(stats.total_seconds, 0.0);
    }

    #[test]
    fn test_randomized_search_is_seeded() {
        let game = GameState::new(Options {
            randomize_moves: true,
            ..options(3, true)
        });
        let first = SearchAI::with_seed(99).run_algorithm(&game, &mut Stats::new());
        let second = SearchAI::with_seed(99).run_algorithm(&game, &mut Stats::new());
        assert_eq!(first, second);
        assert!(game.is_valid_move(first.1.unwrap()));
    }

    #[test]
    fn test_report_fields() {
        let mut game = GameState::new(options(3, true));
        let mut stats = Stats::new();
        let (_, report) = SearchAI::with_seed(3).suggest_move(&mut game, &mut stats);

        assert!(report.contains("Heuristic score: "));
        assert!(report.contains("Evals per depth: 1:12 "));
        assert!(report.contains("Percent evals per depth: 1:"));
        assert!(report.contains(&format!("Cumulative evals: {}", stats.total_evaluations())));
        assert!(report.contains("Eval perf.: "));
        assert!(report.contains("Elapsed time: "));
        assert!(stats.total_seconds > 0.0);
    }
}
