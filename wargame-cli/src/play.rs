//! Play command - run one match between humans, the computer, or a broker
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: PlayArgs::to_options(), MatchRunner::play()
//! - Level 3: human_turn(), broker_turn(), computer_turn()
//! - Level 4: input parsing and option merging

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, ValueEnum};

use wargame_core::{GameState, GameType, Heuristic, Move, Options, Player, SearchAI, Stats};

use crate::broker::BlockingBroker;
use crate::trace::Trace;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Who controls each faction
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GameTypeArg {
    /// Computer vs computer
    Auto,
    /// Human attacker vs computer
    Attacker,
    /// Computer vs human defender
    Defender,
    /// Human vs human
    Manual,
}

impl From<GameTypeArg> for GameType {
    fn from(arg: GameTypeArg) -> Self {
        match arg {
            GameTypeArg::Auto => GameType::CompVsComp,
            GameTypeArg::Attacker => GameType::AttackerVsComp,
            GameTypeArg::Defender => GameType::CompVsDefender,
            GameTypeArg::Manual => GameType::AttackerVsDefender,
        }
    }
}

/// Flags override the config file, which overrides the defaults
#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// Options JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum search depth
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Maximum search time per computer move, in seconds
    #[arg(long)]
    pub max_time: Option<f64>,

    /// Game type
    #[arg(long, value_enum)]
    pub game_type: Option<GameTypeArg>,

    /// Play human turns via a game broker
    #[arg(long, value_name = "URL")]
    pub broker: Option<String>,

    /// Turn limit (reaching it is a Defender win)
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Use alpha-beta pruning (true) or plain minimax (false)
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub alpha_beta: Option<bool>,

    /// Heuristic: 0 for e0, 1 for e1, 2 for e2
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub heuristic: Option<u8>,

    /// Shuffle candidate moves before searching
    #[arg(long)]
    pub randomize: bool,

    /// Seed for candidate shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Board dimension
    #[arg(long)]
    pub dim: Option<i8>,

    /// Directory for the game trace file
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub trace_dir: PathBuf,
}

impl PlayArgs {
    /// Resolve the effective options and validate them
    pub fn to_options(&self) -> Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::load(path)
                .with_context(|| format!("Failed to load options: {}", path.display()))?,
            None => Options::default(),
        };

        if let Some(max_depth) = self.max_depth {
            options.max_depth = max_depth;
            options.min_depth = options.min_depth.min(max_depth);
        }
        if let Some(max_time) = self.max_time {
            options.max_time = max_time;
        }
        if let Some(game_type) = self.game_type {
            options.game_type = game_type.into();
        }
        if let Some(broker) = &self.broker {
            options.broker = Some(broker.clone());
        }
        if let Some(max_turns) = self.max_turns {
            options.max_turns = Some(max_turns);
        }
        if let Some(alpha_beta) = self.alpha_beta {
            options.alpha_beta = alpha_beta;
        }
        if let Some(heuristic) = self.heuristic {
            options.heuristic = Heuristic::try_from(heuristic)?;
        }
        if self.randomize {
            options.randomize_moves = true;
        }
        if let Some(seed) = self.seed {
            options.seed = Some(seed);
        }
        if let Some(dim) = self.dim {
            options.dim = dim;
        }

        options.validate().context("Invalid options")?;
        Ok(options)
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Resolve options
/// 2. Play the match on stdin/stdout
/// 3. Write the trace file
pub fn run(args: PlayArgs) -> Result<()> {
    let options = args.to_options()?;

    tracing::info!(
        "Starting match: {:?} (depth={}, time={}s, alpha_beta={}, heuristic=e{}, max_turns={:?})",
        options.game_type,
        options.max_depth,
        options.max_time,
        options.alpha_beta,
        u8::from(options.heuristic),
        options.max_turns
    );

    let stdin = std::io::stdin();
    let runner = MatchRunner::new(options, stdin.lock(), std::io::stdout())?;
    let outcome = runner.play()?;

    let path = outcome.trace.write_to(&args.trace_dir)?;
    tracing::info!("Trace written to {}", path.display());

    Ok(())
}

// ============================================================================
// LEVEL 2 - MATCH LOOP
// ============================================================================

/// Result of a finished match
#[derive(Debug)]
pub struct MatchOutcome {
    pub winner: Player,
    pub turns_played: u32,
    pub final_state: GameState,
    pub stats: Stats,
    pub trace: Trace,
}

/// Drives one match. Human input comes from `input` (or the broker when one
/// is configured); everything meant for the player goes to `out`.
pub struct MatchRunner<R, W> {
    game: GameState,
    ai: SearchAI,
    stats: Stats,
    broker: Option<BlockingBroker>,
    input: R,
    out: W,
    trace: Trace,
}

impl<R: BufRead, W: Write> MatchRunner<R, W> {
    /// New match with the standard deployment
    pub fn new(options: Options, input: R, out: W) -> Result<Self> {
        Self::with_state(GameState::new(options), input, out)
    }

    /// Continue a match from an arbitrary position
    pub fn with_state(game: GameState, input: R, out: W) -> Result<Self> {
        let broker = match &game.options().broker {
            Some(url) => Some(
                BlockingBroker::new(url.as_str())
                    .with_context(|| format!("Failed to start broker client for {}", url))?,
            ),
            None => None,
        };

        Ok(Self {
            ai: SearchAI::new(game.options()),
            stats: Stats::new(),
            trace: Trace::new(game.options()),
            broker,
            input,
            out,
            game,
        })
    }

    /// Replace the broker client (e.g. to tune its poll interval)
    pub fn with_broker(mut self, broker: BlockingBroker) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Play until a winner is known
    pub fn play(mut self) -> Result<MatchOutcome> {
        loop {
            writeln!(self.out, "{}", self.game)?;
            self.trace.record_board(&self.game);

            if let Some(winner) = self.game.winner() {
                let turns_played = self.game.turns_played();
                writeln!(self.out, "{} wins!", winner)?;
                tracing::info!("{} wins in {} turns", winner, turns_played);
                self.trace.record_result(winner, turns_played);

                return Ok(MatchOutcome {
                    winner,
                    turns_played,
                    final_state: self.game,
                    stats: self.stats,
                    trace: self.trace,
                });
            }

            self.play_turn()?;
        }
    }

    /// Play one turn for whoever is next
    pub fn play_turn(&mut self) -> Result<()> {
        let player = self.game.next_player();
        if self.game.options().game_type.is_human(player) {
            self.human_turn()
        } else {
            self.computer_turn()
        }
    }

    // ========================================================================
    // LEVEL 3 - TURNS
    // ========================================================================

    fn human_turn(&mut self) -> Result<()> {
        if self.broker.is_some() {
            return self.broker_turn();
        }

        let player = self.game.next_player();
        loop {
            let mv = self.read_move()?;
            match self.game.perform_move(mv) {
                Ok(summary) => {
                    writeln!(self.out, "Player {}", summary)?;
                    tracing::info!("Player {}", summary);
                    self.trace.record_turn(&summary);
                    self.game.next_turn();
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!("{} rejected: {}", player, err);
                    writeln!(self.out, "The move is not valid! Try again.")?;
                }
            }
        }
    }

    /// Poll the broker until a playable move for the next turn arrives
    fn broker_turn(&mut self) -> Result<()> {
        let Some(broker) = self.broker.as_ref() else {
            bail!("no broker configured");
        };
        writeln!(self.out, "Getting next move with auto-retry from game broker...")?;

        loop {
            match broker.fetch_move(self.game.turns_played() + 1) {
                Ok(Some(mv)) => match self.game.perform_move(mv) {
                    Ok(summary) => {
                        writeln!(self.out, "Broker {}", summary)?;
                        tracing::info!("Broker {}", summary);
                        self.trace.record_turn(&summary);
                        self.game.next_turn();
                        return Ok(());
                    }
                    Err(err) => tracing::warn!("Broker sent an unplayable move: {}", err),
                },
                Ok(None) => {}
                Err(err) => tracing::warn!("Broker error: {}", err),
            }
            thread::sleep(broker.poll_interval());
        }
    }

    fn computer_turn(&mut self) -> Result<()> {
        let player = self.game.next_player();
        let (best_move, report) = self.ai.suggest_move(&mut self.game, &mut self.stats);
        writeln!(self.out, "{}", report)?;

        let Some(mv) = best_move else {
            writeln!(self.out, "Computer doesn't know what to do!!!")?;
            tracing::warn!("{} computer produced no move", player);
            self.trace.record_turn(&report);
            // Only a timeout forfeit may leave the turn without a move
            if !self.game.is_finished() {
                bail!("{} computer produced no move and the game is not over", player);
            }
            return Ok(());
        };

        let summary = self
            .game
            .perform_move_for(mv, player)
            .context("Search produced an unplayable move")?;
        writeln!(self.out, "Computer {}", summary)?;
        tracing::info!("Computer {}", summary);
        self.trace
            .record_turn(&format!("{}\n\nComputer {}", report, summary));
        self.game.next_turn();

        if let Some(broker) = &self.broker {
            if let Err(err) = broker.post_move(mv, self.game.turns_played()) {
                tracing::warn!("Broker error: {}", err);
            }
        }
        Ok(())
    }

    // ========================================================================
    // LEVEL 4 - INPUT
    // ========================================================================

    /// Prompt until the input yields an on-board move
    fn read_move(&mut self) -> Result<Move> {
        let player = self.game.next_player();
        loop {
            write!(self.out, "Player {}, enter your move: ", player)?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!("Input closed while waiting for a {} move", player);
            }

            match Move::parse(&line) {
                Some(mv) if self.game.is_valid_coord(mv.src) && self.game.is_valid_coord(mv.dst) => {
                    return Ok(mv)
                }
                _ => {
                    tracing::warn!("Unreadable move input: {:?}", line.trim());
                    writeln!(self.out, "Invalid coordinates! Try again.")?;
                }
            }
        }
    }
}
