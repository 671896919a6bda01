//! Plain-text match trace
//!
//! Layout: configuration header, then the board before every turn followed
//! by that turn's description, then the result line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use wargame_core::{GameState, GameType, Options, Player};

#[derive(Clone, Debug)]
pub struct Trace {
    file_name: String,
    text: String,
}

impl Trace {
    pub fn new(options: &Options) -> Self {
        let mut trace = Self {
            file_name: file_name(options),
            text: String::new(),
        };
        trace.write_header(options);
        trace
    }

    fn write_header(&mut self, options: &Options) {
        let role = |player| {
            if options.game_type.is_human(player) {
                "Human"
            } else {
                "AI"
            }
        };
        self.text += &format!(
            "Recorded: {}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        self.text += &format!(
            "Player 1: {}\nPlayer 2: {}\n",
            role(Player::Attacker),
            role(Player::Defender)
        );
        if options.game_type != GameType::AttackerVsDefender {
            self.text += &format!(
                "Alpha-Beta: {}\n\nHeuristic used: e{}\n\n",
                options.alpha_beta,
                u8::from(options.heuristic)
            );
        } else {
            self.text += "\n";
        }
        self.text += &format!("Max turns: {}\n\n", max_turns_label(options));
        self.text += &format!("Timeout time: {} seconds\n\n", options.max_time);
    }

    pub fn record_board(&mut self, state: &GameState) {
        self.text += &format!("{}\n", state);
    }

    pub fn record_turn(&mut self, description: &str) {
        self.text += description;
        self.text += "\n\n";
    }

    pub fn record_result(&mut self, winner: Player, turns_played: u32) {
        self.text += &format!("{} wins in {} turns", winner, turns_played);
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Write the trace into `dir`, returning the file path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.text)
            .with_context(|| format!("Failed to write trace: {}", path.display()))?;
        Ok(path)
    }
}

/// `gameTrace-<alpha_beta>-<max_time>-<max_turns>.txt`
fn file_name(options: &Options) -> String {
    format!(
        "gameTrace-{}-{:?}-{}.txt",
        options.alpha_beta,
        options.max_time,
        max_turns_label(options)
    )
}

fn max_turns_label(options: &Options) -> String {
    options
        .max_turns
        .map_or_else(|| "None".to_string(), |turns| turns.to_string())
}
