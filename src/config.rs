/*
 * Velvet Chess Engine
 * Copyright (C) 2025 mhonert (https://github.com/mhonert)
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::Context;
use serde::Deserialize;

/// Optional configuration file, looked up in the current working directory
pub const CONFIG_FILE: &str = "usi-game-runner.toml";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Fixed thinking time per move (there is no clock accounting)
    pub byoyomi_ms: u32,

    /// Games reaching this number of moves are counted as a draw
    pub max_moves: u32,

    /// Move log: one position command per finished or aborted game
    pub sfen_file: PathBuf,

    /// Result log: one score line per finished game
    pub log_file: PathBuf,

    pub engine_names: [String; 2],

    /// Stops the run after this many games (unbounded if not set)
    pub max_games: Option<u32>,

    /// Gives up waiting for an engine response after this time and treats the engine as exited
    pub response_timeout_ms: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            byoyomi_ms: 1000,
            max_moves: 256,
            sfen_file: PathBuf::from("./games.sfen"),
            log_file: PathBuf::from("./games.log"),
            engine_names: [String::from("engine1"), String::from("engine2")],
            max_games: None,
            response_timeout_ms: None,
        }
    }
}

impl RunnerConfig {
    pub fn go_command(&self) -> String {
        format!("go btime 0 wtime 0 byoyomi {}", self.byoyomi_ms)
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }
}

/// Reads the runner configuration from the given file, falling back to the defaults
/// if the file does not exist.
pub fn read_runner_config(file_path: &Path) -> anyhow::Result<RunnerConfig> {
    if !file_path.exists() {
        return Ok(RunnerConfig::default());
    }

    let config_str = std::fs::read_to_string(file_path)
        .with_context(|| format!("Could not read configuration file {}", file_path.display()))?;
    parse_runner_config(&config_str)
        .with_context(|| format!("Invalid configuration file {}", file_path.display()))
}

pub fn parse_runner_config(config_str: &str) -> anyhow::Result<RunnerConfig> {
    let config: RunnerConfig = toml::from_str(config_str)?;

    if config.max_moves == 0 {
        anyhow::bail!("max_moves must be at least 1");
    }

    if config.engine_names[0] == config.engine_names[1] {
        anyhow::bail!("engine names must be different");
    }

    Ok(config)
}
