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
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use anyhow::Context;
use chrono::Local;
use crate::config::RunnerConfig;
use crate::score::{ScoreBoard, Termination};

/// Append-only game output: the move log and the result log.
pub struct GameRecords {
    sfen_file: PathBuf,
    log_file: PathBuf,
    log: BufWriter<File>,
}

impl GameRecords {
    pub fn open(config: &RunnerConfig) -> anyhow::Result<GameRecords> {
        let is_new_log = !config.log_file.exists();
        let mut log = BufWriter::new(open_for_append(&config.log_file)?);

        if is_new_log {
            writeln!(log, "# Logfile created on {}", Local::now().format("%Y-%m-%d %H:%M:%S %z"))?;
            log.flush()?;
        }

        Ok(GameRecords {
            sfen_file: config.sfen_file.clone(),
            log_file: config.log_file.clone(),
            log,
        })
    }

    /// Appends the final position command of a game to the move log
    pub fn write_game(&mut self, sfen: &str) -> anyhow::Result<()> {
        let mut file = open_for_append(&self.sfen_file)?;
        writeln!(file, "{}", sfen)
            .with_context(|| format!("Could not write to {}", self.sfen_file.display()))?;

        Ok(())
    }

    pub fn write_result(&mut self, termination: Termination, score: &ScoreBoard) -> anyhow::Result<()> {
        writeln!(self.log, "{}: {}", termination.label(), score.render())
            .and_then(|_| self.log.flush())
            .with_context(|| format!("Could not write to {}", self.log_file.display()))?;

        Ok(())
    }
}

fn open_for_append(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open {}", path.display()))
}
