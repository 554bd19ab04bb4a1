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

pub const READY_OK: &str = "readyok";
pub const BESTMOVE_PREFIX: &str = "bestmove ";
pub const RESIGN: &str = "resign";

/// Command/response link to a USI engine.
///
/// An engine, which is no longer running, is never reported as an error: waiting
/// operations return `false` or `None` instead, and `exited` turns true.
pub trait Engine {
    fn name(&self) -> &str;

    /// Sends a single command line to the engine
    fn send(&mut self, cmd: &str);

    /// Discards engine output until a line equal to `token` arrives.
    /// Returns false, if the engine exited before sending it.
    fn wait_for(&mut self, token: &str) -> bool;

    /// Discards engine output until a `bestmove` line arrives and returns the announced move.
    fn wait_for_bestmove(&mut self) -> Option<String>;

    fn exited(&self) -> bool;
}

/// Extracts the move from a `bestmove` line
pub fn parse_bestmove(line: &str) -> Option<&str> {
    line.strip_prefix(BESTMOVE_PREFIX).map(str::trim)
}
