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
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    Resignation,
    MoveCapExceeded,
    Repetition,
}

impl Termination {
    pub fn label(&self) -> &'static str {
        match self {
            Termination::Resignation => "resignation",
            Termination::MoveCapExceeded => "move-cap-exceeded",
            Termination::Repetition => "repetition",
        }
    }
}

impl Display for Termination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Win/draw counters of a run, indexed by engine (0 = first engine, 1 = second engine).
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct ScoreBoard {
    pub wins: [usize; 2],
    pub draws: usize,
}

impl ScoreBoard {
    pub fn add(&mut self, winner: Option<usize>) {
        match winner {
            Some(side) => self.wins[side & 1] += 1,
            None => self.draws += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.wins[0] + self.wins[1] + self.draws
    }

    /// Renders the score as `<wins engine 1>-<draws>-<wins engine 2>/<games>`
    pub fn render(&self) -> String {
        format!("{}-{}-{}/{}", self.wins[0], self.draws, self.wins[1], self.total())
    }
}

impl Display for ScoreBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
