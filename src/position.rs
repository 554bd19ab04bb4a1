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

pub const START_POS: &str = "position startpos";

/// State of a single game: the accumulated USI position command, the side to move and
/// the number of moves played so far.
#[derive(Clone, Debug)]
pub struct Position {
    sfen: String,
    side_to_move: usize,
    move_count: u32,
}

impl Position {
    pub fn new(first_mover: usize) -> Position {
        Position {
            sfen: String::from(START_POS),
            side_to_move: first_mover & 1,
            move_count: 0,
        }
    }

    pub fn add_move(&mut self, mv: &str) {
        if self.move_count == 0 {
            self.sfen.push_str(" moves");
        }
        self.sfen.push(' ');
        self.sfen.push_str(mv);

        self.side_to_move ^= 1;
        self.move_count += 1;
    }

    pub fn sfen(&self) -> &str {
        &self.sfen
    }

    pub fn side_to_move(&self) -> usize {
        self.side_to_move
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }
}
