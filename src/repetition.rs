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

// Positions up to this length are never reported as repetitions
const MIN_CHECK_LEN: usize = 50;

// Length of the trailing slice used as the repetition signature
const SIGNATURE_LEN: usize = 15;

const REQUIRED_OCCURRENCES: usize = 4;

/// Heuristic repetition (sennichite) check on the accumulated position string.
///
/// The trailing 15 characters are used as a signature, which must occur at least 4 times
/// within the whole string. The check does not know about move boundaries, so it may
/// trigger slightly early or late compared to a real position based repetition check.
pub fn is_repetition(sfen: &str) -> bool {
    if sfen.chars().count() <= MIN_CHECK_LEN {
        return false;
    }

    let signature_start = match sfen.char_indices().rev().nth(SIGNATURE_LEN - 1) {
        Some((i, _)) => i,
        None => return false,
    };
    let signature = &sfen[signature_start..];
    let step = signature.chars().next().map_or(1, char::len_utf8);

    let mut from = 0;
    for _ in 0..REQUIRED_OCCURRENCES {
        match sfen[from..].find(signature) {
            Some(i) => from += i + step,
            None => return false,
        }
    }

    true
}
