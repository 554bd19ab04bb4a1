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
use log::{info, warn};
use rand::Rng;
use crate::config::RunnerConfig;
use crate::engine::{Engine, READY_OK, RESIGN};
use crate::position::Position;
use crate::records::GameRecords;
use crate::repetition::is_repetition;
use crate::score::{ScoreBoard, Termination};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    /// `winner` is None for a draw
    Finished { winner: Option<usize>, termination: Termination },

    /// An engine exited during the game, which is therefore not counted
    Aborted,
}

/// Plays consecutive games between two engines until one of them exits.
pub struct GameRunner<'a, E: Engine> {
    config: &'a RunnerConfig,
    engines: [E; 2],
    score: ScoreBoard,
    records: GameRecords,
    games: u32,
}

impl<'a, E: Engine> GameRunner<'a, E> {
    /// Completes the handshake with both engines, which must have been sent `usi` and `isready` already.
    pub fn new(config: &'a RunnerConfig, mut engines: [E; 2]) -> anyhow::Result<GameRunner<'a, E>> {
        for engine in engines.iter_mut() {
            if !engine.wait_for(READY_OK) {
                warn!("{} exited before sending {}", engine.name(), READY_OK);
            }
        }

        let records = GameRecords::open(config)?;

        Ok(GameRunner {
            config,
            engines,
            score: ScoreBoard::default(),
            records,
            games: 0,
        })
    }

    /// Runs games with a random engine moving first in the first game
    pub fn run(&mut self) -> anyhow::Result<()> {
        let first_mover = rand::thread_rng().gen_range(0..2);
        self.run_from(first_mover)
    }

    pub fn run_from(&mut self, first_mover: usize) -> anyhow::Result<()> {
        let mut first_mover = first_mover & 1;

        while !self.engines[0].exited() && !self.engines[1].exited() {
            if self.config.max_games.map_or(false, |max_games| self.games >= max_games) {
                info!("Stopping after {} games", self.games);
                break;
            }

            self.play_game(first_mover)?;
            first_mover ^= 1;
        }

        info!("Final score: {}", self.score);
        Ok(())
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn play_game(&mut self, first_mover: usize) -> anyhow::Result<GameOutcome> {
        self.games += 1;
        info!("Game {}: {} moves first", self.games, self.engines[first_mover & 1].name());

        for engine in self.engines.iter_mut() {
            engine.send("usinewgame");
        }

        let go_cmd = self.config.go_command();
        let mut pos = Position::new(first_mover);

        let outcome = loop {
            let side = pos.side_to_move();
            let engine = &mut self.engines[side];
            engine.send(pos.sfen());
            engine.send(&go_cmd);

            let mv = match engine.wait_for_bestmove() {
                Some(mv) => mv,
                None => {
                    warn!("{} exited during game {}, result is not counted", engine.name(), self.games);
                    break GameOutcome::Aborted;
                }
            };

            if mv == RESIGN {
                break GameOutcome::Finished { winner: Some(side ^ 1), termination: Termination::Resignation };
            }

            pos.add_move(&mv);

            if pos.move_count() >= self.config.max_moves {
                break GameOutcome::Finished { winner: None, termination: Termination::MoveCapExceeded };
            }

            if is_repetition(pos.sfen()) {
                break GameOutcome::Finished { winner: None, termination: Termination::Repetition };
            }
        };

        if let GameOutcome::Finished { winner, termination } = outcome {
            self.on_game_over(winner, termination)?;
        }

        self.records.write_game(pos.sfen())?;

        Ok(outcome)
    }

    fn on_game_over(&mut self, winner: Option<usize>, termination: Termination) -> anyhow::Result<()> {
        self.score.add(winner);

        match winner {
            Some(winner) => {
                self.engines[winner].send("gameover win");
                self.engines[winner ^ 1].send("gameover lose");
            }
            None => {
                self.engines[0].send("gameover draw");
                self.engines[1].send("gameover draw");
            }
        }

        info!("{}: {}", termination, self.score);
        self.records.write_result(termination, &self.score)
    }
}
