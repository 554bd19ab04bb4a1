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
use std::env;
use std::path::Path;
use std::process::exit;
use env_logger::{Env, Target};
use log::{error, info};
use usi_game_runner::config::{read_runner_config, CONFIG_FILE};
use usi_game_runner::game_runner::GameRunner;
use usi_game_runner::usi_engine::UsiEngine;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "Usage: usi-game-runner <engine1> <engine2>";

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).target(Target::Stdout).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("{}", USAGE);
        exit(1);
    }

    if let Err(e) = run(Path::new(&args[1]), Path::new(&args[2])) {
        error!("{:#}", e);
        exit(1);
    }
}

fn run(engine1_path: &Path, engine2_path: &Path) -> anyhow::Result<()> {
    info!("USI Game Runner v{}", VERSION);

    let config = read_runner_config(Path::new(CONFIG_FILE))?;
    let timeout = config.response_timeout();

    let engines = [
        UsiEngine::start(&config.engine_names[0], engine1_path, timeout)?,
        UsiEngine::start(&config.engine_names[1], engine2_path, timeout)?,
    ];

    let mut runner = GameRunner::new(&config, engines)?;
    runner.run()
}
