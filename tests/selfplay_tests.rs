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
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use usi_game_runner::config::RunnerConfig;
use usi_game_runner::engine::Engine;
use usi_game_runner::game_runner::GameRunner;
use usi_game_runner::usi_engine::UsiEngine;

// Writing an executable while another test forks can fail with ETXTBSY
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

const TIMEOUT: Option<Duration> = Some(Duration::from_secs(10));

const RESIGNING_ENGINE: &str = r#"
n=0
while IFS= read -r line; do
  case "$line" in
    usi) echo "id name stub-a"; echo "usiok" ;;
    isready) echo "readyok" ;;
    usinewgame) n=0 ;;
    go*)
      n=$((n+1))
      if [ "$n" -eq 1 ]; then echo "bestmove 7g7f"; else echo "bestmove resign"; fi ;;
    quit) exit 0 ;;
  esac
done
"#;

const FIXED_MOVE_ENGINE: &str = r#"
echo "stub-b started" >&2
while IFS= read -r line; do
  case "$line" in
    usi) echo "id name stub-b"; echo "usiok" ;;
    isready) echo "readyok" ;;
    go*) echo "info depth 1 score cp 0 pv 3c3d"; echo "bestmove 3c3d" ;;
    quit) exit 0 ;;
  esac
done
"#;

const CRASHING_ENGINE: &str = r#"
while IFS= read -r line; do
  case "$line" in
    usi) echo "usiok" ;;
    isready) echo "readyok" ;;
    go*) exit 3 ;;
  esac
done
"#;

const WORKDIR_ENGINE: &str = r#"
while IFS= read -r line; do
  case "$line" in
    isready) if [ -f ./engine.marker ]; then echo "readyok"; else echo "nomarker"; fi ;;
    quit) exit 0 ;;
  esac
done
"#;

const STDERR_ONLY_ENGINE: &str = r#"
while IFS= read -r line; do
  case "$line" in
    isready) echo "readyok" >&2; echo "bestmove 1a1b" >&2; exit 0 ;;
  esac
done
"#;

fn lock() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("usi-game-runner-it-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_engine(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", script)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn test_config(dir: &Path, max_games: Option<u32>) -> RunnerConfig {
    RunnerConfig {
        sfen_file: dir.join("games.sfen"),
        log_file: dir.join("games.log"),
        max_games,
        response_timeout_ms: Some(10_000),
        ..RunnerConfig::default()
    }
}

#[test]
fn plays_game_until_resignation() {
    let _guard = lock();
    let dir = test_dir("resign");
    let engine_a = write_engine(&dir, "engine_a.sh", RESIGNING_ENGINE);
    let engine_b = write_engine(&dir, "engine_b.sh", FIXED_MOVE_ENGINE);
    let config = test_config(&dir, Some(1));

    let engines = [
        UsiEngine::start("engine1", &engine_a, TIMEOUT).unwrap(),
        UsiEngine::start("engine2", &engine_b, TIMEOUT).unwrap(),
    ];
    let mut runner = GameRunner::new(&config, engines).unwrap();
    runner.run_from(0).unwrap();

    assert_eq!([0, 1], runner.score().wins);
    assert_eq!(0, runner.score().draws);

    let games = fs::read_to_string(&config.sfen_file).unwrap();
    assert_eq!("position startpos moves 7g7f 3c3d\n", games);

    let results = fs::read_to_string(&config.log_file).unwrap();
    assert_eq!(Some("resignation: 0-0-1/1"), results.lines().last());
}

#[test]
fn alternates_first_mover_between_games() {
    let _guard = lock();
    let dir = test_dir("alternate");
    let engine_a = write_engine(&dir, "engine_a.sh", RESIGNING_ENGINE);
    let engine_b = write_engine(&dir, "engine_b.sh", FIXED_MOVE_ENGINE);
    let config = test_config(&dir, Some(2));

    let engines = [
        UsiEngine::start("engine1", &engine_a, TIMEOUT).unwrap(),
        UsiEngine::start("engine2", &engine_b, TIMEOUT).unwrap(),
    ];
    let mut runner = GameRunner::new(&config, engines).unwrap();
    runner.run_from(1).unwrap();

    let games = fs::read_to_string(&config.sfen_file).unwrap();
    assert_eq!(vec![
        "position startpos moves 3c3d 7g7f 3c3d",
        "position startpos moves 7g7f 3c3d",
    ], games.lines().collect::<Vec<_>>());

    assert_eq!([0, 2], runner.score().wins);
    let results = fs::read_to_string(&config.log_file).unwrap();
    assert_eq!(Some("resignation: 0-0-2/2"), results.lines().last());
}

#[test]
fn crashed_engine_aborts_game() {
    let _guard = lock();
    let dir = test_dir("crash");
    let engine_a = write_engine(&dir, "engine_a.sh", FIXED_MOVE_ENGINE);
    let engine_b = write_engine(&dir, "engine_b.sh", CRASHING_ENGINE);
    let config = test_config(&dir, None);

    let engines = [
        UsiEngine::start("engine1", &engine_a, TIMEOUT).unwrap(),
        UsiEngine::start("engine2", &engine_b, TIMEOUT).unwrap(),
    ];
    let mut runner = GameRunner::new(&config, engines).unwrap();
    runner.run_from(0).unwrap();

    assert_eq!(0, runner.score().total());

    let games = fs::read_to_string(&config.sfen_file).unwrap();
    assert_eq!("position startpos moves 3c3d\n", games);

    let results = fs::read_to_string(&config.log_file).unwrap();
    assert_eq!(1, results.lines().count());
}

#[test]
fn reports_exit_instead_of_bestmove() {
    let _guard = lock();
    let dir = test_dir("exit");
    let path = write_engine(&dir, "engine.sh", CRASHING_ENGINE);

    let mut engine = UsiEngine::start("engine1", &path, TIMEOUT).unwrap();
    assert!(engine.wait_for("readyok"));
    assert!(!engine.exited());

    engine.send("position startpos");
    engine.send("go btime 0 wtime 0 byoyomi 1000");
    assert_eq!(None, engine.wait_for_bestmove());
    assert!(engine.exited());

    // Sending to an exited engine is not an error
    engine.send("usinewgame");
    assert!(!engine.wait_for("readyok"));
}

#[test]
fn runs_engine_in_its_own_directory() {
    let _guard = lock();
    let dir = test_dir("workdir");
    let path = write_engine(&dir, "engine.sh", WORKDIR_ENGINE);
    fs::write(dir.join("engine.marker"), "").unwrap();

    let mut engine = UsiEngine::start("engine1", &path, TIMEOUT).unwrap();
    assert!(engine.wait_for("readyok"));
}

#[test]
fn runs_symlinked_engine_next_to_link() {
    let _guard = lock();
    let dir = test_dir("symlink");
    fs::create_dir_all(dir.join("builds")).unwrap();
    fs::create_dir_all(dir.join("player")).unwrap();
    let target = write_engine(&dir.join("builds"), "engine.sh", WORKDIR_ENGINE);
    let link = dir.join("player").join("engine");
    std::os::unix::fs::symlink(&target, &link).unwrap();
    fs::write(dir.join("player").join("engine.marker"), "").unwrap();

    let mut engine = UsiEngine::start("engine1", &link, TIMEOUT).unwrap();
    assert!(engine.wait_for("readyok"));
}

#[test]
fn ignores_stderr_output() {
    let _guard = lock();
    let dir = test_dir("stderr");
    let path = write_engine(&dir, "engine.sh", STDERR_ONLY_ENGINE);

    let mut engine = UsiEngine::start("engine1", &path, TIMEOUT).unwrap();
    assert!(!engine.wait_for("readyok"));
    assert!(engine.exited());
    assert_eq!(None, engine.wait_for_bestmove());
}

#[test]
fn rejects_wrong_argument_count() {
    let _guard = lock();
    let dir = test_dir("usage");

    for args in [vec![], vec!["engine_a"], vec!["engine_a", "engine_b", "engine_c"]] {
        let output = Command::new(env!("CARGO_BIN_EXE_usi-game-runner"))
            .args(&args)
            .current_dir(&dir)
            .output()
            .unwrap();

        assert_eq!(Some(1), output.status.code(), "args: {:?}", args);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Usage: usi-game-runner <engine1> <engine2>"), "stderr: {}", stderr);
    }

    assert!(!dir.join("games.sfen").exists());
    assert!(!dir.join("games.log").exists());
}

#[test]
fn fails_to_start_missing_engine() {
    let dir = test_dir("missing");
    assert!(UsiEngine::start("engine1", &dir.join("no_such_engine"), TIMEOUT).is_err());
}
