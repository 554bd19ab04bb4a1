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
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use anyhow::Context;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{info, warn};
use crate::engine::{parse_bestmove, Engine};

const QUIT_GRACE_POLLS: u32 = 50;
const QUIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    Line(String),

    /// Sent once after the engine closed its standard output
    Exited,
}

/// Ordered engine output, consumed by the game runner.
pub struct EventQueue {
    name: String,
    events: Receiver<EngineEvent>,
    exited: Arc<AtomicBool>,
    closed: bool,
    unresponsive: bool,
    timeout: Option<Duration>,
}

impl EventQueue {
    pub fn new(name: &str, events: Receiver<EngineEvent>, exited: Arc<AtomicBool>, timeout: Option<Duration>) -> EventQueue {
        EventQueue {
            name: name.to_string(),
            events,
            exited,
            closed: false,
            unresponsive: false,
            timeout,
        }
    }

    /// Blocks until the next output line is available.
    /// Returns None, if the engine exited and all of its output has been consumed.
    pub fn next_line(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }

        let event = match self.timeout {
            Some(timeout) => match self.events.recv_timeout(timeout) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => {
                    warn!("{}: no response within {} ms, treating engine as exited", self.name, timeout.as_millis());
                    self.unresponsive = true;
                    EngineEvent::Exited
                }
                Err(RecvTimeoutError::Disconnected) => EngineEvent::Exited,
            },
            None => self.events.recv().unwrap_or(EngineEvent::Exited),
        };

        match event {
            EngineEvent::Line(line) => Some(line),
            EngineEvent::Exited => {
                self.closed = true;
                None
            }
        }
    }

    pub fn wait_for(&mut self, token: &str) -> bool {
        while let Some(line) = self.next_line() {
            if line == token {
                return true;
            }
        }
        false
    }

    pub fn wait_for_bestmove(&mut self) -> Option<String> {
        while let Some(line) = self.next_line() {
            if let Some(mv) = parse_bestmove(&line) {
                return Some(mv.to_string());
            }
        }
        None
    }

    pub fn exited(&self) -> bool {
        self.unresponsive || self.exited.load(Ordering::Acquire)
    }
}

/// USI engine running as a child process.
pub struct UsiEngine {
    name: String,
    child: Child,
    stdin: ChildStdin,
    queue: EventQueue,
}

impl UsiEngine {
    /// Starts the engine with its own directory as working directory and sends the
    /// `usi` and `isready` handshake commands.
    pub fn start(name: &str, executable: &Path, timeout: Option<Duration>) -> anyhow::Result<UsiEngine> {
        // Symlinks are kept, so the engine runs next to the link it was started from
        let cmd = if executable.is_absolute() {
            executable.to_path_buf()
        } else {
            std::env::current_dir().context("Could not determine current directory")?.join(executable)
        };
        if !cmd.is_file() {
            anyhow::bail!("Could not find engine executable {}", executable.display());
        }
        let work_dir = cmd.parent().unwrap_or_else(|| Path::new("."));

        let mut child = Command::new(&cmd)
            .current_dir(work_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Could not start engine {}", cmd.display()))?;

        let stdin = child.stdin.take().context("Could not get stdin handle for engine process")?;
        let stdout = child.stdout.take().context("Could not get stdout handle for engine process")?;
        let stderr = child.stderr.take().context("Could not get stderr handle for engine process")?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let exited = Arc::new(AtomicBool::new(false));

        let thread_name = name.to_string();
        let thread_exited = exited.clone();
        thread::Builder::new()
            .name(format!("{} stdout", name))
            .spawn(move || pump_events(&thread_name, stdout, &tx, &thread_exited))
            .context("Could not spawn stdout reader thread")?;

        let thread_name = name.to_string();
        thread::Builder::new()
            .name(format!("{} stderr", name))
            .spawn(move || trace_lines(&thread_name, stderr, |_| {}))
            .context("Could not spawn stderr reader thread")?;

        let mut engine = UsiEngine {
            name: name.to_string(),
            child,
            stdin,
            queue: EventQueue::new(name, rx, exited, timeout),
        };

        engine.send("usi");
        engine.send("isready");

        Ok(engine)
    }
}

impl Engine for UsiEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, cmd: &str) {
        info!("{}< {}", self.name, cmd);
        if let Err(e) = writeln!(self.stdin, "{}", cmd).and_then(|_| self.stdin.flush()) {
            warn!("{}: could not send '{}': {}", self.name, cmd, e);
        }
    }

    fn wait_for(&mut self, token: &str) -> bool {
        self.queue.wait_for(token)
    }

    fn wait_for_bestmove(&mut self) -> Option<String> {
        self.queue.wait_for_bestmove()
    }

    fn exited(&self) -> bool {
        self.queue.exited()
    }
}

impl Drop for UsiEngine {
    fn drop(&mut self) {
        if !self.queue.exited() {
            self.send("quit");
        }

        for _ in 0..QUIT_GRACE_POLLS {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(QUIT_POLL_INTERVAL),
                Err(e) => {
                    warn!("{}: could not query engine process state: {}", self.name, e);
                    break;
                }
            }
        }

        if let Err(e) = self.child.kill() {
            warn!("{}: could not kill engine process: {}", self.name, e);
        }
        let _ = self.child.wait();
    }
}

/// Forwards all output lines to the event queue, followed by the `Exited` event.
pub fn pump_events<R: Read>(name: &str, stream: R, tx: &Sender<EngineEvent>, exited: &AtomicBool) {
    trace_lines(name, stream, |line| {
        // The receiver is gone if the runner no longer needs this engine
        let _ = tx.send(EngineEvent::Line(line));
    });

    exited.store(true, Ordering::Release);
    let _ = tx.send(EngineEvent::Exited);
}

fn trace_lines<R: Read>(name: &str, stream: R, mut handle_line: impl FnMut(String)) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(strip_line_end(&buf)).into_owned();
                info!("{}> {}", name, line);
                handle_line(line);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("{}: could not read engine output: {}", name, e);
                break;
            }
        }
    }
}

fn strip_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
