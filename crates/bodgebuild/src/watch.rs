// bodge: A minimal build-description tool for C and C++ projects.
// Copyright (C) 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// For inquiries, you can contact us via e-mail at jichuruanjian@idea.edu.cn.

//! Rebuild on change.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use bodgeutil::common::{is_header_file, is_source_file};
use colored::Colorize;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, trace, warn};

pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 3_600_000;
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
const MAX_LOG_NAME_LEN: usize = 256;
const DEBOUNCE_TIME: Duration = Duration::from_millis(300);
const POLL_TIME: Duration = Duration::from_millis(200);

static STOP: AtomicBool = AtomicBool::new(false);

/// Rejects log file names that could escape the project directory.
pub fn check_log_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() {
        bail!("log file name is empty");
    }
    if name.contains("..") {
        bail!("log file name `{}` must not contain `..`", name);
    }
    if name.len() > MAX_LOG_NAME_LEN {
        bail!(
            "log file name is {} characters long, the limit is {}",
            name.len(),
            MAX_LOG_NAME_LEN
        );
    }
    Ok(())
}

/// Plain-text log of watch mode activity, one timestamped line per entry.
pub struct BuildLog {
    path: PathBuf,
    file: File,
}

impl BuildLog {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open build log `{}`", path.display()))?;
        Ok(BuildLog {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&mut self, message: &str) {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        if let Err(e) = writeln!(self.file, "[{}] {}", now, message) {
            warn!("failed to write build log: {}", e);
        }
    }

    pub fn build_started(&mut self) {
        self.log("BUILD START");
    }

    pub fn build_finished(&mut self, ok: bool, elapsed: Duration) {
        let status = if ok { "SUCCESS" } else { "FAILED" };
        self.log(&format!("BUILD END {} ({}ms)", status, elapsed.as_millis()));
    }

    pub fn files_changed(&mut self, paths: &[PathBuf]) {
        for path in paths {
            self.log(&format!("CHANGED {}", path.display()));
        }
    }
}

/// Runs `run` once, then again whenever a source or header under
/// `watch_dir` changes, until Ctrl-C. Returns the exit code.
pub fn watching(
    run: impl Fn() -> anyhow::Result<bool>,
    watch_dir: &Path,
    mut log: Option<BuildLog>,
    max_wait: Duration,
) -> anyhow::Result<i32> {
    if let Some(log) = log.as_mut() {
        log.log(&format!("DAEMON START watching {}", watch_dir.display()));
    }
    let ignored = log.as_ref().map(|l| l.path().to_path_buf());

    debug!(watch_dir = %watch_dir.display(), "initial run before starting watcher");
    run_and_print(&run, log.as_mut());

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())
        .context("failed to create a directory watcher")?;

    {
        static HANDLER_SET: AtomicBool = AtomicBool::new(false);
        if HANDLER_SET
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            ctrlc::set_handler(|| STOP.store(true, Ordering::SeqCst))
                .context("failed to set the Ctrl-C handler")?;
        }
    }

    watcher
        .watch(watch_dir, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch directory `{}`", watch_dir.display()))?;
    info!("watching `{}` recursively", watch_dir.display());

    let quiet = DEBOUNCE_TIME.min(max_wait);
    while !STOP.load(Ordering::SeqCst) {
        let first = match rx.recv_timeout(POLL_TIME) {
            Ok(Ok(evt)) => evt,
            Ok(Err(e)) => {
                warn!("watcher error: {:?}", e);
                continue;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        // Wait for a quiet period, but never longer than `max_wait`.
        let mut events = vec![first];
        let start = Instant::now();
        loop {
            let remaining = max_wait.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }
            match rx.recv_timeout(quiet.min(remaining)) {
                Ok(Ok(evt)) => events.push(evt),
                Ok(Err(_)) => {}
                Err(_) => break,
            }
        }
        debug!("debounced {} filesystem event(s)", events.len());

        let changed = changed_paths(&events, ignored.as_deref());
        if changed.is_empty() {
            trace!("no relevant change");
            continue;
        }
        if let Some(log) = log.as_mut() {
            log.files_changed(&changed);
        }
        run_and_print(&run, log.as_mut());
    }

    if let Some(log) = log.as_mut() {
        log.log("DAEMON STOP");
    }
    Ok(0)
}

fn is_event_relevant(event: &notify::Event) -> bool {
    match event.kind {
        EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => false,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => true,
        _ => false,
    }
}

/// Source and header paths touched by `events`, without duplicates.
pub fn changed_paths(events: &[notify::Event], ignored: Option<&Path>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = vec![];
    for evt in events.iter().filter(|e| is_event_relevant(e)) {
        for path in &evt.paths {
            if ignored.is_some_and(|ignored| path == ignored) {
                continue;
            }
            if !is_source_file(path) && !is_header_file(path) {
                continue;
            }
            if !out.contains(path) {
                out.push(path.clone());
            }
        }
    }
    out
}

fn run_and_print(run: impl FnOnce() -> anyhow::Result<bool>, mut log: Option<&mut BuildLog>) {
    let start = Instant::now();
    if let Some(log) = log.as_mut() {
        log.build_started();
    }
    let ok = match run() {
        Ok(ok) => ok,
        Err(e) => {
            error!(error = ?e, "build failed");
            eprintln!("{}: {:?}", "error".red().bold(), e);
            false
        }
    };
    if let Some(log) = log.as_mut() {
        log.build_finished(ok, start.elapsed());
    }
    if ok {
        println!("{}", "Success, waiting for filesystem changes...".green().bold());
    } else {
        println!("{}", "Had errors, waiting for filesystem changes...".red().bold());
    }
}
