//! Watcher thread: collapse bursts of snapshot writes into one refresh signal.
//!
//! The ingestion pipeline rewrites all four files in sequence, so the snapshot
//! is debounced as a unit: a signal goes out only once every touched file has
//! been quiet for the debounce window.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};

use super::is_snapshot_file;
use crate::error::{ArbgraphError, Result};

/// Debounce state for one snapshot directory. Pure over `(path, Instant)` so
/// the timing rules can be tested without a filesystem watcher.
#[derive(Debug)]
pub struct SnapshotDebouncer {
    quiet: Duration,
    last_change: Option<Instant>,
    changed: BTreeSet<String>,
}

impl SnapshotDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_change: None,
            changed: BTreeSet::new(),
        }
    }

    /// Note a change to `path` at `now`. Non-snapshot paths are ignored and
    /// do not extend the quiet window. Returns whether the path counted.
    pub fn record(&mut self, path: &Path, now: Instant) -> bool {
        if !is_snapshot_file(path) {
            return false;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            self.changed.insert(name.to_string());
        }
        self.last_change = Some(now);
        true
    }

    /// The changed file names, once the whole snapshot has been quiet for the
    /// debounce window. Resets the state when it fires.
    pub fn poll(&mut self, now: Instant) -> Option<Vec<String>> {
        let last = self.last_change?;
        if now.saturating_duration_since(last) < self.quiet {
            return None;
        }
        self.last_change = None;
        Some(std::mem::take(&mut self.changed).into_iter().collect())
    }

    /// How long the watcher may block before the next `poll` could fire.
    pub fn wait_time(&self, now: Instant) -> Duration {
        match self.last_change {
            Some(last) => self.quiet.saturating_sub(now.saturating_duration_since(last)),
            None => self.quiet,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.last_change.is_some()
    }
}

/// Watch `root` (non-recursively) and send the changed snapshot file names
/// over `tx` once per settled burst. Blocks until `tx`'s receiver is dropped.
pub fn run_watcher_thread(
    root: &Path,
    debounce_ms: u64,
    tx: mpsc::Sender<Vec<String>>,
) -> Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<Vec<PathBuf>>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(ev) => {
                let _ = event_tx.send(ev.paths);
            }
            Err(e) => log::warn!("watch: notify error: {}", e),
        }
    })
    .map_err(|e| ArbgraphError::Watch(e.to_string()))?;

    watcher
        .watch(root, RecursiveMode::NonRecursive)
        .map_err(|e| ArbgraphError::Watch(e.to_string()))?;

    let mut debouncer = SnapshotDebouncer::new(Duration::from_millis(debounce_ms));

    loop {
        let timeout = debouncer.wait_time(Instant::now());
        match event_rx.recv_timeout(timeout) {
            Ok(paths) => {
                let now = Instant::now();
                for path in &paths {
                    debouncer.record(path, now);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if let Some(files) = debouncer.poll(Instant::now()) {
            log::debug!("watch: snapshot settled after changes to {}", files.join(", "));
            if tx.send(files).is_err() {
                return Ok(());
            }
        }
    }
    Ok(())
}
