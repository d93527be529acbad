//! Snapshot watcher: rebuild the graph when the ingestion pipeline rewrites a snapshot file.

mod watcher;

pub use watcher::{run_watcher_thread, SnapshotDebouncer};

use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;

use crate::context::GraphContext;
use crate::error::Result;
use crate::snapshot::SNAPSHOT_FILES;

/// Whether `path` is one of the four snapshot files.
pub fn is_snapshot_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| SNAPSHOT_FILES.contains(&name))
}

/// Refresh the context after a settled burst of snapshot writes. Refresh
/// failures are logged and the previous graph keeps serving.
pub fn handle_snapshot_change(ctx: &GraphContext, files: &[String]) -> bool {
    match ctx.refresh() {
        Ok(true) => {
            log::info!("watch: {} changed, graph rebuilt", files.join(", "));
            true
        }
        Ok(false) => false,
        Err(e) => {
            log::warn!(
                "watch: refresh after changes to {} failed, keeping previous graph: {}",
                files.join(", "),
                e
            );
            false
        }
    }
}

/// Spawn the watcher and the refresh loop on background threads.
pub fn spawn(ctx: Arc<GraphContext>, debounce_ms: u64) -> Result<()> {
    let root = ctx.data_dir().to_path_buf();
    log::info!("Watching {} for snapshot changes", root.display());
    let (tx, rx) = mpsc::channel();

    std::thread::Builder::new()
        .name("snapshot-watcher".to_string())
        .spawn(move || {
            if let Err(e) = run_watcher_thread(&root, debounce_ms, tx) {
                log::error!("watch: watcher stopped: {}", e);
            }
        })?;

    std::thread::Builder::new()
        .name("snapshot-refresh".to_string())
        .spawn(move || {
            for files in rx {
                handle_snapshot_change(&ctx, &files);
            }
        })?;

    Ok(())
}
