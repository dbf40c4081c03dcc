//! Content change detection for the dev server.
//!
//! A polling watcher checks file modification state at a fixed interval
//! and reports batches of changes over a channel. The watcher shares no
//! state with the build pipeline; the serve loop reacts to a batch by
//! re-running the whole pipeline.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Config as NotifyConfig, PollWatcher, RecursiveMode, Watcher};

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// Watches a directory tree and batches change notifications.
pub struct DirectoryWatcher {
    rx: Receiver<notify::Result<notify::Event>>,
    // kept alive; dropping it stops the polling thread
    _watcher: PollWatcher,
}

impl DirectoryWatcher {
    /// Watch `dir` recursively, polling modification state every
    /// `poll_interval`.
    pub fn new(dir: &Path, poll_interval: Duration) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel();
        let config = NotifyConfig::default().with_poll_interval(poll_interval);
        let mut watcher = PollWatcher::new(tx, config)?;
        watcher.watch(dir, RecursiveMode::Recursive)?;

        Ok(Self {
            rx,
            _watcher: watcher,
        })
    }

    /// Block until at least one change arrives, then drain whatever else
    /// is already queued so one save burst triggers one rebuild. Returns
    /// `None` when the watcher channel closes.
    pub fn wait_for_changes(&self) -> Option<Vec<PathBuf>> {
        let first = self.rx.recv().ok()?;
        let mut changed = Vec::new();
        collect_paths(first, &mut changed);

        // settle window: batch events from the same burst of writes
        loop {
            match self.rx.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => collect_paths(event, &mut changed),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        Some(changed)
    }
}

fn collect_paths(event: notify::Result<notify::Event>, changed: &mut Vec<PathBuf>) {
    match event {
        Ok(event) => changed.extend(event.paths),
        Err(e) => crate::warn!("watch error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_file_change() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("post.md"), "v1").unwrap();

        let watcher = DirectoryWatcher::new(dir.path(), Duration::from_millis(50)).unwrap();
        // notify's PollWatcher tracks mtimes at whole-second granularity, so
        // the rewrite must land in a later second than the initial write.
        std::thread::sleep(Duration::from_millis(1100));
        std::fs::write(dir.path().join("post.md"), "v2 with more content").unwrap();

        let changed = watcher.wait_for_changes().unwrap();
        assert!(
            changed.iter().any(|p| p.ends_with("post.md")),
            "{changed:?}"
        );
    }
}
