//! The work queue feeding the parse-phase worker pool.
//!
//! The feeder is populated exactly once, by a recursive scan of the
//! content root, and then only drained. Any number of workers may call
//! [`Feeder::next`] concurrently; each queued file is delivered exactly
//! once, paired with a strictly increasing sequence index used for log
//! correlation.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use walkdir::WalkDir;

use crate::info;

#[derive(thiserror::Error, Debug)]
pub enum FeederError {
    #[error("content directory not found or inaccessible: {0}")]
    ContentDirMissing(PathBuf),

    #[error("failed to scan content directory: {0}")]
    Scan(#[from] walkdir::Error),
}

/// One unit of parse work: a content file and its dequeue sequence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub index: u32,
    pub path: PathBuf,
}

struct FeederState {
    queue: VecDeque<PathBuf>,
    counter: u32,
}

/// Thread-safe FIFO of discovered content files.
pub struct Feeder {
    state: Mutex<FeederState>,
}

impl Feeder {
    /// Scan `content_dir` recursively and queue every regular file.
    ///
    /// Fails if the directory is missing or unreadable. An existing but
    /// empty directory yields an empty queue, which is a valid zero-page
    /// build. Entries are queued in path order so log output is stable.
    pub fn new(content_dir: &Path) -> Result<Self, FeederError> {
        if !content_dir.is_dir() {
            return Err(FeederError::ContentDirMissing(content_dir.to_path_buf()));
        }

        let mut queue = VecDeque::new();
        for entry in WalkDir::new(content_dir).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                info!("queueing content: {}", entry.path().display());
                queue.push_back(entry.path().to_path_buf());
            }
        }

        Ok(Self {
            state: Mutex::new(FeederState { queue, counter: 0 }),
        })
    }

    /// Pop the next work item, or `None` once the queue is exhausted.
    /// Exhaustion is terminal; the queue is never refilled.
    pub fn next(&self) -> Option<WorkItem> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let path = state.queue.pop_front()?;
        state.counter += 1;
        Some(WorkItem {
            index: state.counter,
            path,
        })
    }

    /// Number of items still queued.
    pub fn remaining(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .queue
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn content_dir(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "body").unwrap();
        }
        dir
    }

    #[test]
    fn test_missing_root_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("content");
        assert!(matches!(
            Feeder::new(&missing),
            Err(FeederError::ContentDirMissing(_))
        ));
    }

    #[test]
    fn test_empty_root_yields_empty_queue() {
        let dir = content_dir(&[]);
        let feeder = Feeder::new(dir.path()).unwrap();
        assert_eq!(feeder.remaining(), 0);
        assert_eq!(feeder.next(), None);
    }

    #[test]
    fn test_sequence_indices_increase_from_one() {
        let dir = content_dir(&["a.md", "b.md", "nested/c.md"]);
        let feeder = Feeder::new(dir.path()).unwrap();
        let indices: Vec<u32> = std::iter::from_fn(|| feeder.next())
            .map(|item| item.index)
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
        // exhaustion is terminal
        assert_eq!(feeder.next(), None);
        assert_eq!(feeder.next(), None);
    }

    #[test]
    fn test_exactly_once_delivery_across_workers() {
        let dir = content_dir(&[
            "a.md", "b.md", "c.md", "d.md", "e.md", "f.md", "g.md", "h.md", "i.md", "j.md",
        ]);

        for workers in 1..=4 {
            let feeder = Feeder::new(dir.path()).unwrap();
            let delivered = Mutex::new(Vec::new());

            std::thread::scope(|scope| {
                for _ in 0..workers {
                    scope.spawn(|| {
                        while let Some(item) = feeder.next() {
                            delivered.lock().unwrap().push(item);
                        }
                    });
                }
            });

            let delivered = delivered.into_inner().unwrap();
            assert_eq!(delivered.len(), 10, "workers={workers}");

            let paths: HashSet<_> = delivered.iter().map(|item| item.path.clone()).collect();
            assert_eq!(paths.len(), 10, "duplicate delivery with workers={workers}");

            let mut indices: Vec<u32> = delivered.iter().map(|item| item.index).collect();
            indices.sort_unstable();
            assert_eq!(indices, (1..=10).collect::<Vec<u32>>());
        }
    }
}
