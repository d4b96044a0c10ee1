//! Per-path build queues and their completion queries.
//!
//! Every path owns an ordered queue of [`BuildRecord`]s; insertion order is
//! execution order. A path is finished when every record in its queue has
//! resolved, and the tracker is finished when every path is. A tracker with
//! no builds at all is finished too: callers that need "builds ran and
//! completed" must also check [`BuildQueues::is_empty`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use jiff::Timestamp;
use log::{debug, error};

use crate::{
    error::{PlanError, Result},
    models::{BuildOutcome, BuildRecord, BuildSummary},
    params::RegisterBuild,
};

static NEXT_TRACKER_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to one registered build, used by the executor to report progress.
///
/// A handle only resolves against the tracker that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildHandle {
    tracker: u64,
    path: String,
    index: usize,
}

impl BuildHandle {
    /// Target path of the build.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Position of the build within its path's queue.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Lock-protected map from path to its queue of builds.
#[derive(Debug)]
pub struct BuildQueues {
    id: u64,
    queues: Mutex<BTreeMap<String, Vec<BuildRecord>>>,
}

impl Default for BuildQueues {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildQueues {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            id: NEXT_TRACKER_ID.fetch_add(1, Ordering::Relaxed),
            queues: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<BuildRecord>>> {
        // Every mutation is a single assignment, so a poisoned map is still
        // coherent.
        self.queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends a pending build to the path's queue.
    pub fn register(&self, params: &RegisterBuild) -> BuildHandle {
        let mut queues = self.lock();
        let queue = queues.entry(params.path.clone()).or_default();
        queue.push(BuildRecord::new(&params.path, &params.assistant_message_id));
        let handle = BuildHandle {
            tracker: self.id,
            path: params.path.clone(),
            index: queue.len() - 1,
        };
        debug!("registered build #{} for {}", handle.index, handle.path);
        handle
    }

    /// Appends executor output to a pending build's working buffer.
    pub fn append_buffer(&self, handle: &BuildHandle, chunk: &str) -> Result<()> {
        self.with_pending(handle, |record| record.buffer.push_str(chunk))
    }

    /// Resolves a pending build as successful with its final file content.
    pub fn mark_success(&self, handle: &BuildHandle, file_content: impl Into<String>) -> Result<()> {
        let file_content = file_content.into();
        self.with_pending(handle, |record| {
            record.file_content = Some(file_content);
            record.outcome = BuildOutcome::Success;
            record.resolved_at = Some(Timestamp::now());
        })
    }

    /// Resolves a pending build as failed.
    pub fn mark_failed(&self, handle: &BuildHandle, error: impl Into<String>) -> Result<()> {
        let error = error.into();
        self.with_pending(handle, |record| {
            record.outcome = BuildOutcome::Failed { error };
            record.resolved_at = Some(Timestamp::now());
        })
    }

    fn with_pending<F>(&self, handle: &BuildHandle, apply: F) -> Result<()>
    where
        F: FnOnce(&mut BuildRecord),
    {
        let not_found = || PlanError::BuildNotFound {
            path: handle.path.clone(),
            index: handle.index,
        };
        if handle.tracker != self.id {
            return Err(not_found());
        }

        let mut queues = self.lock();
        let record = queues
            .get_mut(&handle.path)
            .and_then(|queue| queue.get_mut(handle.index))
            .ok_or_else(not_found)?;

        if record.is_finished() {
            let fault = PlanError::BuildAlreadyResolved {
                path: handle.path.clone(),
                index: handle.index,
                outcome: record.outcome.as_str(),
            };
            error!("{fault}");
            return Err(fault);
        }

        apply(record);
        Ok(())
    }

    /// Whether every build queued for `path` has resolved. True for a path
    /// with no builds.
    pub fn is_path_finished(&self, path: &str) -> bool {
        self.lock()
            .get(path)
            .map_or(true, |queue| queue.iter().all(BuildRecord::is_finished))
    }

    /// Whether every build on every path has resolved. True when nothing has
    /// been registered.
    pub fn is_all_finished(&self) -> bool {
        self.lock()
            .values()
            .all(|queue| queue.iter().all(BuildRecord::is_finished))
    }

    /// Whether `path` has a build still pending.
    pub fn is_building(&self, path: &str) -> bool {
        !self.is_path_finished(path)
    }

    /// Whether no build has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Paths whose queue has resolved and whose latest build succeeded.
    pub fn built_paths(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(_, queue)| queue.iter().all(BuildRecord::is_finished))
            .filter(|(_, queue)| {
                queue
                    .last()
                    .is_some_and(|record| record.outcome == BuildOutcome::Success)
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Copy of the record behind `handle`.
    pub fn record(&self, handle: &BuildHandle) -> Option<BuildRecord> {
        if handle.tracker != self.id {
            return None;
        }
        self.lock()
            .get(&handle.path)
            .and_then(|queue| queue.get(handle.index))
            .cloned()
    }

    /// Per-path summaries, sorted by path.
    pub fn summaries(&self) -> Vec<BuildSummary> {
        self.lock()
            .iter()
            .map(|(path, queue)| BuildSummary::from_records(path, queue))
            .collect()
    }
}
