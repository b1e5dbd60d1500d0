//! Background planning jobs with progress, cancellation and a deadline

use super::request::PlanRequest;
use super::service::Planner;
use crate::core::config::ConfigOverrides;
use crate::core::error::PlannerError;
use crate::core::types::{JobId, PlanId};
use crate::placement::{CancelToken, PlacementResult};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Deadline after which a job is aborted
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a finished job stays queryable before it is dropped
pub const DEFAULT_JOB_RETENTION: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Processing { progress: u8 },
    Completed { plan_id: PlanId },
    Failed { message: String },
    Cancelled,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Processing { .. })
    }
}

struct JobEntry {
    status: JobStatus,
    progress: Arc<AtomicU8>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
    finished_at: Option<Instant>,
}

impl JobEntry {
    fn finish(&mut self, status: JobStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
    }
}

type JobTable = Arc<Mutex<AHashMap<JobId, JobEntry>>>;

fn lock(jobs: &JobTable) -> MutexGuard<'_, AHashMap<JobId, JobEntry>> {
    jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registry of planning runs on tokio's blocking pool
///
/// Must be used from inside a tokio runtime. Finished jobs are dropped
/// once they are older than the retention period; the sweep runs on every
/// submission.
#[derive(Clone)]
pub struct PlanningJobs {
    planner: Arc<Planner>,
    jobs: JobTable,
    timeout: Duration,
    retention: Duration,
}

impl PlanningJobs {
    pub fn new(planner: Arc<Planner>) -> Self {
        Self {
            planner,
            jobs: Arc::new(Mutex::new(AHashMap::new())),
            timeout: DEFAULT_JOB_TIMEOUT,
            retention: DEFAULT_JOB_RETENTION,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Jobs currently tracked, running or finished
    pub fn len(&self) -> usize {
        lock(&self.jobs).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.jobs).is_empty()
    }

    fn prune(&self) {
        let now = Instant::now();
        let retention = self.retention;
        let mut jobs = lock(&self.jobs);
        let before = jobs.len();
        jobs.retain(|_, entry| {
            entry
                .finished_at
                .map_or(true, |at| now.duration_since(at) < retention)
        });
        let dropped = before - jobs.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped finished planning jobs");
        }
    }

    /// Forget a finished job; running jobs are kept
    pub fn remove(&self, id: JobId) -> bool {
        let mut jobs = lock(&self.jobs);
        match jobs.get(&id) {
            Some(entry) if entry.status.is_finished() => {
                jobs.remove(&id);
                true
            }
            _ => false,
        }
    }

    pub fn submit(&self, request: PlanRequest, stored: Option<ConfigOverrides>) -> JobId {
        self.prune();
        let id = JobId::new();
        let progress = Arc::new(AtomicU8::new(0));
        let cancel = CancelToken::with_timeout(self.timeout);

        // Registered before spawning so the task always finds its entry
        lock(&self.jobs).insert(
            id,
            JobEntry {
                status: JobStatus::Processing { progress: 0 },
                progress: Arc::clone(&progress),
                cancel: cancel.clone(),
                handle: None,
                finished_at: None,
            },
        );

        let planner = Arc::clone(&self.planner);
        let jobs = Arc::clone(&self.jobs);
        let timeout = self.timeout;
        let handle = tokio::task::spawn_blocking(move || {
            let outcome = planner.plan_with(&request, stored.as_ref(), &cancel, &*progress);
            let status = match outcome {
                Ok(outcome) => JobStatus::Completed {
                    plan_id: outcome.id,
                },
                Err(PlannerError::Cancelled) if cancel.is_cancel_requested() => JobStatus::Cancelled,
                Err(PlannerError::Cancelled) => JobStatus::Failed {
                    message: format!("Planning timed out after {}s", timeout.as_secs()),
                },
                Err(err) => JobStatus::Failed {
                    message: err.to_string(),
                },
            };
            tracing::info!(job = %id, ?status, "Planning job finished");
            if let Some(entry) = lock(&jobs).get_mut(&id) {
                entry.finish(status);
            }
        });

        if let Some(entry) = lock(&self.jobs).get_mut(&id) {
            entry.handle = Some(handle);
        }
        tracing::debug!(job = %id, "Planning job submitted");
        id
    }

    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        let jobs = lock(&self.jobs);
        let entry = jobs.get(&id)?;
        Some(match &entry.status {
            JobStatus::Processing { .. } => JobStatus::Processing {
                progress: entry.progress.load(Ordering::Relaxed),
            },
            finished => finished.clone(),
        })
    }

    /// Request cancellation; false if the job is unknown or already finished
    pub fn cancel(&self, id: JobId) -> bool {
        match lock(&self.jobs).get(&id) {
            Some(entry) if !entry.status.is_finished() => {
                entry.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Wait for a job to finish and return its final status
    pub async fn wait(&self, id: JobId) -> Option<JobStatus> {
        let handle = lock(&self.jobs).get_mut(&id)?.handle.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                if let Some(entry) = lock(&self.jobs).get_mut(&id) {
                    entry.finish(JobStatus::Failed {
                        message: format!("Planning job aborted: {err}"),
                    });
                }
            }
        }
        self.status(id)
    }

    /// Result of a completed job, while the store still holds it
    pub fn result(&self, id: JobId) -> Option<Arc<PlacementResult>> {
        match self.status(id)? {
            JobStatus::Completed { plan_id } => self.planner.store().get(&plan_id),
            _ => None,
        }
    }
}
