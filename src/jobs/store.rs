/*!
 * Process-wide job state store.
 *
 * Each job record sits behind its own lock inside an outer registry map, so
 * writers to unrelated jobs never contend. All mutation funnels through
 * `update`, which enforces the terminal-state barrier: once a job reaches
 * completed/error/cancelled, further updates are silently dropped.
 */

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use super::{Job, JobId, JobStatus, RenderInfo};

/// Shared map of job id to job state
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Arc<RwLock<Job>>>>,
}

impl JobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly queued job
    pub fn create(&self, id: JobId) {
        self.jobs
            .write()
            .insert(id, Arc::new(RwLock::new(Job::queued(id))));
    }

    fn entry(&self, id: &JobId) -> Option<Arc<RwLock<Job>>> {
        self.jobs.read().get(id).cloned()
    }

    /// Whether the store knows this job
    pub fn contains(&self, id: &JobId) -> bool {
        self.jobs.read().contains_key(id)
    }

    /// Point-in-time copy of a job's state
    pub fn snapshot(&self, id: &JobId) -> Option<Job> {
        self.entry(id).map(|slot| slot.read().clone())
    }

    /// Apply a mutation to a job. Returns false when the id is unknown or
    /// the job has already reached a terminal state.
    pub fn update<F>(&self, id: &JobId, mutate: F) -> bool
    where
        F: FnOnce(&mut Job),
    {
        let Some(slot) = self.entry(id) else {
            return false;
        };

        let mut job = slot.write();
        if job.status.is_terminal() {
            debug!("Ignoring update to terminal job {}", id);
            return false;
        }

        mutate(&mut job);
        true
    }

    /// Move a job into processing
    pub fn mark_processing(&self, id: &JobId, message: &str) {
        self.update(id, |job| {
            job.status = JobStatus::Processing;
            job.progress = 0;
            job.message = message.to_string();
        });
    }

    /// Advance progress. Progress is monotonic while a job is live: a sample
    /// lower than the current value raises nothing.
    pub fn set_progress(&self, id: &JobId, progress: u8, message: &str) {
        self.update(id, |job| {
            job.progress = job.progress.max(progress.min(100));
            job.message = message.to_string();
        });
    }

    /// Record render telemetry along with its progress value
    pub fn set_render_info(&self, id: &JobId, progress: u8, message: &str, info: RenderInfo) {
        self.update(id, |job| {
            job.progress = job.progress.max(progress.min(100));
            job.message = message.to_string();
            job.render_info = Some(info);
        });
    }

    /// Terminal transition: completed, with the output path recorded
    pub fn complete(&self, id: &JobId, output: PathBuf) {
        self.update(id, |job| {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.message = "Video created successfully".to_string();
            job.output_file = Some(output);
        });
    }

    /// Terminal transition: error. Progress resets to zero so pollers cannot
    /// mistake a stalled value for advancement.
    pub fn fail(&self, id: &JobId, message: &str) {
        self.update(id, |job| {
            job.status = JobStatus::Error;
            job.progress = 0;
            job.message = format!("Error: {}", message);
            job.output_file = None;
        });
    }

    /// Terminal transition: cancelled. Progress resets to zero.
    pub fn mark_cancelled(&self, id: &JobId) {
        self.update(id, |job| {
            job.status = JobStatus::Cancelled;
            job.progress = 0;
            job.message = "Job cancelled".to_string();
            job.output_file = None;
        });
    }
}
