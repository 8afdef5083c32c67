/*!
 * Asynchronous render-job management.
 *
 * A job is one user-initiated composition-and-render request. Submission
 * creates a queued job and returns its id synchronously; a dedicated task
 * then drives the job through `queued → processing → {completed | error |
 * cancelled}`, publishing progress into the shared `JobStore` along the way.
 */

pub mod cancel;
pub mod orchestrator;
pub mod progress;
pub mod store;

pub use cancel::{CancelToken, CancellationRegistry};
pub use orchestrator::{JobOrchestrator, JobRequest};
pub use progress::{ProgressSample, ProgressSink, RenderProgressAdapter};
pub use store::JobStore;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique job identifier
pub type JobId = Uuid;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, not yet picked up
    Queued,
    /// Being composed or rendered
    Processing,
    /// Finished successfully; output recorded
    Completed,
    /// Failed; message carries the cause
    Error,
    /// Cancelled by the submitter
    Cancelled,
}

impl JobStatus {
    /// Whether the state is terminal: no further mutation occurs past it
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Cancelled)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Structured render-phase telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderInfo {
    /// Last frame reported by the renderer
    pub current_frame: u64,
    /// Total frames the renderer will produce
    pub total_frames: u64,
    /// Instantaneous render speed in frames per second
    pub fps_speed: f64,
    /// Estimated seconds remaining
    pub eta_seconds: f64,
    /// Render completion percentage
    pub percent: f64,
}

/// One job's observable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Job identifier
    pub id: JobId,
    /// Lifecycle state
    pub status: JobStatus,
    /// Overall progress, 0-100
    pub progress: u8,
    /// Human-readable status message
    pub message: String,
    /// Render telemetry, present during and after the render phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_info: Option<RenderInfo>,
    /// Output media path, recorded on completion only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
}

impl Job {
    /// A freshly submitted job
    pub fn queued(id: JobId) -> Self {
        Job {
            id,
            status: JobStatus::Queued,
            progress: 0,
            message: "Queued...".to_string(),
            render_info: None,
            output_file: None,
        }
    }
}
