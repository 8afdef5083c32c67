use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::app_config::{parse_resolution, Config, SubtitleStyle};
use crate::errors::{AppError, ValidationError};
use crate::file_utils::FileManager;
use crate::jobs::{
    CancellationRegistry, Job, JobId, JobOrchestrator, JobRequest, JobStore,
};
use crate::render::{AudioProbe, Renderer};
use crate::subtitle_processor::SubtitleTrack;
use crate::text_layout::{TextMeasurer, TextWrapper};
use crate::timeline::{
    Resolution, ResolvedSubtitleStyle, TimelineComposer, TitleConfig, TransitionStyle,
};

// @module: Application controller for render job submission and tracking

/// Interval between snapshots on the progress stream
const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One submission: everything needed to compose and render a video
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// Image paths in presentation order
    pub images: Vec<PathBuf>,
    /// Audio track path
    pub audio: PathBuf,
    /// Raw subtitle text in SRT form, if any
    pub subtitle_text: Option<String>,
    /// Output resolution as WIDTHxHEIGHT
    pub resolution: String,
    /// Output frames per second
    pub fps: u32,
    /// Transition style between images
    pub transition: TransitionStyle,
    /// Transition duration in seconds
    pub transition_duration: f64,
    /// Subtitle styling
    pub subtitle_style: SubtitleStyle,
    /// Optional intro title
    pub intro: Option<TitleConfig>,
    /// Optional outro title
    pub outro: Option<TitleConfig>,
}

/// One element of the progress stream
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Point-in-time job state
    Snapshot(Job),
    /// The requested job id is unknown
    NotFound,
}

/// Facade over the job engine consumed by the CLI (or any thin transport
/// layer): validate and submit, then observe status, stream progress and
/// request cancellation.
pub struct Controller {
    config: Config,
    store: Arc<JobStore>,
    registry: Arc<CancellationRegistry>,
    orchestrator: Arc<JobOrchestrator>,
}

impl Controller {
    /// Create a controller with the given capabilities
    pub fn new(
        config: Config,
        renderer: Arc<dyn Renderer>,
        audio_probe: Arc<dyn AudioProbe>,
        measurer: Option<Arc<dyn TextMeasurer>>,
    ) -> Result<Self> {
        FileManager::ensure_dir(&config.work_dir)?;

        let wrapper = match measurer {
            Some(measurer) => TextWrapper::new(measurer),
            None => TextWrapper::without_measurer(),
        };

        let store = Arc::new(JobStore::new());
        let registry = Arc::new(CancellationRegistry::new());
        let orchestrator = Arc::new(JobOrchestrator::new(
            store.clone(),
            renderer,
            audio_probe,
            TimelineComposer::new(wrapper),
            config.render.clone(),
            config.work_dir.clone(),
        ));

        Ok(Controller {
            config,
            store,
            registry,
            orchestrator,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate a submission and start its job. Returns the job id
    /// synchronously, before any processing begins; all validation failures
    /// surface here and no job state is created for a rejected request.
    pub fn submit(&self, request: SubmissionRequest) -> Result<JobId, ValidationError> {
        let job_request = self.validate(&request)?;

        let job_id = Uuid::new_v4();
        self.store.create(job_id);
        let cancel = self.registry.register(job_id);

        info!(
            "Job {} submitted: {} images, transition {}",
            job_id,
            job_request.images.len(),
            job_request.transition
        );

        let orchestrator = self.orchestrator.clone();
        tokio::spawn(async move {
            orchestrator.run(job_id, job_request, cancel).await;
        });

        Ok(job_id)
    }

    /// Point-in-time snapshot of a job
    pub fn status(&self, id: &JobId) -> Result<Job, AppError> {
        self.store
            .snapshot(id)
            .ok_or_else(|| AppError::JobNotFound(id.to_string()))
    }

    /// Request cancellation. Accepted only while the job is queued or
    /// processing; rejected with the current status otherwise.
    pub fn cancel(&self, id: &JobId) -> Result<(), AppError> {
        let job = self.status(id)?;

        if job.status.is_terminal() {
            return Err(AppError::CancelRejected(job.status.to_string()));
        }

        self.registry.cancel(id);
        self.store.update(id, |job| {
            job.message = "Cancelling...".to_string();
        });
        debug!("Cancellation requested for job {}", id);
        Ok(())
    }

    /// Stream snapshots for a job until it reaches a terminal state. An
    /// unknown id yields a single `NotFound` event.
    pub fn subscribe(&self, id: JobId) -> mpsc::Receiver<ProgressEvent> {
        self.subscribe_with_interval(id, PROGRESS_POLL_INTERVAL)
    }

    /// Stream snapshots at a custom poll interval
    pub fn subscribe_with_interval(
        &self,
        id: JobId,
        interval: Duration,
    ) -> mpsc::Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel(16);
        let store = self.store.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match store.snapshot(&id) {
                    Some(job) => {
                        let terminal = job.status.is_terminal();
                        if tx.send(ProgressEvent::Snapshot(job)).await.is_err() {
                            break;
                        }
                        if terminal {
                            break;
                        }
                    }
                    None => {
                        let _ = tx.send(ProgressEvent::NotFound).await;
                        break;
                    }
                }
            }
        });

        rx
    }

    /// Check request parameters and resolve them into orchestrator input
    fn validate(&self, request: &SubmissionRequest) -> Result<JobRequest, ValidationError> {
        if request.images.is_empty() {
            return Err(ValidationError::NoImages(
                "at least one image is required".to_string(),
            ));
        }

        for image in &request.images {
            if !FileManager::file_exists(image) {
                return Err(ValidationError::InvalidParameter {
                    name: "images",
                    reason: format!("image not found: {:?}", image),
                });
            }
        }

        if !FileManager::file_exists(&request.audio) {
            return Err(ValidationError::MissingAudio(format!(
                "{:?}",
                request.audio
            )));
        }

        let (width, height) = parse_resolution(&request.resolution)?;

        if request.fps == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "fps",
                reason: "fps must be at least 1".to_string(),
            });
        }

        if request.transition_duration < 0.0 {
            return Err(ValidationError::InvalidParameter {
                name: "transition_duration",
                reason: "cannot be negative".to_string(),
            });
        }

        let subtitle_style = ResolvedSubtitleStyle::from_style(&request.subtitle_style)?;
        let intro = request.intro.as_ref().map(|t| t.resolve()).transpose()?;
        let outro = request.outro.as_ref().map(|t| t.resolve()).transpose()?;

        // Malformed cue blocks are skipped by the parser; an empty or
        // missing track simply means no subtitle overlays
        let subtitles = request
            .subtitle_text
            .as_deref()
            .map(SubtitleTrack::parse_srt)
            .filter(|track| !track.is_empty());

        Ok(JobRequest {
            images: request.images.clone(),
            audio: request.audio.clone(),
            subtitles,
            resolution: Resolution::new(width, height),
            fps: request.fps,
            transition: request.transition,
            transition_duration: request.transition_duration,
            subtitle_style,
            intro,
            outro,
        })
    }
}
