/*!
 * Job orchestration.
 *
 * One orchestrator run drives a submitted job through its whole lifecycle:
 * probe audio, compose the timeline phase by phase, hand the plan to the
 * renderer, mux the audio, and record the terminal state. Cancellation is
 * cooperative: the token is checked between phases and at every render
 * progress sample. Once the final pre-mux checkpoint has passed, the job
 * runs to completion.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info, warn};

use crate::app_config::RenderSettings;
use crate::errors::{CompositionError, RenderError};
use crate::file_utils::FileManager;
use crate::render::{AudioProbe, RenderOptions, Renderer};
use crate::subtitle_processor::SubtitleTrack;
use crate::timeline::{
    CompositionSpec, Resolution, ResolvedSubtitleStyle, ResolvedTitle, TimelineComposer,
    TransitionStyle,
};

use super::cancel::CancelToken;
use super::progress::{RenderProgressAdapter, RENDER_BASE_PROGRESS};
use super::store::JobStore;
use super::JobId;

/// Progress checkpoint: audio probed
const PROGRESS_AUDIO: u8 = 5;
/// Progress band for per-image composition
const PROGRESS_IMAGES_BASE: u8 = 10;
const PROGRESS_IMAGES_SPAN: f64 = 55.0;
/// Progress checkpoint: body segments laid out
const PROGRESS_CONCAT: u8 = 65;
/// Progress checkpoint: subtitles composed
const PROGRESS_SUBTITLES: u8 = 70;
/// Progress checkpoints: intro/outro composed and appended
const PROGRESS_INTRO: u8 = 77;
const PROGRESS_OUTRO: u8 = 78;
const PROGRESS_TITLE_CONCAT: u8 = 79;
/// Progress checkpoint: audio mux
const PROGRESS_MUX: u8 = 95;

/// Validated submission payload consumed by one orchestrator run
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Image paths in presentation order
    pub images: Vec<PathBuf>,
    /// Audio track path
    pub audio: PathBuf,
    /// Parsed subtitle track, if submitted
    pub subtitles: Option<SubtitleTrack>,
    /// Output resolution
    pub resolution: Resolution,
    /// Output frames per second
    pub fps: u32,
    /// Transition style between images
    pub transition: TransitionStyle,
    /// Transition duration in seconds
    pub transition_duration: f64,
    /// Subtitle styling
    pub subtitle_style: ResolvedSubtitleStyle,
    /// Optional intro title
    pub intro: Option<ResolvedTitle>,
    /// Optional outro title
    pub outro: Option<ResolvedTitle>,
}

/// Why an executing job stopped before completion
enum JobInterrupt {
    /// The cancel token was observed at a checkpoint
    Cancelled,
    /// A phase failed; the message is the user-visible cause
    Failed(String),
}

impl From<CompositionError> for JobInterrupt {
    fn from(error: CompositionError) -> Self {
        JobInterrupt::Failed(error.to_string())
    }
}

impl From<RenderError> for JobInterrupt {
    fn from(error: RenderError) -> Self {
        match error {
            RenderError::Cancelled => JobInterrupt::Cancelled,
            other => JobInterrupt::Failed(other.to_string()),
        }
    }
}

/// Drives submitted jobs through their state machine
pub struct JobOrchestrator {
    store: Arc<JobStore>,
    renderer: Arc<dyn Renderer>,
    audio_probe: Arc<dyn AudioProbe>,
    composer: TimelineComposer,
    render_settings: RenderSettings,
    work_dir: PathBuf,
}

impl JobOrchestrator {
    /// Create an orchestrator bound to the shared store and capabilities
    pub fn new(
        store: Arc<JobStore>,
        renderer: Arc<dyn Renderer>,
        audio_probe: Arc<dyn AudioProbe>,
        composer: TimelineComposer,
        render_settings: RenderSettings,
        work_dir: PathBuf,
    ) -> Self {
        JobOrchestrator {
            store,
            renderer,
            audio_probe,
            composer,
            render_settings,
            work_dir,
        }
    }

    /// Run one job to a terminal state. Never panics back into the caller;
    /// every failure ends as job status `error` with a message.
    pub async fn run(&self, job_id: JobId, request: JobRequest, cancel: CancelToken) {
        info!("Job {} picked up", job_id);

        let temp_video = self
            .work_dir
            .join(format!("{}_output_temp_video.mp4", job_id));
        let output = self.work_dir.join(format!("{}_output.mp4", job_id));

        match self
            .execute(job_id, &request, &cancel, &temp_video, &output)
            .await
        {
            Ok(media_path) => {
                self.store.complete(&job_id, media_path);
                info!("Job {} completed", job_id);
            }
            Err(JobInterrupt::Cancelled) => {
                warn!("Job {} cancelled", job_id);
                self.store.mark_cancelled(&job_id);
                FileManager::remove_if_exists(&temp_video);
                FileManager::remove_if_exists(&output);
            }
            Err(JobInterrupt::Failed(message)) => {
                error!("Job {} failed: {}", job_id, message);
                self.store.fail(&job_id, &message);
                FileManager::remove_if_exists(&temp_video);
                FileManager::remove_if_exists(&output);
            }
        }
    }

    async fn execute(
        &self,
        job_id: JobId,
        request: &JobRequest,
        cancel: &CancelToken,
        temp_video: &Path,
        output: &Path,
    ) -> Result<PathBuf, JobInterrupt> {
        self.store.mark_processing(&job_id, "Starting processing...");
        checkpoint(cancel)?;

        // Phase: audio
        self.store
            .set_progress(&job_id, PROGRESS_AUDIO, "Loading audio...");
        let audio_duration = self
            .audio_probe
            .duration_secs(&request.audio)
            .await
            .map_err(|e| JobInterrupt::Failed(format!("Failed to read audio duration: {}", e)))?;

        let spec = CompositionSpec {
            images: request.images.clone(),
            audio_duration,
            resolution: request.resolution,
            transition: request.transition,
            transition_duration: request.transition_duration,
            subtitles: request.subtitles.clone().unwrap_or_default(),
            subtitle_style: request.subtitle_style.clone(),
            intro: request.intro.clone(),
            outro: request.outro.clone(),
        };
        let layout = self.composer.layout(&spec)?;
        checkpoint(cancel)?;

        // Phase: per-image composition, linear in image index
        let image_count = spec.images.len();
        let mut image_segments = Vec::with_capacity(image_count);
        for index in 0..image_count {
            checkpoint(cancel)?;
            let progress = PROGRESS_IMAGES_BASE
                + ((index as f64 / image_count as f64) * PROGRESS_IMAGES_SPAN) as u8;
            self.store.set_progress(
                &job_id,
                progress,
                &format!("Composing image {}/{}", index + 1, image_count),
            );
            image_segments.push(self.composer.image_segment(&spec, &layout, index));
        }

        self.store
            .set_progress(&job_id, PROGRESS_CONCAT, "Concatenating segments...");

        // Phase: subtitles
        let subtitle_segments = if spec.subtitles.is_empty() {
            Vec::new()
        } else {
            self.store
                .set_progress(&job_id, PROGRESS_SUBTITLES, "Adding subtitles...");
            self.composer.subtitle_segments(&spec)
        };
        checkpoint(cancel)?;

        // Phase: intro/outro
        let intro_segments = if spec.intro.is_some() {
            self.store
                .set_progress(&job_id, PROGRESS_INTRO, "Creating intro...");
            self.composer.intro_segments(&spec)
        } else {
            Vec::new()
        };

        let outro_segments = if spec.outro.is_some() {
            self.store
                .set_progress(&job_id, PROGRESS_OUTRO, "Creating outro...");
            self.composer.outro_segments(&spec)
        } else {
            Vec::new()
        };

        if !intro_segments.is_empty() || !outro_segments.is_empty() {
            self.store.set_progress(
                &job_id,
                PROGRESS_TITLE_CONCAT,
                "Concatenating intro/outro...",
            );
        }
        checkpoint(cancel)?;

        // Draw order: intro under body, subtitles above images, outro last
        let mut segments = intro_segments;
        segments.extend(image_segments);
        segments.extend(subtitle_segments);
        segments.extend(outro_segments);
        let plan = self.composer.assemble(&spec, segments);

        // Phase: render
        self.store
            .set_progress(&job_id, RENDER_BASE_PROGRESS, "Starting render...");
        let options = RenderOptions {
            fps: request.fps,
            codec: None,
            preset: self.render_settings.preset.clone(),
            crf: self.render_settings.crf,
            threads: self.render_settings.threads,
            timeout_secs: self.render_settings.timeout_secs,
        };

        let adapter = RenderProgressAdapter::new(self.store.clone(), job_id);
        let (sink, samples) = RenderProgressAdapter::channel(cancel.clone());
        let adapter_task = tokio::spawn(adapter.run(samples));

        let render_result = self.renderer.render(&plan, temp_video, &options, &sink).await;

        // Close the channel so the adapter task drains and exits
        drop(sink);
        let _ = adapter_task.await;
        render_result?;

        // Final cancellation checkpoint. Entering the mux, the job is
        // committed and runs to completion.
        checkpoint(cancel)?;

        self.store
            .set_progress(&job_id, PROGRESS_MUX, "Combining audio...");
        self.renderer
            .mux_audio(temp_video, &request.audio, plan.audio_offset, output)
            .await?;

        FileManager::remove_if_exists(temp_video);

        Ok(output.to_path_buf())
    }
}

fn checkpoint(cancel: &CancelToken) -> Result<(), JobInterrupt> {
    if cancel.is_cancelled() {
        Err(JobInterrupt::Cancelled)
    } else {
        Ok(())
    }
}
