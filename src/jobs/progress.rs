/*!
 * Render progress plumbing.
 *
 * The renderer reports `(current_frame, total_frames)` samples through a
 * `ProgressSink`. The sink checks the job's cancel token before accepting
 * each sample — returning an error signals the renderer to abort mid-encode
 * — and forwards accepted samples over a typed channel to the
 * `RenderProgressAdapter` task, the only writer of render-phase progress.
 */

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use tokio::sync::mpsc;

use crate::errors::RenderError;

use super::cancel::CancelToken;
use super::store::JobStore;
use super::{JobId, RenderInfo};

/// Job progress value at which the render phase begins
pub const RENDER_BASE_PROGRESS: u8 = 80;

/// Job progress value at which the render phase ends
pub const RENDER_MAX_PROGRESS: u8 = 95;

/// Width of the textual progress bar embedded in status messages
const MESSAGE_BAR_WIDTH: usize = 20;

/// One frame-progress sample from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    /// Frames rendered so far
    pub current_frame: u64,
    /// Total frames to render
    pub total_frames: u64,
}

/// Renderer-facing progress reporter
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: mpsc::UnboundedSender<ProgressSample>,
    cancel: CancelToken,
}

impl ProgressSink {
    /// Report a sample. Fails with `RenderError::Cancelled` once the job's
    /// cancel token is set; the renderer must stop producing frames then.
    pub fn report(&self, current_frame: u64, total_frames: u64) -> Result<(), RenderError> {
        if self.cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        // The adapter may already have shut down during teardown; losing
        // trailing samples is harmless
        let _ = self.tx.send(ProgressSample {
            current_frame,
            total_frames,
        });

        Ok(())
    }
}

/// Translates renderer samples into job progress updates
#[derive(Debug)]
pub struct RenderProgressAdapter {
    store: Arc<JobStore>,
    job_id: JobId,
    render_started: Instant,
}

impl RenderProgressAdapter {
    /// Create an adapter; the render phase clock starts now
    pub fn new(store: Arc<JobStore>, job_id: JobId) -> Self {
        RenderProgressAdapter {
            store,
            job_id,
            render_started: Instant::now(),
        }
    }

    /// Build the sink/receiver pair for one render run
    pub fn channel(cancel: CancelToken) -> (ProgressSink, mpsc::UnboundedReceiver<ProgressSample>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ProgressSink { tx, cancel }, rx)
    }

    /// Consume samples until the renderer drops its sink
    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<ProgressSample>) {
        while let Some(sample) = rx.recv().await {
            self.apply(sample);
        }
        debug!("Render progress channel closed for job {}", self.job_id);
    }

    /// Map one sample to job progress, speed and ETA
    pub fn apply(&self, sample: ProgressSample) {
        let fraction = if sample.total_frames > 0 {
            sample.current_frame as f64 / sample.total_frames as f64
        } else {
            0.0
        };

        let span = (RENDER_MAX_PROGRESS - RENDER_BASE_PROGRESS) as f64;
        let progress = RENDER_BASE_PROGRESS + (fraction * span).floor() as u8;

        let elapsed = self.render_started.elapsed().as_secs_f64();
        let fps = if elapsed > 0.0 {
            sample.current_frame as f64 / elapsed
        } else {
            0.0
        };

        let remaining = sample.total_frames.saturating_sub(sample.current_frame);
        let eta = if fps > 0.0 { remaining as f64 / fps } else { 0.0 };

        let message = render_message(sample, fraction, fps, eta);
        let info = RenderInfo {
            current_frame: sample.current_frame,
            total_frames: sample.total_frames,
            fps_speed: (fps * 100.0).round() / 100.0,
            eta_seconds: (eta * 10.0).round() / 10.0,
            percent: (fraction * 1000.0).round() / 10.0,
        };

        self.store
            .set_render_info(&self.job_id, progress, &message, info);
    }
}

/// Detailed render status message with a textual progress bar
fn render_message(sample: ProgressSample, fraction: f64, fps: f64, eta: f64) -> String {
    let filled = (MESSAGE_BAR_WIDTH as f64 * fraction) as usize;
    let bar: String = "█".repeat(filled.min(MESSAGE_BAR_WIDTH))
        + &"░".repeat(MESSAGE_BAR_WIDTH - filled.min(MESSAGE_BAR_WIDTH));

    let eta_min = (eta / 60.0) as u64;
    let eta_sec = (eta % 60.0) as u64;

    format!(
        "Rendering: {}/{} [{}] {:.0}% | {:.1} fps | ETA: {}:{:02}",
        sample.current_frame,
        sample.total_frames,
        bar,
        fraction * 100.0,
        fps,
        eta_min,
        eta_sec
    )
}
