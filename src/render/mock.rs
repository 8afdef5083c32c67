/*!
 * Mock renderer and probe implementations for testing.
 *
 * Behaviors mirror the failure modes of a real render backend:
 * - `MockRenderer::working(n)` - renders n frames instantly and succeeds
 * - `MockRenderer::slow(n, delay)` - yields between frames so cancellation
 *   can land mid-render
 * - `MockRenderer::failing()` - always fails
 * - `MockRenderer::mux_failing(n)` - renders fine, fails at the mux step
 */

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::errors::RenderError;
use crate::jobs::ProgressSink;
use crate::timeline::TimelinePlan;

use super::{AudioProbe, RenderOptions, RenderedMedia, Renderer};

/// Behavior mode for the mock renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockRenderBehavior {
    /// Render all frames immediately and succeed
    Working {
        /// Frames to report
        total_frames: u64,
    },
    /// Sleep between frames, leaving room for cancellation
    Slow {
        /// Frames to report
        total_frames: u64,
        /// Delay between frames in milliseconds
        delay_ms: u64,
    },
    /// Always fail with a render error
    Failing,
    /// Render successfully but fail the mux step
    MuxFailing {
        /// Frames to report
        total_frames: u64,
    },
}

/// Scripted renderer for exercising the job pipeline without ffmpeg
#[derive(Debug)]
pub struct MockRenderer {
    behavior: MockRenderBehavior,
    render_calls: Arc<AtomicUsize>,
}

impl MockRenderer {
    /// Create a mock with the given behavior
    pub fn new(behavior: MockRenderBehavior) -> Self {
        MockRenderer {
            behavior,
            render_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A renderer that succeeds after reporting `total_frames` samples
    pub fn working(total_frames: u64) -> Self {
        Self::new(MockRenderBehavior::Working { total_frames })
    }

    /// A renderer that sleeps between frames
    pub fn slow(total_frames: u64, delay_ms: u64) -> Self {
        Self::new(MockRenderBehavior::Slow {
            total_frames,
            delay_ms,
        })
    }

    /// A renderer that always fails
    pub fn failing() -> Self {
        Self::new(MockRenderBehavior::Failing)
    }

    /// A renderer that fails only at the mux step
    pub fn mux_failing(total_frames: u64) -> Self {
        Self::new(MockRenderBehavior::MuxFailing { total_frames })
    }

    /// How many times render was invoked
    pub fn render_calls(&self) -> usize {
        self.render_calls.load(Ordering::SeqCst)
    }

    async fn emit_frames(
        &self,
        total_frames: u64,
        delay_ms: u64,
        output: &Path,
        progress: &ProgressSink,
    ) -> Result<RenderedMedia, RenderError> {
        for frame in 1..=total_frames {
            progress.report(frame, total_frames)?;
            if delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            } else {
                // Let spawned observers run between samples
                tokio::task::yield_now().await;
            }
        }

        std::fs::write(output, b"mock video data")
            .map_err(|e| RenderError::Failed(format!("could not write mock output: {}", e)))?;

        Ok(RenderedMedia {
            path: output.to_path_buf(),
            frames: total_frames,
        })
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(
        &self,
        _plan: &TimelinePlan,
        output: &Path,
        _options: &RenderOptions,
        progress: &ProgressSink,
    ) -> Result<RenderedMedia, RenderError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockRenderBehavior::Working { total_frames }
            | MockRenderBehavior::MuxFailing { total_frames } => {
                self.emit_frames(total_frames, 0, output, progress).await
            }
            MockRenderBehavior::Slow {
                total_frames,
                delay_ms,
            } => self.emit_frames(total_frames, delay_ms, output, progress).await,
            MockRenderBehavior::Failing => {
                Err(RenderError::Failed("mock renderer failure".to_string()))
            }
        }
    }

    async fn mux_audio(
        &self,
        video: &Path,
        _audio: &Path,
        _offset_secs: f64,
        output: &Path,
    ) -> Result<(), RenderError> {
        if matches!(self.behavior, MockRenderBehavior::MuxFailing { .. }) {
            return Err(RenderError::MuxFailed("mock mux failure".to_string()));
        }

        std::fs::copy(video, output)
            .map(|_| ())
            .map_err(|e| RenderError::MuxFailed(format!("could not copy mock output: {}", e)))
    }
}

/// Scripted audio probe
#[derive(Debug)]
pub struct MockAudioProbe {
    duration: Option<f64>,
    delay_ms: u64,
}

impl MockAudioProbe {
    /// A probe reporting a fixed duration
    pub fn with_duration(secs: f64) -> Self {
        MockAudioProbe {
            duration: Some(secs),
            delay_ms: 0,
        }
    }

    /// A probe that sleeps before answering, holding the job in its audio
    /// phase for a while
    pub fn with_duration_delayed(secs: f64, delay_ms: u64) -> Self {
        MockAudioProbe {
            duration: Some(secs),
            delay_ms,
        }
    }

    /// A probe that always fails
    pub fn failing() -> Self {
        MockAudioProbe {
            duration: None,
            delay_ms: 0,
        }
    }
}

#[async_trait]
impl AudioProbe for MockAudioProbe {
    async fn duration_secs(&self, path: &Path) -> Result<f64> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        self.duration
            .ok_or_else(|| anyhow!("mock probe failure for {:?}", path))
    }
}
