/*!
 * Renderer and media-probe capabilities.
 *
 * The composition/orchestration core treats pixel rendering as an opaque
 * capability: anything that can turn a `TimelinePlan` into a media file
 * while streaming frame progress and honoring mid-flight aborts. The
 * bundled implementation drives ffmpeg; tests substitute scripted mocks.
 */

pub mod ffmpeg;
pub mod media;
pub mod mock;
pub mod mux;

pub use ffmpeg::FfmpegRenderer;
pub use media::FfprobeAudio;
pub use mock::{MockAudioProbe, MockRenderer};

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use crate::errors::RenderError;
use crate::jobs::ProgressSink;
use crate::timeline::TimelinePlan;

/// Encoder configuration passed to the renderer
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Output frames per second
    pub fps: u32,
    /// Video codec; `None` lets the renderer pick (hardware encoder when
    /// available, `libx264` otherwise)
    pub codec: Option<String>,
    /// Encoder preset
    pub preset: String,
    /// Constant rate factor
    pub crf: u32,
    /// Encoder thread count
    pub threads: usize,
    /// Seconds before the render is abandoned
    pub timeout_secs: u64,
}

/// Result of a successful render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMedia {
    /// Path of the produced media file
    pub path: PathBuf,
    /// Frames actually rendered
    pub frames: u64,
}

/// Capability: render a timeline plan to a media file.
///
/// Implementations must call `progress.report` as frames complete and abort
/// promptly when a report returns `RenderError::Cancelled`.
#[async_trait]
pub trait Renderer: Send + Sync + Debug {
    /// Render `plan` into `output`
    async fn render(
        &self,
        plan: &TimelinePlan,
        output: &Path,
        options: &RenderOptions,
        progress: &ProgressSink,
    ) -> Result<RenderedMedia, RenderError>;

    /// Combine a rendered video with its audio track, shifting the audio
    /// forward by `offset_secs` so narration starts after the intro
    async fn mux_audio(
        &self,
        video: &Path,
        audio: &Path,
        offset_secs: f64,
        output: &Path,
    ) -> Result<(), RenderError>;
}

/// Capability: report the duration of an audio file.
///
/// Kept separate from `Renderer` so composition input can be validated
/// before any rendering resources exist.
#[async_trait]
pub trait AudioProbe: Send + Sync + Debug {
    /// Duration of the audio at `path` in seconds
    async fn duration_secs(&self, path: &Path) -> Result<f64>;
}
