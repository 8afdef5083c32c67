/*!
 * # slidecast
 *
 * A Rust library for turning still images, one audio track and an optional
 * subtitle track into a rendered slideshow video.
 *
 * ## Features
 *
 * - Parse SRT subtitle tracks into timed cues
 * - Compose a fully time-addressed timeline plan: image segments with
 *   transition overlaps, typewriter subtitle reveals, intro/outro titles
 * - Run renders as cancellable background jobs with streamed progress
 * - Drive ffmpeg for encoding and audio muxing
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management and the font catalog
 * - `subtitle_processor`: SRT parsing and serialization
 * - `text_layout`: Pixel-based word wrapping behind a TextMeasurer seam
 * - `timeline`: Timeline composition:
 *   - `timeline::composer`: Plan assembly
 *   - `timeline::transitions`: Transition style policy
 *   - `timeline::typewriter`: Reveal keyframe generation
 *   - `timeline::titles`: Intro/outro planning
 * - `jobs`: Job store, cancellation, orchestration and progress adaption
 * - `render`: Renderer/probe capabilities, ffmpeg implementation, mocks
 * - `file_utils`: File system operations
 * - `app_controller`: Submission/status/cancel/progress facade
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod jobs;
pub mod render;
pub mod subtitle_processor;
pub mod text_layout;
pub mod timeline;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, ProgressEvent, SubmissionRequest};
pub use errors::{AppError, CompositionError, RenderError, ValidationError};
pub use jobs::{Job, JobId, JobStatus};
pub use subtitle_processor::{SubtitleCue, SubtitleTrack};
pub use timeline::{TimelineComposer, TimelinePlan, TransitionStyle};
