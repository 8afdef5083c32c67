/*!
 * Error types for the slidecast application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors rejected synchronously at submission time, before a job exists
#[derive(Error, Debug)]
pub enum ValidationError {
    /// No images were provided or found
    #[error("No images provided: {0}")]
    NoImages(String),

    /// Audio file is missing or unusable
    #[error("Audio source missing: {0}")]
    MissingAudio(String),

    /// A resolution string could not be parsed
    #[error("Invalid resolution '{0}', expected WIDTHxHEIGHT (e.g. 1080x1920)")]
    InvalidResolution(String),

    /// A color string could not be parsed
    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),

    /// A request parameter is out of range
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors raised by timeline composition
#[derive(Error, Debug)]
pub enum CompositionError {
    /// Composition requires at least one image segment
    #[error("Cannot compose a timeline from an empty image list")]
    EmptyImageList,

    /// Audio duration must be strictly positive
    #[error("Audio duration must be positive, got {0}s")]
    NonPositiveAudioDuration(f64),

    /// A cue carries an inverted or empty time range
    #[error("Invalid cue time range: start {start}s >= end {end}s")]
    InvalidCueRange {
        /// Cue start in seconds
        start: f64,
        /// Cue end in seconds
        end: f64,
    },
}

/// Errors raised by the external renderer or the muxing step
#[derive(Error, Debug)]
pub enum RenderError {
    /// The render was aborted because the job was cancelled
    #[error("Render cancelled")]
    Cancelled,

    /// The renderer process could not be started
    #[error("Failed to launch renderer: {0}")]
    LaunchFailed(String),

    /// The renderer ran but reported failure
    #[error("Render failed: {0}")]
    Failed(String),

    /// Combining the rendered video with the audio track failed
    #[error("Audio mux failed: {0}")]
    MuxFailed(String),

    /// The renderer exceeded its allotted time
    #[error("Render timed out after {0}s")]
    TimedOut(u64),
}

/// Errors raised while parsing subtitle input
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The subtitle content yielded no usable cues
    #[error("No valid subtitle cues were found in the input")]
    NoCues,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from request validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Error from timeline composition
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    /// Error from the renderer
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Error from subtitle parsing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The requested job id is unknown
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Cancellation was requested for a job that already reached a terminal state
    #[error("Job cannot be cancelled, current status: {0}")]
    CancelRejected(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
