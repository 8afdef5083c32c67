/*!
 * The time-addressed composition data model.
 *
 * A `TimelinePlan` is the fully resolved description of every visual element
 * the renderer must draw: image segments, subtitle and title text with their
 * typewriter keyframes, and declarative entry/exit effects. All times are
 * absolute seconds from the start of the output video.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Output resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Resolution {
    /// Create a resolution
    pub fn new(width: u32, height: u32) -> Self {
        Resolution { width, height }
    }

    /// Width/height aspect ratio
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// RGB color triple
pub type Rgb = (u8, u8, u8);

/// Which slide edge an element enters from or exits to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    /// Left edge
    Left,
    /// Right edge
    Right,
    /// Top edge
    Top,
    /// Bottom edge
    Bottom,
}

/// Declarative entry/exit effect on a segment.
///
/// Fade and slide are discrete effects evaluated over a fixed window at the
/// segment boundary. Zoom is a continuous scale ramp the renderer must
/// evaluate per frame; `scale_at` gives the reference evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Fade from transparent
    FadeIn {
        /// Effect window in seconds
        duration: f64,
    },
    /// Fade to transparent
    FadeOut {
        /// Effect window in seconds
        duration: f64,
    },
    /// Crossfade in (overlapping the previous segment)
    CrossFadeIn {
        /// Effect window in seconds
        duration: f64,
    },
    /// Crossfade out (overlapping the next segment)
    CrossFadeOut {
        /// Effect window in seconds
        duration: f64,
    },
    /// Slide in from an edge
    SlideIn {
        /// Effect window in seconds
        duration: f64,
        /// Edge the element enters from
        from: SlideDirection,
    },
    /// Slide out towards an edge
    SlideOut {
        /// Effect window in seconds
        duration: f64,
        /// Edge the element exits to
        to: SlideDirection,
    },
    /// Continuous scale ramp at segment start
    ZoomIn {
        /// Ramp window in seconds
        duration: f64,
        /// Scale at elapsed 0
        from_scale: f64,
        /// Scale once the window has elapsed
        to_scale: f64,
    },
    /// Continuous scale ramp at segment end
    ZoomOut {
        /// Ramp window in seconds
        duration: f64,
        /// Scale before the window begins
        from_scale: f64,
        /// Scale at the segment's final instant
        to_scale: f64,
    },
}

impl Effect {
    /// Evaluate the zoom scale at `elapsed` seconds into a segment lasting
    /// `segment_duration` seconds. Returns `None` for non-zoom effects.
    pub fn scale_at(&self, elapsed: f64, segment_duration: f64) -> Option<f64> {
        match *self {
            Effect::ZoomIn {
                duration,
                from_scale,
                to_scale,
            } => {
                if duration <= 0.0 || elapsed >= duration {
                    Some(to_scale)
                } else {
                    Some(from_scale + (to_scale - from_scale) * (elapsed / duration))
                }
            }
            Effect::ZoomOut {
                duration,
                from_scale,
                to_scale,
            } => {
                let ramp_start = segment_duration - duration;
                if duration <= 0.0 || elapsed <= ramp_start {
                    Some(from_scale)
                } else {
                    let progress = ((elapsed - ramp_start) / duration).min(1.0);
                    Some(from_scale + (to_scale - from_scale) * progress)
                }
            }
            _ => None,
        }
    }
}

/// Anchor point for positioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Centered both axes
    Center,
    /// Horizontally centered, anchored to the top edge
    TopCenter,
    /// Horizontally centered, anchored to the bottom edge
    BottomCenter,
}

/// Placement of a segment within the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Anchor point
    pub anchor: Anchor,
    /// Horizontal offset from the anchor in pixels
    pub offset_x: f64,
    /// Vertical offset from the anchor in pixels (positive moves down)
    pub offset_y: f64,
}

impl Position {
    /// Centered placement
    pub fn center() -> Self {
        Position {
            anchor: Anchor::Center,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Bottom-anchored placement raised by `margin` pixels
    pub fn bottom(margin: f64) -> Self {
        Position {
            anchor: Anchor::BottomCenter,
            offset_x: 0.0,
            offset_y: -margin,
        }
    }
}

/// Styled text content of a text segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Text with wrapping line breaks already applied
    pub text: String,
    /// Font file path
    pub font: PathBuf,
    /// Font size in pixels
    pub size_px: u32,
    /// Fill color
    pub color: Rgb,
    /// Outline color, if stroked
    pub stroke_color: Option<Rgb>,
    /// Outline width in pixels
    pub stroke_width: u32,
}

/// What a segment draws.
///
/// Image segments are scaled cover-fit (aspect preserved, overflow cropped)
/// and centered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentContent {
    /// A still image
    Image {
        /// Source image path
        path: PathBuf,
    },
    /// A solid color layer covering the frame
    Color {
        /// Fill color
        rgb: Rgb,
    },
    /// Styled text
    Text(TextBlock),
}

/// Category of a visual segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Body image slide
    Image,
    /// Subtitle overlay text
    SubtitleText,
    /// Intro/outro title text or backdrop
    TitleText,
}

/// One reveal step of a typewriter text segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypewriterKeyframe {
    /// Partial text revealed at this step, independently re-wrapped
    pub text: String,
    /// Absolute start time in seconds
    pub start: f64,
    /// Step duration in seconds; the final step absorbs the hold window
    pub duration: f64,
}

/// One positioned, timed element of the composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSegment {
    /// Segment category
    pub kind: SegmentKind,
    /// Drawn content
    pub content: SegmentContent,
    /// Absolute start time in seconds
    pub start: f64,
    /// Duration in seconds, always positive
    pub duration: f64,
    /// Placement within the frame
    pub position: Position,
    /// Effect applied while the segment enters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_effect: Option<Effect>,
    /// Effect applied while the segment exits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_effect: Option<Effect>,
    /// Reveal steps subdividing a text segment; empty for static content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<TypewriterKeyframe>,
}

impl VisualSegment {
    /// Absolute end time in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// The composed, immutable output of timeline composition.
///
/// Segments are ordered bottom-to-top for drawing: a later segment renders
/// above an earlier one when they overlap in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePlan {
    /// Total video duration in seconds (intro + body + outro)
    pub total_duration: f64,
    /// Seconds the audio track must be shifted forward (the intro length)
    pub audio_offset: f64,
    /// Output resolution
    pub resolution: Resolution,
    /// Ordered visual segments
    pub segments: Vec<VisualSegment>,
}

impl TimelinePlan {
    /// Segments of a given kind, in plan order
    pub fn segments_of_kind(&self, kind: SegmentKind) -> impl Iterator<Item = &VisualSegment> {
        self.segments.iter().filter(move |s| s.kind == kind)
    }
}
