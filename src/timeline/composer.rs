/*!
 * Timeline composition.
 *
 * The composer turns ordered images, an audio duration, subtitle cues and
 * optional intro/outro titles into a `TimelinePlan`. The math is pure and
 * synchronous; the orchestrator drives the staged methods one phase at a
 * time so it can report progress and observe cancellation between phases,
 * while `compose` runs the whole pipeline in one call.
 *
 * Layout rules:
 * - every image gets `audio_duration / image_count` seconds, no remainder
 *   redistribution;
 * - overlapping transitions shift segment `i` to `i × (per_image −
 *   transition)`, and the body duration stays clamped to the audio duration
 *   regardless of the arithmetic sum;
 * - intro and outro are silent and sit strictly before/after the body, so
 *   the audio track is offset by the intro duration.
 */

use std::path::PathBuf;

use log::{debug, warn};

use crate::app_config::{parse_hex_color, resolve_font, SubtitlePosition, SubtitleStyle};
use crate::errors::{CompositionError, ValidationError};
use crate::subtitle_processor::SubtitleTrack;
use crate::text_layout::TextWrapper;

use super::plan::{
    Position, Resolution, Rgb, SegmentContent, SegmentKind, TextBlock, TimelinePlan, VisualSegment,
};
use super::titles::{plan_title, ResolvedTitle};
use super::transitions::{effects_apply, transition_spec, TransitionSpec, TransitionStyle};
use super::typewriter;

/// Horizontal padding reserved around subtitle text, in pixels
const SUBTITLE_TEXT_MARGIN: u32 = 80;

/// Pixel margin above the bottom edge for bottom-positioned subtitles
const SUBTITLE_BOTTOM_MARGIN: f64 = 50.0;

/// Subtitle styling resolved for composition
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSubtitleStyle {
    /// Font file path
    pub font: PathBuf,
    /// Font size in pixels
    pub font_size: u32,
    /// Fill color
    pub color: Rgb,
    /// Stroke color
    pub stroke_color: Rgb,
    /// Stroke width in pixels
    pub stroke_width: u32,
    /// Whether the typewriter reveal is enabled
    pub typewriter: bool,
    /// Share of each cue spent revealing
    pub typewriter_ratio: f64,
    /// Keyframe cap per cue
    pub max_clips_per_cue: usize,
    /// Vertical placement
    pub position: SubtitlePosition,
}

impl ResolvedSubtitleStyle {
    /// Validate and resolve a configured style
    pub fn from_style(style: &SubtitleStyle) -> Result<Self, ValidationError> {
        Ok(ResolvedSubtitleStyle {
            font: resolve_font(&style.font),
            font_size: style.font_size,
            color: parse_hex_color(&style.font_color)?,
            stroke_color: parse_hex_color(&style.stroke_color)?,
            stroke_width: style.stroke_width,
            typewriter: style.typewriter,
            typewriter_ratio: style.typewriter_ratio,
            max_clips_per_cue: style.max_clips_per_cue,
            position: style.position,
        })
    }
}

/// Validated input to timeline composition
#[derive(Debug, Clone)]
pub struct CompositionSpec {
    /// Image paths in presentation order
    pub images: Vec<PathBuf>,
    /// Audio track duration in seconds
    pub audio_duration: f64,
    /// Output resolution
    pub resolution: Resolution,
    /// Transition style between images
    pub transition: TransitionStyle,
    /// Transition duration in seconds
    pub transition_duration: f64,
    /// Subtitle cues, possibly empty
    pub subtitles: SubtitleTrack,
    /// Subtitle styling
    pub subtitle_style: ResolvedSubtitleStyle,
    /// Optional intro title
    pub intro: Option<ResolvedTitle>,
    /// Optional outro title
    pub outro: Option<ResolvedTitle>,
}

impl CompositionSpec {
    /// Intro duration, zero when absent
    pub fn intro_duration(&self) -> f64 {
        self.intro.as_ref().map_or(0.0, |t| t.duration)
    }

    /// Outro duration, zero when absent
    pub fn outro_duration(&self) -> f64 {
        self.outro.as_ref().map_or(0.0, |t| t.duration)
    }

    /// Total plan duration: intro + body + outro
    pub fn total_duration(&self) -> f64 {
        self.intro_duration() + self.audio_duration + self.outro_duration()
    }
}

/// Precomputed body layout parameters
#[derive(Debug, Clone, Copy)]
pub struct BodyLayout {
    /// Seconds every image segment lasts
    pub per_image: f64,
    /// Start-time increment between adjacent segments
    pub step: f64,
    /// Resolved transition effects
    pub transition: TransitionSpec,
    /// Whether the per-segment effect guard passed
    pub apply_effects: bool,
}

/// Produces time-addressed plans from composition input
#[derive(Debug, Clone)]
pub struct TimelineComposer {
    wrapper: TextWrapper,
}

impl TimelineComposer {
    /// Create a composer wrapping text through the given wrapper
    pub fn new(wrapper: TextWrapper) -> Self {
        TimelineComposer { wrapper }
    }

    /// Validate the spec and compute the body layout
    pub fn layout(&self, spec: &CompositionSpec) -> Result<BodyLayout, CompositionError> {
        if spec.images.is_empty() {
            return Err(CompositionError::EmptyImageList);
        }

        if spec.audio_duration <= 0.0 {
            return Err(CompositionError::NonPositiveAudioDuration(
                spec.audio_duration,
            ));
        }

        let per_image = spec.audio_duration / spec.images.len() as f64;
        let transition = transition_spec(spec.transition, spec.transition_duration);
        let overlap = transition.needs_overlap && spec.transition_duration > 0.0;

        let step = if overlap {
            per_image - spec.transition_duration
        } else {
            per_image
        };

        let apply_effects =
            transition.has_effects() && effects_apply(per_image, spec.transition_duration);
        if transition.has_effects() && !apply_effects {
            debug!(
                "Transition window {}s too large for {:.2}s segments, rendering hard cuts",
                spec.transition_duration, per_image
            );
        }

        Ok(BodyLayout {
            per_image,
            step,
            transition,
            apply_effects,
        })
    }

    /// Build the image segment at `index`
    pub fn image_segment(
        &self,
        spec: &CompositionSpec,
        layout: &BodyLayout,
        index: usize,
    ) -> VisualSegment {
        let start = spec.intro_duration() + index as f64 * layout.step;

        let (entry_effect, exit_effect) = if layout.apply_effects {
            (layout.transition.entry, layout.transition.exit)
        } else {
            (None, None)
        };

        VisualSegment {
            kind: SegmentKind::Image,
            content: SegmentContent::Image {
                path: spec.images[index].clone(),
            },
            start,
            duration: layout.per_image,
            position: Position::center(),
            entry_effect,
            exit_effect,
            keyframes: Vec::new(),
        }
    }

    /// Build all subtitle text segments.
    ///
    /// Cues whose text is empty after markup stripping are dropped here;
    /// cue starts are shifted by the intro duration so captions stay in
    /// sync with the offset audio.
    pub fn subtitle_segments(&self, spec: &CompositionSpec) -> Vec<VisualSegment> {
        let style = &spec.subtitle_style;
        let budget = spec.resolution.width.saturating_sub(SUBTITLE_TEXT_MARGIN) as f32;
        let wrap = |text: &str| self.wrapper.wrap(text, &style.font, style.font_size, budget);

        let position = match style.position {
            SubtitlePosition::Center => Position::center(),
            SubtitlePosition::Bottom => Position::bottom(SUBTITLE_BOTTOM_MARGIN),
        };

        let mut segments = Vec::new();

        for cue in &spec.subtitles.cues {
            if cue.text.is_empty() {
                continue;
            }

            let duration = cue.duration_secs();
            if duration <= 0.0 {
                warn!(
                    "Dropping cue with non-positive duration at {}ms",
                    cue.start_ms
                );
                continue;
            }

            let start = spec.intro_duration() + cue.start_secs();

            let keyframes = if style.typewriter {
                typewriter::generate_keyframes(
                    &cue.text,
                    start,
                    duration,
                    style.typewriter_ratio,
                    Some(style.max_clips_per_cue),
                    wrap,
                )
            } else {
                vec![typewriter::static_keyframe(&cue.text, start, duration, wrap)]
            };

            segments.push(VisualSegment {
                kind: SegmentKind::SubtitleText,
                content: SegmentContent::Text(TextBlock {
                    text: wrap(&cue.text),
                    font: style.font.clone(),
                    size_px: style.font_size,
                    color: style.color,
                    stroke_color: Some(style.stroke_color),
                    stroke_width: style.stroke_width,
                }),
                start,
                duration,
                position,
                entry_effect: None,
                exit_effect: None,
                keyframes,
            });
        }

        segments
    }

    /// Build the intro title segments, if configured
    pub fn intro_segments(&self, spec: &CompositionSpec) -> Vec<VisualSegment> {
        spec.intro
            .as_ref()
            .map(|title| plan_title(title, spec.resolution, 0.0, &self.wrapper))
            .unwrap_or_default()
    }

    /// Build the outro title segments, if configured
    pub fn outro_segments(&self, spec: &CompositionSpec) -> Vec<VisualSegment> {
        spec.outro
            .as_ref()
            .map(|title| {
                let start = spec.intro_duration() + spec.audio_duration;
                plan_title(title, spec.resolution, start, &self.wrapper)
            })
            .unwrap_or_default()
    }

    /// Assemble ordered segments into the final plan
    pub fn assemble(&self, spec: &CompositionSpec, segments: Vec<VisualSegment>) -> TimelinePlan {
        TimelinePlan {
            total_duration: spec.total_duration(),
            audio_offset: spec.intro_duration(),
            resolution: spec.resolution,
            segments,
        }
    }

    /// Run the whole composition in one call
    pub fn compose(&self, spec: &CompositionSpec) -> Result<TimelinePlan, CompositionError> {
        let layout = self.layout(spec)?;

        let mut segments = self.intro_segments(spec);
        for index in 0..spec.images.len() {
            segments.push(self.image_segment(spec, &layout, index));
        }
        segments.extend(self.subtitle_segments(spec));
        segments.extend(self.outro_segments(spec));

        Ok(self.assemble(spec, segments))
    }
}
