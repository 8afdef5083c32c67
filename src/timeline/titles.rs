/*!
 * Intro/outro title planning.
 *
 * A title is a silent, fixed-duration block: a backdrop (solid color, or a
 * cover-fit image over a black base) plus centered text with optional entry
 * and exit animations. Titles never carry audio; the audio offset of the
 * plan accounts for the intro length.
 */

use std::path::PathBuf;

use anyhow::anyhow;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::app_config::{parse_hex_color, resolve_font};
use crate::errors::ValidationError;
use crate::text_layout::TextWrapper;

use super::plan::{
    Effect, Position, Rgb, SegmentContent, SegmentKind, SlideDirection, TextBlock, Resolution,
    VisualSegment,
};
use super::typewriter::{self, TITLE_REVEAL_RATIO};

/// Horizontal padding reserved around title text, in pixels
const TITLE_TEXT_MARGIN: u32 = 100;

/// Entry/exit animation selection for a title
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TitleAnimation {
    /// No animation
    #[default]
    None,
    /// Fade through transparency
    Fade,
    /// Slide via the left edge
    SlideLeft,
    /// Slide via the right edge
    SlideRight,
    /// Slide via the top edge
    SlideTop,
    /// Slide via the bottom edge
    SlideBottom,
    /// Continuous scale ramp
    Zoom,
    /// Per-character reveal; entry only
    Typewriter,
}

impl std::str::FromStr for TitleAnimation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "fade" => Ok(Self::Fade),
            "slide_left" => Ok(Self::SlideLeft),
            "slide_right" => Ok(Self::SlideRight),
            "slide_top" => Ok(Self::SlideTop),
            "slide_bottom" => Ok(Self::SlideBottom),
            "zoom" => Ok(Self::Zoom),
            "typewriter" => Ok(Self::Typewriter),
            _ => Err(anyhow!("Invalid title animation: {}", s)),
        }
    }
}

/// User-facing intro/outro configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TitleConfig {
    /// Title text
    pub text: String,

    /// Duration in seconds
    #[serde(default = "default_title_duration")]
    pub duration: f64,

    /// Font name, resolved through the font catalog
    #[serde(default = "default_title_font")]
    pub font: String,

    /// Font size in pixels
    #[serde(default = "default_title_font_size")]
    pub font_size: u32,

    /// Text color as #rrggbb
    #[serde(default = "default_title_font_color")]
    pub font_color: String,

    /// Backdrop color as #rrggbb
    #[serde(default = "default_title_bg_color")]
    pub bg_color: String,

    /// Optional backdrop image, drawn cover-fit over a black base
    #[serde(default)]
    pub bg_image: Option<PathBuf>,

    /// Entry animation
    #[serde(default)]
    pub animation_in: TitleAnimation,

    /// Exit animation
    #[serde(default)]
    pub animation_out: TitleAnimation,
}

impl TitleConfig {
    /// Validate and resolve the config into composer input.
    ///
    /// A configured backdrop image that does not exist on disk falls back to
    /// the backdrop color with a warning, mirroring how missing media is
    /// treated as a soft degradation rather than a hard failure.
    pub fn resolve(&self) -> Result<ResolvedTitle, ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::InvalidParameter {
                name: "title.text",
                reason: "text must not be empty".to_string(),
            });
        }

        if self.duration <= 0.0 {
            return Err(ValidationError::InvalidParameter {
                name: "title.duration",
                reason: format!("duration must be positive, got {}", self.duration),
            });
        }

        if self.animation_out == TitleAnimation::Typewriter {
            return Err(ValidationError::InvalidParameter {
                name: "title.animation_out",
                reason: "typewriter is an entry-only animation".to_string(),
            });
        }

        let color = parse_hex_color(&self.font_color)?;
        let bg_color = parse_hex_color(&self.bg_color)?;

        let backdrop = match &self.bg_image {
            Some(path) if path.exists() => TitleBackdrop::Image(path.clone()),
            Some(path) => {
                warn!("Title backdrop image not found, using color: {:?}", path);
                TitleBackdrop::Color(bg_color)
            }
            None => TitleBackdrop::Color(bg_color),
        };

        Ok(ResolvedTitle {
            text: self.text.trim().to_string(),
            duration: self.duration,
            font: resolve_font(&self.font),
            font_size: self.font_size,
            color,
            backdrop,
            animation_in: self.animation_in,
            animation_out: self.animation_out,
        })
    }
}

/// Validated title ready for composition
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTitle {
    /// Title text, trimmed
    pub text: String,
    /// Duration in seconds
    pub duration: f64,
    /// Font file path
    pub font: PathBuf,
    /// Font size in pixels
    pub font_size: u32,
    /// Text color
    pub color: Rgb,
    /// Backdrop layer
    pub backdrop: TitleBackdrop,
    /// Entry animation
    pub animation_in: TitleAnimation,
    /// Exit animation
    pub animation_out: TitleAnimation,
}

/// Title backdrop layer
#[derive(Debug, Clone, PartialEq)]
pub enum TitleBackdrop {
    /// Solid color
    Color(Rgb),
    /// Cover-fit image over a black base
    Image(PathBuf),
}

/// Animation window length: one second, or a third of the title for short
/// titles
pub fn animation_window(duration: f64) -> f64 {
    (duration / 3.0).min(1.0)
}

fn entry_effect(animation: TitleAnimation, window: f64) -> Option<Effect> {
    match animation {
        TitleAnimation::None | TitleAnimation::Typewriter => None,
        TitleAnimation::Fade => Some(Effect::FadeIn { duration: window }),
        TitleAnimation::SlideLeft => Some(Effect::SlideIn {
            duration: window,
            from: SlideDirection::Left,
        }),
        TitleAnimation::SlideRight => Some(Effect::SlideIn {
            duration: window,
            from: SlideDirection::Right,
        }),
        TitleAnimation::SlideTop => Some(Effect::SlideIn {
            duration: window,
            from: SlideDirection::Top,
        }),
        TitleAnimation::SlideBottom => Some(Effect::SlideIn {
            duration: window,
            from: SlideDirection::Bottom,
        }),
        TitleAnimation::Zoom => Some(Effect::ZoomIn {
            duration: window,
            from_scale: 0.3,
            to_scale: 1.0,
        }),
    }
}

fn exit_effect(animation: TitleAnimation, window: f64) -> Option<Effect> {
    match animation {
        TitleAnimation::None | TitleAnimation::Typewriter => None,
        TitleAnimation::Fade => Some(Effect::FadeOut { duration: window }),
        TitleAnimation::SlideLeft => Some(Effect::SlideOut {
            duration: window,
            to: SlideDirection::Left,
        }),
        TitleAnimation::SlideRight => Some(Effect::SlideOut {
            duration: window,
            to: SlideDirection::Right,
        }),
        TitleAnimation::SlideTop => Some(Effect::SlideOut {
            duration: window,
            to: SlideDirection::Top,
        }),
        TitleAnimation::SlideBottom => Some(Effect::SlideOut {
            duration: window,
            to: SlideDirection::Bottom,
        }),
        TitleAnimation::Zoom => Some(Effect::ZoomOut {
            duration: window,
            from_scale: 1.0,
            to_scale: 0.3,
        }),
    }
}

/// Plan the segments for one title block starting at `start`.
///
/// Output order is backdrop first, text last, so the text draws on top.
pub fn plan_title(
    title: &ResolvedTitle,
    resolution: Resolution,
    start: f64,
    wrapper: &TextWrapper,
) -> Vec<VisualSegment> {
    let mut segments = Vec::new();
    let window = animation_window(title.duration);

    match &title.backdrop {
        TitleBackdrop::Color(rgb) => {
            segments.push(backdrop_segment(SegmentContent::Color { rgb: *rgb }, start, title));
        }
        TitleBackdrop::Image(path) => {
            // Black base ensures full coverage even when the image aspect
            // leaves bars after cover-fit rounding
            segments.push(backdrop_segment(
                SegmentContent::Color { rgb: (0, 0, 0) },
                start,
                title,
            ));
            segments.push(backdrop_segment(
                SegmentContent::Image { path: path.clone() },
                start,
                title,
            ));
        }
    }

    let budget = resolution.width.saturating_sub(TITLE_TEXT_MARGIN) as f32;
    let wrap = |text: &str| wrapper.wrap(text, &title.font, title.font_size, budget);

    let keyframes = if title.animation_in == TitleAnimation::Typewriter {
        typewriter::generate_keyframes(
            &title.text,
            start,
            title.duration,
            TITLE_REVEAL_RATIO,
            None,
            wrap,
        )
    } else {
        Vec::new()
    };

    segments.push(VisualSegment {
        kind: SegmentKind::TitleText,
        content: SegmentContent::Text(TextBlock {
            text: wrap(&title.text),
            font: title.font.clone(),
            size_px: title.font_size,
            color: title.color,
            stroke_color: None,
            stroke_width: 0,
        }),
        start,
        duration: title.duration,
        position: Position::center(),
        entry_effect: entry_effect(title.animation_in, window),
        exit_effect: exit_effect(title.animation_out, window),
        keyframes,
    });

    segments
}

fn backdrop_segment(content: SegmentContent, start: f64, title: &ResolvedTitle) -> VisualSegment {
    VisualSegment {
        kind: SegmentKind::TitleText,
        content,
        start,
        duration: title.duration,
        position: Position::center(),
        entry_effect: None,
        exit_effect: None,
        keyframes: Vec::new(),
    }
}

fn default_title_duration() -> f64 {
    5.0
}

fn default_title_font() -> String {
    "DejaVuSans-Bold".to_string()
}

fn default_title_font_size() -> u32 {
    80
}

fn default_title_font_color() -> String {
    "#ffffff".to_string()
}

fn default_title_bg_color() -> String {
    "#000000".to_string()
}
