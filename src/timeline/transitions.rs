/*!
 * Transition policy between image segments.
 *
 * A transition style maps to an (entry effect, exit effect, needs_overlap)
 * triple. Overlapping styles shift each segment's start so adjacent slides
 * share a `transition_duration` window; non-overlapping styles lay segments
 * back to back.
 */

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use super::plan::{Effect, SlideDirection};

/// Transition style between adjacent image segments
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStyle {
    /// Hard cut
    None,
    /// Fade out to background, fade in from background, overlapping
    Fade,
    /// Crossfade between adjacent slides, overlapping
    #[default]
    Crossfade,
    /// Fade in only, back-to-back layout
    FadeIn,
    /// Fade out only, back-to-back layout
    FadeOut,
    /// Slide towards the left edge
    SlideLeft,
    /// Slide towards the right edge
    SlideRight,
    /// Slide upwards
    SlideUp,
    /// Slide downwards
    SlideDown,
}

impl TransitionStyle {
    // @returns: Lowercase style identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fade => "fade",
            Self::Crossfade => "crossfade",
            Self::FadeIn => "fadein",
            Self::FadeOut => "fadeout",
            Self::SlideLeft => "slide_left",
            Self::SlideRight => "slide_right",
            Self::SlideUp => "slide_up",
            Self::SlideDown => "slide_down",
        }
    }
}

impl std::fmt::Display for TransitionStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransitionStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "fade" => Ok(Self::Fade),
            "crossfade" => Ok(Self::Crossfade),
            "fadein" => Ok(Self::FadeIn),
            "fadeout" => Ok(Self::FadeOut),
            "slide_left" => Ok(Self::SlideLeft),
            "slide_right" => Ok(Self::SlideRight),
            "slide_up" => Ok(Self::SlideUp),
            "slide_down" => Ok(Self::SlideDown),
            _ => Err(anyhow!("Invalid transition style: {}", s)),
        }
    }
}

/// Resolved effects for one transition style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSpec {
    /// Effect applied as a segment enters
    pub entry: Option<Effect>,
    /// Effect applied as a segment exits
    pub exit: Option<Effect>,
    /// Whether adjacent segments overlap by the transition duration
    pub needs_overlap: bool,
}

impl TransitionSpec {
    /// No transition at all
    pub fn none() -> Self {
        TransitionSpec {
            entry: None,
            exit: None,
            needs_overlap: false,
        }
    }

    /// Whether any effect is present
    pub fn has_effects(&self) -> bool {
        self.entry.is_some() || self.exit.is_some()
    }
}

/// Resolve a transition style and duration to its effect triple.
///
/// Slide styles enter from the opposite edge they exit to, so motion reads
/// as one continuous push across the frame.
pub fn transition_spec(style: TransitionStyle, duration: f64) -> TransitionSpec {
    let slide = |from: SlideDirection, to: SlideDirection| TransitionSpec {
        entry: Some(Effect::SlideIn { duration, from }),
        exit: Some(Effect::SlideOut { duration, to }),
        needs_overlap: true,
    };

    match style {
        TransitionStyle::None => TransitionSpec::none(),
        TransitionStyle::Crossfade => TransitionSpec {
            entry: Some(Effect::CrossFadeIn { duration }),
            exit: Some(Effect::CrossFadeOut { duration }),
            needs_overlap: true,
        },
        TransitionStyle::Fade => TransitionSpec {
            entry: Some(Effect::FadeIn { duration }),
            exit: Some(Effect::FadeOut { duration }),
            needs_overlap: true,
        },
        TransitionStyle::FadeIn => TransitionSpec {
            entry: Some(Effect::FadeIn { duration }),
            exit: None,
            needs_overlap: false,
        },
        TransitionStyle::FadeOut => TransitionSpec {
            entry: None,
            exit: Some(Effect::FadeOut { duration }),
            needs_overlap: false,
        },
        TransitionStyle::SlideLeft => slide(SlideDirection::Right, SlideDirection::Left),
        TransitionStyle::SlideRight => slide(SlideDirection::Left, SlideDirection::Right),
        TransitionStyle::SlideUp => slide(SlideDirection::Bottom, SlideDirection::Top),
        TransitionStyle::SlideDown => slide(SlideDirection::Top, SlideDirection::Bottom),
    }
}

/// Whether effects may be applied to segments of the given length.
/// Guards against degenerate segments where two transition windows would
/// consume the whole slide.
pub fn effects_apply(per_image_duration: f64, transition_duration: f64) -> bool {
    transition_duration > 0.0 && per_image_duration > transition_duration * 2.0
}
