/*!
 * Typewriter reveal keyframe generation.
 *
 * A cue's duration is split into a reveal window (`duration × ratio`) and a
 * hold window (the remainder). The reveal window is divided evenly between
 * keyframes; the final keyframe always shows the complete text and absorbs
 * the hold window on top of its reveal step.
 *
 * Subtitle cues cap the number of keyframes (revealing several characters
 * per step) to bound the amount of drawable elements per cue; titles are
 * short and reveal one character at a time.
 */

use super::plan::TypewriterKeyframe;

/// Default reveal ratio for subtitle cues
pub const SUBTITLE_REVEAL_RATIO: f64 = 0.7;

/// Default reveal ratio for intro/outro titles
pub const TITLE_REVEAL_RATIO: f64 = 0.6;

/// Character positions (1-based prefix lengths) at which keyframes reveal
/// text. With a cap, the step is `max(1, chars / cap)`; the full length is
/// always the final position.
pub fn reveal_positions(char_count: usize, max_steps: Option<usize>) -> Vec<usize> {
    if char_count == 0 {
        return Vec::new();
    }

    let step = match max_steps {
        Some(cap) if cap > 0 => (char_count / cap).max(1),
        _ => 1,
    };

    let mut positions: Vec<usize> = (step..char_count).step_by(step).collect();
    if positions.last() != Some(&char_count) {
        positions.push(char_count);
    }
    positions
}

/// Generate the reveal keyframes for one cue.
///
/// `wrap` re-flows each partial prefix independently: a partial string can
/// wrap at a different word boundary than the full text, so wrapping once
/// and slicing would misplace line breaks.
pub fn generate_keyframes<F>(
    text: &str,
    cue_start: f64,
    cue_duration: f64,
    ratio: f64,
    max_steps: Option<usize>,
    wrap: F,
) -> Vec<TypewriterKeyframe>
where
    F: Fn(&str) -> String,
{
    let chars: Vec<char> = text.chars().collect();
    let positions = reveal_positions(chars.len(), max_steps);
    if positions.is_empty() {
        return Vec::new();
    }

    let reveal_window = cue_duration * ratio;
    let hold_window = cue_duration - reveal_window;
    let per_step = reveal_window / positions.len() as f64;

    positions
        .iter()
        .enumerate()
        .map(|(idx, &char_pos)| {
            let partial: String = chars[..char_pos].iter().collect();
            let is_last = idx == positions.len() - 1;

            TypewriterKeyframe {
                text: wrap(&partial),
                start: cue_start + idx as f64 * per_step,
                duration: if is_last { per_step + hold_window } else { per_step },
            }
        })
        .collect()
}

/// A single keyframe spanning the whole cue, used when typewriter is disabled
pub fn static_keyframe<F>(text: &str, cue_start: f64, cue_duration: f64, wrap: F) -> TypewriterKeyframe
where
    F: Fn(&str) -> String,
{
    TypewriterKeyframe {
        text: wrap(text),
        start: cue_start,
        duration: cue_duration,
    }
}
