/*!
 * Timeline composition: turning images, audio timing, subtitle cues and
 * title configs into a fully time-addressed `TimelinePlan`.
 */

pub mod composer;
pub mod plan;
pub mod titles;
pub mod transitions;
pub mod typewriter;

pub use composer::{CompositionSpec, ResolvedSubtitleStyle, TimelineComposer};
pub use plan::{
    Effect, Position, Resolution, SegmentContent, SegmentKind, TimelinePlan, TypewriterKeyframe,
    VisualSegment,
};
pub use titles::{ResolvedTitle, TitleAnimation, TitleConfig};
pub use transitions::TransitionStyle;
