/*!
 * Tests for timeline composition
 */

use std::path::PathBuf;

use slidecast::app_config::SubtitleStyle;
use slidecast::subtitle_processor::{SubtitleCue, SubtitleTrack};
use slidecast::text_layout::TextWrapper;
use slidecast::timeline::{
    CompositionSpec, Resolution, ResolvedSubtitleStyle, SegmentKind, TimelineComposer,
    TimelinePlan, TitleConfig, TransitionStyle,
};

fn composer() -> TimelineComposer {
    TimelineComposer::new(TextWrapper::without_measurer())
}

fn base_spec(image_count: usize, audio_duration: f64) -> CompositionSpec {
    CompositionSpec {
        images: (0..image_count)
            .map(|i| PathBuf::from(format!("/tmp/slide_{i}.jpg")))
            .collect(),
        audio_duration,
        resolution: Resolution::new(1080, 1920),
        transition: TransitionStyle::None,
        transition_duration: 0.0,
        subtitles: SubtitleTrack::new(),
        subtitle_style: ResolvedSubtitleStyle::from_style(&SubtitleStyle::default()).unwrap(),
        intro: None,
        outro: None,
    }
}

fn title(text: &str, duration: f64) -> TitleConfig {
    TitleConfig {
        text: text.to_string(),
        duration,
        font: "DejaVuSans-Bold".to_string(),
        font_size: 80,
        font_color: "#ffffff".to_string(),
        bg_color: "#000000".to_string(),
        bg_image: None,
        animation_in: Default::default(),
        animation_out: Default::default(),
    }
}

/// Scenario: 3 images, 30s audio, 1s crossfade -> three 10s segments
/// overlapping by 1s, total duration still 30s
#[test]
fn test_compose_withCrossfade_shouldProduceOverlappingLayout() {
    let mut spec = base_spec(3, 30.0);
    spec.transition = TransitionStyle::Crossfade;
    spec.transition_duration = 1.0;

    let plan = composer().compose(&spec).unwrap();
    let images: Vec<_> = plan.segments_of_kind(SegmentKind::Image).collect();

    assert_eq!(images.len(), 3);
    assert_eq!(images[0].start, 0.0);
    assert!((images[1].start - 9.0).abs() < 1e-9);
    assert!((images[2].start - 18.0).abs() < 1e-9);
    for segment in &images {
        assert!((segment.duration - 10.0).abs() < 1e-9);
    }
    assert_eq!(plan.total_duration, 30.0);
}

/// For any image count, non-overlapping durations partition the audio
#[test]
fn test_compose_withVariousCounts_shouldPartitionAudioExactly() {
    for count in [1usize, 2, 5, 7, 12] {
        let plan = composer().compose(&base_spec(count, 63.0)).unwrap();
        let images: Vec<_> = plan.segments_of_kind(SegmentKind::Image).collect();

        assert_eq!(images.len(), count);
        let total: f64 = images.iter().map(|s| s.duration).sum();
        assert!(
            (total - 63.0).abs() < 1e-6,
            "{} segments should cover the audio",
            count
        );
    }
}

/// Scenario: cue 0-4s "Hello world" at ratio 0.7 -> 2.8s reveal, 1.2s hold,
/// final keyframe carries the full text and absorbs the hold
#[test]
fn test_compose_withTypewriterCue_shouldMatchReferenceTiming() {
    let mut spec = base_spec(1, 10.0);
    spec.subtitles
        .cues
        .push(SubtitleCue::new(0, 4_000, "Hello world".to_string()));

    let plan = composer().compose(&spec).unwrap();
    let subtitle = plan
        .segments_of_kind(SegmentKind::SubtitleText)
        .next()
        .unwrap();

    assert_eq!(subtitle.keyframes.len(), 11);

    let last = subtitle.keyframes.last().unwrap();
    assert_eq!(last.text, "Hello world");
    assert!((last.duration - (2.8 / 11.0 + 1.2)).abs() < 1e-9);

    // Keyframe durations for one cue sum exactly to the cue duration
    let total: f64 = subtitle.keyframes.iter().map(|kf| kf.duration).sum();
    assert!((total - 4.0).abs() < 1e-9);
}

/// The final keyframe of every cue reveals the complete cue text
#[test]
fn test_compose_withManyCues_finalKeyframesShouldCompleteText() {
    let mut spec = base_spec(2, 40.0);
    for (i, text) in ["First cue", "A somewhat longer second cue", "Third"]
        .iter()
        .enumerate()
    {
        let start = (i as u64) * 5_000;
        spec.subtitles
            .cues
            .push(SubtitleCue::new(start, start + 3_000, text.to_string()));
    }

    let plan = composer().compose(&spec).unwrap();
    let subtitles: Vec<_> = plan.segments_of_kind(SegmentKind::SubtitleText).collect();
    assert_eq!(subtitles.len(), 3);

    for (segment, text) in subtitles.iter().zip(["First cue", "A somewhat longer second cue", "Third"]) {
        assert_eq!(segment.keyframes.last().unwrap().text, text);
    }
}

/// Intro and outro bracket the body; audio offset equals the intro length
#[test]
fn test_compose_withTitles_shouldSequenceIntroBodyOutro() {
    let mut spec = base_spec(2, 20.0);
    spec.intro = Some(title("Welcome", 5.0).resolve().unwrap());
    spec.outro = Some(title("The End", 3.0).resolve().unwrap());

    let plan = composer().compose(&spec).unwrap();

    assert_eq!(plan.total_duration, 28.0);
    assert_eq!(plan.audio_offset, 5.0);

    // Intro occupies [0, 5), body [5, 25), outro [25, 28)
    let first_image = plan.segments_of_kind(SegmentKind::Image).next().unwrap();
    assert_eq!(first_image.start, 5.0);

    let titles: Vec<_> = plan.segments_of_kind(SegmentKind::TitleText).collect();
    assert!(titles.iter().any(|s| s.start == 0.0 && s.duration == 5.0));
    assert!(titles.iter().any(|s| s.start == 25.0 && s.duration == 3.0));
}

/// Segment windows stay inside the plan's total duration
#[test]
fn test_compose_segments_shouldFitTotalDuration() {
    let mut spec = base_spec(4, 44.0);
    spec.transition = TransitionStyle::Fade;
    spec.transition_duration = 0.8;
    spec.intro = Some(title("Hi", 2.0).resolve().unwrap());
    spec.subtitles
        .cues
        .push(SubtitleCue::new(0, 4_000, "A caption".to_string()));

    let plan = composer().compose(&spec).unwrap();

    for segment in &plan.segments {
        assert!(segment.duration > 0.0);
        assert!(
            segment.end() <= plan.total_duration + 1e-6,
            "segment ends at {} beyond total {}",
            segment.end(),
            plan.total_duration
        );
    }
}

/// Plans serialize to JSON and back without loss
#[test]
fn test_plan_jsonRoundTrip_shouldPreserveStructure() {
    let mut spec = base_spec(2, 10.0);
    spec.transition = TransitionStyle::Crossfade;
    spec.transition_duration = 0.5;
    spec.subtitles
        .cues
        .push(SubtitleCue::new(500, 2_500, "Serialized".to_string()));

    let plan = composer().compose(&spec).unwrap();
    let json = serde_json::to_string(&plan).unwrap();
    let reparsed: TimelinePlan = serde_json::from_str(&json).unwrap();

    assert_eq!(reparsed, plan);
}
