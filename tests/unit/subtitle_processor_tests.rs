/*!
 * Tests for subtitle track parsing and serialization
 */

use slidecast::subtitle_processor::{SubtitleCue, SubtitleTrack};

use crate::common;

/// Well-formed SRT survives a serialize/parse round trip unchanged
#[test]
fn test_round_trip_withWellFormedTrack_shouldPreserveCues() {
    let track = SubtitleTrack {
        cues: vec![
            SubtitleCue::new(1_000, 4_000, "This is a test subtitle.".to_string()),
            SubtitleCue::new(5_000, 9_000, "It contains multiple entries.".to_string()),
            SubtitleCue::new(10_000, 14_000, "For testing purposes.".to_string()),
        ],
    };

    let serialized = track.to_string();
    let reparsed = SubtitleTrack::parse_srt(&serialized);

    assert_eq!(reparsed, track);
}

/// The bundled sample parses into the expected cue timings
#[test]
fn test_parse_withSampleFile_shouldYieldThreeCues() {
    let track = SubtitleTrack::parse_srt(common::sample_srt());

    assert_eq!(track.len(), 3);
    assert_eq!(track.cues[0].start_ms, 1_000);
    assert_eq!(track.cues[0].end_ms, 4_000);
    assert_eq!(track.cues[2].text, "For testing purposes.");
}

/// Millisecond separators may be commas or periods
#[test]
fn test_parse_withMixedSeparators_shouldAcceptBoth() {
    let content = "1\n00:00:01,500 --> 00:00:02.750\nMixed separators\n";
    let track = SubtitleTrack::parse_srt(content);

    assert_eq!(track.len(), 1);
    assert_eq!(track.cues[0].start_ms, 1_500);
    assert_eq!(track.cues[0].end_ms, 2_750);
}

/// Inline markup is stripped; the round trip holds modulo that stripping
#[test]
fn test_parse_withMarkup_shouldStripTagsOnly() {
    let content = "1\n00:00:00,000 --> 00:00:02,000\n<i>Hello</i> <font color=\"red\">world</font>\n";
    let track = SubtitleTrack::parse_srt(content);

    assert_eq!(track.cues[0].text, "Hello world");

    // Re-serializing the stripped form is now a fixed point
    let reparsed = SubtitleTrack::parse_srt(&track.to_string());
    assert_eq!(reparsed, track);
}

/// Multi-line cue text collapses to a single spaced line
#[test]
fn test_parse_withMultilineCue_shouldCollapseNewlines() {
    let content = "1\n00:01:00,000 --> 00:01:03,000\nLine one\nLine two\nLine three\n";
    let track = SubtitleTrack::parse_srt(content);

    assert_eq!(track.cues[0].text, "Line one Line two Line three");
}

/// Malformed blocks are skipped without failing the parse
#[test]
fn test_parse_withMalformedBlocks_shouldSkipSilently() {
    let content = "\
not a number
00:00:01,000 --> bad timestamp
broken

2
00:00:05,000 --> 00:00:07,000
Good cue

just some floating text
";
    let track = SubtitleTrack::parse_srt(content);

    assert_eq!(track.len(), 1);
    assert_eq!(track.cues[0].text, "Good cue");
}

/// Cues come out ordered by start time even when the input is shuffled
#[test]
fn test_parse_withShuffledInput_shouldSortByStart() {
    let content = "\
2
00:00:10,000 --> 00:00:12,000
Later

1
00:00:01,000 --> 00:00:03,000
Earlier
";
    let track = SubtitleTrack::parse_srt(content);

    assert_eq!(track.cues[0].text, "Earlier");
    assert_eq!(track.cues[1].text, "Later");
}

/// Overlapping cues are permitted and preserved
#[test]
fn test_parse_withOverlappingCues_shouldKeepBoth() {
    let content = "\
1
00:00:01,000 --> 00:00:05,000
First

2
00:00:03,000 --> 00:00:07,000
Second
";
    let track = SubtitleTrack::parse_srt(content);

    assert_eq!(track.len(), 2);
    assert!(track.cues[0].end_ms > track.cues[1].start_ms);
}

/// Cues that strip down to empty text are kept at parse time
#[test]
fn test_parse_withMarkupOnlyCue_shouldKeepEmptyCue() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n<i></i>\n";
    let track = SubtitleTrack::parse_srt(content);

    assert_eq!(track.len(), 1);
    assert!(track.cues[0].text.is_empty());
}

/// Timestamp arithmetic covers hours, minutes, seconds and millis
#[test]
fn test_parse_withLargeTimestamps_shouldConvertCorrectly() {
    let content = "1\n01:23:45,678 --> 01:23:50,000\nLate cue\n";
    let track = SubtitleTrack::parse_srt(content);

    assert_eq!(
        track.cues[0].start_ms,
        3_600_000 + 23 * 60_000 + 45_000 + 678
    );
    assert!((track.cues[0].start_secs() - 5025.678).abs() < 1e-9);
    assert!((track.cues[0].duration_secs() - 4.322).abs() < 1e-9);
}

/// Writing and re-reading a file preserves the track
#[test]
fn test_write_to_srt_thenParseFile_shouldRoundTrip() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("out.srt");

    let track = SubtitleTrack::parse_srt(common::sample_srt());
    track.write_to_srt(&path).unwrap();

    let reparsed = SubtitleTrack::from_srt_file(&path).unwrap();
    assert_eq!(reparsed, track);
}

/// An empty input yields an empty track rather than an error
#[test]
fn test_parse_withEmptyInput_shouldYieldEmptyTrack() {
    assert!(SubtitleTrack::parse_srt("").is_empty());
    assert!(SubtitleTrack::parse_srt("\n\n\n").is_empty());
}
