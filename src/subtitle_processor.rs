use std::fmt;
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// @module: Subtitle track parsing and serialization

// @const: SRT cue block regex: index line, timing line, text lines
static CUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^\s*(\d+)\s*\r?\n(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})[^\r\n]*\r?\n(.*)$",
    )
    .unwrap()
});

// @const: Blank-line block separator
static BLOCK_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n\s*\r?\n").unwrap());

// @const: Inline markup tags such as <i> or <font ...>
static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// One timed subtitle cue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCue {
    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Cue text, markup stripped, newlines collapsed
    pub text: String,
}

impl SubtitleCue {
    /// Creates a new cue
    pub fn new(start_ms: u64, end_ms: u64, text: String) -> Self {
        SubtitleCue {
            start_ms,
            end_ms,
            text,
        }
    }

    /// Start time in seconds
    pub fn start_secs(&self) -> f64 {
        self.start_ms as f64 / 1000.0
    }

    /// End time in seconds
    pub fn end_secs(&self) -> f64 {
        self.end_ms as f64 / 1000.0
    }

    /// Cue duration in seconds
    pub fn duration_secs(&self) -> f64 {
        (self.end_ms.saturating_sub(self.start_ms)) as f64 / 1000.0
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

/// Collection of subtitle cues, ordered by start time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    /// Ordered cues
    pub cues: Vec<SubtitleCue>,
}

impl SubtitleTrack {
    /// Create an empty track
    pub fn new() -> Self {
        SubtitleTrack { cues: Vec::new() }
    }

    /// Parse an SRT file into a subtitle track
    pub fn from_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read subtitle file: {:?}", path.as_ref()))?;
        Ok(Self::parse_srt(&content))
    }

    /// Parse SRT content into a subtitle track.
    ///
    /// Blocks that do not match the numbered-cue pattern are skipped with a
    /// warning rather than failing the whole parse. Cues whose text becomes
    /// empty after markup stripping are kept; downstream composition drops
    /// them.
    pub fn parse_srt(content: &str) -> Self {
        let mut cues = Vec::new();

        for (block_idx, block) in BLOCK_SPLIT_REGEX.split(content).enumerate() {
            if block.trim().is_empty() {
                continue;
            }

            let Some(caps) = CUE_REGEX.captures(block) else {
                warn!("Skipping malformed subtitle block {}", block_idx + 1);
                continue;
            };

            let start_ms = Self::timestamp_to_ms(&caps, 2);
            let end_ms = Self::timestamp_to_ms(&caps, 6);

            let raw_text = caps.get(10).map_or("", |m| m.as_str());
            let text = Self::clean_text(raw_text);

            cues.push(SubtitleCue::new(start_ms, end_ms, text));
        }

        // SRT files are usually sorted already, but the contract is order by start
        cues.sort_by_key(|cue| cue.start_ms);

        let overlap_count = cues
            .windows(2)
            .filter(|pair| pair[0].end_ms > pair[1].start_ms)
            .count();
        if overlap_count > 0 {
            debug!("Found {} overlapping subtitle cues", overlap_count);
        }

        SubtitleTrack { cues }
    }

    /// Write the track to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, self.to_string())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))
    }

    /// Number of cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Whether the track has no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Strip inline markup and collapse embedded newlines to spaces
    fn clean_text(raw: &str) -> String {
        let stripped = MARKUP_REGEX.replace_all(raw.trim(), "");
        stripped
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Convert four capture groups starting at `start_idx` (h, m, s, ms) to milliseconds
    fn timestamp_to_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
        let part = |offset: usize| -> u64 {
            caps.get(start_idx + offset)
                .map_or(0, |m| m.as_str().parse().unwrap_or(0))
        };

        (part(0) * 3600 + part(1) * 60 + part(2)) * 1000 + part(3)
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, cue) in self.cues.iter().enumerate() {
            writeln!(f, "{}", i + 1)?;
            writeln!(
                f,
                "{} --> {}",
                SubtitleCue::format_timestamp(cue.start_ms),
                SubtitleCue::format_timestamp(cue.end_ms)
            )?;
            writeln!(f, "{}", cue.text)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
