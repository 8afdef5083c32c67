use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;
use std::path::PathBuf;

use crate::errors::ValidationError;
use crate::timeline::transitions::TransitionStyle;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Video output settings
    #[serde(default)]
    pub video: VideoSettings,

    /// Subtitle overlay styling
    #[serde(default)]
    pub subtitles: SubtitleStyle,

    /// Renderer/encoder settings
    #[serde(default)]
    pub render: RenderSettings,

    /// Working directory for job artifacts
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video: VideoSettings::default(),
            subtitles: SubtitleStyle::default(),
            render: RenderSettings::default(),
            work_dir: default_work_dir(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration after loading and CLI overrides
    pub fn validate(&self) -> Result<()> {
        parse_resolution(&self.video.resolution)
            .map_err(|e| anyhow!("video.resolution: {}", e))?;

        if self.video.fps == 0 {
            return Err(anyhow!("video.fps must be at least 1"));
        }

        if self.video.transition_duration < 0.0 {
            return Err(anyhow!("video.transition_duration cannot be negative"));
        }

        if self.subtitles.font_size == 0 {
            return Err(anyhow!("subtitles.font_size must be at least 1"));
        }

        if !(0.0..=1.0).contains(&self.subtitles.typewriter_ratio) {
            return Err(anyhow!("subtitles.typewriter_ratio must be within [0, 1]"));
        }

        if self.subtitles.max_clips_per_cue == 0 {
            return Err(anyhow!("subtitles.max_clips_per_cue must be at least 1"));
        }

        parse_hex_color(&self.subtitles.font_color)
            .map_err(|e| anyhow!("subtitles.font_color: {}", e))?;
        parse_hex_color(&self.subtitles.stroke_color)
            .map_err(|e| anyhow!("subtitles.stroke_color: {}", e))?;

        Ok(())
    }
}

/// Video composition settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoSettings {
    // @field: Output resolution as WIDTHxHEIGHT
    #[serde(default = "default_resolution")]
    pub resolution: String,

    // @field: Output frames per second
    #[serde(default = "default_fps")]
    pub fps: u32,

    // @field: Transition style between image segments
    #[serde(default)]
    pub transition: TransitionStyle,

    // @field: Transition duration in seconds
    #[serde(default = "default_transition_duration")]
    pub transition_duration: f64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            fps: default_fps(),
            transition: TransitionStyle::default(),
            transition_duration: default_transition_duration(),
        }
    }
}

/// Vertical placement of subtitle text
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitlePosition {
    /// Centered on screen
    #[default]
    Center,
    /// Anchored near the bottom edge
    Bottom,
}

impl std::str::FromStr for SubtitlePosition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            _ => Err(anyhow!("Invalid subtitle position: {}", s)),
        }
    }
}

/// Subtitle overlay styling
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleStyle {
    /// Font name, resolved through the font catalog
    #[serde(default = "default_font_name")]
    pub font: String,

    /// Font size in pixels
    #[serde(default = "default_subtitle_font_size")]
    pub font_size: u32,

    /// Fill color as #rrggbb
    #[serde(default = "default_font_color")]
    pub font_color: String,

    /// Stroke color as #rrggbb
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,

    /// Stroke width in pixels
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,

    /// Whether the typewriter reveal effect is enabled
    #[serde(default = "default_true")]
    pub typewriter: bool,

    /// Share of each cue spent revealing text (the rest holds the full text)
    #[serde(default = "default_typewriter_ratio")]
    pub typewriter_ratio: f64,

    /// Upper bound on reveal keyframes generated per cue
    #[serde(default = "default_max_clips_per_cue")]
    pub max_clips_per_cue: usize,

    /// Vertical placement
    #[serde(default)]
    pub position: SubtitlePosition,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font: default_font_name(),
            font_size: default_subtitle_font_size(),
            font_color: default_font_color(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            typewriter: true,
            typewriter_ratio: default_typewriter_ratio(),
            max_clips_per_cue: default_max_clips_per_cue(),
            position: SubtitlePosition::default(),
        }
    }
}

/// Renderer/encoder settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderSettings {
    // @field: Encoder preset
    #[serde(default = "default_preset")]
    pub preset: String,

    // @field: Constant rate factor (quality, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u32,

    // @field: Encoder thread count
    #[serde(default = "default_render_threads")]
    pub threads: usize,

    // @field: Render timeout in seconds
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            crf: default_crf(),
            threads: default_render_threads(),
            timeout_secs: default_render_timeout_secs(),
        }
    }
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

// @const: Bundled system font catalog, name -> path
static FONT_CATALOG: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // DejaVu (always available from apt)
        ("DejaVuSans-Bold", "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
        ("DejaVuSans", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
        ("DejaVuSerif-Bold", "/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf"),
        ("DejaVuSerif", "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf"),
        // Liberation
        ("LiberationSans-Bold", "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
        ("LiberationSans", "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"),
        ("LiberationMono-Bold", "/usr/share/fonts/truetype/liberation/LiberationMono-Bold.ttf"),
        // FreeFonts
        ("FreeSans-Bold", "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf"),
        ("FreeSans", "/usr/share/fonts/truetype/freefont/FreeSans.ttf"),
        ("FreeSerif-Bold", "/usr/share/fonts/truetype/freefont/FreeSerifBold.ttf"),
        ("FreeSerif", "/usr/share/fonts/truetype/freefont/FreeSerif.ttf"),
        // Google fonts installed under a shared prefix
        ("Roboto-Bold", "/usr/share/fonts/truetype/google/roboto/Roboto-Bold.ttf"),
        ("Roboto", "/usr/share/fonts/truetype/google/roboto/Roboto-Regular.ttf"),
        ("OpenSans-Bold", "/usr/share/fonts/truetype/google/opensans/OpenSans-Bold.ttf"),
        ("OpenSans", "/usr/share/fonts/truetype/google/opensans/OpenSans-Regular.ttf"),
        ("Lato-Bold", "/usr/share/fonts/truetype/google/lato/Lato-Bold.ttf"),
        ("Lato", "/usr/share/fonts/truetype/google/lato/Lato-Regular.ttf"),
        ("Montserrat-Bold", "/usr/share/fonts/truetype/google/montserrat/Montserrat-Bold.ttf"),
        ("Montserrat", "/usr/share/fonts/truetype/google/montserrat/Montserrat-Regular.ttf"),
        ("Oswald-Bold", "/usr/share/fonts/truetype/google/oswald/Oswald-Bold.ttf"),
        ("Oswald", "/usr/share/fonts/truetype/google/oswald/Oswald-Regular.ttf"),
        ("BebasNeue", "/usr/share/fonts/truetype/google/bebas/BebasNeue-Regular.ttf"),
        ("NotoSans-Bold", "/usr/share/fonts/truetype/google/noto/NotoSans-Bold.ttf"),
        ("NotoSans", "/usr/share/fonts/truetype/google/noto/NotoSans-Regular.ttf"),
    ])
});

/// List the known font names, sorted
pub fn font_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = FONT_CATALOG.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Resolve a font name to a font file path.
/// Unknown names fall back to the default font rather than failing.
pub fn resolve_font(name: &str) -> PathBuf {
    FONT_CATALOG
        .get(name)
        .or_else(|| FONT_CATALOG.get(default_font_name().as_str()))
        .map(|path| PathBuf::from(*path))
        .unwrap_or_else(|| PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"))
}

/// Parse a WIDTHxHEIGHT resolution string
pub fn parse_resolution(s: &str) -> Result<(u32, u32), ValidationError> {
    let mut parts = s.trim().splitn(2, ['x', 'X']);
    let width = parts
        .next()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .filter(|w| *w > 0);
    let height = parts
        .next()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .filter(|h| *h > 0);

    match (width, height) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(ValidationError::InvalidResolution(s.to_string())),
    }
}

/// Parse a #rrggbb color string to an RGB triple
pub fn parse_hex_color(s: &str) -> Result<(u8, u8, u8), ValidationError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidColor(s.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| ValidationError::InvalidColor(s.to_string()))
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("slidecast")
}

fn default_resolution() -> String {
    "1080x1920".to_string()
}

fn default_fps() -> u32 {
    24
}

fn default_transition_duration() -> f64 {
    0.5
}

fn default_font_name() -> String {
    "DejaVuSans-Bold".to_string()
}

fn default_subtitle_font_size() -> u32 {
    75
}

fn default_font_color() -> String {
    "#ffffff".to_string()
}

fn default_stroke_color() -> String {
    "#000000".to_string()
}

fn default_stroke_width() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

fn default_typewriter_ratio() -> f64 {
    crate::timeline::typewriter::SUBTITLE_REVEAL_RATIO
}

fn default_max_clips_per_cue() -> usize {
    30
}

fn default_preset() -> String {
    "ultrafast".to_string()
}

fn default_crf() -> u32 {
    32
}

fn default_render_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .max(4)
}

fn default_render_timeout_secs() -> u64 {
    3600
}
