// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{Config, LogLevel, SubtitlePosition};
use crate::app_controller::{Controller, ProgressEvent, SubmissionRequest};
use crate::file_utils::FileManager;
use crate::jobs::JobStatus;
use crate::render::{AudioProbe, FfmpegRenderer, FfprobeAudio};
use crate::subtitle_processor::SubtitleTrack;
use crate::text_layout::TextWrapper;
use crate::timeline::{
    CompositionSpec, Resolution, ResolvedSubtitleStyle, TimelineComposer, TitleAnimation,
    TitleConfig, TransitionStyle,
};

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod jobs;
mod render;
mod subtitle_processor;
mod text_layout;
mod timeline;

/// CLI Wrapper for TransitionStyle to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTransitionStyle {
    None,
    Fade,
    Crossfade,
    Fadein,
    Fadeout,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
}

impl From<CliTransitionStyle> for TransitionStyle {
    fn from(cli_style: CliTransitionStyle) -> Self {
        match cli_style {
            CliTransitionStyle::None => TransitionStyle::None,
            CliTransitionStyle::Fade => TransitionStyle::Fade,
            CliTransitionStyle::Crossfade => TransitionStyle::Crossfade,
            CliTransitionStyle::Fadein => TransitionStyle::FadeIn,
            CliTransitionStyle::Fadeout => TransitionStyle::FadeOut,
            CliTransitionStyle::SlideLeft => TransitionStyle::SlideLeft,
            CliTransitionStyle::SlideRight => TransitionStyle::SlideRight,
            CliTransitionStyle::SlideUp => TransitionStyle::SlideUp,
            CliTransitionStyle::SlideDown => TransitionStyle::SlideDown,
        }
    }
}

/// CLI Wrapper for SubtitlePosition to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubtitlePosition {
    Center,
    Bottom,
}

impl From<CliSubtitlePosition> for SubtitlePosition {
    fn from(cli_position: CliSubtitlePosition) -> Self {
        match cli_position {
            CliSubtitlePosition::Center => SubtitlePosition::Center,
            CliSubtitlePosition::Bottom => SubtitlePosition::Bottom,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose and render a slideshow video (default workflow)
    Render(ComposeArgs),

    /// Compose only: print the timeline plan as JSON without rendering
    Plan(ComposeArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Folder containing the slideshow images (used in alphabetical order)
    #[arg(short, long, value_name = "IMAGES_DIR")]
    images: PathBuf,

    /// Audio file (mp3, wav, etc.)
    #[arg(short, long)]
    audio: PathBuf,

    /// Subtitle .srt file, or a folder containing one
    #[arg(short, long)]
    subtitles: Option<PathBuf>,

    /// Output video file
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Transition style between images
    #[arg(short, long, value_enum)]
    transition: Option<CliTransitionStyle>,

    /// Transition duration in seconds
    #[arg(long)]
    transition_duration: Option<f64>,

    /// Output resolution as WIDTHxHEIGHT
    #[arg(short, long)]
    resolution: Option<String>,

    /// Output frames per second
    #[arg(short, long)]
    fps: Option<u32>,

    /// Vertical subtitle placement
    #[arg(long, value_enum)]
    subtitle_position: Option<CliSubtitlePosition>,

    /// Disable the subtitle typewriter effect
    #[arg(long)]
    no_typewriter: bool,

    /// Intro title text (enables the intro)
    #[arg(long)]
    intro_text: Option<String>,

    /// Intro duration in seconds
    #[arg(long, default_value_t = 5.0)]
    intro_duration: f64,

    /// Intro entry animation (none, fade, slide_*, zoom, typewriter)
    #[arg(long, default_value = "none")]
    intro_animation_in: String,

    /// Intro exit animation (none, fade, slide_*, zoom)
    #[arg(long, default_value = "none")]
    intro_animation_out: String,

    /// Intro backdrop image
    #[arg(long)]
    intro_bg_image: Option<PathBuf>,

    /// Outro title text (enables the outro)
    #[arg(long)]
    outro_text: Option<String>,

    /// Outro duration in seconds
    #[arg(long, default_value_t = 5.0)]
    outro_duration: f64,

    /// Outro entry animation (none, fade, slide_*, zoom, typewriter)
    #[arg(long, default_value = "none")]
    outro_animation_in: String,

    /// Outro exit animation (none, fade, slide_*, zoom)
    #[arg(long, default_value = "none")]
    outro_animation_out: String,

    /// Outro backdrop image
    #[arg(long)]
    outro_bg_image: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// slidecast - slideshow video composer
///
/// Turns a folder of images plus one audio track into a video: images are
/// distributed evenly across the audio duration, subtitles are overlaid
/// with a typewriter reveal, and optional intro/outro titles bookend the
/// result.
#[derive(Parser, Debug)]
#[command(name = "slidecast")]
#[command(version = "1.0.0")]
#[command(about = "Create slideshow videos from images, audio and subtitles")]
#[command(long_about = "slidecast composes still images, one audio track and an optional
SRT subtitle file into a rendered slideshow video.

EXAMPLES:
    slidecast render -i photos/ -a song.mp3                 # Default crossfade slideshow
    slidecast render -i photos/ -a song.mp3 -s lyrics.srt   # With typewriter subtitles
    slidecast render -i photos/ -a song.mp3 -t slide-left   # Sliding transitions
    slidecast render -i photos/ -a song.mp3 --intro-text 'My Trip' --intro-animation-in zoom
    slidecast plan -i photos/ -a song.mp3                   # Inspect the timeline as JSON

CONFIGURATION:
    Styling defaults (fonts, colors, encoder settings) are stored in
    conf.json. You can specify a different config file with --config-path.
    If the config file doesn't exist, a default one will be created
    automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default; the level is
    // adjusted after CLI/config parsing
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Render(args) => run_render(args).await,
        Commands::Plan(args) => run_plan(args).await,
    }
}

/// Load the configuration file (creating a default when missing) and apply
/// CLI overrides
fn load_config(args: &ComposeArgs) -> Result<Config> {
    if let Some(level) = &args.log_level {
        log::set_max_level(level.clone().into());
    }

    let config_path = &args.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // CLI overrides
    if let Some(transition) = &args.transition {
        config.video.transition = transition.clone().into();
    }
    if let Some(duration) = args.transition_duration {
        config.video.transition_duration = duration;
    }
    if let Some(resolution) = &args.resolution {
        config.video.resolution = resolution.clone();
    }
    if let Some(fps) = args.fps {
        config.video.fps = fps;
    }
    if let Some(position) = &args.subtitle_position {
        config.subtitles.position = position.clone().into();
    }
    if args.no_typewriter {
        config.subtitles.typewriter = false;
    }

    config.validate().context("Configuration validation failed")?;

    // If no CLI log level was given, fall back to the configured one
    if args.log_level.is_none() {
        let level = match config.log_level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        };
        log::set_max_level(level);
    }

    Ok(config)
}

/// Build the submission request from CLI arguments and config
fn build_request(args: &ComposeArgs, config: &Config) -> Result<SubmissionRequest> {
    let images = FileManager::collect_images(&args.images)
        .context(format!("Failed to scan image folder: {:?}", args.images))?;
    if images.is_empty() {
        return Err(anyhow!("No images found in: {:?}", args.images));
    }
    info!("Found {} images", images.len());

    let subtitle_text = match &args.subtitles {
        Some(path) if path.is_dir() => match FileManager::find_subtitle_file(path) {
            Some(srt) => {
                info!("Using subtitle file: {:?}", srt);
                Some(FileManager::read_to_string(&srt)?)
            }
            None => {
                warn!("No .srt files found in: {:?}", path);
                None
            }
        },
        Some(path) => Some(FileManager::read_to_string(path)?),
        None => None,
    };

    let intro = build_title(
        args.intro_text.as_deref(),
        args.intro_duration,
        &args.intro_animation_in,
        &args.intro_animation_out,
        args.intro_bg_image.clone(),
    )?;
    let outro = build_title(
        args.outro_text.as_deref(),
        args.outro_duration,
        &args.outro_animation_in,
        &args.outro_animation_out,
        args.outro_bg_image.clone(),
    )?;

    Ok(SubmissionRequest {
        images,
        audio: args.audio.clone(),
        subtitle_text,
        resolution: config.video.resolution.clone(),
        fps: config.video.fps,
        transition: config.video.transition,
        transition_duration: config.video.transition_duration,
        subtitle_style: config.subtitles.clone(),
        intro,
        outro,
    })
}

fn build_title(
    text: Option<&str>,
    duration: f64,
    animation_in: &str,
    animation_out: &str,
    bg_image: Option<PathBuf>,
) -> Result<Option<TitleConfig>> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };

    let animation_in: TitleAnimation = animation_in.parse()?;
    let animation_out: TitleAnimation = animation_out.parse()?;

    Ok(Some(TitleConfig {
        text: text.to_string(),
        duration,
        font: "DejaVuSans-Bold".to_string(),
        font_size: 80,
        font_color: "#ffffff".to_string(),
        bg_color: "#000000".to_string(),
        bg_image,
        animation_in,
        animation_out,
    }))
}

async fn run_render(args: ComposeArgs) -> Result<()> {
    let config = load_config(&args)?;
    let request = build_request(&args, &config)?;

    let controller = Controller::new(
        config,
        Arc::new(FfmpegRenderer::new()),
        Arc::new(FfprobeAudio::new()),
        None,
    )?;

    let job_id = controller
        .submit(request)
        .map_err(|e| anyhow!("Submission rejected: {}", e))?;

    let progress_bar = ProgressBar::new(100);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut events = controller.subscribe(job_id);
    let mut cancel_requested = false;
    let mut final_status = None;

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(ProgressEvent::Snapshot(job)) => {
                        progress_bar.set_position(job.progress as u64);
                        progress_bar.set_message(job.message.clone());
                        if job.status.is_terminal() {
                            final_status = Some(job);
                            break;
                        }
                    }
                    Some(ProgressEvent::NotFound) | None => break,
                }
            }
            _ = tokio::signal::ctrl_c(), if !cancel_requested => {
                warn!("Interrupt received, cancelling job...");
                let _ = controller.cancel(&job_id);
                cancel_requested = true;
            }
        }
    }

    let job = final_status.ok_or_else(|| anyhow!("Progress stream ended unexpectedly"))?;
    match job.status {
        JobStatus::Completed => {
            progress_bar.finish_with_message("done");
            let rendered = job
                .output_file
                .ok_or_else(|| anyhow!("Completed job has no output file"))?;
            std::fs::copy(&rendered, &args.output)
                .context(format!("Failed to copy output to {:?}", args.output))?;
            FileManager::remove_if_exists(&rendered);
            info!("Video created: {:?}", args.output);
            Ok(())
        }
        JobStatus::Cancelled => {
            progress_bar.abandon_with_message("cancelled");
            Err(anyhow!("Job was cancelled"))
        }
        _ => {
            progress_bar.abandon_with_message("failed");
            Err(anyhow!("{}", job.message))
        }
    }
}

async fn run_plan(args: ComposeArgs) -> Result<()> {
    let config = load_config(&args)?;
    let request = build_request(&args, &config)?;

    let probe = FfprobeAudio::new();
    let audio_duration = probe.duration_secs(&request.audio).await?;

    let (width, height) = app_config::parse_resolution(&request.resolution)?;
    let spec = CompositionSpec {
        images: request.images,
        audio_duration,
        resolution: Resolution::new(width, height),
        transition: request.transition,
        transition_duration: request.transition_duration,
        subtitles: request
            .subtitle_text
            .as_deref()
            .map(SubtitleTrack::parse_srt)
            .unwrap_or_default(),
        subtitle_style: ResolvedSubtitleStyle::from_style(&request.subtitle_style)?,
        intro: request.intro.as_ref().map(|t| t.resolve()).transpose()?,
        outro: request.outro.as_ref().map(|t| t.resolve()).transpose()?,
    };

    let composer = TimelineComposer::new(TextWrapper::without_measurer());
    let plan = composer.compose(&spec)?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
