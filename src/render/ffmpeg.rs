/*!
 * ffmpeg-backed renderer.
 *
 * Maps a `TimelinePlan` onto a single ffmpeg invocation: the base canvas is
 * a black lavfi color source, image segments become looped inputs overlaid
 * during their time window, color layers become `drawbox` passes and text
 * keyframes become time-scoped `drawtext` passes. Frame progress is read
 * from `-progress pipe:1` output and forwarded through the progress sink;
 * a cancelled sink report kills the child process.
 *
 * Fades map directly onto alpha fades. Slide and zoom effects are
 * approximated as fades at this layer; the plan still carries the exact
 * descriptors for renderers that can evaluate them.
 */

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::errors::RenderError;
use crate::jobs::ProgressSink;
use crate::timeline::plan::{Anchor, Effect, Position, SegmentContent, TimelinePlan};

use super::media::{detect_h264_encoder, filter_ffmpeg_stderr};
use super::{mux, RenderOptions, RenderedMedia, Renderer};

/// Renders plans by driving the system ffmpeg binary
#[derive(Debug, Default)]
pub struct FfmpegRenderer;

impl FfmpegRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        FfmpegRenderer
    }
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    async fn render(
        &self,
        plan: &TimelinePlan,
        output: &Path,
        options: &RenderOptions,
        progress: &ProgressSink,
    ) -> Result<RenderedMedia, RenderError> {
        let total_frames = ((plan.total_duration * options.fps as f64).ceil() as u64).max(1);

        let codec = match &options.codec {
            Some(codec) => codec.clone(),
            None => detect_h264_encoder().await,
        };

        let args = build_ffmpeg_args(plan, output, options, &codec);
        debug!("Render command: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RenderError::LaunchFailed(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RenderError::LaunchFailed("no stdout pipe".to_string()))?;
        let stderr = child.stderr.take();

        // Drain stderr concurrently so a chatty encoder cannot deadlock the
        // progress pipe
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut buf).await;
            }
            buf
        });

        let mut lines = BufReader::new(stdout).lines();
        let progress_loop = async {
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(value) = line.strip_prefix("frame=") {
                    if let Ok(frame) = value.trim().parse::<u64>() {
                        progress.report(frame.min(total_frames), total_frames)?;
                    }
                }
            }
            Ok::<(), RenderError>(())
        };

        let timeout = tokio::time::sleep(std::time::Duration::from_secs(options.timeout_secs));
        tokio::select! {
            result = progress_loop => {
                if let Err(error) = result {
                    let _ = child.kill().await;
                    return Err(error);
                }
            }
            _ = timeout => {
                let _ = child.kill().await;
                return Err(RenderError::TimedOut(options.timeout_secs));
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| RenderError::Failed(format!("waiting on ffmpeg: {}", e)))?;
        let stderr_buf = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let stderr_text = String::from_utf8_lossy(&stderr_buf);
            return Err(RenderError::Failed(filter_ffmpeg_stderr(&stderr_text)));
        }

        progress.report(total_frames, total_frames)?;

        Ok(RenderedMedia {
            path: output.to_path_buf(),
            frames: total_frames,
        })
    }

    async fn mux_audio(
        &self,
        video: &Path,
        audio: &Path,
        offset_secs: f64,
        output: &Path,
    ) -> Result<(), RenderError> {
        mux::mux_audio(video, audio, offset_secs, output).await
    }
}

/// Assemble the complete argument list for one render
fn build_ffmpeg_args(
    plan: &TimelinePlan,
    output: &Path,
    options: &RenderOptions,
    codec: &str,
) -> Vec<String> {
    let width = plan.resolution.width;
    let height = plan.resolution.height;

    let mut args: Vec<String> = vec![
        "-y".to_string(),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!("color=black:s={}x{}:d={:.3}", width, height, plan.total_duration),
    ];

    // Every image-content segment becomes one looped input
    let mut image_inputs: Vec<usize> = Vec::new();
    for (index, segment) in plan.segments.iter().enumerate() {
        if let SegmentContent::Image { path } = &segment.content {
            args.extend([
                "-loop".to_string(),
                "1".to_string(),
                "-t".to_string(),
                format!("{:.3}", segment.duration),
                "-i".to_string(),
                path.to_string_lossy().into_owned(),
            ]);
            image_inputs.push(index);
        }
    }

    let mut graph: Vec<String> = vec!["[0:v]null[vbase]".to_string()];
    let mut current = "vbase".to_string();

    // Cover-fit, fade and time-shift each image, then overlay it during its
    // window
    for (slot, &segment_index) in image_inputs.iter().enumerate() {
        let segment = &plan.segments[segment_index];
        let input = slot + 1;

        let mut chain = format!(
            "[{}:v]scale={}:{}:force_original_aspect_ratio=increase,crop={}:{},setsar=1,format=yuva420p",
            input, width, height, width, height
        );
        if let Some(window) = effect_window(segment.entry_effect) {
            chain.push_str(&format!(",fade=t=in:st=0:d={:.3}:alpha=1", window));
        }
        if let Some(window) = effect_window(segment.exit_effect) {
            chain.push_str(&format!(
                ",fade=t=out:st={:.3}:d={:.3}:alpha=1",
                segment.duration - window,
                window
            ));
        }
        chain.push_str(&format!(
            ",setpts=PTS-STARTPTS+{:.3}/TB[img{}]",
            segment.start, slot
        ));
        graph.push(chain);

        let next = format!("vimg{}", slot);
        graph.push(format!(
            "[{}][img{}]overlay=x=(W-w)/2:y=(H-h)/2:enable='between(t,{:.3},{:.3})'[{}]",
            current,
            slot,
            segment.start,
            segment.end(),
            next
        ));
        current = next;
    }

    // Color layers and text keyframes apply directly on the running chain
    let mut step = 0usize;
    for segment in &plan.segments {
        match &segment.content {
            SegmentContent::Color { rgb } => {
                let next = format!("vfx{}", step);
                step += 1;
                graph.push(format!(
                    "[{}]drawbox=x=0:y=0:w=iw:h=ih:color=0x{:02x}{:02x}{:02x}:t=fill:enable='between(t,{:.3},{:.3})'[{}]",
                    current, rgb.0, rgb.1, rgb.2, segment.start, segment.end(), next
                ));
                current = next;
            }
            SegmentContent::Text(block) => {
                let windows: Vec<(String, f64, f64)> = if segment.keyframes.is_empty() {
                    vec![(block.text.clone(), segment.start, segment.end())]
                } else {
                    segment
                        .keyframes
                        .iter()
                        .map(|kf| (kf.text.clone(), kf.start, kf.start + kf.duration))
                        .collect()
                };

                for (text, from, to) in windows {
                    let next = format!("vfx{}", step);
                    step += 1;
                    graph.push(format!(
                        "[{}]drawtext=fontfile={}:text='{}':fontsize={}:fontcolor=0x{:02x}{:02x}{:02x}{}:x=(w-text_w)/2:y={}:enable='between(t,{:.3},{:.3})'[{}]",
                        current,
                        block.font.to_string_lossy(),
                        escape_drawtext(&text),
                        block.size_px,
                        block.color.0,
                        block.color.1,
                        block.color.2,
                        stroke_args(block.stroke_color, block.stroke_width),
                        y_expression(&segment.position),
                        from,
                        to,
                        next
                    ));
                    current = next;
                }
            }
            SegmentContent::Image { .. } => {}
        }
    }

    args.extend([
        "-filter_complex".to_string(),
        graph.join(";"),
        "-map".to_string(),
        format!("[{}]", current),
        "-t".to_string(),
        format!("{:.3}", plan.total_duration),
        "-r".to_string(),
        options.fps.to_string(),
        "-c:v".to_string(),
        codec.to_string(),
        "-preset".to_string(),
        options.preset.clone(),
        "-crf".to_string(),
        options.crf.to_string(),
        "-threads".to_string(),
        options.threads.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-tune".to_string(),
        "zerolatency".to_string(),
        "-bf".to_string(),
        "0".to_string(),
        "-an".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
        "-nostats".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        output.to_string_lossy().into_owned(),
    ]);

    args
}

/// Effect window for the fade approximation, if the effect has one
fn effect_window(effect: Option<Effect>) -> Option<f64> {
    match effect? {
        Effect::FadeIn { duration }
        | Effect::FadeOut { duration }
        | Effect::CrossFadeIn { duration }
        | Effect::CrossFadeOut { duration }
        | Effect::SlideIn { duration, .. }
        | Effect::SlideOut { duration, .. }
        | Effect::ZoomIn { duration, .. }
        | Effect::ZoomOut { duration, .. } => Some(duration),
    }
}

fn stroke_args(stroke_color: Option<(u8, u8, u8)>, stroke_width: u32) -> String {
    match stroke_color {
        Some(rgb) if stroke_width > 0 => format!(
            ":borderw={}:bordercolor=0x{:02x}{:02x}{:02x}",
            stroke_width, rgb.0, rgb.1, rgb.2
        ),
        _ => String::new(),
    }
}

fn y_expression(position: &Position) -> String {
    match position.anchor {
        Anchor::Center => "(h-text_h)/2".to_string(),
        Anchor::TopCenter => format!("{:.0}", position.offset_y.max(0.0)),
        Anchor::BottomCenter => format!("h-text_h{:+.0}", position.offset_y),
    }
}

/// Escape a text value for use inside a drawtext filter argument
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\u{2019}")
        .replace(':', "\\:")
        .replace('%', "\\%")
}
