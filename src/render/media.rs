/*!
 * Media probing via ffprobe/ffmpeg.
 */

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, error, warn};
use serde_json::{from_str, Value};
use tokio::process::Command;
use tokio::sync::OnceCell;

use super::AudioProbe;

/// Cached result of the hardware encoder probe
static H264_ENCODER: OnceCell<String> = OnceCell::const_new();

/// ffprobe-backed audio duration probe
#[derive(Debug, Default)]
pub struct FfprobeAudio;

impl FfprobeAudio {
    /// Create a probe
    pub fn new() -> Self {
        FfprobeAudio
    }
}

#[async_trait]
impl AudioProbe for FfprobeAudio {
    async fn duration_secs(&self, path: &Path) -> Result<f64> {
        if !path.exists() {
            return Err(anyhow!("Audio file not found: {:?}", path));
        }

        // Add timeout to prevent hanging on problematic files
        let ffprobe_future = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                path.to_str().unwrap_or(""),
            ])
            .output();

        let timeout_duration = std::time::Duration::from_secs(60);
        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| anyhow!("Failed to execute ffprobe command: {}", e))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(anyhow!("ffprobe command timed out after 60 seconds"));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffprobe failed: {}", stderr);
            return Err(anyhow!("ffprobe command failed: {}", stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: Value = from_str(&stdout).context("Failed to parse ffprobe JSON output")?;

        let duration = json
            .get("format")
            .and_then(|f| f.get("duration"))
            .and_then(|d| d.as_str())
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| anyhow!("No duration reported for audio: {:?}", path))?;

        debug!("Audio duration for {:?}: {:.2}s", path, duration);
        Ok(duration)
    }
}

/// Pick the H.264 encoder to use: `h264_nvenc` when the hardware path
/// actually works, `libx264` otherwise. Probed once per process.
pub async fn detect_h264_encoder() -> String {
    H264_ENCODER
        .get_or_init(|| async {
            if nvenc_works().await {
                debug!("Using h264_nvenc hardware encoder");
                "h264_nvenc".to_string()
            } else {
                debug!("Hardware encoder unavailable, using libx264");
                "libx264".to_string()
            }
        })
        .await
        .clone()
}

/// Check whether h264_nvenc is listed and passes a real test encode.
/// Listing alone is not enough: the encoder can be present while CUDA is
/// broken, which only surfaces when encoding.
async fn nvenc_works() -> bool {
    let listed = match Command::new("ffmpeg").args(["-encoders"]).output().await {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains("h264_nvenc"),
        Err(e) => {
            warn!("Could not list ffmpeg encoders: {}", e);
            return false;
        }
    };

    if !listed {
        return false;
    }

    // Encode a tiny black frame to verify the encoder initializes
    let test = Command::new("ffmpeg")
        .args([
            "-f",
            "lavfi",
            "-i",
            "color=black:s=64x64:d=0.1",
            "-c:v",
            "h264_nvenc",
            "-f",
            "null",
            "-",
        ])
        .output();

    let timeout_duration = std::time::Duration::from_secs(10);
    tokio::select! {
        result = test => matches!(result, Ok(output) if output.status.success()),
        _ = tokio::time::sleep(timeout_duration) => {
            warn!("nvenc test encode timed out");
            false
        }
    }
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub(crate) fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Stream #",
        "      Metadata:",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "frame=",
        "[out#",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim_end();
            if trimmed.trim().is_empty() {
                return false;
            }
            !dominated_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
