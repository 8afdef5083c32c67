/*!
 * Audio/video muxing.
 *
 * The rendered video carries no audio (rendering without audio is much
 * faster); this step remuxes it with the submitted audio track. When the
 * plan has an intro the audio is shifted forward with `-itsoffset` so
 * narration starts exactly when the intro ends. The video stream is copied,
 * never re-encoded.
 */

use std::path::Path;

use log::{debug, error};
use tokio::process::Command;

use crate::errors::RenderError;

use super::media::filter_ffmpeg_stderr;

/// Seconds allowed for the mux before giving up
const MUX_TIMEOUT_SECS: u64 = 300;

/// Mux `audio` into `video`, writing `output`
pub async fn mux_audio(
    video: &Path,
    audio: &Path,
    offset_secs: f64,
    output: &Path,
) -> Result<(), RenderError> {
    let mut args: Vec<String> = vec![
        "-y".to_string(),
        "-i".to_string(),
        video.to_string_lossy().into_owned(),
    ];

    if offset_secs > 0.0 {
        args.push("-itsoffset".to_string());
        args.push(format!("{}", offset_secs));
    }

    args.extend([
        "-i".to_string(),
        audio.to_string_lossy().into_owned(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        output.to_string_lossy().into_owned(),
    ]);

    debug!("Muxing audio: ffmpeg {}", args.join(" "));

    let mux_future = Command::new("ffmpeg").args(&args).output();

    let timeout_duration = std::time::Duration::from_secs(MUX_TIMEOUT_SECS);
    let result = tokio::select! {
        result = mux_future => {
            result.map_err(|e| RenderError::MuxFailed(format!("failed to launch ffmpeg: {}", e)))?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(RenderError::TimedOut(MUX_TIMEOUT_SECS));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("Audio mux failed: {}", filtered);
        return Err(RenderError::MuxFailed(filtered));
    }

    Ok(())
}
