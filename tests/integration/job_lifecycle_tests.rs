/*!
 * End-to-end job lifecycle tests over mock render capabilities
 */

use std::time::Duration;

use slidecast::errors::{AppError, ValidationError};
use slidecast::jobs::JobStatus;
use slidecast::render::{MockAudioProbe, MockRenderer};

use crate::common::{
    basic_request, build_controller, create_media_fixtures, sample_srt, wait_for_terminal,
};

const TERMINAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Files other than the recorded output left in the work dir
fn leftover_files(harness: &crate::common::TestHarness) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(harness.work_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect()
}

#[tokio::test]
async fn test_submit_withWorkingRenderer_shouldComplete() {
    let fixtures = create_media_fixtures(3).unwrap();
    let harness = build_controller(MockRenderer::working(20), MockAudioProbe::with_duration(30.0))
        .unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();

    // Submission returns synchronously with a queued or already-running job
    let early = harness.controller.status(&job_id).unwrap();
    assert!(matches!(
        early.status,
        JobStatus::Queued | JobStatus::Processing | JobStatus::Completed
    ));

    let job = wait_for_terminal(&harness.controller, job_id, TERMINAL_TIMEOUT).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);

    let output = job.output_file.expect("completed job records its output");
    assert!(output.exists());
    assert!(output
        .file_name()
        .unwrap()
        .to_string_lossy()
        .contains(&job_id.to_string()));

    // The temp render file is gone; only the muxed output remains
    let leftovers = leftover_files(&harness);
    assert_eq!(leftovers, vec![output]);
}

#[tokio::test]
async fn test_submit_withSubtitlesAndTitles_shouldComplete() {
    let fixtures = create_media_fixtures(2).unwrap();
    let harness = build_controller(MockRenderer::working(10), MockAudioProbe::with_duration(20.0))
        .unwrap();

    let mut request = basic_request(&fixtures);
    request.subtitle_text = Some(sample_srt().to_string());
    request.intro = Some(slidecast::timeline::TitleConfig {
        text: "Intro".to_string(),
        duration: 3.0,
        font: "DejaVuSans-Bold".to_string(),
        font_size: 80,
        font_color: "#ffffff".to_string(),
        bg_color: "#000000".to_string(),
        bg_image: None,
        animation_in: Default::default(),
        animation_out: Default::default(),
    });

    let job_id = harness.controller.submit(request).unwrap();
    let job = wait_for_terminal(&harness.controller, job_id, TERMINAL_TIMEOUT).await;

    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_submit_withFailingRenderer_shouldError() {
    let fixtures = create_media_fixtures(2).unwrap();
    let harness =
        build_controller(MockRenderer::failing(), MockAudioProbe::with_duration(10.0)).unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();
    let job = wait_for_terminal(&harness.controller, job_id, TERMINAL_TIMEOUT).await;

    assert_eq!(job.status, JobStatus::Error);
    assert_eq!(job.progress, 0);
    assert!(job.message.contains("mock renderer failure"));
    assert!(job.output_file.is_none());
    assert!(leftover_files(&harness).is_empty());
}

#[tokio::test]
async fn test_submit_withFailingProbe_shouldError() {
    let fixtures = create_media_fixtures(2).unwrap();
    let harness = build_controller(MockRenderer::working(5), MockAudioProbe::failing()).unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();
    let job = wait_for_terminal(&harness.controller, job_id, TERMINAL_TIMEOUT).await;

    assert_eq!(job.status, JobStatus::Error);
    assert!(job.message.contains("audio duration"));
}

#[tokio::test]
async fn test_submit_withFailingMux_shouldError() {
    let fixtures = create_media_fixtures(2).unwrap();
    let harness = build_controller(
        MockRenderer::mux_failing(5),
        MockAudioProbe::with_duration(10.0),
    )
    .unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();
    let job = wait_for_terminal(&harness.controller, job_id, TERMINAL_TIMEOUT).await;

    assert_eq!(job.status, JobStatus::Error);
    assert!(job.message.contains("mux"));
    assert!(job.output_file.is_none());
    // The partial render artifact was cleaned up
    assert!(leftover_files(&harness).is_empty());
}

#[tokio::test]
async fn test_cancel_beforeRenderPhase_shouldCancelWithoutRendering() {
    let fixtures = create_media_fixtures(2).unwrap();
    // The probe holds the job in its audio phase long enough for the
    // cancel to land before composition finishes
    let harness = build_controller(
        MockRenderer::working(5),
        MockAudioProbe::with_duration_delayed(10.0, 300),
    )
    .unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();
    harness.controller.cancel(&job_id).unwrap();

    let job = wait_for_terminal(&harness.controller, job_id, TERMINAL_TIMEOUT).await;

    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(job.progress, 0);
    assert!(job.output_file.is_none());
    assert_eq!(harness.renderer.render_calls(), 0);
    assert!(leftover_files(&harness).is_empty());
}

#[tokio::test]
async fn test_cancel_duringRender_shouldAbortRenderer() {
    let fixtures = create_media_fixtures(2).unwrap();
    // 200 frames at 10ms each leaves a wide window to cancel mid-render
    let harness = build_controller(
        MockRenderer::slow(200, 10),
        MockAudioProbe::with_duration(10.0),
    )
    .unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();

    // Wait until the render phase is live
    let deadline = tokio::time::Instant::now() + TERMINAL_TIMEOUT;
    loop {
        let job = harness.controller.status(&job_id).unwrap();
        if job.progress >= 80 || job.status.is_terminal() {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "render never started");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    harness.controller.cancel(&job_id).unwrap();
    let job = wait_for_terminal(&harness.controller, job_id, TERMINAL_TIMEOUT).await;

    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(job.progress, 0);
    assert!(job.output_file.is_none());
    assert!(leftover_files(&harness).is_empty());
}

#[tokio::test]
async fn test_cancel_afterCompletion_shouldBeRejected() {
    let fixtures = create_media_fixtures(1).unwrap();
    let harness =
        build_controller(MockRenderer::working(3), MockAudioProbe::with_duration(5.0)).unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();
    wait_for_terminal(&harness.controller, job_id, TERMINAL_TIMEOUT).await;

    let result = harness.controller.cancel(&job_id);
    assert!(matches!(result, Err(AppError::CancelRejected(status)) if status == "completed"));
}

#[tokio::test]
async fn test_cancel_withUnknownId_shouldBeNotFound() {
    let harness =
        build_controller(MockRenderer::working(3), MockAudioProbe::with_duration(5.0)).unwrap();

    let result = harness.controller.cancel(&uuid::Uuid::new_v4());
    assert!(matches!(result, Err(AppError::JobNotFound(_))));
}

#[tokio::test]
async fn test_status_withUnknownId_shouldBeNotFound() {
    let harness =
        build_controller(MockRenderer::working(3), MockAudioProbe::with_duration(5.0)).unwrap();

    let result = harness.controller.status(&uuid::Uuid::new_v4());
    assert!(matches!(result, Err(AppError::JobNotFound(_))));
}

#[tokio::test]
async fn test_submit_withNoImages_shouldRejectSynchronously() {
    let fixtures = create_media_fixtures(1).unwrap();
    let harness =
        build_controller(MockRenderer::working(3), MockAudioProbe::with_duration(5.0)).unwrap();

    let mut request = basic_request(&fixtures);
    request.images.clear();

    let result = harness.controller.submit(request);
    assert!(matches!(result, Err(ValidationError::NoImages(_))));
}

#[tokio::test]
async fn test_submit_withMissingAudio_shouldRejectSynchronously() {
    let fixtures = create_media_fixtures(1).unwrap();
    let harness =
        build_controller(MockRenderer::working(3), MockAudioProbe::with_duration(5.0)).unwrap();

    let mut request = basic_request(&fixtures);
    request.audio = fixtures.dir.path().join("missing.mp3");

    let result = harness.controller.submit(request);
    assert!(matches!(result, Err(ValidationError::MissingAudio(_))));
}

#[tokio::test]
async fn test_submit_withBadResolution_shouldRejectSynchronously() {
    let fixtures = create_media_fixtures(1).unwrap();
    let harness =
        build_controller(MockRenderer::working(3), MockAudioProbe::with_duration(5.0)).unwrap();

    let mut request = basic_request(&fixtures);
    request.resolution = "widexhigh".to_string();

    let result = harness.controller.submit(request);
    assert!(matches!(result, Err(ValidationError::InvalidResolution(_))));
}

#[tokio::test]
async fn test_submit_withBadSubtitleColor_shouldRejectSynchronously() {
    let fixtures = create_media_fixtures(1).unwrap();
    let harness =
        build_controller(MockRenderer::working(3), MockAudioProbe::with_duration(5.0)).unwrap();

    let mut request = basic_request(&fixtures);
    request.subtitle_style.font_color = "not-a-color".to_string();

    let result = harness.controller.submit(request);
    assert!(matches!(result, Err(ValidationError::InvalidColor(_))));
}
