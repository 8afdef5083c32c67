/*!
 * Progress stream tests: server-push snapshots until a terminal state
 */

use std::time::Duration;

use slidecast::app_controller::ProgressEvent;
use slidecast::jobs::JobStatus;
use slidecast::render::{MockAudioProbe, MockRenderer};

use crate::common::{basic_request, build_controller, create_media_fixtures};

#[tokio::test]
async fn test_subscribe_shouldStreamUntilTerminalState() {
    let fixtures = create_media_fixtures(3).unwrap();
    let harness = build_controller(
        MockRenderer::slow(30, 5),
        MockAudioProbe::with_duration(30.0),
    )
    .unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();
    let mut events = harness
        .controller
        .subscribe_with_interval(job_id, Duration::from_millis(10));

    let mut snapshots = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            ProgressEvent::Snapshot(job) => snapshots.push(job),
            ProgressEvent::NotFound => panic!("job id should be known"),
        }
    }

    // The stream terminated by itself at a terminal snapshot
    let last = snapshots.last().expect("at least one snapshot");
    assert_eq!(last.status, JobStatus::Completed);
    assert_eq!(last.progress, 100);

    // Observed progress is monotonically non-decreasing all the way
    for pair in snapshots.windows(2) {
        assert!(
            pair[1].progress >= pair[0].progress,
            "progress regressed from {} to {}",
            pair[0].progress,
            pair[1].progress
        );
    }
}

#[tokio::test]
async fn test_subscribe_withUnknownId_shouldYieldNotFoundOnce() {
    let harness = build_controller(
        MockRenderer::working(3),
        MockAudioProbe::with_duration(5.0),
    )
    .unwrap();

    let mut events = harness
        .controller
        .subscribe_with_interval(uuid::Uuid::new_v4(), Duration::from_millis(10));

    assert_eq!(events.recv().await, Some(ProgressEvent::NotFound));
    assert_eq!(events.recv().await, None);
}

#[tokio::test]
async fn test_subscribe_onCancelledJob_shouldEndAtCancelledSnapshot() {
    let fixtures = create_media_fixtures(2).unwrap();
    let harness = build_controller(
        MockRenderer::slow(200, 10),
        MockAudioProbe::with_duration(20.0),
    )
    .unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();
    let mut events = harness
        .controller
        .subscribe_with_interval(job_id, Duration::from_millis(10));

    let mut cancelled = false;
    let mut last_status = None;
    while let Some(event) = events.recv().await {
        if let ProgressEvent::Snapshot(job) = event {
            if !cancelled && job.progress >= 80 {
                harness.controller.cancel(&job_id).unwrap();
                cancelled = true;
            }
            last_status = Some(job.status);
        }
    }

    assert!(cancelled, "render phase never observed");
    assert_eq!(last_status, Some(JobStatus::Cancelled));
}

#[tokio::test]
async fn test_render_telemetry_shouldAppearDuringRenderPhase() {
    let fixtures = create_media_fixtures(2).unwrap();
    let harness = build_controller(
        MockRenderer::slow(50, 5),
        MockAudioProbe::with_duration(10.0),
    )
    .unwrap();

    let job_id = harness.controller.submit(basic_request(&fixtures)).unwrap();
    let mut events = harness
        .controller
        .subscribe_with_interval(job_id, Duration::from_millis(10));

    let mut saw_render_info = false;
    while let Some(event) = events.recv().await {
        if let ProgressEvent::Snapshot(job) = event {
            if let Some(info) = &job.render_info {
                saw_render_info = true;
                assert!(info.total_frames == 50);
                assert!(info.current_frame <= info.total_frames);
                assert!(info.percent <= 100.0);
            }
        }
    }

    assert!(saw_render_info, "no render telemetry was streamed");
}
