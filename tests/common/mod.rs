/*!
 * Common test utilities for the slidecast test suite
 */

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tempfile::TempDir;

use slidecast::app_config::{Config, SubtitleStyle};
use slidecast::app_controller::{Controller, SubmissionRequest};
use slidecast::jobs::{Job, JobId};
use slidecast::render::{AudioProbe, MockAudioProbe, MockRenderer, Renderer};
use slidecast::timeline::TransitionStyle;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file body for testing
pub fn sample_srt() -> &'static str {
    r#"1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
"#
}

/// Media fixtures for one submission: image files and an audio file on disk
pub struct MediaFixtures {
    /// Owns the temp dir for the fixture lifetime
    pub dir: TempDir,
    /// Fake image paths
    pub images: Vec<PathBuf>,
    /// Fake audio path
    pub audio: PathBuf,
}

/// Create `image_count` fake images plus a fake audio file.
/// Validation only checks existence; the mock renderer never decodes them.
pub fn create_media_fixtures(image_count: usize) -> Result<MediaFixtures> {
    let dir = create_temp_dir()?;
    let base = dir.path().to_path_buf();

    let images = (0..image_count)
        .map(|i| create_test_file(&base, &format!("img_{i:02}.png"), "fake image data"))
        .collect::<Result<Vec<_>>>()?;
    let audio = create_test_file(&base, "track.mp3", "fake audio data")?;

    Ok(MediaFixtures { dir, images, audio })
}

/// A controller wired with mocks, plus the work dir keeping artifacts alive
pub struct TestHarness {
    /// Controller under test
    pub controller: Controller,
    /// Shared mock renderer, for call assertions
    pub renderer: Arc<MockRenderer>,
    /// Job artifact directory
    pub work_dir: TempDir,
}

/// Build a controller around the given mocks with an isolated work dir
pub fn build_controller(renderer: MockRenderer, probe: MockAudioProbe) -> Result<TestHarness> {
    let work_dir = create_temp_dir()?;

    let mut config = Config::default();
    config.work_dir = work_dir.path().to_path_buf();

    let renderer = Arc::new(renderer);
    let renderer_capability: Arc<dyn Renderer> = renderer.clone();
    let probe_capability: Arc<dyn AudioProbe> = Arc::new(probe);
    let controller = Controller::new(config, renderer_capability, probe_capability, None)?;

    Ok(TestHarness {
        controller,
        renderer,
        work_dir,
    })
}

/// A submission request over the given fixtures with quiet defaults
pub fn basic_request(fixtures: &MediaFixtures) -> SubmissionRequest {
    SubmissionRequest {
        images: fixtures.images.clone(),
        audio: fixtures.audio.clone(),
        subtitle_text: None,
        resolution: "1080x1920".to_string(),
        fps: 24,
        transition: TransitionStyle::None,
        transition_duration: 0.0,
        subtitle_style: SubtitleStyle::default(),
        intro: None,
        outro: None,
    }
}

/// Poll job status until it reaches a terminal state or the timeout expires
pub async fn wait_for_terminal(controller: &Controller, id: JobId, timeout: Duration) -> Job {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let job = controller
            .status(&id)
            .expect("job should exist while waiting for terminal state");
        if job.status.is_terminal() {
            return job;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("job {} did not reach a terminal state in time: {:?}", id, job);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
