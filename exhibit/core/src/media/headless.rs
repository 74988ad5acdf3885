//! Headless Renderer
//!
//! A renderer with no display or audio device. It checks that the configured
//! assets exist, reads the real duration of the WAV soundtrack, and hands out
//! empty frames at the configured rate. Presenting a frame costs a fixed,
//! configurable amount of time, which makes it useful for exercising the
//! drift correction on machines without a screen.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::traits::{AudioHandle, MediaError, MediaRenderer, VideoFrame, VideoStream};

/// Headless renderer configuration
#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    /// Soundtrack (WAV)
    pub audio_path: PathBuf,
    /// Video asset; only its presence is checked
    pub video_path: PathBuf,
    /// Length of the video asset
    pub video_duration: Duration,
    /// Frames per second of the video asset
    pub frame_rate: f64,
    /// Simulated time spent presenting one frame
    pub render_cost: Duration,
    /// Blank screen size (width, height)
    pub blank_size: (u32, u32),
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            audio_path: PathBuf::from("./audio.wav"),
            video_path: PathBuf::from("./video.mp4"),
            video_duration: Duration::from_secs(95),
            frame_rate: 24.0,
            render_cost: Duration::ZERO,
            blank_size: (1280, 720),
        }
    }
}

impl HeadlessConfig {
    /// Number of frames in the video asset
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        (self.video_duration.as_secs_f64() * self.frame_rate).round() as u64
    }
}

/// Renderer that paces frames without any output device
#[derive(Debug)]
pub struct HeadlessRenderer {
    config: HeadlessConfig,
    presented: AtomicU64,
    blanks: AtomicU64,
}

impl HeadlessRenderer {
    /// Create a renderer
    #[must_use]
    pub fn new(config: HeadlessConfig) -> Self {
        Self {
            config,
            presented: AtomicU64::new(0),
            blanks: AtomicU64::new(0),
        }
    }

    /// Frames presented since creation
    #[must_use]
    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }

    /// Times the blank screen was shown
    #[must_use]
    pub fn blanks(&self) -> u64 {
        self.blanks.load(Ordering::Relaxed)
    }

    /// Duration of the soundtrack, read from its WAV header
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::AssetMissing`] if the file does not exist and
    /// [`MediaError::Decode`] if it is not a readable WAV file.
    pub async fn audio_duration(&self) -> Result<Duration, MediaError> {
        ensure_exists(&self.config.audio_path).await?;

        let path = self.config.audio_path.clone();
        tokio::task::spawn_blocking(move || wav_duration(&path))
            .await
            .map_err(|e| MediaError::Task(e.to_string()))?
    }
}

async fn ensure_exists(path: &Path) -> Result<(), MediaError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(MediaError::AssetMissing {
            path: path.to_path_buf(),
        }),
    }
}

fn wav_duration(path: &Path) -> Result<Duration, MediaError> {
    let reader = hound::WavReader::open(path).map_err(|e| MediaError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let spec = reader.spec();
    // duration() counts samples per channel
    let samples = f64::from(reader.duration());
    Ok(Duration::from_secs_f64(samples / f64::from(spec.sample_rate)))
}

#[async_trait]
impl MediaRenderer for HeadlessRenderer {
    fn name(&self) -> &'static str {
        "headless"
    }

    async fn start_audio(&self) -> Result<Box<dyn AudioHandle>, MediaError> {
        let duration = self.audio_duration().await?;
        tracing::debug!(duration_ms = duration.as_millis() as u64, "Audio started");
        Ok(Box::new(TimedAudio {
            started: Instant::now(),
            duration,
            stopped: false,
        }))
    }

    async fn open_video(&self) -> Result<Box<dyn VideoStream>, MediaError> {
        ensure_exists(&self.config.video_path).await?;
        Ok(Box::new(SyntheticStream {
            next: 0,
            frame_count: self.config.frame_count(),
            released: false,
        }))
    }

    async fn present(&self, frame: &VideoFrame) -> Result<(), MediaError> {
        if !self.config.render_cost.is_zero() {
            tokio::time::sleep(self.config.render_cost).await;
        }
        self.presented.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(frame = frame.index, "Frame presented");
        Ok(())
    }

    async fn show_blank(&self) -> Result<(), MediaError> {
        self.blanks.fetch_add(1, Ordering::Relaxed);
        let (width, height) = self.config.blank_size;
        tracing::debug!(width, height, "Blank screen");
        Ok(())
    }
}

/// Audio "playing" for the length of the soundtrack
struct TimedAudio {
    started: Instant,
    duration: Duration,
    stopped: bool,
}

impl AudioHandle for TimedAudio {
    fn is_playing(&self) -> bool {
        !self.stopped && self.started.elapsed() < self.duration
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Empty frames numbered `0..frame_count`
struct SyntheticStream {
    next: u64,
    frame_count: u64,
    released: bool,
}

#[async_trait]
impl VideoStream for SyntheticStream {
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, MediaError> {
        if self.released || self.next >= self.frame_count {
            return Ok(None);
        }
        tokio::task::yield_now().await;
        let frame = VideoFrame::new(self.next, Vec::new());
        self.next += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.released = true;
    }
}
