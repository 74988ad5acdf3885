//! Media Renderer Traits
//!
//! The playback engine owns exactly one audio handle and one video stream
//! per play cycle. Both come from a [`MediaRenderer`], which also presents
//! frames and the blank screen.
//!
//! # Design Philosophy
//!
//! The renderer never decides timing. It hands out decoded frames tagged
//! with their index in the asset, and the engine compares that index with
//! the audio clock to decide whether a frame is shown or dropped.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// A decoded video frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    /// Zero-based position of the frame in the asset
    pub index: u64,
    /// Decoded pixel data, opaque to the engine
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Create a frame
    #[must_use]
    pub fn new(index: u64, data: Vec<u8>) -> Self {
        Self { index, data }
    }

    /// Offset from playback start at which this frame is due
    #[must_use]
    pub fn presentation_offset(&self, frame_rate: f64) -> Duration {
        Duration::from_secs_f64(self.index as f64 / frame_rate)
    }
}

/// Errors from media assets and output devices
#[derive(Debug, Error)]
pub enum MediaError {
    /// An asset file does not exist
    #[error("Media asset not found: {}", path.display())]
    AssetMissing {
        /// Expected location
        path: PathBuf,
    },

    /// An asset exists but cannot be decoded
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode {
        /// Asset location
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// The output device rejected an operation
    #[error("Output device error: {0}")]
    Output(String),

    /// A media task panicked or was cancelled
    #[error("Media task failed: {0}")]
    Task(String),
}

/// Handle to audio that is currently playing
pub trait AudioHandle: Send {
    /// Whether the audio is still audible
    fn is_playing(&self) -> bool;

    /// Stop playback immediately
    fn stop(&mut self);
}

/// A stream of decoded frames
#[async_trait]
pub trait VideoStream: Send {
    /// Next decoded frame, or `None` once the asset is exhausted
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, MediaError>;

    /// Release the decoder; safe to call more than once
    fn release(&mut self);
}

/// Media renderer trait
///
/// Implement this trait to drive a real display and audio device.
#[async_trait]
pub trait MediaRenderer: Send + Sync {
    /// Renderer name for logging
    fn name(&self) -> &str;

    /// Start the audio asset from the beginning, now
    async fn start_audio(&self) -> Result<Box<dyn AudioHandle>, MediaError>;

    /// Open the video asset for decoding from the first frame
    async fn open_video(&self) -> Result<Box<dyn VideoStream>, MediaError>;

    /// Put a frame on screen
    async fn present(&self, frame: &VideoFrame) -> Result<(), MediaError>;

    /// Put the blank (black) screen up
    async fn show_blank(&self) -> Result<(), MediaError>;

    /// Tear down the output surface; called once when the engine halts
    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_offset() {
        let frame = VideoFrame::new(48, Vec::new());
        assert_eq!(frame.presentation_offset(24.0), Duration::from_secs(2));

        let frame = VideoFrame::new(0, Vec::new());
        assert_eq!(frame.presentation_offset(24.0), Duration::ZERO);
    }

    #[test]
    fn test_error_messages() {
        let err = MediaError::AssetMissing {
            path: PathBuf::from("./video.mp4"),
        };
        assert_eq!(err.to_string(), "Media asset not found: ./video.mp4");
    }
}
