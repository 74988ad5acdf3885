//! Media Rendering
//!
//! Capability interfaces for the audio/video output the playback engine
//! drives. Decoding, mixing and putting pixels on a screen are the
//! renderer's business; the engine only decides which frame to show and
//! when to stop.
//!
//! # Available Renderers
//!
//! - **Headless**: validates the assets and paces frames without a display
//!   (bench rigs and tests)

mod headless;
mod traits;

pub use headless::{HeadlessConfig, HeadlessRenderer};
pub use traits::{AudioHandle, MediaError, MediaRenderer, VideoFrame, VideoStream};
