//! Exhibit Core - Visitor Session Control for the Inner Universe Installation
//!
//! This crate runs a single-visitor immersive room: a door sensor detects
//! someone walking in, a scripted lighting timeline runs against a 95-second
//! audio/video sequence, and a reset switch can bring the room back to idle
//! at any moment. Hardware sits behind small async traits so the whole
//! exhibit can run on a bench with in-memory lines and a headless renderer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             Exhibit                              │
//! │                                                                  │
//! │  ┌───────────────┐  reset()   ┌───────────────────┐              │
//! │  │ ResetWatchdog │──────────▶ │ SessionController │              │
//! │  └───────┬───────┘            └──┬─────────────┬──┘              │
//! │          │ request_blank()       │ request_play│ kick()          │
//! │          ▼                       ▼             ▼                 │
//! │  ┌──────────────────────────────────┐   ┌──────────────┐         │
//! │  │          PlaybackEngine          │   │ EffectClient │         │
//! │  └────────────────┬─────────────────┘   └──────────────┘         │
//! │                   ▼                                              │
//! │            MediaRenderer                DigitalInput x2          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`SessionController`]: the visitor state machine and effect timeline
//! - [`PlaybackEngine`]: drift-correcting audio/video playback
//! - [`ResetWatchdog`]: forces the room back to idle on a reset toggle
//! - [`Exhibit`]: spawns and supervises the three loops
//! - [`ExhibitConfig`]: layered TOML/env/CLI configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use exhibit_core::{
//!     ControllerConfig, DryRunClient, Exhibit, HeadlessConfig, HeadlessRenderer, LineState,
//!     ManualLine, PlaybackConfig, PlaybackEngine, ResetWatchdog, SessionController, Timeline,
//! };
//!
//! let playback = PlaybackEngine::new(
//!     Arc::new(HeadlessRenderer::new(HeadlessConfig::default())),
//!     PlaybackConfig::default(),
//! );
//! let door = ManualLine::new("entrance", LineState::Closed);
//! let session = SessionController::new(
//!     Arc::new(door.clone()),
//!     Arc::new(DryRunClient),
//!     Timeline::standard(),
//!     ControllerConfig::default(),
//! );
//! let watchdog = ResetWatchdog::new(Arc::new(ManualLine::new("reset", LineState::Open)));
//!
//! Exhibit::new(playback, session, watchdog)
//!     .run_until(async { tokio::signal::ctrl_c().await.ok(); })
//!     .await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod controller;
pub mod effects;
pub mod exhibit;
pub mod media;
pub mod playback;
pub mod sensors;
pub mod session;
pub mod timeline;
pub mod watchdog;

// Component exports
pub use controller::{ControllerConfig, SessionController};
pub use exhibit::{Exhibit, ExhibitError};
pub use playback::{
    target_frame, PlaybackConfig, PlaybackEnd, PlaybackEngine, PlaybackEvent, PlaybackState,
    PlaybackStats,
};
pub use watchdog::ResetWatchdog;

// State exports
pub use session::{EffectState, Session, SessionSnapshot};
pub use timeline::{Timeline, TimelineAction, TimelineStep};

// Collaborator exports
pub use effects::{
    DryRunClient, EffectChannel, EffectClient, EffectError, EffectMode, EffectTrigger,
    WebhookClient,
};
pub use media::{
    AudioHandle, HeadlessConfig, HeadlessRenderer, MediaError, MediaRenderer, VideoFrame,
    VideoStream,
};
pub use sensors::{DigitalInput, Level, LineState, ManualLine, SysfsLine, WaitOutcome};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, ExhibitConfig, ExhibitToml,
};
