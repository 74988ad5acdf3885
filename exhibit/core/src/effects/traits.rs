//! Effect Client Traits
//!
//! Trait definitions for the lighting actuator service. The session
//! controller only knows about channels and on/off modes; clients turn a
//! trigger into whatever the actuator understands.
//!
//! # Design Philosophy
//!
//! Triggers are fire-and-forget: no response body is consumed and failures
//! are reported to the caller, which logs them and carries on. There is no
//! retry policy.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A lighting channel driven by the exhibit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectChannel {
    /// Aurora projector
    Aurora,
    /// LED strip
    Strip,
}

impl EffectChannel {
    /// All channels, in the order they are forced off
    pub const ALL: [Self; 2] = [Self::Aurora, Self::Strip];

    /// Channel name as used in trigger names
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aurora => "aurora",
            Self::Strip => "strip",
        }
    }
}

impl fmt::Display for EffectChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired channel state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
    /// Turn the channel off
    Off,
    /// Turn the channel on
    On,
}

impl EffectMode {
    /// Whether this mode turns the channel on
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// A single trigger: one channel switched to one mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectTrigger {
    /// Target channel
    pub channel: EffectChannel,
    /// Target mode
    pub mode: EffectMode,
}

impl EffectTrigger {
    /// Create a trigger
    #[must_use]
    pub const fn new(channel: EffectChannel, mode: EffectMode) -> Self {
        Self { channel, mode }
    }

    /// Trigger that turns `channel` on
    #[must_use]
    pub const fn on(channel: EffectChannel) -> Self {
        Self::new(channel, EffectMode::On)
    }

    /// Trigger that turns `channel` off
    #[must_use]
    pub const fn off(channel: EffectChannel) -> Self {
        Self::new(channel, EffectMode::Off)
    }

    /// Trigger name sent to the actuator (`aurora_on`, `strip_off`, ...)
    #[must_use]
    pub fn name(&self) -> &'static str {
        match (self.channel, self.mode) {
            (EffectChannel::Aurora, EffectMode::On) => "aurora_on",
            (EffectChannel::Aurora, EffectMode::Off) => "aurora_off",
            (EffectChannel::Strip, EffectMode::On) => "strip_on",
            (EffectChannel::Strip, EffectMode::Off) => "strip_off",
        }
    }
}

impl fmt::Display for EffectTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from firing a trigger
#[derive(Debug, Error)]
pub enum EffectError {
    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete
    #[error("Trigger {trigger} failed: {source}")]
    Request {
        /// Trigger that was being fired
        trigger: &'static str,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The actuator answered with a non-success status
    #[error("Trigger {trigger} rejected with status {status}")]
    Status {
        /// Trigger that was being fired
        trigger: &'static str,
        /// HTTP status code
        status: u16,
    },
}

/// Effect client trait
///
/// Implement this trait to drive a different actuator service.
#[async_trait]
pub trait EffectClient: Send + Sync {
    /// Client name for logging (e.g., "webhook")
    fn name(&self) -> &str;

    /// Fire a trigger
    async fn trigger(&self, trigger: EffectTrigger) -> Result<(), EffectError>;
}

/// Client that only logs triggers
///
/// Used when no actuator URL is configured.
#[derive(Clone, Debug, Default)]
pub struct DryRunClient;

#[async_trait]
impl EffectClient for DryRunClient {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn trigger(&self, trigger: EffectTrigger) -> Result<(), EffectError> {
        tracing::info!(trigger = %trigger, "Effect trigger (dry run)");
        Ok(())
    }
}
