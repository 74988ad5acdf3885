//! Lighting Effect Triggers
//!
//! The exhibit toggles two external lighting channels (the aurora projector
//! and the LED strip) by firing named triggers at an actuator service.
//! This module provides the trigger vocabulary and a common client trait.
//!
//! # Available Clients
//!
//! - **Webhook**: HTTP GET against a URL template (IFTTT-style maker hooks)
//! - **Dry run**: logs the trigger and does nothing else
//!
//! # Usage
//!
//! ```ignore
//! use exhibit_core::effects::{EffectClient, EffectTrigger, WebhookClient};
//!
//! let client = WebhookClient::new("http://actuator.local/{trigger}", timeout)?;
//! client.trigger(EffectTrigger::on(EffectChannel::Aurora)).await?;
//! ```

mod traits;
mod webhook;

pub use traits::{
    DryRunClient, EffectChannel, EffectClient, EffectError, EffectMode, EffectTrigger,
};
pub use webhook::WebhookClient;
