//! Collaborator wiring
//!
//! Turns a resolved [`ExhibitConfig`] into a ready-to-run [`Exhibit`].

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use exhibit_core::{
    DryRunClient, EffectClient, Exhibit, ExhibitConfig, HeadlessRenderer, PlaybackEngine,
    ResetWatchdog, SessionController, SysfsLine, Timeline, WebhookClient,
};

/// Assemble the exhibit described by `config`
pub fn build(config: &ExhibitConfig) -> Result<Exhibit> {
    let timeline = Timeline::standard();
    config
        .validate(&timeline)
        .context("Configuration rejected")?;

    let sensors = &config.sensors;
    let entrance = Arc::new(SysfsLine::new(
        "entrance",
        &sensors.gpio_root,
        sensors.entrance_pin,
    ));
    let reset = Arc::new(SysfsLine::new("reset", &sensors.gpio_root, sensors.reset_pin));
    info!(
        gpio_root = %sensors.gpio_root.display(),
        entrance_pin = sensors.entrance_pin,
        reset_pin = sensors.reset_pin,
        "Digital lines configured"
    );

    let effects: Arc<dyn EffectClient> = match config.effects.url_template {
        Some(ref template) => Arc::new(
            WebhookClient::new(template.clone(), config.effects.timeout)
                .context("Failed to create webhook client")?,
        ),
        None => {
            warn!("No effect URL configured, triggers will only be logged");
            Arc::new(DryRunClient)
        }
    };

    let renderer = Arc::new(HeadlessRenderer::new(config.headless_config()));
    let playback = PlaybackEngine::new(renderer, config.playback_config());
    let session = SessionController::new(entrance, effects, timeline, config.controller_config());
    let watchdog = ResetWatchdog::new(reset).with_poll_interval(sensors.reset_poll);

    Ok(Exhibit::new(playback, session, watchdog))
}

/// Warn about missing media assets
///
/// Not fatal: each play attempt reports its own failure and the exhibit
/// keeps serving the lighting timeline.
pub async fn check_assets(config: &ExhibitConfig) {
    for (kind, path) in [
        ("audio", &config.media.audio_path),
        ("video", &config.media.video_path),
    ] {
        match tokio::fs::try_exists(path).await {
            Ok(true) => info!(kind, path = %path.display(), "Media asset found"),
            Ok(false) => warn!(kind, path = %path.display(), "Media asset missing"),
            Err(e) => warn!(kind, path = %path.display(), error = %e, "Media asset not accessible"),
        }
    }
}
