//! Reset Watchdog
//!
//! Watches the reset control and forces the exhibit back to its idle state
//! whenever the line changes level. Any change counts, in either direction:
//! the reset control is a toggle switch, not a push button.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::controller::SessionController;
use crate::playback::PlaybackEngine;
use crate::sensors::{wait_for_change, DigitalInput, WaitOutcome};

/// Default reset line poll interval
pub const DEFAULT_RESET_POLL: Duration = Duration::from_secs(1);

/// Reset line watcher
#[derive(Clone)]
pub struct ResetWatchdog {
    line: Arc<dyn DigitalInput>,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
}

impl std::fmt::Debug for ResetWatchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetWatchdog")
            .field("line", &self.line.name())
            .field("poll_interval", &self.poll_interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl ResetWatchdog {
    /// Create a watchdog polling `line` every [`DEFAULT_RESET_POLL`]
    #[must_use]
    pub fn new(line: Arc<dyn DigitalInput>) -> Self {
        Self {
            line,
            poll_interval: DEFAULT_RESET_POLL,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Set the poll interval
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Whether the watchdog loop is still active
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the loop after its current tick
    pub fn halt(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Watch the reset line until halted
    pub async fn run_forever(self, playback: PlaybackEngine, session: SessionController) {
        tracing::info!(
            line = self.line.name(),
            poll_ms = self.poll_interval.as_millis() as u64,
            "Reset watchdog started"
        );

        loop {
            let outcome =
                wait_for_change(self.line.as_ref(), self.poll_interval, || !self.is_running())
                    .await;

            if outcome == WaitOutcome::Cancelled || !self.is_running() {
                break;
            }

            tracing::info!(line = self.line.name(), "RESET");
            playback.request_blank();
            session.reset().await;
        }

        tracing::info!("Reset watchdog stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerConfig;
    use crate::effects::DryRunClient;
    use crate::media::{HeadlessConfig, HeadlessRenderer};
    use crate::playback::PlaybackConfig;
    use crate::sensors::{LineState, ManualLine};
    use crate::timeline::Timeline;

    fn parts() -> (PlaybackEngine, SessionController) {
        let playback = PlaybackEngine::new(
            Arc::new(HeadlessRenderer::new(HeadlessConfig::default())),
            PlaybackConfig::default(),
        );
        let session = SessionController::new(
            Arc::new(ManualLine::new("entrance", LineState::Closed)),
            Arc::new(DryRunClient),
            Timeline::standard(),
            ControllerConfig::default(),
        );
        (playback, session)
    }

    #[tokio::test(start_paused = true)]
    async fn test_halt_stops_loop_at_next_tick() {
        let line = ManualLine::new("reset", LineState::Open);
        let watchdog = ResetWatchdog::new(Arc::new(line));
        let (playback, session) = parts();

        let handle = tokio::spawn(watchdog.clone().run_forever(playback, session));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!handle.is_finished());

        watchdog.halt();
        tokio::time::timeout(Duration::from_millis(1100), handle)
            .await
            .expect("watchdog should stop within one tick")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_level_change_resets() {
        let line = ManualLine::new("reset", LineState::Closed);
        let watchdog = ResetWatchdog::new(Arc::new(line.clone()));
        let (playback, session) = parts();

        let handle = tokio::spawn(watchdog.clone().run_forever(playback, session.clone()));

        // Flip the toggle twice; the session is idle so nothing changes
        line.toggle();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        line.toggle();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let snapshot = session.snapshot();
        assert!(snapshot.paused);
        assert!(!snapshot.occupied);
        assert!(snapshot.effects.all_off());

        watchdog.halt();
        handle.await.unwrap();
    }
}
