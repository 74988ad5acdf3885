//! Session Controller
//!
//! The visitor-session state machine. One controller drives the whole
//! exhibit: it waits for someone to walk through the entrance, watches for
//! them to leave, fires the lighting timeline and tells the playback engine
//! when to start.
//!
//! # Design Philosophy
//!
//! All state lives in a single [`Session`] behind a mutex. The lock is only
//! ever held for a read or a flag flip, never across an await, so the
//! watchdog can pause the session at any moment. Every loop in here checks
//! the session at its polling boundary and winds down on its own; nothing
//! is ever aborted mid-step.
//!
//! # Visit Cycle
//!
//! ```text
//! wait_in ──▶ spawn exit watch ──▶ strip on, aurora on ──▶ timeline
//!    ▲                                                        │
//!    └──── end() ◀── wait while occupied and not paused ◀─────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Mutex as DispatchLock;
use tokio::task::JoinHandle;

use crate::effects::{EffectChannel, EffectClient, EffectMode, EffectTrigger};
use crate::playback::PlaybackEngine;
use crate::sensors::{wait_for_opening, DigitalInput, WaitOutcome};
use crate::session::{Session, SessionSnapshot};
use crate::timeline::{Timeline, TimelineAction};

/// Polling intervals used by the controller
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Entrance and exit detection poll interval
    pub entrance_poll: Duration,
    /// Poll interval while waiting for an occupied session to end
    pub occupancy_poll: Duration,
    /// Granularity of timeline sleeps
    pub sleep_tick: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            entrance_poll: Duration::from_millis(100),
            occupancy_poll: Duration::from_millis(500),
            sleep_tick: Duration::from_secs(1),
        }
    }
}

struct Inner {
    entrance: Arc<dyn DigitalInput>,
    effects: Arc<dyn EffectClient>,
    timeline: Timeline,
    config: ControllerConfig,
    session: Mutex<Session>,
    exit_task: Mutex<Option<JoinHandle<()>>>,
    // One per channel, held from state change until the trigger returns
    dispatch: [DispatchLock<()>; 2],
}

/// Handle to the session controller
///
/// Cheap to clone; the watchdog and the exit watch each hold a clone.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("entrance", &self.inner.entrance.name())
            .field("effects", &self.inner.effects.name())
            .field("session", &self.snapshot())
            .finish()
    }
}

impl SessionController {
    /// Create a controller with an idle session
    #[must_use]
    pub fn new(
        entrance: Arc<dyn DigitalInput>,
        effects: Arc<dyn EffectClient>,
        timeline: Timeline,
        config: ControllerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                entrance,
                effects,
                timeline,
                config,
                session: Mutex::new(Session::new()),
                exit_task: Mutex::new(None),
                dispatch: [DispatchLock::new(()), DispatchLock::new(())],
            }),
        }
    }

    /// Consistent copy of the session
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.session.lock().snapshot()
    }

    fn is_running(&self) -> bool {
        self.inner.session.lock().is_running()
    }

    fn is_paused(&self) -> bool {
        self.inner.session.lock().is_paused()
    }

    fn dispatch_lock(&self, channel: EffectChannel) -> &DispatchLock<()> {
        match channel {
            EffectChannel::Aurora => &self.inner.dispatch[0],
            EffectChannel::Strip => &self.inner.dispatch[1],
        }
    }

    // =========================================================================
    // Main loop
    // =========================================================================

    /// Serve visitors until [`halt`](Self::halt) is called
    pub async fn run_forever(self, playback: PlaybackEngine) {
        tracing::info!(
            entrance = self.inner.entrance.name(),
            effects = self.inner.effects.name(),
            "Session controller started"
        );

        loop {
            if self.wait_in().await == WaitOutcome::Cancelled {
                break;
            }

            let visit = self.snapshot().visit;
            self.spawn_exit_watch(visit, playback.clone()).await;

            self.kick(EffectChannel::Strip, EffectMode::On, false).await;
            self.kick(EffectChannel::Aurora, EffectMode::On, false).await;
            self.run_timeline(&playback).await;
            tracing::info!(visit, "THE END");

            if !self.is_running() {
                break;
            }

            loop {
                let snapshot = self.snapshot();
                if !snapshot.occupied || snapshot.paused {
                    break;
                }
                tokio::time::sleep(self.inner.config.occupancy_poll).await;
            }
            self.end().await;
        }

        tracing::info!("Session controller stopped");
    }

    async fn run_timeline(&self, playback: &PlaybackEngine) {
        for step in self.inner.timeline.steps() {
            self.sleep(step.wait).await;
            match step.action {
                TimelineAction::StartPlayback => {
                    if !self.is_paused() {
                        playback.request_play();
                    }
                }
                TimelineAction::Effect(trigger) => {
                    self.kick(trigger.channel, trigger.mode, false).await;
                }
            }
        }
    }

    // =========================================================================
    // Entrance / exit detection
    // =========================================================================

    /// Wait for a visitor to walk in
    ///
    /// Resolves on a closed-to-open transition of the entrance line and
    /// starts a new visit. Returns [`WaitOutcome::Cancelled`] once the
    /// exhibit is halted.
    pub async fn wait_in(&self) -> WaitOutcome {
        let outcome = wait_for_opening(
            self.inner.entrance.as_ref(),
            self.inner.config.entrance_poll,
            || !self.is_running(),
        )
        .await;

        if outcome == WaitOutcome::Cancelled {
            return outcome;
        }

        let mut session = self.inner.session.lock();
        if !session.is_running() {
            return WaitOutcome::Cancelled;
        }
        let visit = session.begin_visit();
        drop(session);

        tracing::info!(visit, "GOING IN");
        WaitOutcome::Reached
    }

    async fn spawn_exit_watch(&self, visit: u64, playback: PlaybackEngine) {
        // A previous watch sees the new visit number and exits within a tick
        self.join_exit_watch().await;

        let controller = self.clone();
        let handle = tokio::spawn(async move { controller.wait_out(visit, playback).await });
        *self.inner.exit_task.lock() = Some(handle);
    }

    async fn join_exit_watch(&self) {
        let handle = self.inner.exit_task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Exit watch task failed");
            }
        }
    }

    async fn wait_out(&self, visit: u64, playback: PlaybackEngine) {
        let superseded = || {
            let session = self.inner.session.lock();
            session.is_paused() || session.visit() != visit
        };

        if superseded() {
            return;
        }

        let outcome = wait_for_opening(
            self.inner.entrance.as_ref(),
            self.inner.config.entrance_poll,
            superseded,
        )
        .await;

        if outcome == WaitOutcome::Cancelled {
            tracing::debug!(visit, "Exit watch cancelled");
            return;
        }

        tracing::info!(visit, "GOING OUT");
        playback.request_blank();
        self.inner.session.lock().vacate();
        self.reset().await;
    }

    // =========================================================================
    // Effects
    // =========================================================================

    /// Switch a lighting channel
    ///
    /// Does nothing while the session is paused unless `force` is set.
    /// Triggers for one channel reach the client in the order their state
    /// changes were applied. Trigger failures are logged and otherwise
    /// ignored.
    pub async fn kick(&self, channel: EffectChannel, mode: EffectMode, force: bool) {
        let _dispatch = self.dispatch_lock(channel).lock().await;
        if !self.inner.session.lock().try_switch(channel, mode, force) {
            return;
        }

        let trigger = EffectTrigger::new(channel, mode);
        tracing::debug!(trigger = %trigger, force, "Effect trigger");
        if let Err(e) = self.inner.effects.trigger(trigger).await {
            tracing::warn!(
                trigger = %trigger,
                client = self.inner.effects.name(),
                error = %e,
                "Effect trigger failed"
            );
        }
    }

    /// Force every channel that is on to off
    pub async fn off(&self) {
        let active: Vec<EffectChannel> = self
            .inner
            .session
            .lock()
            .effects()
            .active_channels()
            .collect();

        for channel in active {
            self.kick(channel, EffectMode::Off, true).await;
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Sleep for `duration` in ticks, returning early once paused
    pub async fn sleep(&self, duration: Duration) {
        let tick = self.inner.config.sleep_tick;
        let mut remaining = duration;

        while !remaining.is_zero() {
            if self.is_paused() {
                return;
            }
            let step = remaining.min(tick);
            tokio::time::sleep(step).await;
            remaining -= step;
        }
    }

    /// Pause the session; waits for the exit watch if a visitor is inside
    pub async fn end(&self) {
        let occupied = {
            let mut session = self.inner.session.lock();
            session.pause();
            session.is_occupied()
        };

        if occupied {
            self.join_exit_watch().await;
        }
    }

    /// Interrupt the current visit: lights off, session paused
    ///
    /// A no-op (apart from clearing `occupied`) when already paused. The
    /// session is paused before the first forced off goes out.
    pub async fn reset(&self) {
        let was_paused = {
            let mut session = self.inner.session.lock();
            session.vacate();
            let was_paused = session.is_paused();
            session.pause();
            was_paused
        };

        if was_paused {
            tracing::debug!("Reset while idle, nothing to do");
            return;
        }

        self.off().await;
        self.end().await;
    }

    /// Stop serving visitors for good
    pub async fn halt(&self) {
        {
            let mut session = self.inner.session.lock();
            session.stop_running();
            session.pause();
        }
        self.off().await;
        self.end().await;
        self.join_exit_watch().await;
        tracing::debug!("Session controller halted");
    }
}
