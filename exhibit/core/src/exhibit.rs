//! Exhibit Supervisor
//!
//! Spawns the long-running loops, watches their join handles, and runs the
//! orderly shutdown. None of the loops is expected to end on its own while
//! the exhibit is up, so any task that exits early is reported as a
//! failure.
//!
//! # Tasks
//!
//! | Task       | Body                                   |
//! |------------|----------------------------------------|
//! | `playback` | [`PlaybackEngine::run`]                |
//! | `session`  | [`SessionController::run_forever`]     |
//! | `watchdog` | [`ResetWatchdog::run_forever`]         |
//! | `faults`   | resets the session when playback fails |
//!
//! # Shutdown Order
//!
//! Watchdog first (so no reset races the teardown), then playback, then the
//! session. Each task then gets a grace period to wind down before it is
//! aborted.

use std::future::Future;
use std::pin::Pin;
use std::task::Poll;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::{JoinError, JoinHandle};

use crate::controller::SessionController;
use crate::playback::{PlaybackEngine, PlaybackEvent};
use crate::watchdog::ResetWatchdog;

/// Time each task gets to stop after being told to halt
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Supervisor errors
#[derive(Debug, Error)]
pub enum ExhibitError {
    /// A supervised task panicked or returned while the exhibit was running
    #[error("{task} task failed: {reason}")]
    TaskFailed {
        /// Task name
        task: &'static str,
        /// Panic message or exit description
        reason: String,
    },
}

struct Supervised {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// The assembled exhibit
#[derive(Debug)]
pub struct Exhibit {
    playback: PlaybackEngine,
    session: SessionController,
    watchdog: ResetWatchdog,
}

impl Exhibit {
    /// Assemble an exhibit from its three components
    #[must_use]
    pub fn new(playback: PlaybackEngine, session: SessionController, watchdog: ResetWatchdog) -> Self {
        Self {
            playback,
            session,
            watchdog,
        }
    }

    /// Playback engine handle
    #[must_use]
    pub fn playback(&self) -> &PlaybackEngine {
        &self.playback
    }

    /// Session controller handle
    #[must_use]
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Run until `shutdown` resolves or a task fails
    ///
    /// The shutdown sequence runs in both cases.
    ///
    /// # Errors
    ///
    /// Returns [`ExhibitError::TaskFailed`] if any task exits before
    /// `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ExhibitError>
    where
        F: Future<Output = ()>,
    {
        let mut tasks = self.spawn_tasks();

        let exited = tokio::select! {
            () = shutdown => None,
            exit = first_exit(&mut tasks) => Some(exit),
        };

        let failure = exited.map(|(index, result)| {
            let task = tasks.swap_remove(index);
            let reason = match result {
                Ok(()) => "exited unexpectedly".to_string(),
                Err(e) => e.to_string(),
            };
            tracing::error!(task = task.name, reason = %reason, "Task failed");
            ExhibitError::TaskFailed {
                task: task.name,
                reason,
            }
        });

        self.shutdown(tasks).await;

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn spawn_tasks(&self) -> Vec<Supervised> {
        // Subscribe before the engine can publish anything
        let events = self.playback.subscribe();

        vec![
            Supervised {
                name: "playback",
                handle: self.playback.spawn(),
            },
            Supervised {
                name: "session",
                handle: tokio::spawn(self.session.clone().run_forever(self.playback.clone())),
            },
            Supervised {
                name: "watchdog",
                handle: tokio::spawn(
                    self.watchdog
                        .clone()
                        .run_forever(self.playback.clone(), self.session.clone()),
                ),
            },
            Supervised {
                name: "faults",
                handle: tokio::spawn(forward_faults(events, self.session.clone())),
            },
        ]
    }

    async fn shutdown(&self, tasks: Vec<Supervised>) {
        tracing::info!("Shutting down exhibit");

        self.watchdog.halt();
        self.playback.halt_permanently();
        self.session.halt().await;

        for mut task in tasks {
            if task.name == "faults" {
                task.handle.abort();
            }

            match tokio::time::timeout(SHUTDOWN_GRACE, &mut task.handle).await {
                Ok(Ok(())) => tracing::debug!(task = task.name, "Task stopped"),
                Ok(Err(e)) if e.is_cancelled() => {}
                Ok(Err(e)) => tracing::warn!(task = task.name, error = %e, "Task failed during shutdown"),
                Err(_) => {
                    tracing::warn!(task = task.name, "Task did not stop in time, aborting");
                    task.handle.abort();
                }
            }
        }

        tracing::info!("Exhibit stopped");
    }
}

/// Resolve with the index and result of the first task to finish
async fn first_exit(tasks: &mut [Supervised]) -> (usize, Result<(), JoinError>) {
    std::future::poll_fn(|cx| {
        for (index, task) in tasks.iter_mut().enumerate() {
            if let Poll::Ready(result) = Pin::new(&mut task.handle).poll(cx) {
                return Poll::Ready((index, result));
            }
        }
        Poll::Pending
    })
    .await
}

/// Reset the session whenever a play cycle fails
async fn forward_faults(mut events: broadcast::Receiver<PlaybackEvent>, session: SessionController) {
    loop {
        match events.recv().await {
            Ok(PlaybackEvent::Failed { reason }) => {
                tracing::warn!(reason = %reason, "Playback failed, resetting session");
                session.reset().await;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Playback events lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
