//! Playback Engine
//!
//! Owns the display surface and runs the audio/video sync loop. The audio
//! track is the master clock: once it starts, every decoded frame is either
//! shown, held until it is due, or dropped because real time has already
//! moved past it.
//!
//! # Design Philosophy
//!
//! Other tasks never touch the renderer. They send a directive (play, blank,
//! halt) over a `watch` channel and the engine's own task acts on it at the
//! next frame boundary. Outcomes are published on a `broadcast` channel so
//! any number of observers can follow along.
//!
//! ```text
//!            request_play()
//!   Blank ─────────────────────▶ Playing { started_at }
//!     ▲                               │
//!     └── exhausted / request_blank ──┘
//!
//!   halt_permanently(): terminal, engine task exits
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let engine = PlaybackEngine::new(renderer, PlaybackConfig::default());
//! let handle = engine.spawn();
//!
//! engine.request_play();
//! // ...
//! engine.halt_permanently();
//! handle.await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::media::{AudioHandle, MediaError, MediaRenderer, VideoStream};

/// Capacity of the playback event channel
const EVENT_CAPACITY: usize = 16;

/// Frame rate the exhibit video is encoded at
pub const DEFAULT_FRAME_RATE: f64 = 24.0;

/// Index of the frame that should be on screen `elapsed` after audio start
#[must_use]
pub fn target_frame(elapsed: Duration, frame_rate: f64) -> u64 {
    (elapsed.as_secs_f64() * frame_rate).floor() as u64
}

/// Playback engine configuration
#[derive(Clone, Debug)]
pub struct PlaybackConfig {
    /// Frames per second of the video asset
    pub frame_rate: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

/// What the display surface is doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Blank screen, no media open
    Blank,
    /// Sequence running
    Playing {
        /// Instant the audio started
        started_at: Instant,
    },
}

/// Why a play cycle ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The video ran out of frames
    Exhausted,
    /// `request_blank()` was observed
    Stopped,
    /// `halt_permanently()` was observed
    Halted,
}

/// Counters for one play cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Frames presented
    pub displayed: u64,
    /// Frames discarded to catch up with the audio
    pub dropped: u64,
    /// How the cycle ended
    pub end: PlaybackEnd,
}

/// Published by the engine at cycle boundaries
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEvent {
    /// Audio started and frames are flowing
    Started {
        /// Audio start instant
        started_at: Instant,
    },
    /// A cycle completed (for any reason other than a media error)
    Finished(PlaybackStats),
    /// A cycle could not start or was cut short by a media error
    Failed {
        /// Error message
        reason: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Directive {
    Blank,
    Play,
    Halt,
}

struct Inner {
    renderer: Arc<dyn MediaRenderer>,
    config: PlaybackConfig,
    directive: watch::Sender<Directive>,
    events: broadcast::Sender<PlaybackEvent>,
    state: Mutex<PlaybackState>,
}

/// Handle to the playback engine
///
/// Cheap to clone; all clones drive the same engine.
#[derive(Clone)]
pub struct PlaybackEngine {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("renderer", &self.inner.renderer.name())
            .field("state", &self.state())
            .finish()
    }
}

impl PlaybackEngine {
    /// Create an engine around `renderer`; call [`spawn`](Self::spawn) to start it
    #[must_use]
    pub fn new(renderer: Arc<dyn MediaRenderer>, config: PlaybackConfig) -> Self {
        let (directive, _) = watch::channel(Directive::Blank);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                renderer,
                config,
                directive,
                events,
                state: Mutex::new(PlaybackState::Blank),
            }),
        }
    }

    /// Start the engine task
    pub fn spawn(&self) -> JoinHandle<()> {
        tokio::spawn(self.clone().run())
    }

    /// Ask for the sequence to start
    ///
    /// Returns `false` if a cycle is already requested or the engine is
    /// halted.
    pub fn request_play(&self) -> bool {
        self.inner.directive.send_if_modified(|directive| {
            if *directive == Directive::Blank {
                *directive = Directive::Play;
                true
            } else {
                false
            }
        })
    }

    /// Stop the current cycle, if any, and show the blank screen
    pub fn request_blank(&self) {
        self.inner.directive.send_if_modified(|directive| {
            if *directive == Directive::Play {
                *directive = Directive::Blank;
                true
            } else {
                false
            }
        });
    }

    /// Stop for good; every later `request_play()` is ignored
    pub fn halt_permanently(&self) {
        self.inner.directive.send_if_modified(|directive| {
            if *directive == Directive::Halt {
                false
            } else {
                *directive = Directive::Halt;
                true
            }
        });
    }

    /// Whether `halt_permanently()` has been called
    #[must_use]
    pub fn is_halted(&self) -> bool {
        *self.inner.directive.borrow() == Directive::Halt
    }

    /// Current display state
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        *self.inner.state.lock()
    }

    /// Subscribe to playback events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events.subscribe()
    }

    /// Engine task body
    pub async fn run(self) {
        let mut directives = self.inner.directive.subscribe();
        tracing::debug!(renderer = self.inner.renderer.name(), "Playback engine started");

        loop {
            self.show_blank().await;

            let directive = match directives.wait_for(|d| *d != Directive::Blank).await {
                Ok(directive) => *directive,
                Err(_) => break,
            };

            match directive {
                Directive::Play => {
                    self.play_once(&mut directives).await;
                    // re-arm for the next request
                    self.inner.directive.send_if_modified(|d| {
                        if *d == Directive::Play {
                            *d = Directive::Blank;
                            true
                        } else {
                            false
                        }
                    });
                }
                Directive::Halt | Directive::Blank => break,
            }
        }

        self.inner.renderer.close().await;
        tracing::debug!("Playback engine halted");
    }

    async fn show_blank(&self) {
        if let Err(e) = self.inner.renderer.show_blank().await {
            tracing::warn!(error = %e, "Failed to show blank screen");
        }
    }

    fn publish(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    async fn play_once(&self, directives: &mut watch::Receiver<Directive>) {
        let (mut audio, mut video, started_at) = match self.open_media().await {
            Ok(media) => media,
            Err(e) => {
                tracing::error!(error = %e, "Playback failed to start");
                self.publish(PlaybackEvent::Failed {
                    reason: e.to_string(),
                });
                return;
            }
        };

        *self.inner.state.lock() = PlaybackState::Playing { started_at };
        tracing::info!(renderer = self.inner.renderer.name(), "VIDEO START");
        self.publish(PlaybackEvent::Started { started_at });

        let outcome = self.sync(video.as_mut(), started_at, directives).await;

        if audio.is_playing() {
            audio.stop();
        }
        video.release();
        *self.inner.state.lock() = PlaybackState::Blank;

        match outcome {
            Ok(stats) => {
                tracing::info!(
                    displayed = stats.displayed,
                    dropped = stats.dropped,
                    end = ?stats.end,
                    "VIDEO END"
                );
                self.publish(PlaybackEvent::Finished(stats));
            }
            Err(e) => {
                tracing::error!(error = %e, "Playback aborted");
                self.publish(PlaybackEvent::Failed {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Start audio in its own task while the video opens
    async fn open_media(
        &self,
    ) -> Result<(Box<dyn AudioHandle>, Box<dyn VideoStream>, Instant), MediaError> {
        let renderer = Arc::clone(&self.inner.renderer);
        let audio_task = tokio::spawn(async move {
            let audio = renderer.start_audio().await?;
            Ok::<_, MediaError>((audio, Instant::now()))
        });

        let video = self.inner.renderer.open_video().await;
        let audio = audio_task
            .await
            .map_err(|e| MediaError::Task(e.to_string()))
            .and_then(|result| result);

        match (audio, video) {
            (Ok((audio, started_at)), Ok(video)) => Ok((audio, video, started_at)),
            (Ok((mut audio, _)), Err(e)) => {
                audio.stop();
                Err(e)
            }
            (Err(e), Ok(mut video)) => {
                video.release();
                Err(e)
            }
            (Err(e), Err(_)) => Err(e),
        }
    }

    async fn sync(
        &self,
        video: &mut dyn VideoStream,
        t0: Instant,
        directives: &mut watch::Receiver<Directive>,
    ) -> Result<PlaybackStats, MediaError> {
        let frame_rate = self.inner.config.frame_rate;
        let mut stats = PlaybackStats {
            displayed: 0,
            dropped: 0,
            end: PlaybackEnd::Exhausted,
        };

        loop {
            if let Some(end) = stop_requested(directives) {
                stats.end = end;
                return Ok(stats);
            }

            let Some(frame) = video.next_frame().await? else {
                return Ok(stats);
            };

            if frame.index < target_frame(t0.elapsed(), frame_rate) {
                stats.dropped += 1;
                continue;
            }

            // Ahead of the audio: hold until due
            let due = t0 + frame.presentation_offset(frame_rate);
            while Instant::now() < due {
                tokio::select! {
                    () = tokio::time::sleep_until(due) => break,
                    changed = directives.changed() => {
                        if changed.is_err() {
                            tokio::time::sleep_until(due).await;
                        }
                        if let Some(end) = stop_requested(directives) {
                            stats.end = end;
                            return Ok(stats);
                        }
                    }
                }
            }

            self.inner.renderer.present(&frame).await?;
            stats.displayed += 1;
        }
    }
}

fn stop_requested(directives: &watch::Receiver<Directive>) -> Option<PlaybackEnd> {
    match *directives.borrow() {
        Directive::Play => None,
        Directive::Blank => Some(PlaybackEnd::Stopped),
        Directive::Halt => Some(PlaybackEnd::Halted),
    }
}
