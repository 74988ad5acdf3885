//! Scripted Effect Timeline
//!
//! The fixed sequence of waits and actions executed once per visitor. The
//! waits are authored against one specific video asset (95 seconds); the
//! timeline records that duration so a mismatched asset is caught at
//! startup instead of drifting silently.
//!
//! ```text
//! +0s   strip on, aurora on        (issued by the controller before step 1)
//! +4s   start playback
//! +7s   aurora off
//! +14s  strip off
//! +81s  aurora on
//! +92s  aurora off
//! ```

use std::time::Duration;

use crate::effects::{EffectChannel, EffectTrigger};

/// What happens at the end of a step's wait
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelineAction {
    /// Ask the playback engine to start the audio/video sequence
    StartPlayback,
    /// Switch a lighting channel
    Effect(EffectTrigger),
}

/// One step: wait, then act
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelineStep {
    /// Time to wait before the action
    pub wait: Duration,
    /// Action performed after the wait
    pub action: TimelineAction,
}

impl TimelineStep {
    const fn new(wait_secs: u64, action: TimelineAction) -> Self {
        Self {
            wait: Duration::from_secs(wait_secs),
            action,
        }
    }
}

/// Ordered timeline plus the asset duration it was authored for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    steps: Vec<TimelineStep>,
    authored_for: Duration,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Timeline {
    /// Duration of the video asset the standard timeline was authored against
    pub const AUTHORED_ASSET_DURATION: Duration = Duration::from_secs(95);

    /// The exhibit's timeline
    #[must_use]
    pub fn standard() -> Self {
        use TimelineAction::{Effect, StartPlayback};

        Self {
            steps: vec![
                TimelineStep::new(4, StartPlayback),
                // aurora goes dark once the video is under way
                TimelineStep::new(3, Effect(EffectTrigger::off(EffectChannel::Aurora))),
                TimelineStep::new(7, Effect(EffectTrigger::off(EffectChannel::Strip))),
                // aurora returns ahead of the video's closing scene
                TimelineStep::new(67, Effect(EffectTrigger::on(EffectChannel::Aurora))),
                TimelineStep::new(11, Effect(EffectTrigger::off(EffectChannel::Aurora))),
            ],
            authored_for: Self::AUTHORED_ASSET_DURATION,
        }
    }

    /// Steps in execution order
    #[must_use]
    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    /// Asset duration the waits were calibrated against
    #[must_use]
    pub fn authored_for(&self) -> Duration {
        self.authored_for
    }

    /// Whether an asset of `duration` keeps the calibration valid
    #[must_use]
    pub fn matches_asset(&self, duration: Duration) -> bool {
        duration == self.authored_for
    }

    /// Sum of all waits
    #[must_use]
    pub fn total(&self) -> Duration {
        self.steps.iter().map(|step| step.wait).sum()
    }

    /// Each action with its cumulative offset from timeline start
    #[must_use]
    pub fn offsets(&self) -> Vec<(Duration, TimelineAction)> {
        let mut elapsed = Duration::ZERO;
        self.steps
            .iter()
            .map(|step| {
                elapsed += step.wait;
                (elapsed, step.action)
            })
            .collect()
    }
}
