//! Visitor Session State
//!
//! The data half of the session state machine. [`Session`] holds the three
//! lifecycle flags shared by every control loop and the on/off state of each
//! lighting channel. The behaviour lives in
//! [`SessionController`](crate::controller::SessionController), which owns a
//! single `Session` behind a mutex; other tasks only ever see a
//! [`SessionSnapshot`].
//!
//! # Lifecycle
//!
//! ```text
//!   idle (paused) ──entrance──▶ occupied ──exit / reset──▶ idle (paused)
//!         ▲                                                     │
//!         └─────────────────────────────────────────────────────┘
//!
//!   running: true ──halt──▶ false   (once, never back)
//! ```

use serde::{Deserialize, Serialize};

use crate::effects::{EffectChannel, EffectMode};

/// On/off state of every lighting channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectState {
    /// Aurora projector on
    pub aurora: bool,
    /// LED strip on
    pub strip: bool,
}

impl EffectState {
    /// Whether `channel` is on
    #[must_use]
    pub fn is_on(&self, channel: EffectChannel) -> bool {
        match channel {
            EffectChannel::Aurora => self.aurora,
            EffectChannel::Strip => self.strip,
        }
    }

    /// Record a channel switch
    pub fn apply(&mut self, channel: EffectChannel, mode: EffectMode) {
        let slot = match channel {
            EffectChannel::Aurora => &mut self.aurora,
            EffectChannel::Strip => &mut self.strip,
        };
        *slot = mode.is_on();
    }

    /// Channels currently on
    pub fn active_channels(&self) -> impl Iterator<Item = EffectChannel> + '_ {
        EffectChannel::ALL
            .into_iter()
            .filter(move |channel| self.is_on(*channel))
    }

    /// Whether every channel is off
    #[must_use]
    pub fn all_off(&self) -> bool {
        !self.aurora && !self.strip
    }
}

/// The single visitor session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Exhibit-wide liveness; cleared once at shutdown
    running: bool,
    /// Suspended by a reset, an exit, or the end of a visit
    paused: bool,
    /// A visitor is currently inside
    occupied: bool,
    /// Number of entrances detected so far
    visit: u64,
    /// Lighting channel state
    effects: EffectState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an idle session
    ///
    /// Idle is the same state the session returns to between visitors:
    /// paused, unoccupied, running.
    #[must_use]
    pub fn new() -> Self {
        Self {
            running: true,
            paused: true,
            occupied: false,
            visit: 0,
            effects: EffectState::default(),
        }
    }

    /// Whether the exhibit is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the session is paused
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether a visitor is inside
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Current visit number (0 before the first visitor)
    #[must_use]
    pub fn visit(&self) -> u64 {
        self.visit
    }

    /// Lighting channel state
    #[must_use]
    pub fn effects(&self) -> &EffectState {
        &self.effects
    }

    /// Record a detected entrance and return the new visit number
    pub fn begin_visit(&mut self) -> u64 {
        self.paused = false;
        self.occupied = true;
        self.visit += 1;
        self.visit
    }

    /// Mark the visitor as gone
    pub fn vacate(&mut self) {
        self.occupied = false;
    }

    /// Suspend the session
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Stop the exhibit; irreversible
    pub fn stop_running(&mut self) {
        self.running = false;
    }

    /// Apply a channel switch unless the pause guard blocks it
    ///
    /// Returns `false` (and leaves state untouched) when the session is
    /// paused and `force` is not set.
    pub fn try_switch(&mut self, channel: EffectChannel, mode: EffectMode, force: bool) -> bool {
        if self.paused && !force {
            return false;
        }
        self.effects.apply(channel, mode);
        true
    }

    /// Consistent copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            running: self.running,
            paused: self.paused,
            occupied: self.occupied,
            visit: self.visit,
            effects: self.effects,
        }
    }
}

/// Point-in-time copy of the session, safe to hand to other tasks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Exhibit-wide liveness
    pub running: bool,
    /// Session suspended
    pub paused: bool,
    /// Visitor inside
    pub occupied: bool,
    /// Visit number
    pub visit: u64,
    /// Lighting channel state
    pub effects: EffectState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new();
        assert!(session.is_running());
        assert!(session.is_paused());
        assert!(!session.is_occupied());
        assert_eq!(session.visit(), 0);
        assert!(session.effects().all_off());
    }

    #[test]
    fn test_begin_visit_clears_pause() {
        let mut session = Session::new();
        assert_eq!(session.begin_visit(), 1);
        assert!(!session.is_paused());
        assert!(session.is_occupied());

        session.vacate();
        session.pause();
        assert_eq!(session.begin_visit(), 2);
    }

    #[test]
    fn test_pause_guard_blocks_unforced_switch() {
        let mut session = Session::new();
        session.begin_visit();
        assert!(session.try_switch(EffectChannel::Aurora, EffectMode::On, false));
        assert!(session.effects().aurora);

        session.pause();
        assert!(!session.try_switch(EffectChannel::Strip, EffectMode::On, false));
        assert!(!session.effects().strip);
        assert!(!session.try_switch(EffectChannel::Aurora, EffectMode::Off, false));
        assert!(session.effects().aurora);

        assert!(session.try_switch(EffectChannel::Aurora, EffectMode::Off, true));
        assert!(!session.effects().aurora);
    }

    #[test]
    fn test_active_channels() {
        let mut effects = EffectState::default();
        assert_eq!(effects.active_channels().count(), 0);

        effects.apply(EffectChannel::Strip, EffectMode::On);
        let active: Vec<_> = effects.active_channels().collect();
        assert_eq!(active, vec![EffectChannel::Strip]);

        effects.apply(EffectChannel::Aurora, EffectMode::On);
        assert_eq!(effects.active_channels().count(), 2);
        assert!(!effects.all_off());
    }

    #[test]
    fn test_running_is_one_way() {
        let mut session = Session::new();
        session.stop_running();
        session.begin_visit();
        assert!(!session.is_running());
        assert!(!session.snapshot().running);
    }
}
