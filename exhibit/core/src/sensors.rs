//! Digital Input Lines
//!
//! Level-sampled binary inputs for the door sensor and the reset control.
//! Lines are polled, never interrupt driven: every wait in the exhibit is a
//! loop that samples the line, checks a cancellation predicate, and sleeps
//! for a fixed interval.
//!
//! # Conventions
//!
//! A `High` reading means the contact is **closed**, `Low` means **open**.
//! For the entrance line a closed-to-open transition is "someone walked
//! through the door".
//!
//! # Implementations
//!
//! - [`SysfsLine`]: Linux sysfs GPIO (`/sys/class/gpio/gpioN/value`)
//! - [`ManualLine`]: in-memory line driven by code (bench rigs, tests)

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Electrical level reported by a line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    /// Logic high
    High,
    /// Logic low
    Low,
}

impl Level {
    /// Whether this level is high
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// Contact state derived from a level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineState {
    /// Contact closed (level high)
    Closed,
    /// Contact open (level low)
    Open,
}

impl LineState {
    /// The other state
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }

    /// The level that produces this state
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Closed => Level::High,
            Self::Open => Level::Low,
        }
    }
}

impl From<Level> for LineState {
    fn from(level: Level) -> Self {
        match level {
            Level::High => Self::Closed,
            Level::Low => Self::Open,
        }
    }
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
        }
    }
}

/// A named digital input line
///
/// Reads are treated as infallible by the exhibit. Implementations that can
/// fail report their last known level instead of an error.
#[async_trait]
pub trait DigitalInput: Send + Sync {
    /// Line name for logging (e.g., "entrance", "reset")
    fn name(&self) -> &str;

    /// Sample the current level
    async fn level(&self) -> Level;

    /// Sample the current contact state
    async fn state(&self) -> LineState {
        self.level().await.into()
    }
}

/// Result of a polling wait
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The awaited line state was observed
    Reached,
    /// The cancellation predicate fired first
    Cancelled,
}

/// Poll `line` every `interval` until it reads `target`
///
/// The line is sampled before the cancellation predicate on each tick, so a
/// line that already reads `target` resolves immediately even when the
/// predicate is true.
pub async fn poll_until<F>(
    line: &dyn DigitalInput,
    target: LineState,
    interval: Duration,
    mut cancelled: F,
) -> WaitOutcome
where
    F: FnMut() -> bool,
{
    loop {
        if line.state().await == target {
            return WaitOutcome::Reached;
        }
        if cancelled() {
            return WaitOutcome::Cancelled;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Wait for a closed-to-open transition
///
/// If the line currently reads open, first wait for it to close; the wait
/// only ever resolves on an opening edge.
pub async fn wait_for_opening<F>(
    line: &dyn DigitalInput,
    interval: Duration,
    mut cancelled: F,
) -> WaitOutcome
where
    F: FnMut() -> bool,
{
    loop {
        match line.state().await {
            LineState::Closed => {
                return poll_until(line, LineState::Open, interval, &mut cancelled).await;
            }
            LineState::Open => {
                let outcome = poll_until(line, LineState::Closed, interval, &mut cancelled).await;
                if outcome == WaitOutcome::Cancelled {
                    return outcome;
                }
            }
        }
    }
}

/// Wait for one level change in either direction
pub async fn wait_for_change<F>(
    line: &dyn DigitalInput,
    interval: Duration,
    cancelled: F,
) -> WaitOutcome
where
    F: FnMut() -> bool,
{
    let current = line.state().await;
    poll_until(line, current.opposite(), interval, cancelled).await
}

// =============================================================================
// Sysfs GPIO
// =============================================================================

/// Default sysfs GPIO root
pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

/// Line backed by the Linux sysfs GPIO interface
///
/// Reads `<root>/gpio<pin>/value`. The pin must already be exported and
/// configured as an input.
#[derive(Debug)]
pub struct SysfsLine {
    name: String,
    path: PathBuf,
    last_high: AtomicBool,
    failing: AtomicBool,
}

impl SysfsLine {
    /// Create a line for `pin` under `gpio_root`
    pub fn new(name: impl Into<String>, gpio_root: impl AsRef<Path>, pin: u32) -> Self {
        Self {
            name: name.into(),
            path: gpio_root
                .as_ref()
                .join(format!("gpio{pin}"))
                .join("value"),
            last_high: AtomicBool::new(true),
            failing: AtomicBool::new(false),
        }
    }

    /// Path of the value file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn last_level(&self) -> Level {
        self.last_high.load(Ordering::Relaxed).into()
    }

    fn report_failure(&self, reason: &str) {
        if !self.failing.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                line = %self.name,
                path = %self.path.display(),
                reason,
                "Line read failed, reusing last level"
            );
        }
    }
}

/// Parse the contents of a sysfs `value` file
#[must_use]
pub fn parse_level(raw: &str) -> Option<Level> {
    match raw.trim() {
        "1" => Some(Level::High),
        "0" => Some(Level::Low),
        _ => None,
    }
}

#[async_trait]
impl DigitalInput for SysfsLine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn level(&self) -> Level {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                self.report_failure(&e.to_string());
                return self.last_level();
            }
        };

        match parse_level(&raw) {
            Some(level) => {
                if self.failing.swap(false, Ordering::Relaxed) {
                    tracing::info!(line = %self.name, "Line readable again");
                }
                self.last_high.store(level.is_high(), Ordering::Relaxed);
                level
            }
            None => {
                self.report_failure("unexpected value");
                self.last_level()
            }
        }
    }
}

// =============================================================================
// Manual line
// =============================================================================

/// In-memory line whose level is set by code
///
/// Clones share the same level, so one clone can be handed to the exhibit
/// while another drives it.
#[derive(Clone, Debug)]
pub struct ManualLine {
    name: Arc<str>,
    high: Arc<AtomicBool>,
}

impl ManualLine {
    /// Create a line in the given state
    pub fn new(name: &str, initial: LineState) -> Self {
        Self {
            name: Arc::from(name),
            high: Arc::new(AtomicBool::new(initial.level().is_high())),
        }
    }

    /// Set the contact state
    pub fn set(&self, state: LineState) {
        self.high.store(state.level().is_high(), Ordering::SeqCst);
    }

    /// Flip the contact state, returning the new state
    pub fn toggle(&self) -> LineState {
        let was_high = self.high.fetch_xor(true, Ordering::SeqCst);
        LineState::from(Level::from(!was_high))
    }

    /// Current contact state without going through the trait
    #[must_use]
    pub fn current(&self) -> LineState {
        Level::from(self.high.load(Ordering::SeqCst)).into()
    }
}

#[async_trait]
impl DigitalInput for ManualLine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn level(&self) -> Level {
        self.high.load(Ordering::SeqCst).into()
    }
}
