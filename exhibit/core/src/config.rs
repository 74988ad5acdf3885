//! TOML Configuration File Support
//!
//! Loads the exhibit configuration from `~/.config/inner-universe/exhibit.toml`
//! (XDG), environment variables, and command-line overrides.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables (`EXHIBIT_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [sensors]
//! gpio_root = "/sys/class/gpio"
//! entrance_pin = 4
//! reset_pin = 3
//!
//! [effects]
//! url = "https://maker.ifttt.com/trigger/{trigger}/json/with/key/KEY"
//! timeout_ms = 5000
//!
//! [media]
//! audio_path = "/opt/exhibit/audio.wav"
//! video_path = "/opt/exhibit/video.mp4"
//! video_duration_secs = 95
//!
//! [playback]
//! frame_rate = 24.0
//!
//! [display]
//! display = ":0"
//! width = 1280
//! height = 720
//! cursor_helper = ["unclutter", "-idle", "0.1", "-root"]
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::ControllerConfig;
use crate::media::HeadlessConfig;
use crate::playback::{PlaybackConfig, DEFAULT_FRAME_RATE};
use crate::sensors::DEFAULT_GPIO_ROOT;
use crate::timeline::Timeline;
use crate::watchdog::DEFAULT_RESET_POLL;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {}: {source}", path.display())]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Sensors section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsToml {
    /// Sysfs GPIO root directory
    pub gpio_root: Option<PathBuf>,
    /// Entrance (door) line pin
    pub entrance_pin: Option<u32>,
    /// Reset line pin
    pub reset_pin: Option<u32>,
    /// Entrance/exit poll interval in milliseconds
    pub entrance_poll_ms: Option<u64>,
    /// Occupancy poll interval in milliseconds
    pub occupancy_poll_ms: Option<u64>,
    /// Reset line poll interval in milliseconds
    pub reset_poll_ms: Option<u64>,
}

/// Effects section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsToml {
    /// Trigger URL template (`{trigger}` is replaced by the trigger name)
    pub url: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Media section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaToml {
    /// Soundtrack path (WAV)
    pub audio_path: Option<PathBuf>,
    /// Video path
    pub video_path: Option<PathBuf>,
    /// Video duration in seconds
    pub video_duration_secs: Option<u64>,
    /// Simulated per-frame render cost in milliseconds (headless renderer)
    pub render_cost_ms: Option<u64>,
}

/// Playback section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackToml {
    /// Video frame rate
    pub frame_rate: Option<f64>,
}

/// Display section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// X display for child processes
    pub display: Option<String>,
    /// Blank screen width
    pub width: Option<u32>,
    /// Blank screen height
    pub height: Option<u32>,
    /// Cursor-hiding helper command and arguments (empty disables it)
    pub cursor_helper: Option<Vec<String>>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhibitToml {
    /// Sensors section
    pub sensors: SensorsToml,
    /// Effects section
    pub effects: EffectsToml,
    /// Media section
    pub media: MediaToml,
    /// Playback section
    pub playback: PlaybackToml,
    /// Display section
    pub display: DisplayToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Digital input settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorSettings {
    /// Sysfs GPIO root directory
    pub gpio_root: PathBuf,
    /// Entrance line pin
    pub entrance_pin: u32,
    /// Reset line pin
    pub reset_pin: u32,
    /// Entrance/exit poll interval
    pub entrance_poll: Duration,
    /// Occupancy poll interval
    pub occupancy_poll: Duration,
    /// Reset line poll interval
    pub reset_poll: Duration,
}

/// Effect actuator settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectSettings {
    /// Trigger URL template; `None` selects the dry-run client
    pub url_template: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

/// Media asset settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSettings {
    /// Soundtrack path
    pub audio_path: PathBuf,
    /// Video path
    pub video_path: PathBuf,
    /// Video duration
    pub video_duration: Duration,
    /// Simulated per-frame render cost
    pub render_cost: Duration,
}

/// Display settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplaySettings {
    /// X display for child processes
    pub display: String,
    /// Blank screen width
    pub width: u32,
    /// Blank screen height
    pub height: u32,
    /// Cursor-hiding helper command line (empty disables it)
    pub cursor_helper: Vec<String>,
}

/// Resolved exhibit configuration
#[derive(Clone, Debug)]
pub struct ExhibitConfig {
    /// Digital inputs
    pub sensors: SensorSettings,
    /// Effect actuator
    pub effects: EffectSettings,
    /// Media assets
    pub media: MediaSettings,
    /// Video frame rate
    pub frame_rate: f64,
    /// Display
    pub display: DisplaySettings,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ExhibitConfig {
    fn default() -> Self {
        let controller = ControllerConfig::default();
        Self {
            sensors: SensorSettings {
                gpio_root: PathBuf::from(DEFAULT_GPIO_ROOT),
                entrance_pin: 4,
                reset_pin: 3,
                entrance_poll: controller.entrance_poll,
                occupancy_poll: controller.occupancy_poll,
                reset_poll: DEFAULT_RESET_POLL,
            },
            effects: EffectSettings {
                url_template: None,
                timeout: Duration::from_secs(5),
            },
            media: MediaSettings {
                audio_path: PathBuf::from("./audio.wav"),
                video_path: PathBuf::from("./video.mp4"),
                video_duration: Timeline::AUTHORED_ASSET_DURATION,
                render_cost: Duration::ZERO,
            },
            frame_rate: DEFAULT_FRAME_RATE,
            display: DisplaySettings {
                display: ":0".to_string(),
                width: 1280,
                height: 720,
                cursor_helper: ["unclutter", "-idle", "0.1", "-root"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ExhibitConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check the configuration against the timeline it will drive
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for zero poll intervals, a
    /// non-positive frame rate, or a video duration the timeline was not
    /// authored for.
    pub fn validate(&self, timeline: &Timeline) -> Result<(), ConfigError> {
        let polls = [
            ("entrance_poll_ms", self.sensors.entrance_poll),
            ("occupancy_poll_ms", self.sensors.occupancy_poll),
            ("reset_poll_ms", self.sensors.reset_poll),
        ];
        for (name, interval) in polls {
            if interval.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "sensors.{name} must be greater than zero"
                )));
            }
        }

        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "playback.frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }

        if !timeline.matches_asset(self.media.video_duration) {
            return Err(ConfigError::ValidationError(format!(
                "media.video_duration_secs is {}s but the timeline is authored for {}s",
                self.media.video_duration.as_secs(),
                timeline.authored_for().as_secs()
            )));
        }

        Ok(())
    }

    /// Polling intervals for the session controller
    #[must_use]
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            entrance_poll: self.sensors.entrance_poll,
            occupancy_poll: self.sensors.occupancy_poll,
            ..ControllerConfig::default()
        }
    }

    /// Playback engine settings
    #[must_use]
    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            frame_rate: self.frame_rate,
        }
    }

    /// Headless renderer settings
    #[must_use]
    pub fn headless_config(&self) -> HeadlessConfig {
        HeadlessConfig {
            audio_path: self.media.audio_path.clone(),
            video_path: self.media.video_path.clone(),
            video_duration: self.media.video_duration,
            frame_rate: self.frame_rate,
            render_cost: self.media.render_cost,
            blank_size: (self.display.width, self.display.height),
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/inner-universe/exhibit.toml` or
/// `~/.config/inner-universe/exhibit.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("inner-universe").join("exhibit.toml"))
}

/// Load configuration from the default path, then the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub async fn load_config() -> Result<ExhibitConfig, ConfigError> {
    load_config_from_path(default_config_path().as_deref()).await
}

/// Load configuration from a specific path, then the environment
///
/// A missing file is not an error; defaults are used.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_config_from_path(path: Option<&Path>) -> Result<ExhibitConfig, ConfigError> {
    let mut config = ExhibitConfig::default();

    if let Some(config_path) = path {
        match tokio::fs::read_to_string(config_path).await {
            Ok(toml_content) => {
                let toml_config: ExhibitToml = toml::from_str(&toml_content)?;
                apply_toml_config(&mut config, &toml_config);
                config.config_file_path = Some(config_path.to_path_buf());
                config.source = ConfigSource::File;

                tracing::info!(
                    path = %config_path.display(),
                    "Loaded configuration from file"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %config_path.display(),
                    "Config file not found, using defaults"
                );
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: config_path.to_path_buf(),
                    source,
                });
            }
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ExhibitConfig, toml: &ExhibitToml) {
    // Sensors
    if let Some(ref root) = toml.sensors.gpio_root {
        config.sensors.gpio_root = root.clone();
    }
    if let Some(pin) = toml.sensors.entrance_pin {
        config.sensors.entrance_pin = pin;
    }
    if let Some(pin) = toml.sensors.reset_pin {
        config.sensors.reset_pin = pin;
    }
    if let Some(ms) = toml.sensors.entrance_poll_ms {
        config.sensors.entrance_poll = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.sensors.occupancy_poll_ms {
        config.sensors.occupancy_poll = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.sensors.reset_poll_ms {
        config.sensors.reset_poll = Duration::from_millis(ms);
    }

    // Effects
    if toml.effects.url.is_some() {
        config.effects.url_template = toml.effects.url.clone();
    }
    if let Some(ms) = toml.effects.timeout_ms {
        config.effects.timeout = Duration::from_millis(ms);
    }

    // Media
    if let Some(ref path) = toml.media.audio_path {
        config.media.audio_path = path.clone();
    }
    if let Some(ref path) = toml.media.video_path {
        config.media.video_path = path.clone();
    }
    if let Some(secs) = toml.media.video_duration_secs {
        config.media.video_duration = Duration::from_secs(secs);
    }
    if let Some(ms) = toml.media.render_cost_ms {
        config.media.render_cost = Duration::from_millis(ms);
    }

    // Playback
    if let Some(rate) = toml.playback.frame_rate {
        config.frame_rate = rate;
    }

    // Display
    if let Some(ref display) = toml.display.display {
        config.display.display = display.clone();
    }
    if let Some(width) = toml.display.width {
        config.display.width = width;
    }
    if let Some(height) = toml.display.height {
        config.display.height = height;
    }
    if let Some(ref helper) = toml.display.cursor_helper {
        config.display.cursor_helper = helper.clone();
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment variable");
            None
        }
    }
}

/// Apply environment variable overrides to the config
///
/// `lookup` resolves a variable name; the loader passes the process
/// environment.
pub fn apply_env_config(config: &mut ExhibitConfig, lookup: impl Fn(&str) -> Option<String>) {
    let mut touched = false;

    if let Some(root) = lookup("EXHIBIT_GPIO_ROOT") {
        config.sensors.gpio_root = PathBuf::from(root);
        touched = true;
    }
    if let Some(pin) = parse_var(&lookup, "EXHIBIT_ENTRANCE_PIN") {
        config.sensors.entrance_pin = pin;
        touched = true;
    }
    if let Some(pin) = parse_var(&lookup, "EXHIBIT_RESET_PIN") {
        config.sensors.reset_pin = pin;
        touched = true;
    }
    if let Some(url) = lookup("EXHIBIT_EFFECTS_URL") {
        config.effects.url_template = Some(url).filter(|url| !url.is_empty());
        touched = true;
    }
    if let Some(ms) = parse_var(&lookup, "EXHIBIT_EFFECTS_TIMEOUT_MS") {
        config.effects.timeout = Duration::from_millis(ms);
        touched = true;
    }
    if let Some(path) = lookup("EXHIBIT_AUDIO_PATH") {
        config.media.audio_path = PathBuf::from(path);
        touched = true;
    }
    if let Some(path) = lookup("EXHIBIT_VIDEO_PATH") {
        config.media.video_path = PathBuf::from(path);
        touched = true;
    }
    if let Some(ms) = parse_var(&lookup, "EXHIBIT_RENDER_COST_MS") {
        config.media.render_cost = Duration::from_millis(ms);
        touched = true;
    }
    if let Some(rate) = parse_var(&lookup, "EXHIBIT_FRAME_RATE") {
        config.frame_rate = rate;
        touched = true;
    }
    if let Some(display) = lookup("EXHIBIT_DISPLAY") {
        config.display.display = display;
        touched = true;
    }

    if touched {
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// GPIO root override
    pub gpio_root: Option<PathBuf>,
    /// Effect URL template override
    pub effects_url: Option<String>,
    /// Audio path override
    pub audio_path: Option<PathBuf>,
    /// Video path override
    pub video_path: Option<PathBuf>,
    /// X display override
    pub display: Option<String>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set GPIO root override
    #[must_use]
    pub fn with_gpio_root(mut self, path: PathBuf) -> Self {
        self.gpio_root = Some(path);
        self
    }

    /// Set effect URL template override
    #[must_use]
    pub fn with_effects_url(mut self, url: String) -> Self {
        self.effects_url = Some(url);
        self
    }

    /// Set audio path override
    #[must_use]
    pub fn with_audio_path(mut self, path: PathBuf) -> Self {
        self.audio_path = Some(path);
        self
    }

    /// Set video path override
    #[must_use]
    pub fn with_video_path(mut self, path: PathBuf) -> Self {
        self.video_path = Some(path);
        self
    }

    /// Set X display override
    #[must_use]
    pub fn with_display(mut self, display: String) -> Self {
        self.display = Some(display);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ExhibitConfig) {
        if self.gpio_root.is_some()
            || self.effects_url.is_some()
            || self.audio_path.is_some()
            || self.video_path.is_some()
            || self.display.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref root) = self.gpio_root {
            config.sensors.gpio_root = root.clone();
        }
        if let Some(ref url) = self.effects_url {
            config.effects.url_template = Some(url.clone());
        }
        if let Some(ref path) = self.audio_path {
            config.media.audio_path = path.clone();
        }
        if let Some(ref path) = self.video_path {
            config.media.video_path = path.clone();
        }
        if let Some(ref display) = self.display {
            config.display.display = display.clone();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ExhibitConfig::default();

        assert_eq!(config.sensors.entrance_pin, 4);
        assert_eq!(config.sensors.reset_pin, 3);
        assert_eq!(config.sensors.entrance_poll, Duration::from_millis(100));
        assert_eq!(config.sensors.occupancy_poll, Duration::from_millis(500));
        assert_eq!(config.sensors.reset_poll, Duration::from_secs(1));
        assert_eq!(config.effects.url_template, None);
        assert_eq!(config.media.audio_path, PathBuf::from("./audio.wav"));
        assert_eq!(config.media.video_path, PathBuf::from("./video.mp4"));
        assert_eq!(config.display.display, ":0");
        assert_eq!((config.display.width, config.display.height), (1280, 720));
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate(&Timeline::standard()).is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("inner-universe/exhibit.toml"));
        }
    }

    #[tokio::test]
    async fn test_parse_valid_toml() {
        let toml_content = r#"
[sensors]
gpio_root = "/tmp/gpio"
entrance_pin = 17
entrance_poll_ms = 50

[effects]
url = "http://actuator.local/{trigger}"
timeout_ms = 1500

[media]
audio_path = "/opt/exhibit/audio.wav"
render_cost_ms = 12

[display]
display = ":1"
cursor_helper = []
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exhibit.toml");
        tokio::fs::write(&path, toml_content).await.unwrap();

        let config = load_config_from_path(Some(&path)).await.unwrap();

        assert_eq!(config.sensors.gpio_root, PathBuf::from("/tmp/gpio"));
        assert_eq!(config.sensors.entrance_pin, 17);
        assert_eq!(config.sensors.reset_pin, 3);
        assert_eq!(config.sensors.entrance_poll, Duration::from_millis(50));
        assert_eq!(
            config.effects.url_template.as_deref(),
            Some("http://actuator.local/{trigger}")
        );
        assert_eq!(config.effects.timeout, Duration::from_millis(1500));
        assert_eq!(config.media.audio_path, PathBuf::from("/opt/exhibit/audio.wav"));
        assert_eq!(config.media.render_cost, Duration::from_millis(12));
        assert_eq!(config.display.display, ":1");
        assert!(config.display.cursor_helper.is_empty());
        assert_eq!(config.config_file_path, Some(path));
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = load_config_from_path(Some(&path)).await.unwrap();
        assert_eq!(config.sensors.entrance_pin, 4);
        assert_eq!(config.config_file_path, None);
    }

    #[tokio::test]
    async fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exhibit.toml");
        tokio::fs::write(&path, "[sensors\nentrance_pin = ").await.unwrap();

        let result = load_config_from_path(Some(&path)).await;
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = ExhibitConfig::default();
        apply_toml_config(
            &mut config,
            &ExhibitToml {
                sensors: SensorsToml {
                    entrance_pin: Some(17),
                    ..SensorsToml::default()
                },
                ..ExhibitToml::default()
            },
        );

        apply_env_config(
            &mut config,
            env(&[
                ("EXHIBIT_ENTRANCE_PIN", "22"),
                ("EXHIBIT_EFFECTS_URL", "http://hooks/{trigger}"),
                ("EXHIBIT_FRAME_RATE", "not-a-number"),
            ]),
        );

        assert_eq!(config.sensors.entrance_pin, 22);
        assert_eq!(
            config.effects.url_template.as_deref(),
            Some("http://hooks/{trigger}")
        );
        assert_eq!(config.frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_empty_env_url_selects_dry_run() {
        let mut config = ExhibitConfig::default();
        config.effects.url_template = Some("http://file/{trigger}".to_string());

        apply_env_config(&mut config, env(&[("EXHIBIT_EFFECTS_URL", "")]));
        assert_eq!(config.effects.url_template, None);
    }

    #[test]
    fn test_cli_overrides_take_priority() {
        let mut config = ExhibitConfig::default();
        apply_env_config(&mut config, env(&[("EXHIBIT_DISPLAY", ":5")]));

        ConfigOverrides::new()
            .with_display(":9".to_string())
            .with_video_path(PathBuf::from("/media/video.mp4"))
            .apply(&mut config);

        assert_eq!(config.display.display, ":9");
        assert_eq!(config.media.video_path, PathBuf::from("/media/video.mp4"));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = ExhibitConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_validation_rejects_zero_poll() {
        let mut config = ExhibitConfig::default();
        config.sensors.reset_poll = Duration::ZERO;

        let err = config.validate(&Timeline::standard()).unwrap_err();
        assert!(err.to_string().contains("reset_poll_ms"));
    }

    #[test]
    fn test_validation_rejects_bad_frame_rate() {
        let mut config = ExhibitConfig::default();
        config.frame_rate = 0.0;
        assert!(config.validate(&Timeline::standard()).is_err());

        config.frame_rate = f64::NAN;
        assert!(config.validate(&Timeline::standard()).is_err());
    }

    #[test]
    fn test_validation_rejects_recut_video() {
        let mut config = ExhibitConfig::default();
        config.media.video_duration = Duration::from_secs(120);

        let err = config.validate(&Timeline::standard()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("authored for 95s"));
    }

    #[test]
    fn test_component_configs_follow_settings() {
        let mut config = ExhibitConfig::default();
        config.sensors.entrance_poll = Duration::from_millis(20);
        config.display.width = 1920;

        assert_eq!(
            config.controller_config().entrance_poll,
            Duration::from_millis(20)
        );
        assert_eq!(config.headless_config().blank_size, (1920, 720));
        assert_eq!(config.headless_config().frame_count(), 95 * 24);
        assert_eq!(config.playback_config().frame_rate, 24.0);
    }
}
