//! Rover configuration parameters
//!
//! All tunable parameters for the obstacle-avoidance controller.
//! Values are fixed for the lifetime of the process: defaults below, or a
//! JSON override baked in at build time via `ROVER_CONFIG_JSON`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// HC-SR04 minimum recycle time between two ranging cycles.
pub const MIN_POLL_INTERVAL_MS: u32 = 60;

/// Which subset of the movement rules is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// Avoidance turns, stuck escalation to backing up, and recovery.
    Full,
    /// Avoidance turns only. The rover never backs up.
    Simple,
}

impl Preset {
    /// Whether turning/backing timeouts escalate.
    pub fn stuck_escalation(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Core rover configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverConfig {
    // --- Avoidance ---
    /// Obstacle distance (cm) at or below which forward motion stops.
    pub obstacle_threshold_cm: u16,
    /// Ticks a turn or back-up may last before it is escalated.
    pub stuck_timeout_ticks: u32,
    /// Active rule set.
    pub preset: Preset,

    // --- Motor duty (0-255) ---
    pub forward_duty: u8,
    pub turn_duty: u8,
    pub backward_duty: u8,

    // --- Ultrasonic ---
    /// Trigger pulse width (microseconds).
    pub trigger_pulse_us: u32,
    /// Echo wait before a ranging cycle is abandoned (milliseconds).
    pub echo_timeout_ms: u32,

    // --- Timing ---
    /// Polling loop interval (milliseconds).
    pub poll_interval_ms: u32,
    /// Telemetry report interval (control ticks).
    pub telemetry_interval_ticks: u32,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            obstacle_threshold_cm: 50,
            stuck_timeout_ticks: 30, // ~1.8 s at 60 ms
            preset: Preset::Full,

            forward_duty: 255,
            turn_duty: 150,
            backward_duty: 200,

            trigger_pulse_us: 10,
            echo_timeout_ms: 38, // HC-SR04 no-target pulse length

            poll_interval_ms: MIN_POLL_INTERVAL_MS,
            telemetry_interval_ticks: 50,
        }
    }
}

/// Errors from loading or validating a [`RoverConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The override could not be deserialised.
    Parse,
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "config override is not valid JSON"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl RoverConfig {
    /// Parse a JSON override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for this build: the `ROVER_CONFIG_JSON`
    /// override if one was set at compile time, defaults otherwise.
    pub fn load() -> Result<Self, ConfigError> {
        match option_env!("ROVER_CONFIG_JSON") {
            Some(json) => Self::from_json(json),
            None => Ok(Self::default()),
        }
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.obstacle_threshold_cm == 0 {
            return Err(ConfigError::ValidationFailed("obstacle_threshold_cm must be > 0"));
        }
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms below sensor recycle time",
            ));
        }
        if self.echo_timeout_ms == 0 || self.echo_timeout_ms >= self.poll_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "echo_timeout_ms must be non-zero and shorter than poll_interval_ms",
            ));
        }
        if self.trigger_pulse_us == 0 {
            return Err(ConfigError::ValidationFailed("trigger_pulse_us must be > 0"));
        }
        if self.forward_duty == 0 || self.turn_duty == 0 {
            return Err(ConfigError::ValidationFailed("forward/turn duty must be > 0"));
        }
        if self.preset.stuck_escalation() && self.backward_duty == 0 {
            return Err(ConfigError::ValidationFailed(
                "backward_duty must be > 0 when backing up is enabled",
            ));
        }
        if self.telemetry_interval_ticks == 0 {
            return Err(ConfigError::ValidationFailed("telemetry_interval_ticks must be > 0"));
        }
        Ok(())
    }

    /// Echo timeout in microseconds, the unit the capture logic works in.
    pub fn echo_timeout_us(&self) -> u32 {
        self.echo_timeout_ms.saturating_mul(1000)
    }
}
