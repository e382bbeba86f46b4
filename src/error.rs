//! Unified error types for the FieldGate firmware.
//!
//! The scheduling core is infallible by construction: a policy with no
//! decision returns an empty result, and actuators report failure as "no
//! transition happened".  Errors therefore only arise at the edges: parsing
//! configuration payloads and talking to actuator hardware.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A configuration payload was rejected.
    Config(ConfigError),
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Reasons a schedule/override payload is rejected at the parsing boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Payload is not valid JSON or does not have the expected shape.
    Malformed(String),
    /// A schedule window has `period <= 0`.
    NonPositivePeriod,
    /// A duration field is negative.
    NegativeDuration,
    /// A timestamp is not `YYYY-MM-DDTHH:MM:SSZ`.
    InvalidTimestamp(String),
    /// Override state is not one of -1, 0 (clear, commands only) or 1.
    InvalidState(i64),
    /// More schedule windows than the fixed capacity allows.
    TooManySchedules,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed payload: {msg}"),
            Self::NonPositivePeriod => write!(f, "schedule period must be positive"),
            Self::NegativeDuration => write!(f, "duration must not be negative"),
            Self::InvalidTimestamp(raw) => write!(f, "invalid timestamp '{raw}'"),
            Self::InvalidState(raw) => write!(f, "invalid override state {raw}"),
            Self::TooManySchedules => write!(f, "too many schedules"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
