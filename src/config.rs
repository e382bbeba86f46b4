//! Configuration payloads and loop tuning.
//!
//! Schedule and override configuration arrives as JSON from the
//! configuration layer (NVS, MQTT, BLE provisioning).  It is parsed in two
//! stages: serde decodes the raw wire shape, then [`ScheduleConfig`]
//! validates it into the scheduler's value types.  Anything malformed is
//! rejected here, so the schedulers never see a non-positive period or a
//! negative duration.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "schedule": [ { "start": "2024-05-01T06:00:00Z", "period": 86400, "duration": 900 } ],
//!   "override": { "state": 1, "start": "2024-05-01T12:00:00Z", "duration": 3600 }
//! }
//! ```

use core::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scheduler::{OverrideWindow, ScheduleList, TimeWindowSchedule};
use crate::state::TargetState;

/// Timestamp format used on the wire (ISO-8601, UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Override duration applied when a command does not carry one.
pub const DEFAULT_OVERRIDE_DURATION: Duration = Duration::from_secs(3600);

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse a wire timestamp.  Falls back to full RFC 3339 (fractional
/// seconds, offsets) for payloads produced by other tooling.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ConfigError::InvalidTimestamp(raw.into()))
}

pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

fn seconds(raw: i64) -> Result<Duration, ConfigError> {
    u64::try_from(raw)
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::NegativeDuration)
}

fn target_state(raw: i64) -> Result<TargetState, ConfigError> {
    i8::try_from(raw)
        .ok()
        .and_then(TargetState::from_i8)
        .ok_or(ConfigError::InvalidState(raw))
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireWindow {
    start: String,
    period: i64,
    duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireOverride {
    state: i64,
    start: String,
    duration: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireConfig {
    #[serde(default)]
    schedule: Vec<WireWindow>,
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    override_: Option<WireOverride>,
}

// ---------------------------------------------------------------------------
// Validated schedule configuration
// ---------------------------------------------------------------------------

/// An override as configured: `state` from `start` for `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideSpec {
    pub state: TargetState,
    pub start: DateTime<Utc>,
    pub duration: Duration,
}

impl OverrideSpec {
    /// `start + duration`, saturating at the far future.
    pub fn until(&self) -> DateTime<Utc> {
        TimeDelta::from_std(self.duration)
            .ok()
            .and_then(|d| self.start.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// One configuration snapshot for a single actuator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub schedules: ScheduleList,
    pub override_spec: Option<OverrideSpec>,
}

impl ScheduleConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let wire: WireConfig = serde_json::from_str(json)?;
        Self::validate(wire)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&WireConfig::from(self))?)
    }

    /// The override as the scheduler consumes it.
    pub fn override_window(&self) -> Option<OverrideWindow> {
        self.override_spec
            .map(|o| OverrideWindow::new(o.state, o.until()))
    }

    fn validate(wire: WireConfig) -> Result<Self, ConfigError> {
        let mut schedules = ScheduleList::new();
        for w in &wire.schedule {
            if w.period <= 0 {
                return Err(ConfigError::NonPositivePeriod);
            }
            let window = TimeWindowSchedule::new(
                parse_timestamp(&w.start)?,
                seconds(w.period)?,
                seconds(w.duration)?,
            )?;
            schedules
                .push(window)
                .map_err(|_| ConfigError::TooManySchedules)?;
        }

        let override_spec = wire
            .override_
            .map(|o| {
                Ok::<_, ConfigError>(OverrideSpec {
                    state: target_state(o.state)?,
                    start: parse_timestamp(&o.start)?,
                    duration: seconds(o.duration)?,
                })
            })
            .transpose()?;

        Ok(Self {
            schedules,
            override_spec,
        })
    }
}

impl From<&ScheduleConfig> for WireConfig {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            schedule: config
                .schedules
                .iter()
                .map(|s| WireWindow {
                    start: format_timestamp(s.start()),
                    period: s.period().as_secs() as i64,
                    duration: s.window().as_secs() as i64,
                })
                .collect(),
            override_: config.override_spec.map(|o| WireOverride {
                state: i64::from(o.state.as_i8()),
                start: format_timestamp(o.start),
                duration: o.duration.as_secs() as i64,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Override commands
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireCommand {
    state: i64,
    #[serde(default)]
    duration: Option<i64>,
}

/// A manual override request relative to the moment it is received.
///
/// `{"state": 1, "duration": 600}` opens for ten minutes, `{"state": 0}`
/// clears any override.  Without `duration` the override lasts
/// [`DEFAULT_OVERRIDE_DURATION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideCommand {
    Set { state: TargetState, duration: Duration },
    Clear,
}

impl OverrideCommand {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let wire: WireCommand = serde_json::from_str(json)?;
        if wire.state == 0 {
            return Ok(Self::Clear);
        }
        let state = target_state(wire.state)?;
        let duration = match wire.duration {
            Some(raw) => seconds(raw)?,
            None => DEFAULT_OVERRIDE_DURATION,
        };
        Ok(Self::Set { state, duration })
    }

    /// Resolve against `now` into the override a [`ScheduleConfig`] carries.
    pub fn resolve(self, now: DateTime<Utc>) -> Option<OverrideSpec> {
        match self {
            Self::Set { state, duration } => Some(OverrideSpec {
                state,
                start: now,
                duration,
            }),
            Self::Clear => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transition loop tuning
// ---------------------------------------------------------------------------

/// Tuning for one [`TransitionLoop`](crate::transition::TransitionLoop).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Upper bound on a single wait (milliseconds).  The loop never sleeps
    /// longer than this even if the scheduler reports a later deadline.
    pub max_wait_ms: u32,
    /// Publish telemetry after the first tick even if nothing changed.
    pub initial_telemetry: bool,
    /// Re-evaluation interval (milliseconds) while the clock has no valid
    /// wall time yet.
    pub unsynced_retry_ms: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: u32::MAX, // ~49.7 days
            initial_telemetry: true,
            unsynced_retry_ms: 10_000,
        }
    }
}

impl LoopConfig {
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(u64::from(self.max_wait_ms))
    }

    pub fn unsynced_retry(&self) -> Duration {
        Duration::from_millis(u64::from(self.unsynced_retry_ms))
    }
}
