//! Schedule value types.

use core::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::ConfigError;
use crate::state::TargetState;

/// Maximum number of time windows per actuator (stack-allocated).
pub const MAX_SCHEDULES: usize = 8;

/// Fixed-capacity schedule list owned by a [`TimeBasedScheduler`](super::TimeBasedScheduler).
pub type ScheduleList = heapless::Vec<TimeWindowSchedule, MAX_SCHEDULES>;

/// A recurring open window.
///
/// Covers the half-open intervals `[start + k·period, start + k·period + window)`
/// for every `k ≥ 0`.  Nothing exists before `start`.  A `window` longer than
/// `period` means "always open once started".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindowSchedule {
    start: DateTime<Utc>,
    period: Duration,
    window: Duration,
}

impl TimeWindowSchedule {
    /// Rejects a zero `period`.
    pub fn new(
        start: DateTime<Utc>,
        period: Duration,
        window: Duration,
    ) -> Result<Self, ConfigError> {
        if period.is_zero() {
            return Err(ConfigError::NonPositivePeriod);
        }
        Ok(Self {
            start,
            period,
            window,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Position of `now` inside the current period, or `None` if the
    /// schedule has not started yet.
    pub fn period_position(&self, now: DateTime<Utc>) -> Option<Duration> {
        let elapsed = (now - self.start).to_std().ok()?;
        let position = elapsed.as_nanos() % self.period.as_nanos();
        // `position < period`, which always fits in u64 nanoseconds.
        Some(Duration::from_nanos(position as u64))
    }
}

/// Force `state` until `until`, then hand control back to the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideWindow {
    pub state: TargetState,
    pub until: DateTime<Utc>,
}

impl OverrideWindow {
    pub fn new(state: TargetState, until: DateTime<Utc>) -> Self {
        Self { state, until }
    }

    /// Time left at `now`; `None` once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.until - now).to_std().ok().filter(|d| !d.is_zero())
    }
}
