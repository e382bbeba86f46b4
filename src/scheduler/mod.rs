//! Scheduling policies for binary actuators.
//!
//! Every policy answers the same question on each tick: which state should
//! the actuator be in right now, and when could that answer change?
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │                    PriorityScheduler                         │
//!  │                                                              │
//!  │  ┌───────────────────┐   present?   ┌─────────────────────┐  │
//!  │  │ OverrideScheduler │──── yes ────▶│ result (verbatim)   │  │
//!  │  └─────────┬─────────┘              └─────────────────────┘  │
//!  │            │ no                                              │
//!  │            ▼                                                 │
//!  │  ┌───────────────────┐              ┌─────────────────────┐  │
//!  │  │TimeBasedScheduler │─────────────▶│ result              │  │
//!  │  └───────────────────┘              └─────────────────────┘  │
//!  └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//!                  TransitionLoop (absent target ⇒ Closed)
//! ```
//!
//! Policies hold no locks: their inputs are only ever mutated by the single
//! transition loop that owns them, in response to configuration updates.

pub mod composite;
pub mod delay;
pub mod manual;
pub mod model;
pub mod time_based;

use core::time::Duration;

use chrono::{DateTime, Utc};

use crate::state::TargetState;

pub use composite::PriorityScheduler;
pub use delay::{DelaySchedule, DelayScheduler};
pub use manual::OverrideScheduler;
pub use model::{MAX_SCHEDULES, OverrideWindow, ScheduleList, TimeWindowSchedule};
pub use time_based::TimeBasedScheduler;

/// The outcome of one [`Scheduler::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleResult {
    /// The state this policy wants now; `None` means "no opinion".
    pub target_state: Option<TargetState>,
    /// When this policy's opinion could next change; `None` means never.
    pub next_deadline: Option<Duration>,
    /// Whether this tick's decision is worth a telemetry update.
    pub should_publish_telemetry: bool,
}

impl ScheduleResult {
    /// No opinion, no deadline.
    pub const fn undecided() -> Self {
        Self {
            target_state: None,
            next_deadline: None,
            should_publish_telemetry: false,
        }
    }

    /// A decision valid for `valid_for`.
    pub const fn decided(state: TargetState, valid_for: Duration) -> Self {
        Self {
            target_state: Some(state),
            next_deadline: Some(valid_for),
            should_publish_telemetry: false,
        }
    }

    /// Same result with the telemetry flag set to `publish`.
    #[must_use]
    pub const fn with_telemetry(mut self, publish: bool) -> Self {
        self.should_publish_telemetry = publish;
        self
    }
}

/// A scheduling policy.
pub trait Scheduler {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Evaluate the policy at `now`.
    fn tick(&mut self, now: DateTime<Utc>) -> ScheduleResult;

    /// The manual override in effect at `now`, for telemetry.
    fn active_override(&self, _now: DateTime<Utc>) -> Option<OverrideWindow> {
        None
    }
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn tick(&mut self, now: DateTime<Utc>) -> ScheduleResult {
        (**self).tick(now)
    }

    fn active_override(&self, now: DateTime<Utc>) -> Option<OverrideWindow> {
        (**self).active_override(now)
    }
}

/// Earlier of two optional deadlines, where `None` means "never".
pub(crate) fn min_deadline(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
