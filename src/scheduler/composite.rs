//! Override-first composition of the two schedule policies.

use chrono::{DateTime, Utc};

use super::manual::OverrideScheduler;
use super::model::{OverrideWindow, ScheduleList};
use super::time_based::TimeBasedScheduler;
use super::{ScheduleResult, Scheduler};
use crate::config::ScheduleConfig;
use crate::state::TargetState;

/// An active override wins unconditionally; otherwise the time windows
/// decide.  Deadlines are not merged: whichever policy answered owns the
/// deadline for this tick.
///
/// Telemetry is edge-triggered on the override as well: the first tick of
/// an override (or of a changed override state) and the first tick after
/// it ends ask for a publish, steady ticks do not.
#[derive(Default)]
pub struct PriorityScheduler {
    manual: OverrideScheduler,
    time: TimeBasedScheduler,
    /// Override state reported on the previous tick.
    last_override: Option<TargetState>,
}

impl PriorityScheduler {
    pub fn new(manual: OverrideScheduler, time: TimeBasedScheduler) -> Self {
        Self {
            manual,
            time,
            last_override: None,
        }
    }

    pub fn set_schedules(&mut self, schedules: ScheduleList) {
        self.time.set_schedules(schedules);
    }

    pub fn set_override(&mut self, window: Option<OverrideWindow>) {
        self.manual.set(window);
    }

    /// Apply a configuration snapshot to both policies.
    pub fn apply(&mut self, config: ScheduleConfig) {
        let override_window = config.override_window();
        self.time.set_schedules(config.schedules);
        self.manual.set(override_window);
    }
}

impl Scheduler for PriorityScheduler {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn tick(&mut self, now: DateTime<Utc>) -> ScheduleResult {
        let overridden = self.manual.tick(now);
        if overridden.target_state.is_some() {
            let changed = overridden.target_state != self.last_override;
            self.last_override = overridden.target_state;
            return overridden.with_telemetry(overridden.should_publish_telemetry || changed);
        }

        let ended = self.last_override.take().is_some();
        let scheduled = self.time.tick(now);
        scheduled.with_telemetry(scheduled.should_publish_telemetry || ended)
    }

    fn active_override(&self, now: DateTime<Utc>) -> Option<OverrideWindow> {
        self.manual.active(now)
    }
}
