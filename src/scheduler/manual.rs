//! Expiring manual override.

use chrono::{DateTime, Utc};
use log::info;

use super::model::OverrideWindow;
use super::{ScheduleResult, Scheduler};
use crate::state::TargetState;

/// Holds at most one [`OverrideWindow`].
///
/// While the window has time left, `tick` reports its state with the
/// remaining time as the deadline.  Once it has run out the override is
/// dropped and `tick` has no opinion.
#[derive(Debug, Default)]
pub struct OverrideScheduler {
    window: Option<OverrideWindow>,
}

impl OverrideScheduler {
    pub fn new() -> Self {
        Self { window: None }
    }

    /// Install or replace the override.
    pub fn set_override(&mut self, state: TargetState, until: DateTime<Utc>) {
        self.set(Some(OverrideWindow::new(state, until)));
    }

    /// Install, replace (`Some`) or clear (`None`) the override.
    pub fn set(&mut self, window: Option<OverrideWindow>) {
        match window {
            Some(w) => info!("Override: {} until {}", w.state, w.until.format("%FT%TZ")),
            None if self.window.is_some() => info!("Override: cleared"),
            None => {}
        }
        self.window = window;
    }

    pub fn clear(&mut self) {
        self.set(None);
    }

    /// The override in effect at `now`, if any.
    pub fn active(&self, now: DateTime<Utc>) -> Option<OverrideWindow> {
        self.window.filter(|w| w.remaining(now).is_some())
    }
}

impl Scheduler for OverrideScheduler {
    fn name(&self) -> &'static str {
        "override"
    }

    fn tick(&mut self, now: DateTime<Utc>) -> ScheduleResult {
        let Some(window) = self.window else {
            return ScheduleResult::undecided();
        };
        match window.remaining(now) {
            Some(remaining) => ScheduleResult::decided(window.state, remaining),
            None => {
                info!("Override: {} expired", window.state);
                self.window = None;
                ScheduleResult::undecided()
            }
        }
    }

    fn active_override(&self, now: DateTime<Utc>) -> Option<OverrideWindow> {
        self.active(now)
    }
}
