//! Debouncing wrapper around another scheduler.
//!
//! ```text
//!  inner:     C C C O O O O O O O O C C O O O
//!  committed: C C C C C C C O O O O O O O O O     (delay_open = 4 ticks)
//!                   └─ pending ─┘        └ reset: inner changed its mind
//! ```

use core::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;

use super::model::OverrideWindow;
use super::{ScheduleResult, Scheduler, min_deadline};
use crate::state::TargetState;

/// How long the inner policy must keep asking for a state before it is
/// committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DelaySchedule {
    pub delay_open: Duration,
    pub delay_close: Duration,
}

impl DelaySchedule {
    fn delay_for(&self, state: TargetState) -> Duration {
        match state {
            TargetState::Open => self.delay_open,
            TargetState::Closed => self.delay_close,
        }
    }
}

pub struct DelayScheduler<S> {
    inner: S,
    delays: DelaySchedule,
    committed: Option<TargetState>,
    /// State the inner policy wants, and since when.
    pending: Option<(TargetState, DateTime<Utc>)>,
}

impl<S: Scheduler> DelayScheduler<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            delays: DelaySchedule::default(),
            committed: None,
            pending: None,
        }
    }

    pub fn set_delays(&mut self, delays: DelaySchedule) {
        self.delays = delays;
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: Scheduler> Scheduler for DelayScheduler<S> {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn tick(&mut self, now: DateTime<Utc>) -> ScheduleResult {
        let inner = self.inner.tick(now);

        let Some(desired) = inner.target_state else {
            self.pending = None;
            return ScheduleResult {
                target_state: self.committed,
                ..inner
            };
        };

        let Some(committed) = self.committed else {
            debug!("Delay: initial commit to {}", desired);
            self.committed = Some(desired);
            self.pending = None;
            return inner.with_telemetry(true);
        };

        if desired == committed {
            self.pending = None;
            return inner;
        }

        let since = match self.pending {
            Some((state, since)) if state == desired => since,
            _ => {
                debug!("Delay: {} requested, waiting", desired);
                self.pending = Some((desired, now));
                now
            }
        };

        let delay = self.delays.delay_for(desired);
        let elapsed = (now - since).to_std().unwrap_or_default();
        if elapsed >= delay {
            debug!("Delay: committing to {} after {:?}", desired, elapsed);
            self.committed = Some(desired);
            self.pending = None;
            return inner.with_telemetry(true);
        }

        ScheduleResult {
            target_state: Some(committed),
            next_deadline: min_deadline(inner.next_deadline, Some(delay - elapsed)),
            should_publish_telemetry: false,
        }
    }

    fn active_override(&self, now: DateTime<Utc>) -> Option<OverrideWindow> {
        self.inner.active_override(now)
    }
}
