//! Periodic time-window scheduler.
//!
//! Conflicts between windows are settled with a fixed set of rules:
//!
//! - Open beats Closed, whatever the list order.
//! - Among Open windows, the one closing **latest** wins, so the valve is
//!   not shut early just because a shorter window ended.
//! - Among Closed windows, the one opening **soonest** wins, so the loop
//!   wakes up no later than necessary.
//! - Equal scores go to the window that comes later in the list.
//!
//! Windows that have not started yet are ignored entirely.

use core::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, trace};

use super::model::{ScheduleList, TimeWindowSchedule};
use super::{ScheduleResult, Scheduler};
use crate::state::TargetState;

/// The running winner of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub state: TargetState,
    /// `Duration::MAX` until some window has an opinion.
    pub transition_after: Duration,
    /// Index of the window that produced the winning opinion.
    pub winner: Option<usize>,
}

impl Evaluation {
    /// Convert to the policy contract: no winner means no opinion.
    pub fn into_result(self) -> ScheduleResult {
        match self.winner {
            Some(_) => ScheduleResult::decided(self.state, self.transition_after),
            None => ScheduleResult::undecided(),
        }
    }
}

/// Evaluate `schedules` at `now`, starting from `default_state`.
pub fn evaluate(
    schedules: &[TimeWindowSchedule],
    now: DateTime<Utc>,
    default_state: TargetState,
) -> Evaluation {
    let mut best = Evaluation {
        state: default_state,
        transition_after: Duration::MAX,
        winner: None,
    };

    for (index, schedule) in schedules.iter().enumerate() {
        let Some(position) = schedule.period_position(now) else {
            trace!("Schedule #{}: not started yet", index);
            continue;
        };

        if position < schedule.window() {
            let close_after = schedule.window() - position;
            trace!("Schedule #{}: open, closes after {:?}", index, close_after);
            if best.state == TargetState::Open && close_after < best.transition_after {
                continue;
            }
            best = Evaluation {
                state: TargetState::Open,
                transition_after: close_after,
                winner: Some(index),
            };
        } else {
            let open_after = schedule.period() - position;
            trace!("Schedule #{}: closed, opens after {:?}", index, open_after);
            if best.state == TargetState::Open || open_after > best.transition_after {
                continue;
            }
            best = Evaluation {
                state: TargetState::Closed,
                transition_after: open_after,
                winner: Some(index),
            };
        }
    }

    best
}

/// Scheduler over a replaceable set of [`TimeWindowSchedule`]s.
pub struct TimeBasedScheduler {
    schedules: ScheduleList,
    default_state: TargetState,
    /// Target returned by the previous tick, for edge-triggered telemetry.
    last_target: Option<TargetState>,
}

impl Default for TimeBasedScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeBasedScheduler {
    pub fn new() -> Self {
        Self::with_default_state(TargetState::Closed)
    }

    /// Seed the evaluation with `default_state` instead of Closed.
    ///
    /// With `Open`, every window loses against the unbounded default, so
    /// such a scheduler never forms an opinion of its own.
    pub fn with_default_state(default_state: TargetState) -> Self {
        Self {
            schedules: ScheduleList::new(),
            default_state,
            last_target: None,
        }
    }

    /// Replace the active set (no merging).
    pub fn set_schedules(&mut self, schedules: ScheduleList) {
        info!("Time scheduler: {} schedule(s) set", schedules.len());
        self.schedules = schedules;
    }

    pub fn schedules(&self) -> &[TimeWindowSchedule] {
        &self.schedules
    }
}

impl Scheduler for TimeBasedScheduler {
    fn name(&self) -> &'static str {
        "time"
    }

    fn tick(&mut self, now: DateTime<Utc>) -> ScheduleResult {
        let result = evaluate(&self.schedules, now, self.default_state).into_result();
        let changed = result.target_state != self.last_target;
        self.last_target = result.target_state;
        result.with_telemetry(changed)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
