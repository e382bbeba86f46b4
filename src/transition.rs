//! Scheduled-transition control loop.
//!
//! One loop per actuator, on its own thread.  Each iteration ticks the
//! scheduler, drives the actuator, requests telemetry if anything changed,
//! and then sleeps in a single bounded wait that ends at the scheduler's
//! deadline *or* as soon as a configuration update arrives.
//!
//! ```text
//!        ┌────────────────────────────────────────────────────────────┐
//!        ▼                                                            │
//!   tick(now) ──▶ target ∨ Closed ──▶ transition_to ──▶ telemetry?    │
//!                                                          │          │
//!                                     poll_in(deadline) ◀──┘          │
//!                                      ├─ timeout ────────────────────┤
//!                                      └─ config ─▶ on_config ────────┘
//! ```
//!
//! With no opinion from any policy the actuator is driven Closed.  While the
//! clock has no valid wall time the wait is capped at
//! [`LoopConfig::unsynced_retry`], so schedules take effect soon after SNTP
//! syncs instead of after the full `max_wait`.

use core::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::app::ports::{Actuator, Clock, ConfigSource, TelemetryPublisher};
use crate::app::telemetry::ValveTelemetry;
use crate::config::LoopConfig;
use crate::scheduler::Scheduler;
use crate::state::TargetState;

/// What one iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub target: TargetState,
    pub transitioned: bool,
    /// The wait ceiling used for this iteration.
    pub deadline: Duration,
    /// Whether the wait ended with a configuration update.
    pub reconfigured: bool,
}

/// Bound a scheduler deadline by `max_wait`.  An absent deadline means
/// "nothing scheduled", which waits the full `max_wait`.
pub fn clamp_deadline(next: Option<Duration>, max_wait: Duration) -> Duration {
    next.map_or(max_wait, |d| d.min(max_wait))
}

pub struct TransitionLoop<A, S, T, C, Q, H> {
    actuator: A,
    scheduler: S,
    telemetry: T,
    clock: C,
    configs: Q,
    on_config: H,
    settings: LoopConfig,
    needs_telemetry: bool,
}

impl<A, S, T, C, Q, H> TransitionLoop<A, S, T, C, Q, H>
where
    A: Actuator,
    S: Scheduler,
    T: TelemetryPublisher,
    C: Clock,
    Q: ConfigSource,
    H: FnMut(&mut S, Q::Item),
{
    /// `on_config` applies one configuration update to the scheduler.
    pub fn new(
        actuator: A,
        scheduler: S,
        telemetry: T,
        clock: C,
        configs: Q,
        on_config: H,
        settings: LoopConfig,
    ) -> Self {
        let needs_telemetry = settings.initial_telemetry;
        Self {
            actuator,
            scheduler,
            telemetry,
            clock,
            configs,
            on_config,
            settings,
            needs_telemetry,
        }
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Evaluate, actuate, then wait for the deadline or a config update.
    pub fn step(&mut self) -> Step {
        let now = self.clock.now();
        let result = self.scheduler.tick(now);
        self.needs_telemetry |= result.should_publish_telemetry;

        let mut deadline = clamp_deadline(result.next_deadline, self.settings.max_wait());
        if !self.clock.is_synced() {
            debug!("{}: wall clock not synced yet", self.actuator.name());
            deadline = deadline.min(self.settings.unsynced_retry());
        }
        let target = result.target_state.unwrap_or(TargetState::Closed);
        let transitioned = self.actuator.transition_to(Some(target));

        if transitioned {
            info!(
                "{}: {} via {}, next evaluation in {}s",
                self.actuator.name(),
                target,
                self.scheduler.name(),
                deadline.as_secs()
            );
        } else {
            debug!(
                "{}: staying {} via {}, next evaluation in {}s",
                self.actuator.name(),
                target,
                self.scheduler.name(),
                deadline.as_secs()
            );
        }

        self.needs_telemetry |= transitioned;
        if self.needs_telemetry {
            self.telemetry.stage_report(self.report_at(now));
            self.telemetry.request_telemetry_publishing();
            self.needs_telemetry = false;
        }

        let reconfigured = match self.configs.poll_in(deadline) {
            Some(config) => {
                info!("{}: applying configuration update", self.actuator.name());
                (self.on_config)(&mut self.scheduler, config);
                self.needs_telemetry = true;
                true
            }
            None => false,
        };

        Step {
            target,
            transitioned,
            deadline,
            reconfigured,
        }
    }

    /// Run for the lifetime of the actuator.
    pub fn run(mut self) -> ! {
        info!("{}: transition loop started", self.actuator.name());
        loop {
            self.step();
        }
    }

    /// Current telemetry document for this actuator.
    pub fn report(&self) -> ValveTelemetry {
        self.report_at(self.clock.now())
    }

    fn report_at(&self, now: DateTime<Utc>) -> ValveTelemetry {
        ValveTelemetry::new(self.actuator.state(), self.scheduler.active_override(now))
    }
}
