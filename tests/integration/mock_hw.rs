//! Mock hardware and plumbing for integration tests.
//!
//! Records every actuator call and telemetry request so tests can assert
//! on the full history without touching GPIO, and drives time explicitly
//! so waits complete instantly.

use core::cell::{Cell, RefCell};
use core::time::Duration;
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use fieldgate::app::ports::{Actuator, Clock, ConfigSource, TelemetryPublisher};
use fieldgate::app::telemetry::ValveTelemetry;
use fieldgate::state::{ActuatorState, TargetState};

/// 2024-05-01T06:00:00Z, the reference instant of most tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()
}

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

// ── MockActuator ──────────────────────────────────────────────

pub struct MockActuator {
    pub calls: Vec<Option<TargetState>>,
    pub state: ActuatorState,
}

#[allow(dead_code)]
impl MockActuator {
    pub fn new() -> Self {
        Self::with_state(ActuatorState::Unknown)
    }

    pub fn with_state(state: ActuatorState) -> Self {
        Self {
            calls: Vec::new(),
            state,
        }
    }
}

impl Actuator for MockActuator {
    fn name(&self) -> &str {
        "mock-valve"
    }

    fn transition_to(&mut self, target: Option<TargetState>) -> bool {
        self.calls.push(target);
        let target = match (target, self.state) {
            (Some(t), _) => t,
            (None, ActuatorState::Unknown) => TargetState::Closed,
            (None, _) => return false,
        };
        if self.state.is(target) {
            return false;
        }
        self.state = target.into();
        true
    }

    fn state(&self) -> ActuatorState {
        self.state
    }
}

// ── RecordingTelemetry ────────────────────────────────────────

#[derive(Default)]
pub struct RecordingTelemetry {
    requests: Cell<u32>,
    reports: RefCell<Vec<ValveTelemetry>>,
}

#[allow(dead_code)]
impl RecordingTelemetry {
    pub fn count(&self) -> u32 {
        self.requests.get()
    }

    pub fn last_report(&self) -> Option<ValveTelemetry> {
        self.reports.borrow().last().cloned()
    }
}

impl TelemetryPublisher for RecordingTelemetry {
    fn request_telemetry_publishing(&self) {
        self.requests.set(self.requests.get() + 1);
    }

    fn stage_report(&self, report: ValveTelemetry) {
        self.reports.borrow_mut().push(report);
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Shared, manually advanced clock.  Clones observe the same time.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
    synced: Rc<Cell<bool>>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
            synced: Rc::new(Cell::new(true)),
        }
    }

    pub fn set_synced(&self, synced: bool) {
        self.synced.set(synced);
    }

    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).unwrap();
        self.now.set(self.now.get() + delta);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn is_synced(&self) -> bool {
        self.synced.get()
    }
}

// ── ScriptedConfigSource ──────────────────────────────────────

/// An update that arrives `after` into the next wait.
pub struct Delivery<C> {
    pub after: Duration,
    pub config: C,
}

/// Config source that plays back a script instead of blocking.
///
/// Each `poll_in` records its timeout.  If the next scripted delivery
/// arrives within the timeout, the clock advances to the arrival and the
/// update is returned; otherwise the clock advances by the full timeout.
/// A frozen source never advances the clock.
pub struct ScriptedConfigSource<C> {
    clock: Option<ManualClock>,
    script: VecDeque<Delivery<C>>,
    pub waits: Vec<Duration>,
}

#[allow(dead_code)]
impl<C> ScriptedConfigSource<C> {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock: Some(clock),
            script: VecDeque::new(),
            waits: Vec::new(),
        }
    }

    pub fn frozen() -> Self {
        Self {
            clock: None,
            script: VecDeque::new(),
            waits: Vec::new(),
        }
    }

    pub fn deliver(mut self, after: Duration, config: C) -> Self {
        self.script.push_back(Delivery { after, config });
        self
    }

    fn advance(&self, by: Duration) {
        if let Some(clock) = &self.clock {
            clock.advance(by);
        }
    }
}

impl<C> ConfigSource for ScriptedConfigSource<C> {
    type Item = C;

    fn poll_in(&mut self, timeout: Duration) -> Option<C> {
        self.waits.push(timeout);
        match self.script.front() {
            Some(next) if next.after <= timeout => {
                let after = next.after;
                self.advance(after);
                self.script.pop_front().map(|d| d.config)
            }
            _ => {
                self.advance(timeout);
                None
            }
        }
    }
}
