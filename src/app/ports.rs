//! Port traits — the hexagonal boundary between the scheduling core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TransitionLoop (domain)
//! ```
//!
//! Driven adapters (actuators, telemetry, clocks, configuration channels)
//! implement these traits.  The [`TransitionLoop`](crate::transition::TransitionLoop)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use core::time::Duration;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::app::telemetry::ValveTelemetry;
use crate::state::{ActuatorState, TargetState};

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// A binary actuator (valve, door) that can be driven to a target state.
pub trait Actuator {
    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Drive towards `target`.
    ///
    /// `None` holds the current state, except that an actuator whose state
    /// is still [`ActuatorState::Unknown`] closes.  Returns whether a
    /// physical state change happened.  Never fails: a driver that could
    /// not move reports `false` and raises its own fault telemetry.
    fn transition_to(&mut self, target: Option<TargetState>) -> bool;

    /// Current state as reported by the actuator.
    fn state(&self) -> ActuatorState;
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → MQTT / BLE / log)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget request for a telemetry publish.
///
/// The caller neither waits for nor verifies publication.
pub trait TelemetryPublisher {
    fn request_telemetry_publishing(&self);

    /// Hand over the document the next publish should send.  Called right
    /// before each request; publishers that read state elsewhere ignore it.
    fn stage_report(&self, _report: ValveTelemetry) {}
}

impl<T: TelemetryPublisher + ?Sized> TelemetryPublisher for &T {
    fn request_telemetry_publishing(&self) {
        (**self).request_telemetry_publishing();
    }

    fn stage_report(&self, report: ValveTelemetry) {
        (**self).stage_report(report);
    }
}

impl<T: TelemetryPublisher + ?Sized> TelemetryPublisher for Arc<T> {
    fn request_telemetry_publishing(&self) {
        (**self).request_telemetry_publishing();
    }

    fn stage_report(&self, report: ValveTelemetry) {
        (**self).stage_report(report);
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Source of "now" for schedule evaluation.
///
/// Implementations must be monotonic while staying correlated with wall
/// time, since schedules are anchored at wall-clock start times.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Whether `now` reflects real wall time.  While it does not, the loop
    /// re-evaluates at `LoopConfig::unsynced_retry_ms` instead of trusting
    /// schedule deadlines.
    fn is_synced(&self) -> bool {
        true
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn is_synced(&self) -> bool {
        (**self).is_synced()
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: config layer → domain)
// ───────────────────────────────────────────────────────────────

/// Bounded source of configuration updates.
pub trait ConfigSource {
    type Item;

    /// Wait up to `timeout` for an update.  Returns `None` on timeout.
    ///
    /// Must never block longer than `timeout`.
    fn poll_in(&mut self, timeout: Duration) -> Option<Self::Item>;
}
