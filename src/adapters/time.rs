//! Wall-clock time adapter.
//!
//! Schedules are anchored at wall-clock start times, but the control loop
//! must not jump when SNTP steps the system clock.  [`WallClock`] reads
//! wall time once, anchors it to a monotonic `Instant`, and from then on
//! advances only with the monotonic clock.
//!
//! An ESP32 boots at 1970 and only learns the date from SNTP.  An anchor
//! taken before [`EPOCH_2020`] counts as unsynced: every read re-checks the
//! system clock and re-anchors as soon as it reports a plausible date.
//!
//! - **`target_os = "espidf"`** — `Instant` is backed by `esp_timer`, wall
//!   time by `gettimeofday` (valid once SNTP has synced).
//! - **`not(target_os = "espidf")`** — the host clocks, for tests and
//!   simulation.

use core::cell::Cell;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use log::info;

use crate::app::ports::Clock;
use crate::config::format_timestamp;

/// 2020-01-01T00:00:00Z.  Earlier system time is treated as unsynced.
pub const EPOCH_2020: i64 = 1_577_836_800;

#[derive(Debug, Clone, Copy)]
struct Anchor {
    wall: DateTime<Utc>,
    instant: Instant,
}

impl Anchor {
    fn now(self) -> DateTime<Utc> {
        TimeDelta::from_std(self.instant.elapsed())
            .ok()
            .and_then(|elapsed| self.wall.checked_add_signed(elapsed))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn is_synced(self) -> bool {
        self.wall.timestamp() >= EPOCH_2020
    }
}

/// Monotonic clock that reports wall-clock time.
#[derive(Debug, Clone)]
pub struct WallClock {
    anchor: Cell<Anchor>,
    system: fn() -> DateTime<Utc>,
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock {
    /// Anchor at the current system time.
    pub fn new() -> Self {
        Self::with_source(Utc::now)
    }

    /// Anchor at `system()`, and re-read it while unsynced.
    pub fn with_source(system: fn() -> DateTime<Utc>) -> Self {
        Self {
            anchor: Cell::new(Anchor {
                wall: system(),
                instant: Instant::now(),
            }),
            system,
        }
    }

    /// Anchor `wall` to `instant`.  Falls back to the system time if `wall`
    /// is unsynced.
    pub fn anchored(wall: DateTime<Utc>, instant: Instant) -> Self {
        Self {
            anchor: Cell::new(Anchor { wall, instant }),
            system: Utc::now,
        }
    }

    /// Re-anchor after the system clock was corrected (e.g. SNTP sync).
    pub fn resync(&self, wall: DateTime<Utc>) {
        let drift = wall - self.anchor.get().now();
        info!(
            "Clock: anchored at {}, drift {}s",
            format_timestamp(wall),
            drift.num_seconds()
        );
        self.anchor.set(Anchor {
            wall,
            instant: Instant::now(),
        });
    }

    fn sync_from_system(&self) {
        let wall = (self.system)();
        if wall.timestamp() >= EPOCH_2020 {
            self.resync(wall);
        }
    }
}

impl Clock for WallClock {
    fn now(&self) -> DateTime<Utc> {
        if !self.anchor.get().is_synced() {
            self.sync_from_system();
        }
        self.anchor.get().now()
    }

    fn is_synced(&self) -> bool {
        self.anchor.get().is_synced()
    }
}
