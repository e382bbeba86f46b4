//! Telemetry request signal.
//!
//! The transition loop only *requests* a publish.  Requests coalesce in a
//! [`TelemetrySignal`] together with the latest staged [`ValveTelemetry`];
//! the publisher task (MQTT, BLE notify, or just the log) drains it and
//! sends one document per burst of requests.

use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;

use crate::app::ports::TelemetryPublisher;
use crate::app::telemetry::ValveTelemetry;

/// Coalescing "please publish" flag plus the document to publish.
pub struct TelemetrySignal {
    requested: Signal<CriticalSectionRawMutex, ()>,
    report: Signal<CriticalSectionRawMutex, ValveTelemetry>,
}

impl Default for TelemetrySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySignal {
    pub const fn new() -> Self {
        Self {
            requested: Signal::new(),
            report: Signal::new(),
        }
    }

    pub fn request(&self) {
        self.requested.signal(());
    }

    /// Consume a pending request, if any.
    pub fn try_take(&self) -> bool {
        self.requested.try_take().is_some()
    }

    /// Take the most recently staged document, if any.
    pub fn take_report(&self) -> Option<ValveTelemetry> {
        self.report.try_take()
    }

    /// Block until a request is pending or `timeout` elapses.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        if self.try_take() {
            return true;
        }
        future::block_on(future::or(
            async {
                self.requested.wait().await;
                true
            },
            async {
                async_io_mini::Timer::after(timeout).await;
                false
            },
        ))
    }
}

impl TelemetryPublisher for TelemetrySignal {
    fn request_telemetry_publishing(&self) {
        self.request();
    }

    fn stage_report(&self, report: ValveTelemetry) {
        self.report.signal(report);
    }
}
