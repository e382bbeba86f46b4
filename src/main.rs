//! FieldGate Firmware — Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  main thread                                                     │
//! │    boot config ──offer──▶ CONFIG ──┐                             │
//! │    TELEMETRY ◀── wait/publish ──┐  │                             │
//! │                                 │  ▼                             │
//! │  ┌──────────────────────────────┴──────────────────────────────┐ │
//! │  │ valve-0 thread: TransitionLoop                              │ │
//! │  │   PriorityScheduler (override ▶ time windows) ─▶ PinValve   │ │
//! │  └─────────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::time::Duration;

use anyhow::Result;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::{info, warn};

use fieldgate::adapters::config_queue::ConfigQueue;
use fieldgate::adapters::telemetry::TelemetrySignal;
use fieldgate::adapters::time::WallClock;
use fieldgate::config::{LoopConfig, ScheduleConfig};
use fieldgate::drivers::task::{self, TaskSpec};
use fieldgate::drivers::valve::PinValve;
use fieldgate::scheduler::PriorityScheduler;
use fieldgate::transition::TransitionLoop;

/// Configuration channel for valve 0.
static CONFIG: ConfigQueue<ScheduleConfig> = ConfigQueue::new();

/// Telemetry requests and the latest report from the valve-0 loop.
static TELEMETRY: TelemetrySignal = TelemetrySignal::new();

/// Schedule baked in at build time, applied until the configuration layer
/// delivers one.
const BOOT_SCHEDULE: &str = match option_env!("FIELDGATE_SCHEDULE") {
    Some(json) => json,
    None => "{}",
};

fn main() -> Result<()> {
    // Required for ESP-IDF: link patches and initialise logger
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("FieldGate firmware v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let pin = PinDriver::output(peripherals.pins.gpio4)?;
    let valve = PinValve::new("valve-0", pin);

    match ScheduleConfig::from_json(BOOT_SCHEDULE) {
        Ok(config) => {
            info!("Boot schedule: {} window(s)", config.schedules.len());
            CONFIG.offer(config);
        }
        Err(e) => warn!("Boot schedule rejected: {}", e),
    }

    let transition = TransitionLoop::new(
        valve,
        PriorityScheduler::default(),
        &TELEMETRY,
        WallClock::new(),
        &CONFIG,
        |scheduler: &mut PriorityScheduler, config: ScheduleConfig| scheduler.apply(config),
        LoopConfig::default(),
    );
    task::spawn(TaskSpec::transition_loop("valve-0\0"), move || transition.run())?;

    loop {
        if !TELEMETRY.wait_for(Duration::from_secs(300)) {
            continue;
        }
        match TELEMETRY.take_report().map(|report| report.to_json()) {
            Some(Ok(json)) => info!("Telemetry: valve-0 {}", json),
            Some(Err(e)) => warn!("Telemetry: encoding failed: {}", e),
            None => warn!("Telemetry: publish requested without a report"),
        }
    }
}
