//! Application boundary — the port traits the scheduling core is written
//! against, and the telemetry document it reports.  Everything behind these
//! traits (GPIO, timers, channels, telemetry transport) lives in
//! [`adapters`](crate::adapters) and [`drivers`](crate::drivers), keeping
//! the core testable without hardware.

pub mod ports;
pub mod telemetry;
