//! FieldGate firmware library.
//!
//! Scheduling and actuation core for battery-powered irrigation/poultry
//! field devices.  Exposes the pure-logic modules for integration testing;
//! all ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod scheduler;
pub mod state;
pub mod transition;

#[cfg(all(target_os = "espidf", feature = "espidf"))]
mod time_driver;
