//! Actuator drivers and task helpers.

pub mod task;
pub mod valve;
