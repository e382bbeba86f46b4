//! Core-pinned thread spawning for the per-actuator transition loops.
//!
//! ESP-IDF implements `std::thread` on top of FreeRTOS tasks.
//! `esp_pthread_set_cfg()` configures the *next* `pthread_create()` from
//! the calling thread, so configure-then-spawn must not interleave with
//! other thread creation on the same thread.

use std::thread::JoinHandle;

use crate::error::Error;

/// CPU core of the ESP32-S3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Protocol stacks (WiFi, BLE, lwIP).
    Pro = 0,
    /// Application logic.
    App = 1,
}

/// Placement and sizing of one task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// Must be nul-terminated (`"valve-0\0"`).
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

impl TaskSpec {
    /// Defaults for a transition loop: application core, low priority,
    /// enough stack for JSON handling.
    pub const fn transition_loop(name: &'static str) -> Self {
        Self {
            name,
            core: Core::App,
            priority: 5,
            stack_kb: 8,
        }
    }

    fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

#[cfg(target_os = "espidf")]
pub fn spawn(spec: TaskSpec, f: impl FnOnce() + Send + 'static) -> Result<JoinHandle<()>, Error> {
    // SAFETY: `cfg` outlives the call and `name` is a nul-terminated
    // 'static string.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = i32::from(spec.priority);
        cfg.stack_size = (spec.stack_kb * 1024) as i32;
        cfg.thread_name = spec.name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(Error::Init("esp_pthread_set_cfg failed"));
    }

    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        spec.display_name(),
        spec.core,
        spec.priority,
        spec.stack_kb
    );
    std::thread::Builder::new()
        .name(spec.display_name().into())
        .spawn(f)
        .map_err(|_| Error::Init("thread creation failed"))
}

/// Host fallback: no core pinning or priorities.
#[cfg(not(target_os = "espidf"))]
pub fn spawn(spec: TaskSpec, f: impl FnOnce() + Send + 'static) -> Result<JoinHandle<()>, Error> {
    log::info!(
        "Spawning '{}' (sim, stack={}KB)",
        spec.display_name(),
        spec.stack_kb
    );
    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
        .map_err(|_| Error::Init("thread creation failed"))
}
