//! Single-slot configuration channel.
//!
//! Bridges the configuration layer (NVS load, MQTT/BLE writes) to one
//! transition loop.  Built on an `embassy-sync` [`Signal`], so it can live
//! in a `static` without heap allocation.
//!
//! ```text
//! ┌───────────────┐  offer(cfg)  ┌──────────────┐  wait_for(deadline)  ┌─────────────────┐
//! │ config layer  │─────────────▶│ ConfigQueue  │─────────────────────▶│ TransitionLoop  │
//! │ (any thread)  │  never blocks│  (1 slot)    │  config or timeout   │ (sole consumer) │
//! └───────────────┘              └──────────────┘                      └─────────────────┘
//! ```
//!
//! Back-pressure: at most one update is pending.  A newer offer replaces an
//! unread older one (latest wins), because only the most recent snapshot
//! describes the desired configuration.

use core::time::Duration;
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use log::debug;

use crate::app::ports::ConfigSource;

pub struct ConfigQueue<C> {
    slot: Signal<CriticalSectionRawMutex, C>,
}

impl<C: Send> Default for ConfigQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send> ConfigQueue<C> {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
        }
    }

    /// Publish an update.  Never blocks.  Returns `true` if an unread
    /// update was superseded.
    pub fn offer(&self, config: C) -> bool {
        let superseded = self.slot.signaled();
        if superseded {
            debug!("ConfigQueue: pending update superseded");
        }
        self.slot.signal(config);
        superseded
    }

    pub fn has_pending(&self) -> bool {
        self.slot.signaled()
    }

    /// Take the pending update without waiting.
    pub fn try_take(&self) -> Option<C> {
        self.slot.try_take()
    }

    /// Block the calling thread until an update arrives or `timeout`
    /// elapses, whichever comes first.
    pub fn wait_for(&self, timeout: Duration) -> Option<C> {
        if let Some(config) = self.try_take() {
            return Some(config);
        }
        if timeout.is_zero() {
            return None;
        }

        future::block_on(future::or(
            async { Some(self.slot.wait().await) },
            async {
                async_io_mini::Timer::after(timeout).await;
                None
            },
        ))
    }
}

impl<C: Send> ConfigSource for &ConfigQueue<C> {
    type Item = C;

    fn poll_in(&mut self, timeout: Duration) -> Option<C> {
        self.wait_for(timeout)
    }
}

impl<C: Send> ConfigSource for Arc<ConfigQueue<C>> {
    type Item = C;

    fn poll_in(&mut self, timeout: Duration) -> Option<C> {
        self.wait_for(timeout)
    }
}
