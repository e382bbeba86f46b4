//! `embassy-time` driver for ESP-IDF.
//!
//! `async_io_mini::Timer` sits on `embassy-time`, which links against two
//! symbols the target must export: `_embassy_time_now` and
//! `_embassy_time_schedule_wake`.  On the host the `std` feature of
//! `embassy-time` provides them; on the device they are defined here.
//!
//! Time is `esp_timer` microseconds since boot, matching embassy's default
//! 1 MHz tick.  Wakes are served by one lazily started thread that sleeps
//! until the earliest registered instant.

use core::task::Waker;
use core::time::Duration;
use std::sync::OnceLock;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};

use log::warn;

const WAKER_STACK: usize = 4096;

struct Wake {
    at: u64,
    waker: Waker,
}

static WAKES: OnceLock<Option<Sender<Wake>>> = OnceLock::new();

#[unsafe(no_mangle)]
fn _embassy_time_now() -> u64 {
    // SAFETY: esp_timer is started by the IDF before `main`.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

#[unsafe(no_mangle)]
fn _embassy_time_schedule_wake(at: u64, waker: &Waker) {
    let sent = WAKES
        .get_or_init(start_waker_thread)
        .as_ref()
        .is_some_and(|tx| {
            tx.send(Wake {
                at,
                waker: waker.clone(),
            })
            .is_ok()
        });
    if !sent {
        // Timers re-check their deadline when woken, so an early wake only
        // costs a re-poll.
        waker.wake_by_ref();
    }
}

fn start_waker_thread() -> Option<Sender<Wake>> {
    let (tx, rx) = mpsc::channel();
    match std::thread::Builder::new()
        .name("time-driver".into())
        .stack_size(WAKER_STACK)
        .spawn(move || serve_wakes(&rx))
    {
        Ok(_) => Some(tx),
        Err(e) => {
            warn!("Time driver: waker thread failed to start: {}", e);
            None
        }
    }
}

fn serve_wakes(rx: &Receiver<Wake>) {
    let mut pending: Vec<Wake> = Vec::new();
    loop {
        let now = _embassy_time_now();
        pending.retain(|w| {
            if w.at <= now {
                w.waker.wake_by_ref();
                false
            } else {
                true
            }
        });

        let next = match pending.iter().map(|w| w.at).min() {
            Some(at) => rx.recv_timeout(Duration::from_micros(at.saturating_sub(now))),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match next {
            Ok(wake) => match pending.iter_mut().find(|w| w.waker.will_wake(&wake.waker)) {
                Some(existing) => existing.at = existing.at.min(wake.at),
                None => pending.push(wake),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}
