//! Single-pin valve / door driver.
//!
//! A solenoid valve (or a door motor behind a relay) driven by one GPIO:
//! high = open, low = closed.  Generic over `embedded-hal` [`OutputPin`],
//! so the same driver runs on an `esp-idf-hal` `PinDriver` and on a mock
//! pin in host tests.
//!
//! ## Safety contract
//!
//! - Until the first successful write the state is `Unknown`.  An absent
//!   target on an `Unknown` valve closes it.
//! - A failed GPIO write leaves the recorded state untouched and reports
//!   "no transition"; the loop retries on its next tick.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::app::ports::Actuator;
use crate::error::ActuatorError;
use crate::state::{ActuatorState, TargetState};

pub struct PinValve<P> {
    name: &'static str,
    pin: P,
    state: ActuatorState,
}

impl<P: OutputPin> PinValve<P> {
    pub fn new(name: &'static str, pin: P) -> Self {
        Self {
            name,
            pin,
            state: ActuatorState::Unknown,
        }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }

    fn drive(&mut self, target: TargetState) -> Result<(), ActuatorError> {
        let written = match target {
            TargetState::Open => self.pin.set_high(),
            TargetState::Closed => self.pin.set_low(),
        };
        written.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.state = target.into();
        Ok(())
    }
}

impl<P: OutputPin> Actuator for PinValve<P> {
    fn name(&self) -> &str {
        self.name
    }

    fn transition_to(&mut self, target: Option<TargetState>) -> bool {
        let target = match (target, self.state) {
            (Some(t), _) => t,
            (None, ActuatorState::Unknown) => TargetState::Closed,
            (None, _) => return false,
        };
        if self.state.is(target) {
            return false;
        }

        match self.drive(target) {
            Ok(()) => {
                info!("{}: -> {}", self.name, target);
                true
            }
            Err(e) => {
                warn!("{}: transition to {} failed: {}", self.name, target, e);
                false
            }
        }
    }

    fn state(&self) -> ActuatorState {
        self.state
    }
}
