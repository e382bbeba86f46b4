//! Actuator state enums shared by the schedulers, the transition loop and
//! the drivers.
//!
//! [`TargetState`] is strictly two-valued: "no opinion" is modelled one level
//! up, as an absent `target_state` in a
//! [`ScheduleResult`](crate::scheduler::ScheduleResult).  [`ActuatorState`]
//! adds `Unknown`, which an actuator reports until its first transition.
//!
//! Both serialize to the integers used on the wire (`Closed = -1`,
//! `Unknown = 0`, `Open = 1`).

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The state a scheduling policy asks an actuator to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum TargetState {
    Closed = -1,
    Open = 1,
}

/// The state an actuator reports for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i8)]
pub enum ActuatorState {
    Closed = -1,
    /// Before the first transition completes (e.g. at boot).
    #[default]
    Unknown = 0,
    Open = 1,
}

impl TargetState {
    /// Wire value (`-1` / `1`).
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    /// Decode a wire value.  `0` and anything else is rejected.
    pub const fn from_i8(raw: i8) -> Option<Self> {
        match raw {
            -1 => Some(Self::Closed),
            1 => Some(Self::Open),
            _ => None,
        }
    }
}

impl ActuatorState {
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    pub const fn from_i8(raw: i8) -> Option<Self> {
        match raw {
            -1 => Some(Self::Closed),
            0 => Some(Self::Unknown),
            1 => Some(Self::Open),
            _ => None,
        }
    }

    /// Whether the actuator is known to already be in `target`.
    pub fn is(self, target: TargetState) -> bool {
        self == Self::from(target)
    }
}

impl From<TargetState> for ActuatorState {
    fn from(target: TargetState) -> Self {
        match target {
            TargetState::Closed => Self::Closed,
            TargetState::Open => Self::Open,
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
        }
    }
}

impl fmt::Display for ActuatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Unknown => write!(f, "Unknown"),
            Self::Open => write!(f, "Open"),
        }
    }
}

// ── Wire encoding ─────────────────────────────────────────────

impl Serialize for TargetState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.as_i8())
    }
}

impl<'de> Deserialize<'de> for TargetState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i8::deserialize(deserializer)?;
        Self::from_i8(raw).ok_or_else(|| {
            serde::de::Error::custom(format_args!("invalid target state {raw}, expected -1 or 1"))
        })
    }
}

impl Serialize for ActuatorState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.as_i8())
    }
}

impl<'de> Deserialize<'de> for ActuatorState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i8::deserialize(deserializer)?;
        Self::from_i8(raw).ok_or_else(|| {
            serde::de::Error::custom(format_args!("invalid actuator state {raw}"))
        })
    }
}
