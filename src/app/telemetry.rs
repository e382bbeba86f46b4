//! Telemetry document published for each actuator.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::format_timestamp;
use crate::scheduler::OverrideWindow;
use crate::state::{ActuatorState, TargetState};

/// Telemetry document for one valve.
///
/// ```json
/// {"state":1,"overrideState":-1,"overrideEnd":"2024-05-01T13:00:00Z"}
/// ```
///
/// The override fields are omitted when no override is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValveTelemetry {
    pub state: ActuatorState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_state: Option<TargetState>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_end"
    )]
    pub override_end: Option<DateTime<Utc>>,
}

fn serialize_end<S: serde::Serializer>(
    end: &Option<DateTime<Utc>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match end {
        Some(t) => s.serialize_str(&format_timestamp(*t)),
        None => s.serialize_none(),
    }
}

impl ValveTelemetry {
    pub fn new(state: ActuatorState, active_override: Option<OverrideWindow>) -> Self {
        Self {
            state,
            override_state: active_override.map(|o| o.state),
            override_end: active_override.map(|o| o.until),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
