//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements          | Connects to                 |
//! |----------------|---------------------|-----------------------------|
//! | `config_queue` | ConfigSource        | config layer (NVS/MQTT/BLE) |
//! | `telemetry`    | TelemetryPublisher  | telemetry publisher task    |
//! | `time`         | Clock               | system timer + wall clock   |

pub mod config_queue;
pub mod telemetry;
pub mod time;
