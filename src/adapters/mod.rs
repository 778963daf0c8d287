//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements             | Connects to                 |
//! |------------|------------------------|-----------------------------|
//! | `onewire`  | WireBus, ProbeChannel  | RMT 1-Wire bus, DS18B20     |
//! | `log_sink` | EventSink              | Serial log output           |
//! | `time`     | Monotonic              | ESP32 system timer / host   |

pub mod log_sink;
#[cfg(target_os = "espidf")]
pub mod onewire;
pub mod time;
