//! Board clock adapter.
//!
//! Provides the monotonic time the pipeline stamps readings with.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.

use crate::app::ports::Monotonic;

/// Monotonic uptime clock for the ESP32-S3 platform.
pub struct BoardClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for BoardClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Monotonic for BoardClock {
    /// Seconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    fn uptime_secs(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000_000
    }

    /// Seconds since start (monotonic).
    #[cfg(not(target_os = "espidf"))]
    fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}
