//! System configuration parameters.
//!
//! Runtime-tunable values live in [`SystemConfig`]; sizes that shape memory
//! layout are compile-time constants.

use serde::{Deserialize, Serialize};

/// Number of logical probe slots. Matches the number of probe channels the
/// board exposes; the register window is `5 *` this many addresses wide.
pub const PROBE_SLOTS: usize = 2;

/// Capacity of the reading hand-off queue between the acquisition loop and
/// the register-serving context.
pub const RESULT_QUEUE_DEPTH: usize = 10;

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Probe register window ---
    /// First input-register address of the probe window.
    pub probe_window_base: u16,
    /// Maximum age (seconds) before a cached reading is reported as
    /// unavailable.
    pub temp_max_age_secs: u64,

    // --- Timing ---
    /// Poll cycle interval (milliseconds).
    pub poll_interval_ms: u32,
    /// Bus rescan interval (seconds). Much longer than the poll interval —
    /// enumeration is slow and holds the bus exclusively.
    pub rescan_interval_secs: u32,
    /// Re-enumerate on the next cycle after any slot fails a fetch
    /// (a probe was likely unplugged or swapped).
    pub rescan_on_fetch_failure: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            probe_window_base: 1000,
            temp_max_age_secs: 30,

            poll_interval_ms: 1000, // 1 Hz
            rescan_interval_secs: 60,
            rescan_on_fetch_failure: true,
        }
    }
}
