//! Unified error types for the fieldnode firmware.
//!
//! A single `Error` enum every subsystem converts into, keeping the main
//! loop's error handling uniform. All variants are `Copy` so they can move
//! through reports and events without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The shared probe bus could not be locked or searched.
    Bus(BusError),
    /// A probe channel could not be programmed or read.
    Sensor(SensorError),
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Probe bus errors
// ---------------------------------------------------------------------------

/// Failures of the shared single-wire bus itself. Both are non-fatal: the
/// next periodic cycle retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Exclusive ownership could not be acquired; no bindings were changed
    /// this cycle beyond the initial clear.
    LockFailed,
    /// The enumeration traversal errored mid-scan. Bindings made before the
    /// failure are kept.
    SearchFailed,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockFailed => write!(f, "bus lock failed"),
            Self::SearchFailed => write!(f, "device search failed"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Probe channel errors
// ---------------------------------------------------------------------------

/// Per-channel failures, all transient: a probe unplugged between
/// enumeration and poll lands here, and its slot simply skips the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sample fetch transaction failed (no presence, CRC, timeout).
    FetchFailed,
    /// The converted value could not be read back.
    ReadFailed,
    /// The channel rejected the address filter it was given.
    FilterRejected,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailed => write!(f, "sample fetch failed"),
            Self::ReadFailed => write!(f, "value read failed"),
            Self::FilterRejected => write!(f, "address filter rejected"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Register (protocol boundary) errors
// ---------------------------------------------------------------------------

/// Errors surfaced to the fieldbus server collaborator. These map onto the
/// protocol's exception responses; a register read never answers with zero
/// or stale data in place of one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// The slot behind this address has no sufficiently recent data.
    Unavailable,
    /// No register is mapped at this address.
    Unsupported,
    /// The address exists but cannot be written.
    ReadOnly,
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "no current data"),
            Self::Unsupported => write!(f, "unsupported address"),
            Self::ReadOnly => write!(f, "read-only address"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
