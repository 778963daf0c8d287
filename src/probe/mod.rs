//! 1-Wire probe pipeline — discovery, polling, and register mirroring.
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌──────────────┐   ┌────────────────┐
//! │ scan         │──▶│ SlotTable│──▶│ poll         │──▶│ ReadingQueue   │
//! │ (enumerate + │   │ (binding │   │ (fetch bound │   │ (SPSC, never   │
//! │  bind slots) │   │  half)   │   │  slots)      │   │  blocks)       │
//! └──────────────┘   └──────────┘   └──────────────┘   └───────┬────────┘
//!                                                              │ drain
//!                                                      ┌───────▼────────┐
//!                                                      │ RegisterMirror │
//!                                                      │ (cache half +  │
//!                                                      │  age gate)     │
//!                                                      └────────────────┘
//! ```
//!
//! The left side runs in the periodic acquisition loop; the mirror runs in
//! whatever context the fieldbus server invokes register callbacks from.
//! The queue is the only structure shared between the two.

pub mod mirror;
pub mod poll;
pub mod queue;
pub mod scan;
pub mod slots;

/// Family code of the probes this node binds (DS18B20 temperature sensors).
/// Devices with any other family code are ignored during enumeration.
pub const FAMILY_DS18B20: u8 = 0x28;

// ───────────────────────────────────────────────────────────────
// Device identity
// ───────────────────────────────────────────────────────────────

/// 64-bit 1-Wire device address.
///
/// Canonical layout here is family-code-leading: the family code occupies
/// the most-significant byte, the serial portion the remainder. This is the
/// order the register window exposes (word 0 = most significant). Adapters
/// whose hardware reports the address serial-first must byte-swap before
/// constructing a `DeviceId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(u64);

impl DeviceId {
    /// The cleared/blank address, programmed into a channel filter to
    /// detach it from any physical device.
    pub const BLANK: DeviceId = DeviceId(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Device class byte (most-significant byte of the address).
    pub const fn family_code(self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// 16-bit word view of the address; word 0 is the most significant.
    ///
    /// `word > 3` is a caller bug and wraps silently on the shift — the
    /// register mirror only ever passes 0..=3.
    pub const fn word(self, word: u16) -> u16 {
        (self.0 >> (48 - 16 * (word as u64 % 4))) as u16
    }
}

// ───────────────────────────────────────────────────────────────
// Reading
// ───────────────────────────────────────────────────────────────

/// One timestamped temperature acquisition, the unit that crosses from the
/// acquisition loop into the register-serving context.
///
/// The device identity rides along so the serving side never has to look at
/// acquisition-side state: everything a register read needs arrives through
/// the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Logical slot index the value belongs to.
    pub slot: u8,
    /// Monotonic seconds since boot at acquisition time.
    pub timestamp: u64,
    /// Identity of the device the value was read from.
    pub id: DeviceId,
    /// Temperature in hundredths of a degree Celsius.
    pub temp_centi: i16,
}
