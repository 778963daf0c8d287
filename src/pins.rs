//! GPIO / peripheral pin assignments for the fieldnode main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// 1-Wire probe bus
// ---------------------------------------------------------------------------

/// Shared probe bus data line. Externally pulled up with 4.7 kΩ.
pub const ONEWIRE_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Discrete outputs (coils)
// ---------------------------------------------------------------------------

/// Coil 0 — relay driver (active HIGH).
pub const COIL0_GPIO: i32 = 11;
/// Coil 1 — relay driver (active HIGH).
pub const COIL1_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// PWM outputs (LEDC)
// ---------------------------------------------------------------------------

pub const PWM0_GPIO: i32 = 1;
pub const PWM1_GPIO: i32 = 2;
pub const PWM2_GPIO: i32 = 3;

/// LEDC timer resolution (bits). 10-bit gives 0 – 1023 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 10;
/// LEDC base frequency (25 kHz — inaudible on inductive loads).
pub const PWM_FREQ_HZ: u32 = 25_000;

// ---------------------------------------------------------------------------
// Board monitor — analog (ADC1)
// ---------------------------------------------------------------------------

/// Supply voltage divider (100k : 10k). ADC1 channel 4 (GPIO 5).
pub const VIN_ADC_GPIO: i32 = 5;
/// Supply current shunt amplifier output. ADC1 channel 5 (GPIO 6).
pub const IIN_ADC_GPIO: i32 = 6;
/// 3.3 V rail through a 1:1 divider. ADC1 channel 6 (GPIO 7).
pub const RAIL_3V3_ADC_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// UART (fieldbus transceiver)
// ---------------------------------------------------------------------------

pub const FIELDBUS_TX_GPIO: i32 = 17;
pub const FIELDBUS_RX_GPIO: i32 = 18;
/// RS-485 driver-enable line.
pub const FIELDBUS_DE_GPIO: i32 = 21;
