//! Application core — pure domain logic, zero I/O.
//!
//! The acquisition service orchestrates the probe pipeline once per
//! periodic tick. All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
