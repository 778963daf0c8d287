//! Discrete coil outputs over GPIO.
//!
//! Generic over `embedded-hal` [`OutputPin`] so the same driver runs
//! against real pins on target and mock pins in tests. Commanded state is
//! cached for register read-back (the pins are write-only).

use embedded_hal::digital::OutputPin;

use crate::app::ports::CoilBank;
use crate::error::ActuatorError;

/// [`CoilBank`] over `N` GPIO-driven outputs.
pub struct GpioCoils<P: OutputPin, const N: usize> {
    pins: [P; N],
    state: [bool; N],
}

impl<P: OutputPin, const N: usize> GpioCoils<P, N> {
    /// Takes ownership of the pins; all coils start de-energised.
    pub fn new(mut pins: [P; N]) -> Result<Self, ActuatorError> {
        for pin in &mut pins {
            pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        }
        Ok(Self {
            pins,
            state: [false; N],
        })
    }
}

impl<P: OutputPin, const N: usize> CoilBank for GpioCoils<P, N> {
    fn coil_count(&self) -> usize {
        N
    }

    fn set(&mut self, idx: usize, on: bool) -> Result<(), ActuatorError> {
        let Some(pin) = self.pins.get_mut(idx) else {
            return Err(ActuatorError::GpioWriteFailed);
        };
        let result = if on { pin.set_high() } else { pin.set_low() };
        result.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.state[idx] = on;
        Ok(())
    }

    fn get(&self, idx: usize) -> Option<bool> {
        self.state.get(idx).copied()
    }
}
