//! PWM output stage behind the holding registers.
//!
//! The register value is interpreted as a duty in 1/1024 steps (10-bit
//! LEDC resolution); values past full scale clamp. Channel configuration
//! (timer, frequency, GPIO routing) happens once in main.
//!
//! On host targets duties land in static atomics for inspection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use log::debug;

use crate::app::ports::PwmOutputs;
use crate::error::ActuatorError;
use crate::registers::PWM_CHANNELS;

/// Full-scale duty at 10-bit resolution.
const DUTY_MAX: u16 = 1023;

static SIM_DUTY: [AtomicU16; PWM_CHANNELS] =
    [const { AtomicU16::new(0) }; PWM_CHANNELS];

/// Last duty applied to `ch` (host/test builds).
#[cfg(not(target_os = "espidf"))]
pub fn sim_duty(ch: usize) -> u16 {
    SIM_DUTY[ch].load(Ordering::Relaxed)
}

/// LEDC-backed implementation of the [`PwmOutputs`] port.
pub struct PwmOut;

impl PwmOut {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PwmOut {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmOutputs for PwmOut {
    fn channel_count(&self) -> usize {
        PWM_CHANNELS
    }

    #[cfg(target_os = "espidf")]
    fn apply(&mut self, ch: usize, raw: u16) -> Result<(), ActuatorError> {
        if ch >= PWM_CHANNELS {
            return Err(ActuatorError::PwmWriteFailed);
        }
        let duty = u32::from(raw.min(DUTY_MAX));
        debug!("pwm {ch} <- {duty}");
        // SAFETY: channels are configured in main before the register bank
        // can receive writes.
        unsafe {
            let channel = ch as esp_idf_sys::ledc_channel_t;
            let mode = esp_idf_sys::ledc_mode_t_LEDC_LOW_SPEED_MODE;
            if esp_idf_sys::ledc_set_duty(mode, channel, duty) != esp_idf_sys::ESP_OK
                || esp_idf_sys::ledc_update_duty(mode, channel) != esp_idf_sys::ESP_OK
            {
                return Err(ActuatorError::PwmWriteFailed);
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn apply(&mut self, ch: usize, raw: u16) -> Result<(), ActuatorError> {
        if ch >= PWM_CHANNELS {
            return Err(ActuatorError::PwmWriteFailed);
        }
        let duty = raw.min(DUTY_MAX);
        debug!("pwm {ch} <- {duty}");
        SIM_DUTY[ch].store(duty, Ordering::Relaxed);
        Ok(())
    }
}
