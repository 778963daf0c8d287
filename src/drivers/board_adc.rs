//! Board electrical monitor (supply rails, board temperature).
//!
//! Wraps the ADC1 one-shot reads and the internal temperature sensor into
//! the [`BoardMonitor`] port, converting raw counts into the units the
//! input registers serve.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 channels via the legacy one-shot API. On
//! host/test: reads from static atomics for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use crate::app::ports::BoardMonitor;

static SIM_VIN_RAW: AtomicU16 = AtomicU16::new(2048);
static SIM_IIN_RAW: AtomicU16 = AtomicU16::new(512);
static SIM_RAIL_RAW: AtomicU16 = AtomicU16::new(2047);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_raw(vin: u16, iin: u16, rail: u16) {
    SIM_VIN_RAW.store(vin, Ordering::Relaxed);
    SIM_IIN_RAW.store(iin, Ordering::Relaxed);
    SIM_RAIL_RAW.store(rail, Ordering::Relaxed);
}

const ADC_MAX: f32 = 4095.0;
const V_REF_MV: f32 = 3300.0;
/// Supply divider 100 kΩ : 10 kΩ.
const VIN_DIVIDER: f32 = 11.0;
/// Shunt amplifier transfer: 0.1 V per A → 10 mA per mV.
const IIN_MA_PER_MV: f32 = 10.0;
/// 3.3 V rail divider 1 : 1.
const RAIL_DIVIDER: f32 = 2.0;

/// ADC-backed implementation of the [`BoardMonitor`] port.
pub struct BoardAdc;

impl BoardAdc {
    pub fn new() -> Self {
        Self
    }

    fn raw_mv(raw: u16) -> f32 {
        f32::from(raw) / ADC_MAX * V_REF_MV
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(channel: u32) -> u16 {
        // SAFETY: channel constants come from pins.rs; the legacy one-shot
        // API needs no driver object.
        unsafe { esp_idf_sys::adc1_get_raw(channel) as u16 }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(channel: u32) -> u16 {
        match channel {
            0 => SIM_VIN_RAW.load(Ordering::Relaxed),
            1 => SIM_IIN_RAW.load(Ordering::Relaxed),
            _ => SIM_RAIL_RAW.load(Ordering::Relaxed),
        }
    }

    #[cfg(target_os = "espidf")]
    const CH_VIN: u32 = esp_idf_sys::adc1_channel_t_ADC1_CHANNEL_4;
    #[cfg(target_os = "espidf")]
    const CH_IIN: u32 = esp_idf_sys::adc1_channel_t_ADC1_CHANNEL_5;
    #[cfg(target_os = "espidf")]
    const CH_RAIL: u32 = esp_idf_sys::adc1_channel_t_ADC1_CHANNEL_6;

    #[cfg(not(target_os = "espidf"))]
    const CH_VIN: u32 = 0;
    #[cfg(not(target_os = "espidf"))]
    const CH_IIN: u32 = 1;
    #[cfg(not(target_os = "espidf"))]
    const CH_RAIL: u32 = 2;
}

impl Default for BoardAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardMonitor for BoardAdc {
    fn vin_mv(&mut self) -> u16 {
        (Self::raw_mv(Self::read_raw(Self::CH_VIN)) * VIN_DIVIDER) as u16
    }

    fn iin_ma(&mut self) -> u16 {
        (Self::raw_mv(Self::read_raw(Self::CH_IIN)) * IIN_MA_PER_MV) as u16
    }

    fn rail_3v3_mv(&mut self) -> u16 {
        (Self::raw_mv(Self::read_raw(Self::CH_RAIL)) * RAIL_DIVIDER) as u16
    }

    /// Die temperature in hundredths of a degree.
    #[cfg(target_os = "espidf")]
    fn board_temp_centi(&mut self) -> i16 {
        let mut celsius: f32 = 0.0;
        // SAFETY: sensor is started once in main before any read.
        if unsafe { esp_idf_sys::temp_sensor_read_celsius(&mut celsius) } != esp_idf_sys::ESP_OK {
            return 0;
        }
        (celsius * 100.0) as i16
    }

    #[cfg(not(target_os = "espidf"))]
    fn board_temp_centi(&mut self) -> i16 {
        2500
    }
}
