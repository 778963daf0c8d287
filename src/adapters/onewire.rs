//! ESP-IDF 1-Wire bus adapter (RMT peripheral, `onewire_bus` component).
//!
//! Implements [`WireBus`] and [`ProbeChannel`] on top of the espressif
//! `onewire_bus` managed component (declared in `Cargo.toml` under
//! `package.metadata.esp-idf-sys`). The data line must be externally
//! pulled up with 4.7 kΩ.
//!
//! The component reports 64-bit addresses serial-first (family code in the
//! low byte); this adapter byte-swaps them into the family-leading form
//! the rest of the firmware uses.

#![cfg(target_os = "espidf")]

use core::ptr;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_sys as sys;
use log::{debug, warn};

use crate::app::ports::{ProbeChannel, WireBus};
use crate::error::{BusError, SensorError};
use crate::probe::DeviceId;

// ROM and function commands.
const CMD_MATCH_ROM: u8 = 0x55;
const CMD_CONVERT_T: u8 = 0x44;
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

// 12-bit conversion time ceiling.
const CONVERSION_WAIT_MS: u32 = 750;

/// `CRC = X^8 + X^5 + X^4 + X^0`, bit-reversed polynomial 0x8C. Running the
/// scratchpad including its CRC byte through this yields 0 on intact data.
fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for byte in data {
        crc ^= byte;
        for _ in 0..u8::BITS {
            let bit = crc & 0x01;
            crc >>= 1;
            if bit != 0 {
                crc ^= 0x8C;
            }
        }
    }
    crc
}

/// Owner of the RMT-backed bus; hands out raw handles to channels.
pub struct OneWireBus {
    handle: sys::onewire_bus_handle_t,
    owned: bool,
}

impl OneWireBus {
    /// Install the RMT 1-Wire driver on `gpio`.
    pub fn new(gpio: i32) -> Result<Self, crate::error::Error> {
        let config = sys::onewire_bus_config_t {
            bus_gpio_num: gpio,
            ..Default::default()
        };
        // 1 byte command + 8 byte ROM + 9 byte scratchpad.
        let rmt_config = sys::onewire_bus_rmt_config_t { max_rx_bytes: 18 };
        let mut handle: sys::onewire_bus_handle_t = ptr::null_mut();
        // SAFETY: config structs outlive the call; handle is written on success.
        let err = unsafe { sys::onewire_new_bus_rmt(&config, &rmt_config, &mut handle) };
        if err != sys::ESP_OK {
            return Err(crate::error::Error::Init("onewire bus install failed"));
        }
        Ok(Self {
            handle,
            owned: false,
        })
    }

    /// Raw component handle for constructing [`Ds18b20Channel`]s.
    pub fn handle(&self) -> sys::onewire_bus_handle_t {
        self.handle
    }
}

impl WireBus for OneWireBus {
    fn lock(&mut self) -> Result<(), BusError> {
        // This firmware is the bus's only master; exclusivity against a
        // concurrent enumeration is tracked, not contended.
        if self.owned {
            return Err(BusError::LockFailed);
        }
        self.owned = true;
        Ok(())
    }

    fn unlock(&mut self) {
        self.owned = false;
    }

    fn enumerate(&mut self, visit: &mut dyn FnMut(DeviceId)) -> Result<(), BusError> {
        let mut iter: sys::onewire_device_iter_handle_t = ptr::null_mut();
        // SAFETY: bus handle is valid for the adapter's lifetime.
        if unsafe { sys::onewire_new_device_iter(self.handle, &mut iter) } != sys::ESP_OK {
            return Err(BusError::SearchFailed);
        }
        let mut result = Ok(());
        loop {
            let mut device = sys::onewire_device_t::default();
            // SAFETY: iter is valid until deleted below.
            let err = unsafe { sys::onewire_device_iter_get_next(iter, &mut device) };
            match err {
                sys::ESP_OK => visit(DeviceId::new(device.address.swap_bytes())),
                sys::ESP_ERR_NOT_FOUND => break, // search exhausted
                _ => {
                    result = Err(BusError::SearchFailed);
                    break;
                }
            }
        }
        // SAFETY: created above; deleting releases the component iterator.
        unsafe {
            sys::onewire_del_device_iter(iter);
        }
        result
    }
}

/// One logical DS18B20 channel addressed through a programmable ROM filter.
pub struct Ds18b20Channel {
    bus: sys::onewire_bus_handle_t,
    filter: Option<DeviceId>,
    last_centi: Option<i16>,
}

impl Ds18b20Channel {
    pub fn new(bus: &OneWireBus) -> Self {
        Self {
            bus: bus.handle(),
            filter: None,
            last_centi: None,
        }
    }

    fn address_device(&self, id: DeviceId) -> Result<(), SensorError> {
        // SAFETY: bus handle valid; tx buffer outlives the call.
        unsafe {
            if sys::onewire_bus_reset(self.bus) != sys::ESP_OK {
                return Err(SensorError::FetchFailed);
            }
            let mut frame = [0u8; 9];
            frame[0] = CMD_MATCH_ROM;
            // Family-leading big-endian bytes are serial-first on the wire.
            frame[1..].copy_from_slice(&id.raw().to_be_bytes());
            if sys::onewire_bus_write_bytes(self.bus, frame.as_ptr(), frame.len() as u8)
                != sys::ESP_OK
            {
                return Err(SensorError::FetchFailed);
            }
        }
        Ok(())
    }
}

impl ProbeChannel for Ds18b20Channel {
    fn program_filter(&mut self, id: DeviceId) -> Result<(), SensorError> {
        self.filter = if id == DeviceId::BLANK { None } else { Some(id) };
        self.last_centi = None;
        Ok(())
    }

    fn fetch_sample(&mut self) -> Result<(), SensorError> {
        let Some(id) = self.filter else {
            return Err(SensorError::FetchFailed);
        };

        // Trigger the conversion and wait it out.
        self.address_device(id)?;
        // SAFETY: bus handle valid; single-byte command buffer on the stack.
        unsafe {
            let cmd = [CMD_CONVERT_T];
            if sys::onewire_bus_write_bytes(self.bus, cmd.as_ptr(), 1) != sys::ESP_OK {
                return Err(SensorError::FetchFailed);
            }
        }
        FreeRtos::delay_ms(CONVERSION_WAIT_MS);

        // Read the scratchpad back.
        self.address_device(id)?;
        let mut scratchpad = [0u8; 9];
        // SAFETY: bus handle valid; rx buffer sized for the full scratchpad.
        unsafe {
            let cmd = [CMD_READ_SCRATCHPAD];
            if sys::onewire_bus_write_bytes(self.bus, cmd.as_ptr(), 1) != sys::ESP_OK {
                return Err(SensorError::FetchFailed);
            }
            if sys::onewire_bus_read_bytes(self.bus, scratchpad.as_mut_ptr(), scratchpad.len())
                != sys::ESP_OK
            {
                return Err(SensorError::FetchFailed);
            }
        }
        if crc8(&scratchpad) != 0 {
            warn!("scratchpad CRC mismatch on {:016x}", id.raw());
            return Err(SensorError::FetchFailed);
        }

        // 1/16 °C steps → hundredths.
        let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
        let centi = (i32::from(raw) * 100 / 16) as i16;
        debug!("probe {:016x}: {centi} cC", id.raw());
        self.last_centi = Some(centi);
        Ok(())
    }

    fn read_centi(&mut self) -> Result<i16, SensorError> {
        self.last_centi.ok_or(SensorError::ReadFailed)
    }
}
