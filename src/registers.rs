//! Register map and dispatch.
//!
//! The fieldbus server collaborator owns framing, CRC, and transport; it
//! calls into [`RegisterBank`] by address. Everything here answers from
//! local state or port traits — the only probe-facing path goes through
//! the [`RegisterMirror`], which itself only reads cached data.
//!
//! Input registers (read-only):
//!
//! | address        | contents                                |
//! |----------------|-----------------------------------------|
//! | 0              | supply voltage, mV                      |
//! | 1              | supply current, mA                      |
//! | 2              | 3.3 V rail, mV                          |
//! | 3              | board temperature, c°C                  |
//! | base .. base+5·N | probe window (see [`crate::probe::mirror`]) |
//!
//! Holding registers: `0` status (reserved, reads 0), `1` uptime seconds,
//! `2..=4` PWM output duties. Coils `0..=1` drive the discrete outputs.

use log::{info, warn};

use crate::app::ports::{BoardMonitor, CoilBank, Monotonic, PwmOutputs};
use crate::error::RegisterError;
use crate::probe::mirror::RegisterMirror;

// ── Input registers ───────────────────────────────────────────
pub const INPUT_VIN_MV: u16 = 0;
pub const INPUT_IIN_MA: u16 = 1;
pub const INPUT_RAIL_3V3_MV: u16 = 2;
pub const INPUT_BOARD_TEMP: u16 = 3;

// ── Holding registers ─────────────────────────────────────────
pub const HOLDING_STATUS: u16 = 0;
pub const HOLDING_UPTIME: u16 = 1;
/// Three consecutive PWM duty registers starting here.
pub const HOLDING_PWM_FIRST: u16 = 2;
pub const PWM_CHANNELS: usize = 3;

const HOLDING_PWM_LAST: u16 = HOLDING_PWM_FIRST + PWM_CHANNELS as u16 - 1;

/// The node's complete register surface.
pub struct RegisterBank<'q, M, P, Co, T, const N: usize, const K: usize> {
    mirror: RegisterMirror<'q, N, K>,
    monitor: M,
    pwm: P,
    coils: Co,
    clock: T,
    /// Read-back cache of the PWM duty registers.
    pwm_reg: [u16; PWM_CHANNELS],
}

impl<'q, M, P, Co, T, const N: usize, const K: usize> RegisterBank<'q, M, P, Co, T, N, K>
where
    M: BoardMonitor,
    P: PwmOutputs,
    Co: CoilBank,
    T: Monotonic,
{
    pub fn new(mirror: RegisterMirror<'q, N, K>, monitor: M, pwm: P, coils: Co, clock: T) -> Self {
        Self {
            mirror,
            monitor,
            pwm,
            coils,
            clock,
            pwm_reg: [0; PWM_CHANNELS],
        }
    }

    // ── Input registers ───────────────────────────────────────

    pub fn read_input(&mut self, addr: u16) -> Result<u16, RegisterError> {
        if self.mirror.contains(addr) {
            return self.mirror.read(addr, self.clock.uptime_secs());
        }
        match addr {
            INPUT_VIN_MV => Ok(self.monitor.vin_mv()),
            INPUT_IIN_MA => Ok(self.monitor.iin_ma()),
            INPUT_RAIL_3V3_MV => Ok(self.monitor.rail_3v3_mv()),
            INPUT_BOARD_TEMP => Ok(self.monitor.board_temp_centi() as u16),
            _ => Err(RegisterError::Unsupported),
        }
    }

    pub fn write_input(&mut self, addr: u16, _value: u16) -> Result<(), RegisterError> {
        if self.mirror.contains(addr) || addr <= INPUT_BOARD_TEMP {
            Err(RegisterError::ReadOnly)
        } else {
            Err(RegisterError::Unsupported)
        }
    }

    // ── Holding registers ─────────────────────────────────────

    pub fn read_holding(&mut self, addr: u16) -> Result<u16, RegisterError> {
        match addr {
            HOLDING_STATUS => Ok(0),
            // Truncates at u16::MAX seconds (~18 h); hosts track deltas.
            HOLDING_UPTIME => Ok(self.clock.uptime_secs() as u16),
            HOLDING_PWM_FIRST..=HOLDING_PWM_LAST => {
                Ok(self.pwm_reg[usize::from(addr - HOLDING_PWM_FIRST)])
            }
            _ => Err(RegisterError::Unsupported),
        }
    }

    pub fn write_holding(&mut self, addr: u16, value: u16) -> Result<(), RegisterError> {
        match addr {
            HOLDING_PWM_FIRST..=HOLDING_PWM_LAST => {
                let ch = usize::from(addr - HOLDING_PWM_FIRST);
                self.pwm_reg[ch] = value;
                // The register write stands even if the output stage balks;
                // the duty is reapplied on the next write.
                if let Err(e) = self.pwm.apply(ch, value) {
                    warn!("pwm channel {ch}: {e}");
                }
                Ok(())
            }
            HOLDING_STATUS | HOLDING_UPTIME => Err(RegisterError::ReadOnly),
            _ => {
                info!("write to unknown register {addr}");
                Err(RegisterError::Unsupported)
            }
        }
    }

    // ── Coils ─────────────────────────────────────────────────

    pub fn read_coil(&mut self, addr: u16) -> Result<bool, RegisterError> {
        self.coils
            .get(usize::from(addr))
            .ok_or(RegisterError::Unsupported)
    }

    pub fn write_coil(&mut self, addr: u16, on: bool) -> Result<(), RegisterError> {
        let idx = usize::from(addr);
        if idx >= self.coils.coil_count() {
            return Err(RegisterError::Unsupported);
        }
        info!("coil write, addr {addr}, {}", i32::from(on));
        if let Err(e) = self.coils.set(idx, on) {
            warn!("coil {idx}: {e}");
        }
        Ok(())
    }
}
