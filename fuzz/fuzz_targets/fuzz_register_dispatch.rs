//! Fuzz the register dispatch surface: arbitrary interleavings of queue
//! pushes and register reads/writes at arbitrary addresses must never
//! panic — only answer or return a typed RegisterError.

#![no_main]

use libfuzzer_sys::fuzz_target;

use fieldnode::app::ports::{BoardMonitor, CoilBank, Monotonic, PwmOutputs};
use fieldnode::error::ActuatorError;
use fieldnode::probe::mirror::RegisterMirror;
use fieldnode::probe::queue::ReadingQueue;
use fieldnode::probe::{DeviceId, Reading};
use fieldnode::registers::{RegisterBank, PWM_CHANNELS};

struct NullMonitor;

impl BoardMonitor for NullMonitor {
    fn vin_mv(&mut self) -> u16 {
        24_000
    }
    fn iin_ma(&mut self) -> u16 {
        100
    }
    fn rail_3v3_mv(&mut self) -> u16 {
        3300
    }
    fn board_temp_centi(&mut self) -> i16 {
        2500
    }
}

struct NullPwm;

impl PwmOutputs for NullPwm {
    fn channel_count(&self) -> usize {
        PWM_CHANNELS
    }
    fn apply(&mut self, _ch: usize, _raw: u16) -> Result<(), ActuatorError> {
        Ok(())
    }
}

struct NullCoils([bool; 2]);

impl CoilBank for NullCoils {
    fn coil_count(&self) -> usize {
        2
    }
    fn set(&mut self, idx: usize, on: bool) -> Result<(), ActuatorError> {
        self.0[idx] = on;
        Ok(())
    }
    fn get(&self, idx: usize) -> Option<bool> {
        self.0.get(idx).copied()
    }
}

struct FuzzClock(u64);

impl Monotonic for FuzzClock {
    fn uptime_secs(&self) -> u64 {
        self.0
    }
}

fuzz_target!(|data: &[u8]| {
    let queue: ReadingQueue<4> = ReadingQueue::new();
    let mirror: RegisterMirror<2, 4> = RegisterMirror::new(&queue, 1000, 30);
    let mut bank = RegisterBank::new(
        mirror,
        NullMonitor,
        NullPwm,
        NullCoils([false; 2]),
        FuzzClock(u64::from(data.first().copied().unwrap_or(0))),
    );

    for chunk in data.chunks_exact(4) {
        let addr = u16::from_le_bytes([chunk[1], chunk[2]]);
        let value = u16::from(chunk[3]);
        match chunk[0] % 8 {
            0 => {
                let _ = bank.read_input(addr);
            }
            1 => {
                let _ = bank.write_input(addr, value);
            }
            2 => {
                let _ = bank.read_holding(addr);
            }
            3 => {
                let _ = bank.write_holding(addr, value);
            }
            4 => {
                let _ = bank.read_coil(addr);
            }
            5 => {
                let _ = bank.write_coil(addr, value != 0);
            }
            _ => {
                let _ = queue.push(Reading {
                    slot: chunk[1] % 4,
                    timestamp: u64::from(chunk[2]),
                    id: DeviceId::new(u64::from(value) << 48),
                    temp_centi: value as i16,
                });
            }
        }
    }
});
