//! Address-windowed register view of the probe slots — the cache half of
//! the pipeline.
//!
//! Lives in whatever context the fieldbus server invokes callbacks from.
//! Every in-window request first drains the queue into the per-slot cache,
//! then answers from the cache alone; the mirror never performs bus or
//! device I/O. Data older than the configured maximum age is reported as
//! unavailable, not served stale.
//!
//! Per slot `i` the window holds five registers at `base + 5·i`:
//!
//! | offset | contents                                   |
//! |--------|--------------------------------------------|
//! | 0..=3  | device address, most-significant word first |
//! | 4      | temperature, hundredths of a degree (i16)   |

use log::debug;

use crate::error::RegisterError;
use crate::probe::queue::ReadingQueue;
use crate::probe::Reading;

/// Registers mirrored per slot: four address words plus the temperature.
pub const REGS_PER_SLOT: u16 = 5;

/// Maps a window of `5·N` register addresses onto cached probe readings.
pub struct RegisterMirror<'q, const N: usize, const K: usize> {
    queue: &'q ReadingQueue<K>,
    cache: [Option<Reading>; N],
    base: u16,
    max_age_secs: u64,
}

impl<'q, const N: usize, const K: usize> RegisterMirror<'q, N, K> {
    pub fn new(queue: &'q ReadingQueue<K>, base: u16, max_age_secs: u64) -> Self {
        Self {
            queue,
            cache: [None; N],
            base,
            max_age_secs,
        }
    }

    /// First address of the mirrored window.
    pub fn base(&self) -> u16 {
        self.base
    }

    /// Whether `addr` falls inside the mirrored window.
    pub fn contains(&self, addr: u16) -> bool {
        addr >= self.base && addr < self.base + REGS_PER_SLOT * N as u16
    }

    /// Answer a register read at `addr`, with `now` in monotonic seconds.
    pub fn read(&mut self, addr: u16, now: u64) -> Result<u16, RegisterError> {
        if !self.contains(addr) {
            return Err(RegisterError::Unsupported);
        }
        self.drain();

        let rel = addr - self.base;
        let slot = usize::from(rel / REGS_PER_SLOT);
        let offset = rel % REGS_PER_SLOT;

        let Some(reading) = self.read_cache(slot) else {
            return Err(RegisterError::Unavailable);
        };
        if now.saturating_sub(reading.timestamp) > self.max_age_secs {
            return Err(RegisterError::Unavailable);
        }

        if offset < 4 {
            Ok(reading.id.word(offset))
        } else {
            Ok(reading.temp_centi as u16)
        }
    }

    /// Reject any write into the window.
    pub fn write(&mut self, addr: u16, _value: u16) -> Result<(), RegisterError> {
        if self.contains(addr) {
            Err(RegisterError::ReadOnly)
        } else {
            Err(RegisterError::Unsupported)
        }
    }

    /// Latest cached reading for `slot`, ignoring age.
    pub fn read_cache(&self, slot: usize) -> Option<Reading> {
        self.cache.get(slot).copied().flatten()
    }

    /// Pull everything queued since the last request into the cache.
    fn drain(&mut self) {
        for reading in self.queue.drain_all() {
            debug!(
                "cached reading: slot {} -> {} cC",
                reading.slot, reading.temp_centi
            );
            self.update_cache(reading);
        }
    }

    fn update_cache(&mut self, reading: Reading) {
        if let Some(entry) = self.cache.get_mut(usize::from(reading.slot)) {
            *entry = Some(reading);
        }
    }
}
