//! Per-cycle sample acquisition from every bound slot.
//!
//! Two phases, so all probes convert simultaneously: trigger a fetch on
//! every bound channel first, then read the converted values back. A slot
//! failing either phase is skipped for the cycle and the rest carry on —
//! a probe unplugged between enumeration and poll is normal operation, not
//! an abort.

use log::{debug, error, info};

use crate::app::ports::ProbeChannel;
use crate::probe::queue::ReadingQueue;
use crate::probe::slots::SlotTable;
use crate::probe::Reading;

/// Outcome counters of one poll cycle. Diagnostic only — nothing here ever
/// stops the periodic loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Slots that produced a reading this cycle.
    pub polled: u8,
    /// Slots that failed a fetch or read this cycle.
    pub failed: u8,
    /// Readings lost to a full queue this cycle.
    pub dropped: u8,
}

impl PollReport {
    pub fn any_failed(&self) -> bool {
        self.failed > 0
    }
}

/// Fetch a value from every bound slot and queue the results.
///
/// A push rejected by a full queue is dropped silently — the data already
/// queued is older and still undelivered, and the next cycle supersedes
/// this one anyway.
pub fn poll_once<C, const N: usize, const K: usize>(
    slots: &SlotTable<N>,
    channels: &mut [C; N],
    now: u64,
    queue: &ReadingQueue<K>,
) -> PollReport
where
    C: ProbeChannel,
{
    let mut report = PollReport::default();
    let mut fetched = [false; N];

    debug!("fetching probes");
    for (slot, _) in slots.iter_bound() {
        match channels[slot].fetch_sample() {
            Ok(()) => fetched[slot] = true,
            Err(e) => {
                error!("slot {slot}: {e}");
                report.failed += 1;
            }
        }
    }

    for (slot, id) in slots.iter_bound() {
        if !fetched[slot] {
            continue;
        }
        match channels[slot].read_centi() {
            Ok(temp_centi) => {
                info!(
                    "slot {slot} temperature: {temp_centi} cC, addr {:016x}",
                    id.raw()
                );
                let reading = Reading {
                    slot: slot as u8,
                    timestamp: now,
                    id,
                    temp_centi,
                };
                if !queue.push(reading) {
                    debug!("result queue full, dropped slot {slot}");
                    report.dropped += 1;
                }
                report.polled += 1;
            }
            Err(e) => {
                error!("slot {slot}: {e}");
                report.failed += 1;
            }
        }
    }

    report
}
