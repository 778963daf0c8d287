//! Exclusive-access bus enumeration and slot (re)binding.
//!
//! A rescan always starts from a clean table: every binding and channel
//! filter is cleared first, then the bus is searched and matching devices
//! are bound to slots in discovery order. A probe that disappeared since
//! the last scan therefore ends up unbound no matter what else was found.

use log::{debug, error, info, warn};

use crate::app::ports::{ProbeChannel, WireBus};
use crate::error::BusError;
use crate::probe::slots::SlotTable;
use crate::probe::{DeviceId, FAMILY_DS18B20};

/// Outcome counters of one enumeration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Devices bound to slots this pass.
    pub bound: u8,
    /// Devices discarded for a non-matching family code.
    pub foreign: u8,
    /// Matching devices discarded because no slot was free.
    pub overflow: u8,
}

/// Holds the bus lock for the duration of an enumeration; released on every
/// exit path, including search failure.
struct BusGuard<'a, B: WireBus> {
    bus: &'a mut B,
}

impl<'a, B: WireBus> BusGuard<'a, B> {
    fn acquire(bus: &'a mut B) -> Result<Self, BusError> {
        bus.lock()?;
        Ok(Self { bus })
    }

    fn enumerate(&mut self, visit: &mut dyn FnMut(DeviceId)) -> Result<(), BusError> {
        self.bus.enumerate(visit)
    }
}

impl<B: WireBus> Drop for BusGuard<'_, B> {
    fn drop(&mut self) {
        self.bus.unlock();
    }
}

/// Re-enumerate the bus and rebind the slot table.
///
/// On [`BusError::LockFailed`] the table is left fully cleared and nothing
/// was searched. On [`BusError::SearchFailed`] the bindings made before the
/// traversal died remain in place. Both are retried by the next periodic
/// cycle.
pub fn rescan<B, C, const N: usize>(
    bus: &mut B,
    slots: &mut SlotTable<N>,
    channels: &mut [C; N],
) -> Result<ScanReport, BusError>
where
    B: WireBus,
    C: ProbeChannel,
{
    debug!("rescanning the probe bus");

    // First, detach every slot and channel filter.
    slots.clear_all();
    for (i, ch) in channels.iter_mut().enumerate() {
        if ch.program_filter(DeviceId::BLANK).is_err() {
            warn!("channel {i}: blank filter rejected");
        }
    }

    let mut report = ScanReport::default();
    let mut guard = match BusGuard::acquire(bus) {
        Ok(g) => g,
        Err(e) => {
            error!("failed to lock the probe bus");
            return Err(e);
        }
    };

    let searched = guard.enumerate(&mut |id| {
        if id.family_code() != FAMILY_DS18B20 {
            warn!(
                "device {:016x} has unknown family {:02x}, skipping",
                id.raw(),
                id.family_code()
            );
            report.foreign += 1;
            return;
        }

        let Some(slot) = slots.first_empty() else {
            warn!("found more than {N} probes, skipping {:016x}", id.raw());
            report.overflow += 1;
            return;
        };

        info!("probe {:016x} bound to slot {slot}", id.raw());
        slots.bind(slot, id);
        if channels[slot].program_filter(id).is_err() {
            // The binding stands; the slot's fetches will fail until the
            // next rescan reprograms it.
            error!("channel {slot}: failed to program filter {:016x}", id.raw());
        }
        report.bound += 1;
    });
    drop(guard);

    if let Err(e) = searched {
        error!("probe search failed mid-scan, {} bindings kept", report.bound);
        return Err(e);
    }
    Ok(report)
}
