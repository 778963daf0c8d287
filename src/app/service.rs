//! Acquisition service — drives the probe pipeline once per periodic tick.
//!
//! ```text
//!  WireBus ──────▶ ┌──────────────────────────┐
//!  ProbeChannel ─▶ │    AcquisitionService     │ ──▶ EventSink
//!                  │  rescan cadence · poll    │ ──▶ ReadingQueue (push)
//!                  └──────────────────────────┘
//! ```
//!
//! Owns the bus, the channel array, the slot table, and the producer side
//! of the queue. Rescans run on a much longer cadence than polls — the bus
//! search is slow and holds the bus exclusively — and are additionally
//! armed by a fetch failure, so an unplugged or swapped probe is picked up
//! on the very next cycle instead of waiting out the interval.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, ProbeChannel, WireBus};
use crate::config::SystemConfig;
use crate::probe::poll::{poll_once, PollReport};
use crate::probe::queue::ReadingQueue;
use crate::probe::scan;
use crate::probe::slots::SlotTable;

/// Orchestrates scan and poll against the injected ports.
pub struct AcquisitionService<'q, B, C, const N: usize, const K: usize> {
    bus: B,
    channels: [C; N],
    slots: SlotTable<N>,
    queue: &'q ReadingQueue<K>,
    rescan_interval_secs: u64,
    rescan_on_fetch_failure: bool,
    /// Uptime of the last *successful* scan; `None` until one completes.
    last_scan: Option<u64>,
    /// Set by a fetch failure (or externally); forces a scan next tick.
    rescan_armed: bool,
}

impl<'q, B, C, const N: usize, const K: usize> AcquisitionService<'q, B, C, N, K>
where
    B: WireBus,
    C: ProbeChannel,
{
    pub fn new(bus: B, channels: [C; N], queue: &'q ReadingQueue<K>, config: &SystemConfig) -> Self {
        Self {
            bus,
            channels,
            slots: SlotTable::new(),
            queue,
            rescan_interval_secs: u64::from(config.rescan_interval_secs),
            rescan_on_fetch_failure: config.rescan_on_fetch_failure,
            last_scan: None,
            rescan_armed: false,
        }
    }

    /// Run one acquisition cycle: rescan when due, then poll every bound
    /// slot. Never fails — scan and poll errors are events, handled by
    /// retrying next period.
    pub fn tick(&mut self, now: u64, sink: &mut impl EventSink) -> PollReport {
        if self.rescan_due(now) {
            match scan::rescan(&mut self.bus, &mut self.slots, &mut self.channels) {
                Ok(report) => {
                    self.last_scan = Some(now);
                    self.rescan_armed = false;
                    info!(
                        "scan complete: {} bound, {} foreign, {} over capacity",
                        report.bound, report.foreign, report.overflow
                    );
                    sink.emit(&AppEvent::ScanCompleted {
                        bound: report.bound,
                        foreign: report.foreign,
                        overflow: report.overflow,
                    });
                }
                Err(e) => {
                    // `last_scan` stays put, so the next tick tries again.
                    warn!("scan failed ({e}), retrying next cycle");
                    sink.emit(&AppEvent::ScanFailed(e));
                }
            }
        }

        let report = poll_once(&self.slots, &mut self.channels, now, self.queue);
        if report.any_failed() && self.rescan_on_fetch_failure {
            self.rescan_armed = true;
        }
        sink.emit(&AppEvent::PollCompleted {
            polled: report.polled,
            failed: report.failed,
            dropped: report.dropped,
        });
        report
    }

    /// Force a rescan on the next tick (e.g. from an operator command).
    pub fn request_rescan(&mut self) {
        self.rescan_armed = true;
    }

    /// Current slot bindings (acquisition side's view).
    pub fn slots(&self) -> &SlotTable<N> {
        &self.slots
    }

    fn rescan_due(&self, now: u64) -> bool {
        if self.rescan_armed {
            return true;
        }
        match self.last_scan {
            None => true,
            Some(at) => now.saturating_sub(at) >= self.rescan_interval_secs,
        }
    }
}
