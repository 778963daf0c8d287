//! Outbound application events.
//!
//! The acquisition service emits these through the
//! [`EventSink`](super::ports::EventSink) port; adapters on the other side
//! decide what to do with them.

use crate::error::BusError;

/// Structured events emitted by the acquisition service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// A bus rescan finished. `overflow` counts matching devices discarded
    /// because every slot was already bound.
    ScanCompleted {
        bound: u8,
        foreign: u8,
        overflow: u8,
    },

    /// A bus rescan failed; the next periodic cycle retries.
    ScanFailed(BusError),

    /// A poll cycle finished. `failed` slots skipped this cycle; `dropped`
    /// readings were lost to a full queue.
    PollCompleted { polled: u8, failed: u8, dropped: u8 },
}
