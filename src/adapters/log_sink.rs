//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production). A fieldbus diagnostic
//! channel would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ScanCompleted {
                bound,
                foreign,
                overflow,
            } => {
                info!("SCAN | bound={bound} foreign={foreign} overflow={overflow}");
                if *overflow > 0 {
                    warn!("SCAN | {overflow} probe(s) ignored, all slots in use");
                }
            }
            AppEvent::ScanFailed(e) => {
                warn!("SCAN | failed: {e}");
            }
            AppEvent::PollCompleted {
                polled,
                failed,
                dropped,
            } => {
                info!("POLL | polled={polled} failed={failed} dropped={dropped}");
            }
        }
    }
}
