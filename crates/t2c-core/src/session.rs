//! The synchronous per-message recording loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{error, info};

use t2c_common::Result;

use crate::flatten::flatten;
use crate::recorder::{CsvRecorder, RecordOutcome};
use crate::source::{MessageSource, Recv};

/// Longest stretch the loop waits for a delivery before re-checking the
/// shutdown flag, so an interrupt on an idle stream still completes the
/// orderly shutdown path.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Counters for one completed recording session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SessionStats {
    /// Rows accepted and written.
    pub written: u64,
    /// Rows rejected for not matching the committed schema.
    pub rejected: u64,
}

/// Drive deliveries from `source` into `recorder` until the stream ends or
/// `shutdown` is set.
///
/// Strictly single-threaded and in arrival order: one delivery is pulled,
/// flattened, and durably recorded before the next is looked at. Waits are
/// bounded by [`SHUTDOWN_POLL`] so the flag is honored even while the
/// stream is idle. The recorder is always closed on the way out, including
/// on I/O failure, so the destination is left flushed and readable.
pub fn run_session(
    source: &mut dyn MessageSource,
    recorder: &mut CsvRecorder,
    shutdown: &AtomicBool,
) -> Result<SessionStats> {
    let mut stats = SessionStats::default();
    let result = loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("shutdown requested, ending session");
            break Ok(());
        }
        let delivery = match source.next_delivery(SHUTDOWN_POLL) {
            Recv::Delivery(delivery) => delivery,
            Recv::Idle => continue,
            Recv::Closed => {
                info!("source exhausted, ending session");
                break Ok(());
            }
        };
        let row = flatten(delivery.receive_time_ns, &delivery.payload);
        match recorder.record(&row) {
            Ok(RecordOutcome::Written) => stats.written += 1,
            Ok(RecordOutcome::SchemaMismatch) => stats.rejected += 1,
            Err(e) => {
                // Further writes are unsafe after an I/O failure.
                error!(error = %e, "write failed, aborting session");
                break Err(e);
            }
        }
    };

    let close_result = recorder.close();
    result?;
    close_result?;

    info!(written = stats.written, rejected = stats.rejected, "session finished");
    Ok(stats)
}
