//! topic2csv core: flatten nested records into CSV rows.
//!
//! The pipeline has two halves:
//! - [`flatten`] — pure transformation from one decoded message (a nested
//!   JSON-shaped record) to one ordered flat row of named cells.
//! - [`recorder`] — stateful CSV sink that commits its column schema from
//!   the first row it sees and persists every later row in that order.
//!
//! Around them sit the delivery seam ([`source`]) and the synchronous
//! per-message loop ([`session`]) that the `topic2csv` binary drives.

pub mod cli;
pub mod exit_codes;
pub mod flatten;
pub mod recorder;
pub mod session;
pub mod source;

pub use exit_codes::ExitCode;
pub use flatten::{flatten, FlatRow, RECEIVE_TIME_COLUMN};
pub use recorder::{CsvRecorder, RecordOutcome};
pub use session::{run_session, SessionStats};
pub use source::{
    channel, ChannelPublisher, ChannelSource, Delivery, JsonLinesSource, MessageSource,
    PublishOutcome, QosProfile, Recv, Reliability,
};
