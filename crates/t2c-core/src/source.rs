//! Message delivery seam.
//!
//! The recording loop only needs one thing from a transport: decoded
//! messages, one at a time, in arrival order, each stamped with a receipt
//! time. [`MessageSource`] is that seam. Two implementations ship here:
//!
//! - [`ChannelSource`] / [`ChannelPublisher`] — a bounded in-process queue
//!   whose send side honors the configured [`QosProfile`]: reliable
//!   publishers block when the queue is full, best-effort publishers drop.
//! - [`JsonLinesSource`] — reads one JSON object per line from any
//!   `BufRead` (the binary wires stdin), skipping payloads that fail to
//!   decode.

use std::io::BufRead;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde_json::{Map, Value};
use tracing::warn;

/// Transport-level delivery guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    /// Never drop: publishing blocks until the queue has room.
    #[default]
    Reliable,
    /// Drop the message when the queue is full.
    BestEffort,
}

/// Queueing policy for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QosProfile {
    /// Bound on undelivered in-flight messages. Clamped to at least 1.
    pub depth: usize,
    pub reliability: Reliability,
}

impl QosProfile {
    pub fn new(depth: usize, reliability: Reliability) -> Self {
        Self {
            depth: depth.max(1),
            reliability,
        }
    }
}

impl Default for QosProfile {
    fn default() -> Self {
        Self::new(100, Reliability::Reliable)
    }
}

/// One decoded message plus its receipt timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Wall-clock receipt time, nanoseconds since the Unix epoch.
    pub receive_time_ns: i64,
    /// The decoded message as a nested record.
    pub payload: Map<String, Value>,
}

impl Delivery {
    /// Wrap a payload, stamping the receipt time now.
    pub fn now(payload: Map<String, Value>) -> Self {
        Self {
            receive_time_ns: now_ns(),
            payload,
        }
    }
}

/// Result of waiting for the next delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Recv {
    /// A message arrived.
    Delivery(Delivery),
    /// Nothing arrived within the wait; the stream may still produce more.
    Idle,
    /// The stream ended; no further messages will arrive.
    Closed,
}

/// A stream of decoded messages in arrival order.
///
/// `next_delivery` waits up to `wait` for a message, returning
/// [`Recv::Idle`] on expiry so callers can re-check a shutdown flag
/// between waits. The bound is advisory: a source backed by a blocking
/// reader may overrun it while parked on a quiet input. Implementations
/// must never reorder messages.
pub trait MessageSource {
    fn next_delivery(&mut self, wait: Duration) -> Recv;
}

/// Create a bounded in-process delivery queue honoring `qos`.
pub fn channel(qos: QosProfile) -> (ChannelPublisher, ChannelSource) {
    let (tx, rx) = bounded(qos.depth);
    (
        ChannelPublisher {
            tx,
            reliability: qos.reliability,
            dropped: 0,
        },
        ChannelSource { rx },
    )
}

/// What became of one published message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Enqueued for delivery.
    Delivered,
    /// Queue full under best-effort delivery; message discarded.
    Dropped,
    /// The consumer went away; no further publishes can succeed.
    Disconnected,
}

/// Send side of the in-process delivery queue.
pub struct ChannelPublisher {
    tx: Sender<Delivery>,
    reliability: Reliability,
    dropped: u64,
}

impl ChannelPublisher {
    /// Publish an already-stamped delivery.
    ///
    /// Reliable publishers block while the queue is full; best-effort
    /// publishers drop instead.
    pub fn publish(&mut self, delivery: Delivery) -> PublishOutcome {
        match self.reliability {
            Reliability::Reliable => match self.tx.send(delivery) {
                Ok(()) => PublishOutcome::Delivered,
                Err(_) => PublishOutcome::Disconnected,
            },
            Reliability::BestEffort => match self.tx.try_send(delivery) {
                Ok(()) => PublishOutcome::Delivered,
                Err(TrySendError::Full(_)) => {
                    self.dropped += 1;
                    PublishOutcome::Dropped
                }
                Err(TrySendError::Disconnected(_)) => PublishOutcome::Disconnected,
            },
        }
    }

    /// Stamp a payload with the current time and publish it.
    pub fn publish_now(&mut self, payload: Map<String, Value>) -> PublishOutcome {
        self.publish(Delivery::now(payload))
    }

    /// Messages dropped under best-effort delivery.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Receive side of the in-process delivery queue.
pub struct ChannelSource {
    rx: Receiver<Delivery>,
}

impl MessageSource for ChannelSource {
    fn next_delivery(&mut self, wait: Duration) -> Recv {
        match self.rx.recv_timeout(wait) {
            Ok(delivery) => Recv::Delivery(delivery),
            Err(RecvTimeoutError::Timeout) => Recv::Idle,
            Err(RecvTimeoutError::Disconnected) => Recv::Closed,
        }
    }
}

/// Reads one JSON object per line, stamping receipt time at decode.
///
/// Malformed lines and non-object payloads are skipped with a warning;
/// blank lines are ignored. An I/O error on the underlying reader ends the
/// stream. The wait bound is not honored here: `read_line` blocks until a
/// line or EOF arrives, so run this source on its own thread when the
/// input can go quiet.
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    skipped: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            skipped: 0,
        }
    }

    /// Lines skipped because they failed to decode to an object.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<R: BufRead> MessageSource for JsonLinesSource<R> {
    fn next_delivery(&mut self, _wait: Duration) -> Recv {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return Recv::Closed,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "read failed, ending stream");
                    return Recv::Closed;
                }
            }
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(payload)) => return Recv::Delivery(Delivery::now(payload)),
                Ok(other) => {
                    self.skipped += 1;
                    warn!(kind = json_kind(&other), "payload is not a record, skipping");
                }
                Err(e) => {
                    self.skipped += 1;
                    warn!(error = %e, "malformed payload, skipping");
                }
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn now_ns() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}
