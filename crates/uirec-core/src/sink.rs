//! Terminal sinks - the end of the handler chain
//!
//! Sinks absorb their own failures: a broken writer or a full channel is
//! logged and the event dropped, never reported back into the pipeline.

use crate::event::{Event, EventKind};
use crate::handler::EventHandler;
pub use crossbeam_channel::{Receiver, Sender};
use crossbeam_channel::TrySendError;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Logs every finalized event as a structured tracing record
#[derive(Debug, Default)]
pub struct LogSink {
    count: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl EventHandler for LogSink {
    fn handle_event(&mut self, event: Event) {
        self.count += 1;
        tracing::info!(
            seq = self.count,
            kind = %event.kind(),
            address = %event.target,
            payload = ?event.payload,
            "recorded event"
        );
    }

    fn flush(&mut self) {
        tracing::debug!(total = self.count, "log sink flushed");
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, event: &Event) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        writeln!(self.writer)
    }
}

impl<W: Write> EventHandler for JsonLinesSink<W> {
    fn handle_event(&mut self, event: Event) {
        match self.write_line(&event) {
            Ok(()) => self.written += 1,
            Err(e) => tracing::warn!(kind = %event.kind(), error = %e, "failed to write event"),
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(error = %e, "failed to flush event writer");
        }
    }
}

/// Streams events into a bounded channel for consumption on another thread
pub struct ChannelSink {
    tx: Sender<Event>,
    dropped: usize,
}

impl ChannelSink {
    pub fn new(tx: Sender<Event>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Sink plus the receiving end of a fresh channel
    pub fn bounded(capacity: usize) -> (Self, Receiver<Event>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self::new(tx), rx)
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl EventHandler for ChannelSink {
    fn handle_event(&mut self, event: Event) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(e)) => {
                self.dropped += 1;
                tracing::warn!(kind = %e.kind(), dropped = self.dropped, "event channel full, dropping event");
            }
            Err(TrySendError::Disconnected(e)) => {
                self.dropped += 1;
                tracing::warn!(kind = %e.kind(), "event channel disconnected, dropping event");
            }
        }
    }

    fn flush(&mut self) {}
}

/// Shared in-memory collector. Clones see the same events.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Drain everything collected so far
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(Event::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventHandler for CollectingSink {
    fn handle_event(&mut self, event: Event) {
        self.events.lock().push(event);
    }

    fn flush(&mut self) {}
}
