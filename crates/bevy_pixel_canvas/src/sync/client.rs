//! Sync client - protocol state machine and outbound batching.
//!
//! Connection lifecycle:
//! `Disconnected` → (open) `Connected` → (request sent) `Synchronizing` →
//! (snapshot received) `Live` → (close) `Disconnected`.
//!
//! Local edits accumulate in the store's pending batch. The first edit after
//! each flush arms the flush task; when it fires, every pending chunk is
//! sent as one `edit_chunk` message, or dropped if the transport is closed.
//! Closing the connection discards the batch outright.

use std::time::Duration;

// WASM compat: std::time::Instant panics on wasm32
use web_time::{Instant, SystemTime, UNIX_EPOCH};

use super::protocol::{ChunkPayload, ClientMessage, ServerMessage};
use super::transport::{Transport, TransportEvent};
use crate::scheduler::{DeferredTask, Interval};
use crate::store::ChunkStore;

/// Connection state as seen by the sync layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
  #[default]
  Disconnected,
  /// Transport open, full-state request not yet sent.
  Connected,
  /// Full-state request sent, waiting for the snapshot.
  Synchronizing,
  /// Snapshot applied; receiving live updates.
  Live,
}

impl SyncState {
  pub fn label(self) -> &'static str {
    match self {
      Self::Disconnected => "Disconnected",
      Self::Connected => "Connected",
      Self::Synchronizing => "Synchronizing",
      Self::Live => "Live",
    }
  }
}

/// Timing parameters for the sync layer.
#[derive(Clone, Copy, Debug)]
pub struct SyncTiming {
  /// Coalescing window between the first edit and the flush.
  pub flush_interval: Duration,
  /// Period of the liveness probe.
  pub ping_interval: Duration,
}

impl Default for SyncTiming {
  fn default() -> Self {
    Self {
      flush_interval: Duration::from_millis(200),
      ping_interval: Duration::from_secs(15),
    }
  }
}

/// What a flush did with the pending batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
  /// Nothing was pending.
  Empty,
  /// One message per chunk was sent.
  Sent(usize),
  /// The transport was closed; the chunks were dropped.
  Dropped(usize),
}

/// Effects of processing transport events and timers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
  /// Chunk data changed; a repaint is needed.
  pub redraw: bool,
  /// Last `canvas_size` received in this batch of events.
  pub canvas_size: Option<(u32, u32)>,
  /// Result of the flush, if the flush task fired.
  pub flush: Option<FlushOutcome>,
  /// The connection closed during this pump.
  pub disconnected: bool,
}

/// Protocol client owning the transport.
pub struct SyncClient {
  transport: Box<dyn Transport>,
  state: SyncState,
  timing: SyncTiming,
  flush: DeferredTask,
  ping: Interval,
  latency: Option<Duration>,
}

impl SyncClient {
  pub fn new(transport: Box<dyn Transport>, timing: SyncTiming) -> Self {
    Self {
      transport,
      state: SyncState::Disconnected,
      timing,
      flush: DeferredTask::new(),
      ping: Interval::new(timing.ping_interval),
      latency: None,
    }
  }

  pub fn state(&self) -> SyncState {
    self.state
  }

  /// Round-trip time observed from the last pong.
  pub fn latency(&self) -> Option<Duration> {
    self.latency
  }

  /// Returns true if the flush task is armed.
  pub fn flush_pending(&self) -> bool {
    self.flush.is_armed()
  }

  /// Notes that a local edit entered the pending batch.
  ///
  /// Arms the flush task unless it is already armed.
  pub fn note_local_edit(&mut self, now: Instant) {
    if self.flush.arm(now, self.timing.flush_interval) {
      log::debug!("Flush armed for {:?}", self.timing.flush_interval);
    }
  }

  /// Processes every queued transport event in arrival order, then the
  /// flush and ping timers.
  pub fn pump(&mut self, store: &mut ChunkStore, now: Instant) -> SyncReport {
    let mut report = SyncReport::default();

    while let Some(event) = self.transport.poll_event() {
      self.handle_event(event, store, now, &mut report);
    }

    if self.flush.poll(now) {
      report.flush = Some(self.flush_now(store));
    }

    if self.ping.poll(now) {
      self.send(ClientMessage::Ping {
        time: wall_clock_ms(),
      });
    }

    report
  }

  /// Sends or drops the pending batch immediately.
  pub fn flush_now(&mut self, store: &mut ChunkStore) -> FlushOutcome {
    self.flush.cancel();
    if store.pending().is_empty() {
      return FlushOutcome::Empty;
    }

    if !self.transport.is_open() {
      let dropped = store.discard_pending();
      log::debug!("Transport closed, dropped {} pending chunks", dropped);
      return FlushOutcome::Dropped(dropped);
    }

    let batch = store.take_pending();
    let count = batch.len();
    for (pos, data) in batch {
      self.send(ClientMessage::EditChunk(ChunkPayload::new(pos, data.into_vec())));
    }
    log::debug!("Flushed {} chunks", count);
    FlushOutcome::Sent(count)
  }

  fn handle_event(
    &mut self,
    event: TransportEvent,
    store: &mut ChunkStore,
    now: Instant,
    report: &mut SyncReport,
  ) {
    match event {
      TransportEvent::Opened => {
        log::info!("Connection open, requesting canvas state");
        self.state = SyncState::Connected;
        self.ping.start(now);
        if self.send(ClientMessage::RequestAllChunks) {
          self.state = SyncState::Synchronizing;
        }
      }
      TransportEvent::Closed => {
        if self.state != SyncState::Disconnected {
          log::info!("Connection closed");
        }
        self.state = SyncState::Disconnected;
        self.ping.stop();
        self.flush.cancel();
        let dropped = store.discard_pending();
        if dropped > 0 {
          log::debug!("Discarded {} unsent chunks on disconnect", dropped);
        }
        report.disconnected = true;
      }
      TransportEvent::Message(text) => match ServerMessage::decode(&text) {
        Ok(message) => self.handle_message(message, store, report),
        Err(e) => log::debug!("Ignoring inbound frame: {}", e),
      },
    }
  }

  fn handle_message(
    &mut self,
    message: ServerMessage,
    store: &mut ChunkStore,
    report: &mut SyncReport,
  ) {
    match message {
      ServerMessage::CanvasSize { width, height } => {
        report.canvas_size = Some((width, height));
        report.redraw = true;
      }
      ServerMessage::AllChunks { chunks } => {
        let stored = store.apply_snapshot(
          chunks
            .into_iter()
            .map(|payload| (payload.pos(), payload.chunk_data))
            .collect(),
        );
        log::info!("Snapshot applied: {} chunks", stored);
        self.state = SyncState::Live;
        report.redraw = true;
      }
      ServerMessage::EditChunk(payload) => {
        if store.apply_remote_chunk(payload.pos(), payload.chunk_data) {
          report.redraw = true;
        }
      }
      ServerMessage::Pong { time } => {
        let rtt = Duration::from_millis(wall_clock_ms().saturating_sub(time));
        log::debug!("Ping latency: {} ms", rtt.as_millis());
        self.latency = Some(rtt);
      }
    }
  }

  /// Encodes and sends one message. Returns false if it could not be sent.
  fn send(&mut self, message: ClientMessage) -> bool {
    let frame = match message.encode() {
      Ok(frame) => frame,
      Err(e) => {
        log::warn!("Failed to encode {:?}: {}", message, e);
        return false;
      }
    };
    match self.transport.send(frame) {
      Ok(()) => true,
      Err(e) => {
        log::debug!("Send failed: {}", e);
        false
      }
    }
  }
}

/// Milliseconds since the Unix epoch, used for ping timestamps.
fn wall_clock_ms() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as u64)
    .unwrap_or(0)
}
