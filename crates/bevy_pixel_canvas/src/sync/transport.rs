//! Transport abstraction.
//!
//! The sync client only needs an ordered stream of [`TransportEvent`]s and a
//! way to send text frames. Connection management (reconnect, backoff)
//! belongs to the transport's owner.

use async_channel::{Receiver, Sender, TryRecvError};

/// Something that happened on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
  /// The connection is open and ready to send.
  Opened,
  /// One inbound text frame.
  Message(String),
  /// The connection closed; no further frames will arrive until reopened.
  Closed,
}

/// Error reported by a transport.
#[derive(Debug)]
pub enum TransportError {
  Io(std::io::Error),
  /// The connection is not open.
  Closed,
}

impl From<std::io::Error> for TransportError {
  fn from(err: std::io::Error) -> Self {
    Self::Io(err)
  }
}

impl std::fmt::Display for TransportError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io(e) => write!(f, "I/O error: {}", e),
      Self::Closed => write!(f, "connection closed"),
    }
  }
}

impl std::error::Error for TransportError {}

/// A message-oriented, bidirectional connection.
pub trait Transport: Send + Sync {
  /// Returns true if frames can currently be sent.
  fn is_open(&self) -> bool;

  /// Sends one text frame.
  fn send(&mut self, frame: String) -> Result<(), TransportError>;

  /// Returns the next event in arrival order, if any.
  fn poll_event(&mut self) -> Option<TransportEvent>;
}

/// In-memory transport backed by `async-channel`.
///
/// The other side is a [`RemoteEnd`], owned by whoever drives the real
/// connection (a host bridge, an in-process server, a test).
pub struct ChannelTransport {
  outbound: Sender<String>,
  inbound: Receiver<TransportEvent>,
  open: bool,
}

/// Remote side of a [`ChannelTransport`].
#[derive(Clone)]
pub struct RemoteEnd {
  events: Sender<TransportEvent>,
  frames: Receiver<String>,
}

impl ChannelTransport {
  /// Creates a connected transport/remote pair. The transport starts closed
  /// until the remote pushes [`TransportEvent::Opened`].
  pub fn pair() -> (ChannelTransport, RemoteEnd) {
    let (out_tx, out_rx) = async_channel::unbounded::<String>();
    let (in_tx, in_rx) = async_channel::unbounded::<TransportEvent>();
    (
      ChannelTransport {
        outbound: out_tx,
        inbound: in_rx,
        open: false,
      },
      RemoteEnd {
        events: in_tx,
        frames: out_rx,
      },
    )
  }
}

impl Transport for ChannelTransport {
  fn is_open(&self) -> bool {
    self.open && !self.outbound.is_closed()
  }

  fn send(&mut self, frame: String) -> Result<(), TransportError> {
    if !self.is_open() {
      return Err(TransportError::Closed);
    }
    self
      .outbound
      .try_send(frame)
      .map_err(|_| TransportError::Closed)
  }

  fn poll_event(&mut self) -> Option<TransportEvent> {
    let event = match self.inbound.try_recv() {
      Ok(event) => event,
      Err(TryRecvError::Empty) => return None,
      Err(TryRecvError::Closed) => {
        if !self.open {
          return None;
        }
        TransportEvent::Closed
      }
    };
    match event {
      TransportEvent::Opened => self.open = true,
      TransportEvent::Closed => self.open = false,
      TransportEvent::Message(_) => {}
    }
    Some(event)
  }
}

impl RemoteEnd {
  /// Signals that the connection opened.
  pub fn open(&self) {
    let _ = self.events.try_send(TransportEvent::Opened);
  }

  /// Signals that the connection closed.
  pub fn close(&self) {
    let _ = self.events.try_send(TransportEvent::Closed);
  }

  /// Delivers one inbound frame to the client.
  pub fn deliver(&self, frame: impl Into<String>) {
    let _ = self.events.try_send(TransportEvent::Message(frame.into()));
  }

  /// Returns the next frame sent by the client, if any.
  pub fn try_recv(&self) -> Option<String> {
    self.frames.try_recv().ok()
  }

  /// Blocks until the client sends a frame. Returns `None` once the client
  /// side has been dropped.
  pub fn recv_blocking(&self) -> Option<String> {
    self.frames.recv_blocking().ok()
  }

  /// Stops accepting outbound frames. Pending and future
  /// [`RemoteEnd::recv_blocking`] calls return `None` once drained, and the
  /// transport reports itself closed.
  pub fn shutdown(&self) {
    self.frames.close();
  }

  /// Drains every frame sent by the client so far.
  pub fn drain(&self) -> Vec<String> {
    std::iter::from_fn(|| self.try_recv()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn send_fails_until_opened() {
    let (mut transport, remote) = ChannelTransport::pair();
    assert!(transport.send("early".into()).is_err());

    remote.open();
    assert_eq!(transport.poll_event(), Some(TransportEvent::Opened));
    transport.send("hello".into()).unwrap();
    assert_eq!(remote.drain(), vec!["hello".to_string()]);
  }

  #[test]
  fn dropping_remote_reports_close_once() {
    let (mut transport, remote) = ChannelTransport::pair();
    remote.open();
    drop(remote);
    assert_eq!(transport.poll_event(), Some(TransportEvent::Opened));
    assert_eq!(transport.poll_event(), Some(TransportEvent::Closed));
    assert_eq!(transport.poll_event(), None);
    assert!(!transport.is_open());
  }
}
