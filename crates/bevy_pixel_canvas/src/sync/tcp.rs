//! Native transport: newline-delimited JSON over TCP.
//!
//! A connector thread opens the socket, then a reader thread forwards each
//! line as a [`TransportEvent::Message`] while the connector thread turns
//! into the writer. Both feed the same [`ChannelTransport`] the sync client
//! polls, so the main loop never blocks on the socket.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::thread::{self, JoinHandle};

use super::transport::{ChannelTransport, RemoteEnd, Transport, TransportError, TransportEvent};

/// TCP transport with a background I/O worker.
pub struct TcpTransport {
  inner: ChannelTransport,
  _worker_handle: JoinHandle<()>,
}

impl TcpTransport {
  /// Starts connecting to `addr` in the background.
  ///
  /// Connection failures are reported as [`TransportEvent::Closed`].
  pub fn connect(addr: impl ToSocketAddrs + Send + 'static) -> Self {
    let (inner, remote) = ChannelTransport::pair();
    let worker_handle = thread::spawn(move || worker_loop(addr, remote));
    Self {
      inner,
      _worker_handle: worker_handle,
    }
  }
}

impl Transport for TcpTransport {
  fn is_open(&self) -> bool {
    self.inner.is_open()
  }

  fn send(&mut self, frame: String) -> Result<(), TransportError> {
    self.inner.send(frame)
  }

  fn poll_event(&mut self) -> Option<TransportEvent> {
    self.inner.poll_event()
  }
}

fn worker_loop(addr: impl ToSocketAddrs, remote: RemoteEnd) {
  let stream = match TcpStream::connect(addr) {
    Ok(stream) => stream,
    Err(e) => {
      log::warn!("Connection failed: {}", e);
      remote.close();
      return;
    }
  };
  if let Err(e) = stream.set_nodelay(true) {
    log::debug!("Failed to disable Nagle: {}", e);
  }

  let reader = match stream.try_clone() {
    Ok(reader) => reader,
    Err(e) => {
      log::warn!("Failed to clone socket: {}", e);
      remote.close();
      return;
    }
  };

  log::info!("Connected to {:?}", stream.peer_addr().ok());
  remote.open();

  let reader_remote = remote.clone();
  let reader_handle = thread::spawn(move || read_loop(reader, reader_remote));

  if let Err(e) = write_loop(&stream, &remote) {
    log::warn!("Connection lost while sending: {}", e);
  }
  let _ = stream.shutdown(Shutdown::Both);
  let _ = reader_handle.join();
}

/// Forwards each inbound line until EOF or a socket error.
///
/// Lines that are not UTF-8 are skipped; the connection stays open. On exit
/// the socket and the outbound channel are shut down so the writer returns.
fn read_loop(stream: TcpStream, remote: RemoteEnd) {
  let mut reader = BufReader::new(&stream);
  let mut buf = Vec::new();
  loop {
    buf.clear();
    match reader.read_until(b'\n', &mut buf) {
      Ok(0) => {
        log::info!("Server closed the connection");
        break;
      }
      Ok(_) => {}
      Err(e) if e.kind() == ErrorKind::Interrupted => continue,
      Err(e) => {
        log::warn!("Connection lost while reading: {}", e);
        break;
      }
    }
    match String::from_utf8(std::mem::take(&mut buf)) {
      Ok(line) if line.trim().is_empty() => {}
      Ok(line) => remote.deliver(line.trim_end_matches(['\r', '\n'])),
      Err(e) => log::debug!("Ignoring non-UTF-8 frame: {}", e),
    }
  }
  let _ = stream.shutdown(Shutdown::Both);
  remote.shutdown();
  remote.close();
}

/// Writes outbound frames until the client side is dropped or the socket
/// fails.
fn write_loop(mut stream: &TcpStream, remote: &RemoteEnd) -> Result<(), TransportError> {
  while let Some(frame) = remote.recv_blocking() {
    stream.write_all(frame.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::net::TcpListener;
  use std::time::{Duration, Instant};

  use super::*;

  fn collect_until(
    transport: &mut TcpTransport,
    mut done: impl FnMut(&[TransportEvent]) -> bool,
  ) -> Vec<TransportEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while !done(&events) && Instant::now() < deadline {
      match transport.poll_event() {
        Some(event) => events.push(event),
        None => thread::sleep(Duration::from_millis(5)),
      }
    }
    events
  }

  #[test]
  fn non_utf8_line_is_skipped_and_connection_stays_open() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
      let (mut socket, _) = listener.accept().unwrap();
      socket.write_all(b"\xff\xfe garbage\n").unwrap();
      socket.write_all(b"{\"type\":\"pong\",\"time\":1}\n").unwrap();
      let mut line = String::new();
      BufReader::new(&socket).read_line(&mut line).unwrap();
      line
    });

    let mut transport = TcpTransport::connect(addr);
    let events = collect_until(&mut transport, |events| {
      events.iter().any(|e| matches!(e, TransportEvent::Message(_)))
    });

    assert_eq!(
      events,
      vec![
        TransportEvent::Opened,
        TransportEvent::Message(r#"{"type":"pong","time":1}"#.to_string()),
      ]
    );
    assert!(transport.is_open());

    transport.send("hello".to_string()).unwrap();
    assert_eq!(server.join().unwrap(), "hello\n");
  }

  #[test]
  fn server_eof_closes_transport_and_stops_worker() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
      let (socket, _) = listener.accept().unwrap();
      drop(socket);
    });

    let mut transport = TcpTransport::connect(addr);
    let events = collect_until(&mut transport, |events| {
      events.contains(&TransportEvent::Closed)
    });
    server.join().unwrap();

    assert_eq!(events.last(), Some(&TransportEvent::Closed));
    assert!(!transport.is_open());
    assert!(transport.send("late".to_string()).is_err());

    let deadline = Instant::now() + Duration::from_secs(5);
    while !transport._worker_handle.is_finished() && Instant::now() < deadline {
      thread::sleep(Duration::from_millis(5));
    }
    assert!(transport._worker_handle.is_finished());
  }
}
