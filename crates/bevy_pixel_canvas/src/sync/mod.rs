//! Synchronization with the remote authority.
//!
//! - [`protocol`]: wire messages
//! - [`transport`]: connection abstraction and the in-memory transport
//! - [`client`]: protocol state machine and outbound batching
//! - `tcp`: native newline-delimited JSON transport

pub mod client;
pub mod protocol;
#[cfg(not(target_family = "wasm"))]
mod tcp;
pub mod transport;

pub use client::{FlushOutcome, SyncClient, SyncReport, SyncState, SyncTiming};
pub use protocol::{ChunkPayload, ClientMessage, ProtocolError, ServerMessage};
#[cfg(not(target_family = "wasm"))]
pub use tcp::TcpTransport;
pub use transport::{ChannelTransport, RemoteEnd, Transport, TransportError, TransportEvent};
