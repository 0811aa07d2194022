//! Wire protocol: JSON messages tagged by `type`.
//!
//! One message per transport frame (one line on stream transports).

use serde::{Deserialize, Serialize};

use crate::color::PixelColor;
use crate::coords::ChunkPos;

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
  /// Full-state request, sent once per connection.
  RequestAllChunks,
  /// Full data of one locally edited chunk.
  EditChunk(ChunkPayload),
  /// Liveness probe carrying a millisecond timestamp.
  Ping { time: u64 },
}

/// Messages sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
  /// Paint surface size chosen by the server.
  CanvasSize { width: u32, height: u32 },
  /// Full snapshot of every chunk the server knows.
  AllChunks { chunks: Vec<ChunkPayload> },
  /// One chunk changed remotely.
  EditChunk(ChunkPayload),
  /// Echo of a [`ClientMessage::Ping`].
  Pong { time: u64 },
}

/// Chunk coordinates plus full row-major color data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
  pub cx: i32,
  pub cy: i32,
  #[serde(rename = "chunkData")]
  pub chunk_data: Vec<PixelColor>,
}

impl ChunkPayload {
  pub fn new(pos: ChunkPos, chunk_data: Vec<PixelColor>) -> Self {
    Self {
      cx: pos.x,
      cy: pos.y,
      chunk_data,
    }
  }

  pub fn pos(&self) -> ChunkPos {
    ChunkPos::new(self.cx, self.cy)
  }
}

/// Error encoding or decoding a wire message.
#[derive(Debug)]
pub enum ProtocolError {
  Json(serde_json::Error),
}

impl From<serde_json::Error> for ProtocolError {
  fn from(err: serde_json::Error) -> Self {
    Self::Json(err)
  }
}

impl std::fmt::Display for ProtocolError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Json(e) => write!(f, "malformed message: {}", e),
    }
  }
}

impl std::error::Error for ProtocolError {}

impl ClientMessage {
  /// Encodes the message as a single JSON line (without the newline).
  pub fn encode(&self) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(self)?)
  }
}

impl ServerMessage {
  /// Decodes one inbound frame.
  pub fn decode(text: &str) -> Result<Self, ProtocolError> {
    Ok(serde_json::from_str(text.trim())?)
  }

  /// Encodes the message; used by in-process servers and tests.
  pub fn encode(&self) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(self)?)
  }
}
