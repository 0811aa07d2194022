//! Pixel Canvas - collaborative chunked pixel canvas client for Bevy.
//!
//! The world is an unbounded integer pixel plane split into fixed-size
//! chunks. Only a rectangular region is drawable. Local edits are applied
//! optimistically, batched per chunk and flushed to a remote authority that
//! broadcasts every change back to all clients.
//!
//! The engine ([`CanvasSession`]) is plain Rust and can be driven directly;
//! [`PixelCanvasPlugin`] wires it into a Bevy app.

pub mod bounds;
pub mod brush;
pub mod camera;
pub mod color;
pub mod config;
pub mod coords;
pub mod input;
pub mod pending;
pub mod plugin;
pub mod primitives;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod sync;
pub mod viewport;

pub use bounds::WorldBounds;
pub use brush::Brush;
pub use camera::{CanvasCamera, ZoomLimits};
pub use color::PixelColor;
pub use config::{CanvasConfig, ConfigError};
pub use coords::{
  CHUNK_AREA, CHUNK_SIZE, ChunkPos, ChunkRect, WorldPos, chunk_local_index, screen_to_world,
  world_to_chunk, world_to_screen,
};
pub use input::{
  CanvasKey, EditOutcome, InputController, InputEffects, InputSettings, InputTarget,
  PointerButton, WheelDelta, WheelNotches,
};
pub use pending::PendingEdits;
pub use plugin::{PixelCanvasPlugin, PixelCanvasSet};
pub use primitives::{Chunk, RgbaSurface, Surface};
pub use render::{FrameBuffer, PaintSurface, Rgba, TextSink, rgb};
pub use scheduler::{DeferredTask, FrameRequest, Interval};
pub use session::CanvasSession;
pub use store::ChunkStore;
#[cfg(not(target_family = "wasm"))]
pub use sync::TcpTransport;
pub use sync::{
  ChannelTransport, FlushOutcome, RemoteEnd, SyncClient, SyncReport, SyncState, SyncTiming,
  Transport, TransportEvent,
};
pub use viewport::{DrawPermission, FrameStats, StatusReadout, ViewportRenderer};
