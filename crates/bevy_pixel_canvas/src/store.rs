//! ChunkStore - local cache of chunk contents.
//!
//! Owns every chunk known to the session, keyed by chunk position, and the
//! batch of local edits waiting to be flushed:
//! - reads never allocate; absent chunks read as background
//! - local writes are gated by [`WorldBounds`] and create chunks lazily
//! - remote writes overwrite unconditionally (the server always wins)
//!
//! Render caches are rebuilt before every mutating call returns, so a
//! present chunk always has a cache matching its data.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::bounds::WorldBounds;
use crate::color::PixelColor;
use crate::coords::{ChunkPos, WorldPos};
use crate::pending::PendingEdits;
use crate::primitives::Chunk;

/// In-memory chunk map plus the pending edit batch.
#[derive(Debug, Default)]
pub struct ChunkStore {
  chunks: HashMap<ChunkPos, Chunk>,
  bounds: WorldBounds,
  pending: PendingEdits,
}

impl ChunkStore {
  /// Creates an empty store for the given drawable region.
  pub fn new(bounds: WorldBounds) -> Self {
    Self {
      chunks: HashMap::new(),
      bounds,
      pending: PendingEdits::new(),
    }
  }

  pub fn bounds(&self) -> WorldBounds {
    self.bounds
  }

  /// Returns true if the chunk belongs to the drawable world.
  pub fn is_in_bounds(&self, pos: ChunkPos) -> bool {
    self.bounds.is_in_bounds(pos)
  }

  /// Returns the color at a world position.
  ///
  /// Pixels of chunks that were never created read as background.
  pub fn get_pixel(&self, pos: WorldPos) -> PixelColor {
    let (chunk_pos, index) = pos.to_chunk_and_index();
    self
      .chunks
      .get(&chunk_pos)
      .map_or(PixelColor::Background, |chunk| chunk.get(index))
  }

  /// Writes a local edit.
  ///
  /// Returns false without touching anything if the owning chunk is out of
  /// bounds. Otherwise creates the chunk if needed, writes the color,
  /// refreshes the render cache and records the chunk's full data in the
  /// pending batch.
  pub fn set_pixel(&mut self, pos: WorldPos, color: PixelColor) -> bool {
    let (chunk_pos, index) = pos.to_chunk_and_index();
    if !self.bounds.is_in_bounds(chunk_pos) {
      return false;
    }

    let chunk = self.chunks.entry(chunk_pos).or_default();
    chunk.set(index, color);
    chunk.materialize();
    self.pending.record(chunk_pos, chunk.snapshot());
    true
  }

  /// Overwrites a chunk with data received from the server.
  ///
  /// Out-of-bounds chunks are ignored and reported with `false`.
  pub fn apply_remote_chunk(&mut self, pos: ChunkPos, colors: Vec<PixelColor>) -> bool {
    if !self.bounds.is_in_bounds(pos) {
      log::debug!("Ignoring remote chunk {:?} outside the drawable world", pos);
      return false;
    }

    let chunk = self.chunks.entry(pos).or_default();
    chunk.replace(colors);
    chunk.materialize();
    true
  }

  /// Replaces the whole local chunk set with a server snapshot.
  ///
  /// Chunks absent from the snapshot are dropped. Returns how many chunks
  /// were stored.
  pub fn apply_snapshot(&mut self, chunks: Vec<(ChunkPos, Vec<PixelColor>)>) -> usize {
    let bounds = self.bounds;
    let mut fresh: HashMap<ChunkPos, Chunk> = chunks
      .into_iter()
      .filter(|(pos, _)| {
        let keep = bounds.is_in_bounds(*pos);
        if !keep {
          log::debug!("Ignoring snapshot chunk {:?} outside the drawable world", pos);
        }
        keep
      })
      .map(|(pos, colors)| (pos, Chunk::from_colors(colors)))
      .collect();

    fresh.par_iter_mut().for_each(|(_, chunk)| chunk.materialize());

    self.chunks = fresh;
    self.chunks.len()
  }

  /// Returns the chunk at a position, if it exists locally.
  pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
    self.chunks.get(&pos)
  }

  pub fn contains(&self, pos: ChunkPos) -> bool {
    self.chunks.contains_key(&pos)
  }

  /// Number of chunks stored locally.
  pub fn len(&self) -> usize {
    self.chunks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.chunks.is_empty()
  }

  /// Iterates stored chunk positions.
  pub fn positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
    self.chunks.keys().copied()
  }

  /// Returns the pending edit batch.
  pub fn pending(&self) -> &PendingEdits {
    &self.pending
  }

  /// Removes and returns every pending edit.
  pub fn take_pending(&mut self) -> Vec<(ChunkPos, Box<[PixelColor]>)> {
    self.pending.take()
  }

  /// Drops every pending edit. Returns how many chunks were dropped.
  pub fn discard_pending(&mut self) -> usize {
    self.pending.discard()
  }
}
