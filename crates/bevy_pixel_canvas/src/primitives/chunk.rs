//! Chunk - the unit of storage, sync and rendering.
//!
//! A chunk holds `CHUNK_SIZE * CHUNK_SIZE` colors in row-major order plus a
//! render cache derived from them. The cache is rebuilt with
//! [`Chunk::materialize`] after the color data changes.

use super::surface::{RgbaSurface, Surface};
use crate::color::PixelColor;
use crate::coords::{CHUNK_AREA, CHUNK_SIZE};

/// Color data of one chunk.
pub type ChunkData = Surface<PixelColor>;

/// A chunk of the canvas.
#[derive(Clone, Debug)]
pub struct Chunk {
  data: ChunkData,
  render_cache: Option<RgbaSurface>,
  /// Whether `data` changed since the cache was last built.
  stale: bool,
}

impl Default for Chunk {
  fn default() -> Self {
    Self::new()
  }
}

impl Chunk {
  /// Creates an all-background chunk with no render cache.
  pub fn new() -> Self {
    Self {
      data: ChunkData::new(CHUNK_SIZE, CHUNK_SIZE),
      render_cache: None,
      stale: true,
    }
  }

  /// Creates a chunk from received data, normalized to `CHUNK_AREA` entries.
  pub fn from_colors(colors: Vec<PixelColor>) -> Self {
    Self {
      data: normalized(colors),
      render_cache: None,
      stale: true,
    }
  }

  /// Returns the color at a local index.
  #[inline]
  pub fn get(&self, index: usize) -> PixelColor {
    self.data[index]
  }

  /// Writes a color at a local index and invalidates the render cache.
  #[inline]
  pub fn set(&mut self, index: usize, color: PixelColor) {
    self.data[index] = color;
    self.stale = true;
  }

  /// Overwrites all color data and invalidates the render cache.
  pub fn replace(&mut self, colors: Vec<PixelColor>) {
    self.data = normalized(colors);
    self.stale = true;
  }

  /// Returns the color data in row-major order.
  pub fn colors(&self) -> &[PixelColor] {
    self.data.as_slice()
  }

  /// Returns a copy of the color data, as recorded in the pending batch.
  pub fn snapshot(&self) -> Box<[PixelColor]> {
    self.data.as_slice().into()
  }

  /// Returns the render cache if the chunk has been materialized.
  ///
  /// `None` until the first [`Chunk::materialize`] call; an existing cache
  /// may lag behind `data` while [`Chunk::is_stale`] is true.
  pub fn render_cache(&self) -> Option<&RgbaSurface> {
    self.render_cache.as_ref()
  }

  /// Returns true if the render cache does not reflect the current data.
  pub fn is_stale(&self) -> bool {
    self.stale
  }

  /// Rebuilds the render cache from the color data if it is stale.
  pub fn materialize(&mut self) {
    if !self.stale && self.render_cache.is_some() {
      return;
    }
    let cache = self
      .render_cache
      .get_or_insert_with(|| RgbaSurface::filled(CHUNK_SIZE, CHUNK_SIZE, PixelColor::Background.to_rgba()));
    for (dst, src) in cache.as_slice_mut().iter_mut().zip(self.data.as_slice()) {
      *dst = src.to_rgba();
    }
    self.stale = false;
  }
}

fn normalized(colors: Vec<PixelColor>) -> ChunkData {
  if colors.len() != CHUNK_AREA {
    log::debug!(
      "Normalizing chunk payload of {} entries to {}",
      colors.len(),
      CHUNK_AREA
    );
  }
  ChunkData::from_vec(CHUNK_SIZE, CHUNK_SIZE, colors)
}
