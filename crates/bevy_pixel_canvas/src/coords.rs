//! Coordinate types and spatial constants.
//!
//! Defines the three coordinate spaces of the canvas:
//! - screen space: continuous `f64` positions on the paint surface
//! - [`WorldPos`]: integer pixel position on the unbounded plane (i64)
//! - [`ChunkPos`]: chunk grid position (i32)
//!
//! Screen Y grows downward, and so does world Y: the world origin maps to
//! `offset` on screen and row 0 of a chunk is its top row.

use bevy::math::DVec2;

/// Size of a chunk in pixels (width and height).
pub const CHUNK_SIZE: u32 = 50;

/// Number of pixels stored in one chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Absolute pixel position in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WorldPos {
  pub x: i64,
  pub y: i64,
}

impl WorldPos {
  /// Creates a new world position.
  pub const fn new(x: i64, y: i64) -> Self {
    Self { x, y }
  }

  /// Returns the chunk that owns this pixel.
  ///
  /// Uses floor division, so world position -1 maps to chunk -1.
  pub fn chunk(self) -> ChunkPos {
    world_to_chunk(self)
  }

  /// Returns the row-major index of this pixel inside its chunk.
  pub fn local_index(self) -> usize {
    chunk_local_index(self)
  }

  /// Convert to chunk position and local index in one step.
  pub fn to_chunk_and_index(self) -> (ChunkPos, usize) {
    (world_to_chunk(self), chunk_local_index(self))
  }
}

/// Position in the chunk grid.
///
/// Each chunk spans [`CHUNK_SIZE`] pixels in each dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
  pub x: i32,
  pub y: i32,
}

impl ChunkPos {
  /// Creates a new chunk position.
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }

  /// Returns the top-left pixel of this chunk in world coordinates.
  pub fn to_world(self) -> WorldPos {
    let chunk_size = CHUNK_SIZE as i64;
    WorldPos::new(self.x as i64 * chunk_size, self.y as i64 * chunk_size)
  }
}

/// Inclusive rectangle of chunk positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRect {
  pub min: ChunkPos,
  pub max: ChunkPos,
}

impl ChunkRect {
  /// Creates a rectangle spanning `min..=max` on both axes.
  pub const fn new(min: ChunkPos, max: ChunkPos) -> Self {
    Self { min, max }
  }

  /// Returns true if `pos` lies inside the rectangle.
  pub fn contains(&self, pos: ChunkPos) -> bool {
    pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
  }

  /// Number of chunks covered (0 for an inverted rectangle).
  pub fn len(&self) -> usize {
    let w = (self.max.x as i64 - self.min.x as i64 + 1).max(0);
    let h = (self.max.y as i64 - self.min.y as i64 + 1).max(0);
    (w * h) as usize
  }

  /// Returns true if the rectangle covers no chunks.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Iterates column-major, matching the paint order of the renderer.
  pub fn iter(&self) -> impl Iterator<Item = ChunkPos> {
    let (min, max) = (self.min, self.max);
    (min.x..=max.x).flat_map(move |cx| (min.y..=max.y).map(move |cy| ChunkPos::new(cx, cy)))
  }
}

/// Maps a screen point to the world pixel under it.
///
/// Applies the inverse of `screen = world * scale + offset`, then floors so
/// negative world coordinates round toward negative infinity.
pub fn screen_to_world(screen: DVec2, offset: DVec2, scale: f64) -> WorldPos {
  let world = (screen - offset) / scale;
  WorldPos::new(world.x.floor() as i64, world.y.floor() as i64)
}

/// Maps a continuous world point to screen space.
pub fn world_to_screen(world: DVec2, offset: DVec2, scale: f64) -> DVec2 {
  world * scale + offset
}

/// Returns the chunk that owns the given pixel.
///
/// Chunk indices beyond the `i32` range saturate. A saturated chunk lies far
/// outside any drawable world, so it never aliases a stored chunk.
pub fn world_to_chunk(pos: WorldPos) -> ChunkPos {
  let chunk_size = CHUNK_SIZE as i64;
  let saturate = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
  ChunkPos::new(
    saturate(pos.x.div_euclid(chunk_size)),
    saturate(pos.y.div_euclid(chunk_size)),
  )
}

/// Returns the row-major index of the pixel inside its chunk.
///
/// Local offsets use a positive modulo, so the result is always in
/// `0..CHUNK_AREA` regardless of sign.
pub fn chunk_local_index(pos: WorldPos) -> usize {
  let chunk_size = CHUNK_SIZE as i64;
  let lx = pos.x.rem_euclid(chunk_size);
  let ly = pos.y.rem_euclid(chunk_size);
  (ly * chunk_size + lx) as usize
}
