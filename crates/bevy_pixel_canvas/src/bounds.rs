//! Drawable world region.
//!
//! Only chunks whose top-left pixel lies inside `[0, width) x [0, height)`
//! are part of the drawable world. Everything else is permanently
//! out-of-bounds: never stored, never synced, painted as a placeholder.

use crate::coords::{ChunkPos, WorldPos};

/// The drawable rectangle of the world, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldBounds {
  pub width: u32,
  pub height: u32,
}

impl Default for WorldBounds {
  fn default() -> Self {
    Self {
      width: 500,
      height: 500,
    }
  }
}

impl WorldBounds {
  /// Creates bounds covering `[0, width) x [0, height)`.
  pub const fn new(width: u32, height: u32) -> Self {
    Self { width, height }
  }

  /// Returns true if the chunk belongs to the drawable world.
  pub fn is_in_bounds(&self, pos: ChunkPos) -> bool {
    if pos.x < 0 || pos.y < 0 {
      return false;
    }
    let origin = pos.to_world();
    origin.x < self.width as i64 && origin.y < self.height as i64
  }

  /// Returns true if the chunk owning this pixel is drawable.
  pub fn contains(&self, pos: WorldPos) -> bool {
    self.is_in_bounds(pos.chunk())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn last_pixel_is_in_bounds_and_next_is_not() {
    let bounds = WorldBounds::new(500, 500);
    assert!(bounds.contains(WorldPos::new(499, 499)));
    assert!(!bounds.contains(WorldPos::new(500, 499)));
    assert!(!bounds.contains(WorldPos::new(-5, 10)));
  }

  #[test]
  fn partially_covered_chunk_counts_as_in_bounds() {
    // 520 is not a multiple of 50, so chunk 10 starts at 500 < 520.
    let bounds = WorldBounds::new(520, 100);
    assert!(bounds.is_in_bounds(ChunkPos::new(10, 0)));
    assert!(bounds.contains(WorldPos::new(549, 0)));
    assert!(!bounds.is_in_bounds(ChunkPos::new(11, 0)));
    assert!(!bounds.is_in_bounds(ChunkPos::new(0, 2)));
  }
}
