//! Pending edit batch.
//!
//! Holds the latest full data of every chunk edited locally since the last
//! flush. Recording the same chunk twice replaces the earlier entry, so one
//! flush sends at most one message per chunk.

use std::collections::HashMap;

use crate::color::PixelColor;
use crate::coords::ChunkPos;

/// Coalescing map from chunk position to its latest local data.
#[derive(Debug, Default)]
pub struct PendingEdits {
  entries: HashMap<ChunkPos, Box<[PixelColor]>>,
  /// First-edit order, so flushes are deterministic.
  order: Vec<ChunkPos>,
}

impl PendingEdits {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records the full data of an edited chunk, replacing any earlier entry.
  pub fn record(&mut self, pos: ChunkPos, data: Box<[PixelColor]>) {
    if self.entries.insert(pos, data).is_none() {
      self.order.push(pos);
    }
  }

  /// Returns the recorded data for a chunk.
  pub fn get(&self, pos: ChunkPos) -> Option<&[PixelColor]> {
    self.entries.get(&pos).map(|d| d.as_ref())
  }

  /// Removes and returns every entry in first-edit order.
  pub fn take(&mut self) -> Vec<(ChunkPos, Box<[PixelColor]>)> {
    let mut entries = std::mem::take(&mut self.entries);
    self
      .order
      .drain(..)
      .filter_map(|pos| entries.remove(&pos).map(|data| (pos, data)))
      .collect()
  }

  /// Drops every entry without returning it. Returns how many were dropped.
  pub fn discard(&mut self) -> usize {
    let dropped = self.entries.len();
    self.entries.clear();
    self.order.clear();
    dropped
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn data(color: PixelColor) -> Box<[PixelColor]> {
    vec![color; 4].into_boxed_slice()
  }

  #[test]
  fn repeated_records_coalesce_to_latest() {
    let mut pending = PendingEdits::new();
    let a = ChunkPos::new(0, 0);
    let b = ChunkPos::new(1, 0);

    pending.record(a, data(PixelColor::BLACK));
    pending.record(b, data(PixelColor::BLACK));
    pending.record(a, data(PixelColor::Rgb(1, 1, 1)));

    assert_eq!(pending.len(), 2);
    let taken = pending.take();
    assert_eq!(taken.len(), 2);
    assert_eq!(taken[0].0, a);
    assert_eq!(taken[0].1[0], PixelColor::Rgb(1, 1, 1));
    assert_eq!(taken[1].0, b);
    assert!(pending.is_empty());
  }

  #[test]
  fn discard_empties_the_batch() {
    let mut pending = PendingEdits::new();
    pending.record(ChunkPos::new(2, 3), data(PixelColor::BLACK));
    assert_eq!(pending.discard(), 1);
    assert!(pending.is_empty());
    assert!(pending.take().is_empty());
  }
}
