//! Camera transform of the canvas view.
//!
//! `screen = world * scale + offset`. Offsets are unbounded: the view can be
//! panned arbitrarily far from the drawable world.

use bevy::math::DVec2;

use crate::coords::{self, WorldPos};

/// Zoom limits and the drawing threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLimits {
  pub min: f64,
  pub max: f64,
  /// Drawing is allowed only when `scale > min_draw`.
  pub min_draw: f64,
}

impl Default for ZoomLimits {
  fn default() -> Self {
    Self {
      min: 0.1,
      max: 50.0,
      min_draw: 21.0,
    }
  }
}

/// Pan/zoom state of the view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasCamera {
  scale: f64,
  offset: DVec2,
  limits: ZoomLimits,
}

impl Default for CanvasCamera {
  fn default() -> Self {
    Self::new(1.0, ZoomLimits::default())
  }
}

impl CanvasCamera {
  /// Creates a camera at the world origin. The initial scale is clamped
  /// into the limits; inverted limits resolve to `max` rather than panic.
  pub fn new(scale: f64, limits: ZoomLimits) -> Self {
    let scale = if scale.is_finite() { scale } else { limits.min };
    Self {
      scale: scale.max(limits.min).min(limits.max),
      offset: DVec2::ZERO,
      limits,
    }
  }

  pub fn scale(&self) -> f64 {
    self.scale
  }

  pub fn offset(&self) -> DVec2 {
    self.offset
  }

  pub fn limits(&self) -> ZoomLimits {
    self.limits
  }

  pub fn set_offset(&mut self, offset: DVec2) {
    self.offset = offset;
  }

  /// Returns true if the zoom level permits drawing.
  pub fn can_draw(&self) -> bool {
    self.scale > self.limits.min_draw
  }

  /// Returns the world pixel under a screen point.
  pub fn screen_to_world(&self, screen: DVec2) -> WorldPos {
    coords::screen_to_world(screen, self.offset, self.scale)
  }

  /// Returns the continuous world point under a screen point.
  pub fn screen_to_world_point(&self, screen: DVec2) -> DVec2 {
    (screen - self.offset) / self.scale
  }

  /// Returns where a continuous world point lands on screen.
  pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
    coords::world_to_screen(world, self.offset, self.scale)
  }

  /// Translates the view by a screen-space delta.
  pub fn pan(&mut self, delta: DVec2) {
    self.offset += delta;
  }

  /// Multiplies the scale by `factor`, keeping the world point under
  /// `anchor` fixed on screen.
  ///
  /// A result outside the zoom limits is rejected entirely and leaves the
  /// camera untouched. Returns true if the zoom was applied.
  pub fn zoom_at(&mut self, anchor: DVec2, factor: f64) -> bool {
    let new_scale = self.scale * factor;
    if !new_scale.is_finite() || new_scale < self.limits.min || new_scale > self.limits.max {
      return false;
    }
    let before = self.screen_to_world_point(anchor);
    self.scale = new_scale;
    self.offset = anchor - before * self.scale;
    true
  }

  /// Positions the view so `world` sits at the center of a canvas of the
  /// given size.
  pub fn center_on(&mut self, world: DVec2, canvas: DVec2) {
    self.offset = canvas * 0.5 - world * self.scale;
  }
}
