//! Viewport renderer.
//!
//! Paints only the chunks intersecting the visible area, plus one chunk of
//! margin on each side. Out-of-bounds chunks get a fixed placeholder tile;
//! absent in-bounds chunks are left to the background fill.

use std::fmt;
use std::time::Duration;

use bevy::math::DVec2;

use crate::bounds::WorldBounds;
use crate::camera::CanvasCamera;
use crate::coords::{CHUNK_SIZE, ChunkPos, ChunkRect, WorldPos};
use crate::primitives::RgbaSurface;
use crate::render::{PaintSurface, Rgba, rgb};
use crate::store::ChunkStore;
use crate::sync::SyncState;

/// Canvas background behind every chunk.
pub const BACKGROUND_COLOR: Rgba = rgb(255, 255, 255);

/// Fill of out-of-bounds chunks.
pub const PLACEHOLDER_COLOR: Rgba = rgb(0xf0, 0xf0, 0xf0);

/// Pixel grid line color.
pub const GRID_COLOR: Rgba = rgb(0xdc, 0xdc, 0xdc);

/// Pointer outline color.
pub const POINTER_COLOR: Rgba = rgb(255, 0, 0);

/// Whether drawing is currently possible at the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawPermission {
  Allowed,
  ZoomTooLow,
  OutOfBounds,
}

impl DrawPermission {
  /// Evaluates the draw gates at `pointer`, or at the world origin if the
  /// pointer has not been seen yet.
  pub fn evaluate(camera: &CanvasCamera, bounds: WorldBounds, pointer: Option<WorldPos>) -> Self {
    let at = pointer.unwrap_or_default();
    if !camera.can_draw() {
      Self::ZoomTooLow
    } else if !bounds.contains(at) {
      Self::OutOfBounds
    } else {
      Self::Allowed
    }
  }

  pub fn is_allowed(self) -> bool {
    self == Self::Allowed
  }

  pub fn message(self) -> &'static str {
    match self {
      Self::Allowed => "You may draw.",
      Self::ZoomTooLow => "Can't draw, Zoom in a little.",
      Self::OutOfBounds => "Can't draw, Out of bounds.",
    }
  }
}

/// Passive status text shown in a corner of the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusReadout {
  pub permission: DrawPermission,
  pub zoom: f64,
  pub sync: SyncState,
  pub latency: Option<Duration>,
}

impl fmt::Display for StatusReadout {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", self.permission.message())?;
    writeln!(f, "Zoom: {:.2}x", self.zoom)?;
    write!(f, "{}", self.sync.label())?;
    if let Some(latency) = self.latency {
      write!(f, " ({} ms)", latency.as_millis())?;
    }
    Ok(())
  }
}

/// Counters from one painted frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
  /// Chunks whose render cache was drawn.
  pub chunks: usize,
  /// Out-of-bounds placeholder tiles drawn.
  pub placeholders: usize,
  /// Whether the pixel grid overlay was drawn.
  pub grid: bool,
}

/// Paints the store through a camera onto a [`PaintSurface`].
pub struct ViewportRenderer {
  placeholder: RgbaSurface,
  grid_min_scale: f64,
}

impl Default for ViewportRenderer {
  fn default() -> Self {
    Self::new(30.0)
  }
}

impl ViewportRenderer {
  /// Creates a renderer that overlays the pixel grid at `grid_min_scale`
  /// and above.
  pub fn new(grid_min_scale: f64) -> Self {
    Self {
      placeholder: RgbaSurface::filled(CHUNK_SIZE, CHUNK_SIZE, PLACEHOLDER_COLOR),
      grid_min_scale,
    }
  }

  /// Inclusive chunk rectangle covering a canvas of `canvas` pixels, with
  /// one chunk of margin on every side.
  pub fn visible_chunks(camera: &CanvasCamera, canvas: (u32, u32)) -> ChunkRect {
    let scale = camera.scale();
    let offset = camera.offset();
    let size = DVec2::new(canvas.0 as f64, canvas.1 as f64);
    let chunk = CHUNK_SIZE as f64;

    let start = (-offset / scale / chunk).floor();
    let end = ((-offset + size) / scale / chunk).floor();

    ChunkRect::new(
      ChunkPos::new(
        (start.x as i32).saturating_sub(1),
        (start.y as i32).saturating_sub(1),
      ),
      ChunkPos::new(
        (end.x as i32).saturating_add(1),
        (end.y as i32).saturating_add(1),
      ),
    )
  }

  /// Paints one full frame.
  pub fn paint<S: PaintSurface + ?Sized>(
    &self,
    surface: &mut S,
    store: &ChunkStore,
    camera: &CanvasCamera,
    pointer: Option<WorldPos>,
  ) -> FrameStats {
    let (width, height) = surface.size();
    let mut stats = FrameStats::default();

    surface.reset_transform();
    surface.fill_rect(0.0, 0.0, width as f64, height as f64, BACKGROUND_COLOR);

    let scale = camera.scale();
    let offset = camera.offset();

    surface.save();
    surface.translate(offset.x, offset.y);
    surface.scale(scale, scale);

    let visible = Self::visible_chunks(camera, (width, height));
    for pos in visible.iter() {
      let origin = pos.to_world();
      let (x, y) = (origin.x as f64, origin.y as f64);
      if !store.is_in_bounds(pos) {
        surface.draw_image(&self.placeholder, x, y);
        stats.placeholders += 1;
      } else if let Some(cache) = store.get(pos).and_then(|chunk| chunk.render_cache()) {
        surface.draw_image(cache, x, y);
        stats.chunks += 1;
      }
    }

    if scale >= self.grid_min_scale {
      stats.grid = self.paint_grid(surface, store.bounds(), camera, (width, height));
    }
    surface.restore();

    if let Some(at) = pointer {
      surface.save();
      surface.translate(offset.x, offset.y);
      surface.scale(scale, scale);
      surface.stroke_rect(at.x as f64, at.y as f64, 1.0, 1.0, 1.0 / scale, POINTER_COLOR);
      surface.restore();
    }

    stats
  }

  /// Draws one-device-pixel lines along every visible pixel edge of the
  /// drawable region. Expects the camera transform to be applied.
  fn paint_grid<S: PaintSurface + ?Sized>(
    &self,
    surface: &mut S,
    bounds: WorldBounds,
    camera: &CanvasCamera,
    canvas: (u32, u32),
  ) -> bool {
    let chunk = CHUNK_SIZE as f64;
    let extent = DVec2::new(
      (bounds.width as f64 / chunk).ceil() * chunk,
      (bounds.height as f64 / chunk).ceil() * chunk,
    );

    let top_left = camera
      .screen_to_world_point(DVec2::ZERO)
      .floor()
      .max(DVec2::ZERO);
    let bottom_right = camera
      .screen_to_world_point(DVec2::new(canvas.0 as f64, canvas.1 as f64))
      .ceil()
      .min(extent);
    if top_left.x > bottom_right.x || top_left.y > bottom_right.y {
      return false;
    }

    let line = 1.0 / camera.scale();
    let span = bottom_right - top_left;
    for x in top_left.x as i64..=bottom_right.x as i64 {
      surface.fill_rect(x as f64, top_left.y, line, span.y, GRID_COLOR);
    }
    for y in top_left.y as i64..=bottom_right.y as i64 {
      surface.fill_rect(top_left.x, y as f64, span.x, line, GRID_COLOR);
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::camera::ZoomLimits;

  #[test]
  fn visible_range_includes_margin() {
    let camera = CanvasCamera::new(1.0, ZoomLimits::default());
    let rect = ViewportRenderer::visible_chunks(&camera, (500, 500));
    assert_eq!(rect.min, ChunkPos::new(-1, -1));
    assert_eq!(rect.max, ChunkPos::new(11, 11));
  }

  #[test]
  fn visible_range_follows_offset_and_scale() {
    let mut camera = CanvasCamera::new(2.0, ZoomLimits::default());
    camera.set_offset(DVec2::new(-1000.0, 250.0));
    let rect = ViewportRenderer::visible_chunks(&camera, (400, 100));
    // x: 500 / 50 = 10 .. 700 / 50 = 14; y: -125 / 50 = -2.5 .. -75 / 50 = -1.5
    assert_eq!(rect.min, ChunkPos::new(9, -4));
    assert_eq!(rect.max, ChunkPos::new(15, -1));
  }

  #[test]
  fn permission_checks_zoom_before_bounds() {
    let bounds = WorldBounds::default();
    let zoomed_out = CanvasCamera::new(1.0, ZoomLimits::default());
    let zoomed_in = CanvasCamera::new(25.0, ZoomLimits::default());
    let outside = Some(WorldPos::new(-1, 0));

    assert_eq!(
      DrawPermission::evaluate(&zoomed_out, bounds, outside),
      DrawPermission::ZoomTooLow
    );
    assert_eq!(
      DrawPermission::evaluate(&zoomed_in, bounds, outside),
      DrawPermission::OutOfBounds
    );
    assert!(DrawPermission::evaluate(&zoomed_in, bounds, None).is_allowed());
  }

  #[test]
  fn status_text_lists_permission_zoom_and_connection() {
    let status = StatusReadout {
      permission: DrawPermission::ZoomTooLow,
      zoom: 1.0,
      sync: SyncState::Live,
      latency: Some(Duration::from_millis(42)),
    };
    assert_eq!(
      status.to_string(),
      "Can't draw, Zoom in a little.\nZoom: 1.00x\nLive (42 ms)"
    );
  }
}
