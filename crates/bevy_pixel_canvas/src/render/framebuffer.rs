//! CPU rasterizer implementing [`PaintSurface`] over an [`RgbaSurface`].
//!
//! Rectangles cover every device pixel whose center lies inside them, so
//! adjacent rectangles never overlap or leave gaps. Images are sampled with
//! nearest-neighbor filtering. Drawing is opaque: alpha is copied, not
//! blended.

use bevy::math::DVec2;

use super::{PaintSurface, Rgba};
use crate::primitives::RgbaSurface;

/// Axis-aligned affine transform: `device = local * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Transform {
  scale: DVec2,
  translate: DVec2,
}

impl Transform {
  const IDENTITY: Self = Self {
    scale: DVec2::ONE,
    translate: DVec2::ZERO,
  };

  fn apply(&self, p: DVec2) -> DVec2 {
    p * self.scale + self.translate
  }
}

/// Frame buffer backing the on-screen canvas.
pub struct FrameBuffer {
  pixels: RgbaSurface,
  transform: Transform,
  stack: Vec<Transform>,
}

impl FrameBuffer {
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      pixels: RgbaSurface::new(width, height),
      transform: Transform::IDENTITY,
      stack: Vec::new(),
    }
  }

  /// Resizes the buffer, clearing its contents. No-op if the size is
  /// unchanged.
  pub fn resize(&mut self, width: u32, height: u32) {
    if self.pixels.width() != width || self.pixels.height() != height {
      self.pixels = RgbaSurface::new(width, height);
    }
  }

  pub fn pixels(&self) -> &RgbaSurface {
    &self.pixels
  }

  /// Returns the pixel at device coordinates.
  pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
    self.pixels.get(x, y).copied()
  }

  /// Converts a local rectangle to the clipped range of device pixels it
  /// covers. Returns `None` if nothing is covered.
  fn device_span(&self, x: f64, y: f64, width: f64, height: f64) -> Option<DeviceSpan> {
    let a = self.transform.apply(DVec2::new(x, y));
    let b = self.transform.apply(DVec2::new(x + width, y + height));
    let min = a.min(b);
    let max = a.max(b);

    let x0 = covered_start(min.x).max(0.0);
    let y0 = covered_start(min.y).max(0.0);
    let x1 = covered_start(max.x).min(self.pixels.width() as f64);
    let y1 = covered_start(max.y).min(self.pixels.height() as f64);
    if !(x0 < x1 && y0 < y1) {
      return None;
    }

    Some(DeviceSpan {
      origin: min,
      extent: max - min,
      x0: x0 as u32,
      y0: y0 as u32,
      x1: x1 as u32,
      y1: y1 as u32,
    })
  }
}

/// First device pixel whose center is at or right of `edge`.
fn covered_start(edge: f64) -> f64 {
  (edge - 0.5).ceil()
}

struct DeviceSpan {
  origin: DVec2,
  extent: DVec2,
  x0: u32,
  y0: u32,
  x1: u32,
  y1: u32,
}

impl PaintSurface for FrameBuffer {
  fn size(&self) -> (u32, u32) {
    (self.pixels.width(), self.pixels.height())
  }

  fn save(&mut self) {
    self.stack.push(self.transform);
  }

  fn restore(&mut self) {
    if let Some(transform) = self.stack.pop() {
      self.transform = transform;
    }
  }

  fn reset_transform(&mut self) {
    self.transform = Transform::IDENTITY;
  }

  fn translate(&mut self, dx: f64, dy: f64) {
    self.transform.translate += DVec2::new(dx, dy) * self.transform.scale;
  }

  fn scale(&mut self, sx: f64, sy: f64) {
    self.transform.scale *= DVec2::new(sx, sy);
  }

  fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
    let Some(span) = self.device_span(x, y, width, height) else {
      return;
    };
    for py in span.y0..span.y1 {
      self.pixels.row_mut(py)[span.x0 as usize..span.x1 as usize].fill(color);
    }
  }

  fn draw_image(&mut self, image: &RgbaSurface, x: f64, y: f64) {
    if image.is_empty() {
      return;
    }
    let Some(span) = self.device_span(x, y, image.width() as f64, image.height() as f64) else {
      return;
    };

    let texel = span.extent / DVec2::new(image.width() as f64, image.height() as f64);
    let max_x = image.width() - 1;
    let max_y = image.height() - 1;

    for py in span.y0..span.y1 {
      let sy = (((py as f64 + 0.5 - span.origin.y) / texel.y).floor().max(0.0) as u32).min(max_y);
      let src = image.row(sy);
      let dst = self.pixels.row_mut(py);
      for px in span.x0..span.x1 {
        let sx = (((px as f64 + 0.5 - span.origin.x) / texel.x).floor().max(0.0) as u32).min(max_x);
        dst[px as usize] = src[sx as usize];
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::render::rgb;

  const RED: Rgba = rgb(255, 0, 0);

  #[test]
  fn fill_covers_pixel_centers_only() {
    let mut fb = FrameBuffer::new(8, 8);
    fb.fill_rect(1.0, 1.0, 2.0, 3.0, RED);
    assert_eq!(fb.pixel(1, 1), Some(RED));
    assert_eq!(fb.pixel(2, 3), Some(RED));
    assert_eq!(fb.pixel(3, 1), Some(Rgba::default()));
    assert_eq!(fb.pixel(1, 4), Some(Rgba::default()));
  }

  #[test]
  fn transform_stack_scales_and_restores() {
    let mut fb = FrameBuffer::new(16, 16);
    fb.save();
    fb.translate(2.0, 2.0);
    fb.scale(4.0, 4.0);
    fb.fill_rect(1.0, 1.0, 1.0, 1.0, RED);
    fb.restore();
    fb.fill_rect(0.0, 0.0, 1.0, 1.0, RED);

    assert_eq!(fb.pixel(0, 0), Some(RED));
    assert_eq!(fb.pixel(6, 6), Some(RED));
    assert_eq!(fb.pixel(9, 9), Some(RED));
    assert_eq!(fb.pixel(10, 10), Some(Rgba::default()));
    assert_eq!(fb.pixel(5, 5), Some(Rgba::default()));
  }

  #[test]
  fn image_is_magnified_nearest_neighbor() {
    let mut image = RgbaSurface::new(2, 1);
    image[(1, 0)] = RED;
    let mut fb = FrameBuffer::new(8, 2);
    fb.scale(4.0, 2.0);
    fb.draw_image(&image, 0.0, 0.0);

    assert_eq!(fb.pixel(3, 1), Some(Rgba::default()));
    assert_eq!(fb.pixel(4, 0), Some(RED));
    assert_eq!(fb.pixel(7, 1), Some(RED));
  }

  #[test]
  fn drawing_outside_is_clipped() {
    let mut fb = FrameBuffer::new(4, 4);
    fb.fill_rect(-10.0, -10.0, 100.0, 11.0, RED);
    fb.fill_rect(50.0, 50.0, 2.0, 2.0, RED);
    assert_eq!(fb.pixel(3, 0), Some(RED));
    assert_eq!(fb.pixel(0, 1), Some(Rgba::default()));
  }
}
