//! Collaborator interfaces of the viewport renderer.

use super::Rgba;
use crate::primitives::RgbaSurface;

/// A canvas-like paint target with an affine transform stack.
///
/// Coordinates passed to the drawing calls are transformed by the current
/// transform (translation and axis scale) before rasterization.
pub trait PaintSurface {
  /// Size of the surface in device pixels.
  fn size(&self) -> (u32, u32);

  /// Pushes the current transform.
  fn save(&mut self);

  /// Pops the transform pushed by the matching [`PaintSurface::save`].
  fn restore(&mut self);

  /// Replaces the current transform with the identity.
  fn reset_transform(&mut self);

  /// Appends a translation to the current transform.
  fn translate(&mut self, dx: f64, dy: f64);

  /// Appends an axis scale to the current transform.
  fn scale(&mut self, sx: f64, sy: f64);

  /// Fills a rectangle.
  fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba);

  /// Outlines a rectangle with lines of `line_width` units, drawn inside
  /// the rectangle's edges.
  fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, line_width: f64, color: Rgba) {
    self.fill_rect(x, y, width, line_width, color);
    self.fill_rect(x, y + height - line_width, width, line_width, color);
    self.fill_rect(x, y, line_width, height, color);
    self.fill_rect(x + width - line_width, y, line_width, height, color);
  }

  /// Draws a whole image with its top-left corner at `(x, y)`, one image
  /// pixel per unit.
  fn draw_image(&mut self, image: &RgbaSurface, x: f64, y: f64);
}

/// Receiver of the textual readouts (pointer coordinates, status).
pub trait TextSink {
  fn set_coordinates(&mut self, text: &str);

  fn set_status(&mut self, text: &str);
}

impl TextSink for () {
  fn set_coordinates(&mut self, _text: &str) {}

  fn set_status(&mut self, _text: &str) {}
}
