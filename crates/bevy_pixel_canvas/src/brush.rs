//! Brush state derived from the external color source.

use crate::color::PixelColor;

/// Maximum brightness value (percent).
pub const MAX_BRIGHTNESS: u8 = 100;

/// Current brush. The paint color is recomputed whenever an input changes.
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
  base: (u8, u8, u8),
  brightness: u8,
  eraser: bool,
  color: PixelColor,
}

impl Default for Brush {
  fn default() -> Self {
    Self::new((0, 0, 0), MAX_BRIGHTNESS)
  }
}

impl Brush {
  /// Creates a brush from a base color and a brightness in percent.
  pub fn new(base: (u8, u8, u8), brightness: u8) -> Self {
    let mut brush = Self {
      base,
      brightness: brightness.min(MAX_BRIGHTNESS),
      eraser: false,
      color: PixelColor::Background,
    };
    brush.recompute();
    brush
  }

  /// Returns the color the brush currently paints.
  pub fn color(&self) -> PixelColor {
    self.color
  }

  pub fn base(&self) -> (u8, u8, u8) {
    self.base
  }

  pub fn brightness(&self) -> u8 {
    self.brightness
  }

  pub fn is_eraser(&self) -> bool {
    self.eraser
  }

  /// Sets the base color (the picker's hue input).
  pub fn set_base(&mut self, base: (u8, u8, u8)) {
    self.base = base;
    self.recompute();
  }

  /// Sets the brightness factor in percent, clamped to 0..=100.
  pub fn set_brightness(&mut self, brightness: u8) {
    self.brightness = brightness.min(MAX_BRIGHTNESS);
    self.recompute();
  }

  /// Toggles eraser mode. Returns the new state.
  pub fn toggle_eraser(&mut self) -> bool {
    self.eraser = !self.eraser;
    self.recompute();
    self.eraser
  }

  /// Eyedropper: adopts a sampled color at full brightness.
  pub fn pick(&mut self, sampled: PixelColor) {
    self.base = sampled.channels();
    self.brightness = MAX_BRIGHTNESS;
    self.eraser = false;
    self.recompute();
  }

  fn recompute(&mut self) {
    if self.eraser {
      self.color = PixelColor::Background;
      return;
    }
    let brightness = self.brightness as u16;
    let scale = |c: u8| (c as u16 * brightness / MAX_BRIGHTNESS as u16) as u8;
    let (r, g, b) = self.base;
    self.color = PixelColor::Rgb(scale(r), scale(g), scale(b));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn brightness_scales_each_channel_with_floor() {
    let brush = Brush::new((255, 128, 3), 50);
    assert_eq!(brush.color(), PixelColor::Rgb(127, 64, 1));
  }

  #[test]
  fn color_follows_input_changes() {
    let mut brush = Brush::new((200, 100, 50), 100);
    brush.set_brightness(10);
    assert_eq!(brush.color(), PixelColor::Rgb(20, 10, 5));
    brush.set_base((10, 10, 10));
    assert_eq!(brush.color(), PixelColor::Rgb(1, 1, 1));
  }

  #[test]
  fn eraser_paints_background_and_pick_resets_it() {
    let mut brush = Brush::new((1, 2, 3), 100);
    assert!(brush.toggle_eraser());
    assert_eq!(brush.color(), PixelColor::Background);

    brush.pick(PixelColor::Rgb(40, 50, 60));
    assert!(!brush.is_eraser());
    assert_eq!(brush.color(), PixelColor::Rgb(40, 50, 60));
  }
}
