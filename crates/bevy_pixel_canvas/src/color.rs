//! Pixel color representation.
//!
//! Chunk data stores a closed set of colors: the background sentinel or an
//! explicit RGB triple. The wire uses CSS-like string tokens; anything that
//! is not a recognized token decodes to [`PixelColor::Background`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::render::{Rgba, rgb};

/// Wire token for the background color.
const BACKGROUND_TOKEN: &str = "white";

/// A single pixel value as stored in a chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelColor {
  /// Unpainted pixel. Rendered as opaque white.
  #[default]
  Background,
  /// Explicit color.
  Rgb(u8, u8, u8),
}

impl PixelColor {
  /// Opaque black, the wire's `"black"` token.
  pub const BLACK: Self = Self::Rgb(0, 0, 0);

  /// Decodes a wire token, falling back to background for unknown forms.
  pub fn parse(token: &str) -> Self {
    let token = token.trim();
    if token == "black" {
      return Self::BLACK;
    }
    parse_rgb_function(token).unwrap_or(Self::Background)
  }

  /// Parses a `#rrggbb` hex string, as produced by a color picker.
  pub fn parse_hex(hex: &str) -> Option<Self> {
    let s = hex.trim().trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
      return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Self::Rgb(r, g, b))
  }

  /// Returns the color channels, with background as white.
  pub fn channels(self) -> (u8, u8, u8) {
    match self {
      Self::Background => (255, 255, 255),
      Self::Rgb(r, g, b) => (r, g, b),
    }
  }

  /// Converts to the render pixel format.
  pub fn to_rgba(self) -> Rgba {
    let (r, g, b) = self.channels();
    rgb(r, g, b)
  }
}

/// Parses `rgb(r,g,b)` with optional whitespace around the components.
fn parse_rgb_function(token: &str) -> Option<PixelColor> {
  let inner = token.strip_prefix("rgb(")?.strip_suffix(')')?;
  let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
  let r = parts.next()?.ok()?;
  let g = parts.next()?.ok()?;
  let b = parts.next()?.ok()?;
  if parts.next().is_some() {
    return None;
  }
  Some(PixelColor::Rgb(r, g, b))
}

impl fmt::Display for PixelColor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Background => f.write_str(BACKGROUND_TOKEN),
      Self::Rgb(r, g, b) => write!(f, "rgb({},{},{})", r, g, b),
    }
  }
}

impl Serialize for PixelColor {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for PixelColor {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    // Any JSON value is accepted; non-strings coerce to background.
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(PixelColor::parse).unwrap_or_default())
  }
}
