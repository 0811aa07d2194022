//! Session configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! stock client behavior.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, de};

use crate::bounds::WorldBounds;
use crate::brush::Brush;
use crate::camera::ZoomLimits;
use crate::color::PixelColor;
use crate::input::InputSettings;
use crate::sync::SyncTiming;

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CanvasConfig {
  pub world: WorldConfig,
  pub zoom: ZoomConfig,
  pub timing: TimingConfig,
  pub brush: BrushConfig,
  pub network: NetworkConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
  pub width: u32,
  pub height: u32,
}

impl Default for WorldConfig {
  fn default() -> Self {
    Self {
      width: 500,
      height: 500,
    }
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ZoomConfig {
  pub min: f64,
  pub max: f64,
  pub min_draw: f64,
  pub initial: f64,
  pub wheel_step: f64,
  pub pinch_threshold: f64,
  pub pan_threshold: f64,
  /// Scale at which the pixel grid is overlaid.
  pub grid_min: f64,
}

impl Default for ZoomConfig {
  fn default() -> Self {
    Self {
      min: 0.1,
      max: 50.0,
      min_draw: 21.0,
      initial: 1.0,
      wheel_step: 0.1,
      pinch_threshold: 5.0,
      pan_threshold: 2.0,
      grid_min: 30.0,
    }
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
  pub flush_interval_ms: u64,
  pub draw_cooldown_ms: u64,
  pub ping_interval_ms: u64,
}

impl Default for TimingConfig {
  fn default() -> Self {
    Self {
      flush_interval_ms: 200,
      draw_cooldown_ms: 200,
      ping_interval_ms: 15_000,
    }
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BrushConfig {
  #[serde(deserialize_with = "deserialize_hex_color")]
  pub color: (u8, u8, u8),
  /// Percent, 0 to 100.
  pub brightness: u8,
}

impl Default for BrushConfig {
  fn default() -> Self {
    Self {
      color: (0, 0, 0),
      brightness: 100,
    }
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
  /// `host:port` of the canvas server.
  pub address: String,
}

impl Default for NetworkConfig {
  fn default() -> Self {
    Self {
      address: "127.0.0.1:9062".to_string(),
    }
  }
}

fn deserialize_hex_color<'de, D>(deserializer: D) -> Result<(u8, u8, u8), D::Error>
where
  D: Deserializer<'de>,
{
  let s: String = Deserialize::deserialize(deserializer)?;
  PixelColor::parse_hex(&s)
    .map(PixelColor::channels)
    .ok_or_else(|| de::Error::custom(format!("expected a #rrggbb hex color, got {:?}", s)))
}

/// Error loading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
  Io(std::io::Error),
  Parse(toml::de::Error),
  /// Parsed, but a value is out of range.
  Invalid(String),
}

impl From<std::io::Error> for ConfigError {
  fn from(err: std::io::Error) -> Self {
    Self::Io(err)
  }
}

impl From<toml::de::Error> for ConfigError {
  fn from(err: toml::de::Error) -> Self {
    Self::Parse(err)
  }
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io(e) => write!(f, "I/O error: {}", e),
      Self::Parse(e) => write!(f, "parse error: {}", e),
      Self::Invalid(msg) => write!(f, "invalid value: {}", msg),
    }
  }
}

impl std::error::Error for ConfigError {}

impl CanvasConfig {
  /// Reads and parses a TOML file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Self::from_toml(&text)
  }

  pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
    let config: Self = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
  }

  /// Checks ranges serde cannot express.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let zoom = &self.zoom;
    let invalid = |msg: String| Err(ConfigError::Invalid(msg));

    for (name, value) in [
      ("zoom.min", zoom.min),
      ("zoom.max", zoom.max),
      ("zoom.min_draw", zoom.min_draw),
      ("zoom.initial", zoom.initial),
      ("zoom.wheel_step", zoom.wheel_step),
      ("zoom.pinch_threshold", zoom.pinch_threshold),
      ("zoom.pan_threshold", zoom.pan_threshold),
      ("zoom.grid_min", zoom.grid_min),
    ] {
      if !value.is_finite() {
        return invalid(format!("{} must be finite", name));
      }
    }
    if zoom.min <= 0.0 {
      return invalid(format!("zoom.min must be positive, got {}", zoom.min));
    }
    if zoom.min > zoom.max {
      return invalid(format!(
        "zoom.min ({}) is greater than zoom.max ({})",
        zoom.min, zoom.max
      ));
    }
    if !(zoom.wheel_step > 0.0 && zoom.wheel_step < 1.0) {
      return invalid(format!(
        "zoom.wheel_step must be in (0, 1), got {}",
        zoom.wheel_step
      ));
    }
    if zoom.pinch_threshold < 0.0 || zoom.pan_threshold < 0.0 {
      return invalid("zoom thresholds must not be negative".to_string());
    }
    if self.brush.brightness > crate::brush::MAX_BRIGHTNESS {
      return invalid(format!(
        "brush.brightness must be at most 100, got {}",
        self.brush.brightness
      ));
    }
    Ok(())
  }

  pub fn bounds(&self) -> WorldBounds {
    WorldBounds::new(self.world.width, self.world.height)
  }

  pub fn zoom_limits(&self) -> ZoomLimits {
    ZoomLimits {
      min: self.zoom.min,
      max: self.zoom.max,
      min_draw: self.zoom.min_draw,
    }
  }

  pub fn sync_timing(&self) -> SyncTiming {
    SyncTiming {
      flush_interval: Duration::from_millis(self.timing.flush_interval_ms),
      ping_interval: Duration::from_millis(self.timing.ping_interval_ms),
    }
  }

  pub fn input_settings(&self) -> InputSettings {
    InputSettings {
      draw_cooldown: Duration::from_millis(self.timing.draw_cooldown_ms),
      wheel_step: self.zoom.wheel_step,
      pinch_threshold: self.zoom.pinch_threshold,
      pan_threshold: self.zoom.pan_threshold,
    }
  }

  pub fn brush(&self) -> Brush {
    Brush::new(self.brush.color, self.brush.brightness)
  }
}
