//! Input controller: turns pointer, wheel, touch and key events into draw,
//! pan and zoom intents.
//!
//! Gestures are independent:
//! - primary press + drag draws, subject to the zoom and bounds gates, the
//!   unchanged-color check and the draw cooldown
//! - secondary press + drag pans by the raw pointer delta
//! - the wheel zooms by a fixed step, anchored at the pointer
//! - one touch draws, two touches pan and pinch-zoom around their centroid
//!
//! Rejected edits are silent; they are reported as [`EditOutcome`] values
//! only so callers can observe them.

use std::time::Duration;

use bevy::math::DVec2;
use bitflags::bitflags;
// WASM compat: std::time::Instant panics on wasm32
use web_time::Instant;

use crate::brush::Brush;
use crate::camera::CanvasCamera;
use crate::coords::WorldPos;
use crate::store::ChunkStore;

/// Screen pixels moved per keyboard pan step.
pub const KEY_PAN_STEP: f64 = 10.0;

bitflags! {
  /// What an input event changed.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
  pub struct InputEffects: u8 {
    /// A pixel was written to the store.
    const DREW = 1 << 0;
    const CAMERA_CHANGED = 1 << 1;
    const POINTER_MOVED = 1 << 2;
    const BRUSH_CHANGED = 1 << 3;
  }
}

impl InputEffects {
  /// Returns true if the view has to be repainted.
  pub fn needs_redraw(self) -> bool {
    !self.is_empty()
  }
}

/// Result of one draw attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
  Applied,
  /// `scale <= min_draw`.
  ZoomTooLow,
  /// The pointer's chunk is outside the drawable world.
  OutOfBounds,
  /// The pixel already has the brush color.
  Unchanged,
  /// Less than the cooldown has passed since the last applied edit.
  CoolingDown,
}

/// Pointer buttons the controller distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
  Primary,
  Secondary,
}

/// Discrete key actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasKey {
  PanLeft,
  PanRight,
  PanUp,
  PanDown,
  ToggleEraser,
}

/// Raw wheel input, by device unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WheelDelta {
  /// Notched wheel; every event is one step whatever its magnitude.
  Lines(f64),
  /// Trackpad or high-resolution wheel, in screen pixels.
  Pixels(f64),
}

/// Converts wheel events into discrete zoom notches.
///
/// Pixel deltas accumulate until they cross [`WheelNotches::PIXELS_PER_NOTCH`],
/// so one trackpad swipe yields a bounded number of steps instead of one per
/// event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelNotches {
  pixels: f64,
}

impl WheelNotches {
  pub const PIXELS_PER_NOTCH: f64 = 50.0;

  /// Returns signed notches to apply; positive zooms in.
  pub fn feed(&mut self, delta: WheelDelta) -> i32 {
    match delta {
      WheelDelta::Lines(y) => {
        self.pixels = 0.0;
        if y == 0.0 || !y.is_finite() {
          0
        } else {
          y.signum() as i32
        }
      }
      WheelDelta::Pixels(y) => {
        if !y.is_finite() {
          return 0;
        }
        if self.pixels != 0.0 && y.signum() != self.pixels.signum() {
          self.pixels = 0.0;
        }
        self.pixels += y;
        let notches = (self.pixels / Self::PIXELS_PER_NOTCH).trunc();
        self.pixels -= notches * Self::PIXELS_PER_NOTCH;
        notches.clamp(-10.0, 10.0) as i32
      }
    }
  }
}

/// Tunables of the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSettings {
  /// Minimum time between two applied edits.
  pub draw_cooldown: Duration,
  /// Relative scale change per wheel notch.
  pub wheel_step: f64,
  /// Minimum change of finger distance, in screen pixels, before a pinch
  /// zooms.
  pub pinch_threshold: f64,
  /// Minimum centroid movement on either axis before a two-finger pan
  /// applies.
  pub pan_threshold: f64,
}

impl Default for InputSettings {
  fn default() -> Self {
    Self {
      draw_cooldown: Duration::from_millis(200),
      wheel_step: 0.1,
      pinch_threshold: 5.0,
      pan_threshold: 2.0,
    }
  }
}

/// State the controller acts on.
pub struct InputTarget<'a> {
  pub camera: &'a mut CanvasCamera,
  pub store: &'a mut ChunkStore,
  pub brush: &'a mut Brush,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PinchAnchor {
  distance: f64,
  center: DVec2,
}

/// Gesture state machine.
#[derive(Debug)]
pub struct InputController {
  settings: InputSettings,
  drawing: bool,
  pan_anchor: Option<DVec2>,
  pinch: Option<PinchAnchor>,
  touch_count: usize,
  shift: bool,
  last_edit: Option<Instant>,
  pointer: Option<WorldPos>,
}

impl Default for InputController {
  fn default() -> Self {
    Self::new(InputSettings::default())
  }
}

impl InputController {
  pub fn new(settings: InputSettings) -> Self {
    Self {
      settings,
      drawing: false,
      pan_anchor: None,
      pinch: None,
      touch_count: 0,
      shift: false,
      last_edit: None,
      pointer: None,
    }
  }

  pub fn settings(&self) -> InputSettings {
    self.settings
  }

  /// Last world pixel under the pointer, if the pointer has been seen.
  pub fn pointer(&self) -> Option<WorldPos> {
    self.pointer
  }

  pub fn is_drawing(&self) -> bool {
    self.drawing
  }

  pub fn is_panning(&self) -> bool {
    self.pan_anchor.is_some() || self.pinch.is_some()
  }

  /// Sets the eyedropper modifier.
  pub fn set_shift(&mut self, held: bool) {
    self.shift = held;
  }

  pub fn pointer_down(
    &mut self,
    button: PointerButton,
    screen: DVec2,
    target: &mut InputTarget<'_>,
    now: Instant,
  ) -> InputEffects {
    let world = target.camera.screen_to_world(screen);
    let mut effects = self.track_pointer(world);

    match button {
      PointerButton::Primary if self.shift => {
        target.brush.pick(target.store.get_pixel(world));
        log::debug!("Picked {} at {:?}", target.brush.color(), world);
        effects |= InputEffects::BRUSH_CHANGED;
      }
      PointerButton::Primary => {
        if Self::draw_gate(world, target).is_none() {
          self.drawing = true;
          effects |= self.attempt(world, target, now);
        }
      }
      PointerButton::Secondary => {
        self.pan_anchor = Some(screen);
      }
    }
    effects
  }

  pub fn pointer_up(&mut self, button: PointerButton) {
    match button {
      PointerButton::Primary => self.drawing = false,
      PointerButton::Secondary => self.pan_anchor = None,
    }
  }

  /// Handles pointer movement: continues a draw stroke or a pan.
  pub fn pointer_move(
    &mut self,
    screen: DVec2,
    target: &mut InputTarget<'_>,
    now: Instant,
  ) -> InputEffects {
    let world = target.camera.screen_to_world(screen);
    let mut effects = self.track_pointer(world);

    if self.drawing {
      effects |= self.attempt(world, target, now);
    } else if let Some(anchor) = self.pan_anchor {
      target.camera.pan(screen - anchor);
      self.pan_anchor = Some(screen);
      effects |= InputEffects::CAMERA_CHANGED;
    }
    effects
  }

  /// Zooms one wheel tick at `screen`. Positive `delta` zooms in.
  pub fn wheel(&mut self, screen: DVec2, delta: f64, camera: &mut CanvasCamera) -> InputEffects {
    if delta == 0.0 || !delta.is_finite() {
      return InputEffects::empty();
    }
    let factor = 1.0 + delta.signum() * self.settings.wheel_step;
    if camera.zoom_at(screen, factor) {
      InputEffects::CAMERA_CHANGED
    } else {
      InputEffects::empty()
    }
  }

  /// Handles the current set of active touches, in a stable order.
  ///
  /// A change in touch count resets the gesture anchors; no delta is carried
  /// across a count change.
  pub fn touches(
    &mut self,
    points: &[DVec2],
    target: &mut InputTarget<'_>,
    now: Instant,
  ) -> InputEffects {
    let previous = std::mem::replace(&mut self.touch_count, points.len());

    if points.len() != previous {
      return self.begin_touch_gesture(points, previous, target, now);
    }

    match points {
      [point] => {
        let world = target.camera.screen_to_world(*point);
        let mut effects = self.track_pointer(world);
        if self.drawing {
          effects |= self.attempt(world, target, now);
        }
        effects
      }
      [a, b] => self.pinch_pan(*a, *b, target.camera),
      _ => InputEffects::empty(),
    }
  }

  fn begin_touch_gesture(
    &mut self,
    points: &[DVec2],
    previous: usize,
    target: &mut InputTarget<'_>,
    now: Instant,
  ) -> InputEffects {
    self.drawing = false;
    self.pinch = None;

    match points {
      [] => InputEffects::empty(),
      [point] => {
        let world = target.camera.screen_to_world(*point);
        let mut effects = self.track_pointer(world);
        if Self::draw_gate(world, target).is_none() {
          self.drawing = true;
          // Lifting the second finger only re-enables drawing.
          if previous == 0 {
            effects |= self.attempt(world, target, now);
          }
        }
        effects
      }
      [a, b] => {
        self.pinch = Some(PinchAnchor {
          distance: a.distance(*b),
          center: (*a + *b) * 0.5,
        });
        InputEffects::empty()
      }
      _ => InputEffects::empty(),
    }
  }

  fn pinch_pan(&mut self, a: DVec2, b: DVec2, camera: &mut CanvasCamera) -> InputEffects {
    let Some(mut anchor) = self.pinch else {
      return InputEffects::empty();
    };
    let mut effects = InputEffects::empty();
    let distance = a.distance(b);
    let center = (a + b) * 0.5;

    if (distance - anchor.distance).abs() > self.settings.pinch_threshold {
      if anchor.distance > 0.0 && camera.zoom_at(center, distance / anchor.distance) {
        effects |= InputEffects::CAMERA_CHANGED;
      }
      anchor.distance = distance;
    }

    let delta = center - anchor.center;
    if delta.x.abs() > self.settings.pan_threshold || delta.y.abs() > self.settings.pan_threshold {
      camera.pan(delta);
      anchor.center = center;
      effects |= InputEffects::CAMERA_CHANGED;
    }

    self.pinch = Some(anchor);
    effects
  }

  /// Applies a key action.
  pub fn key(&mut self, key: CanvasKey, target: &mut InputTarget<'_>) -> InputEffects {
    let pan = match key {
      CanvasKey::PanLeft => DVec2::new(KEY_PAN_STEP, 0.0),
      CanvasKey::PanRight => DVec2::new(-KEY_PAN_STEP, 0.0),
      CanvasKey::PanUp => DVec2::new(0.0, KEY_PAN_STEP),
      CanvasKey::PanDown => DVec2::new(0.0, -KEY_PAN_STEP),
      CanvasKey::ToggleEraser => {
        let on = target.brush.toggle_eraser();
        log::debug!("Eraser {}", if on { "on" } else { "off" });
        return InputEffects::BRUSH_CHANGED;
      }
    };
    target.camera.pan(pan);
    InputEffects::CAMERA_CHANGED
  }

  /// Tries to paint the brush color at `world`.
  pub fn draw_at(
    &mut self,
    world: WorldPos,
    target: &mut InputTarget<'_>,
    now: Instant,
  ) -> EditOutcome {
    if let Some(rejected) = Self::draw_gate(world, target) {
      return rejected;
    }

    let color = target.brush.color();
    if target.store.get_pixel(world) == color {
      return EditOutcome::Unchanged;
    }

    if let Some(last) = self.last_edit
      && now.saturating_duration_since(last) < self.settings.draw_cooldown
    {
      return EditOutcome::CoolingDown;
    }

    if !target.store.set_pixel(world, color) {
      return EditOutcome::OutOfBounds;
    }
    self.last_edit = Some(now);
    EditOutcome::Applied
  }

  fn attempt(&mut self, world: WorldPos, target: &mut InputTarget<'_>, now: Instant) -> InputEffects {
    match self.draw_at(world, target, now) {
      EditOutcome::Applied => InputEffects::DREW,
      _ => InputEffects::empty(),
    }
  }

  /// Zoom and bounds gates shared by pointer and touch drawing.
  fn draw_gate(world: WorldPos, target: &InputTarget<'_>) -> Option<EditOutcome> {
    if !target.camera.can_draw() {
      Some(EditOutcome::ZoomTooLow)
    } else if !target.store.is_in_bounds(world.chunk()) {
      Some(EditOutcome::OutOfBounds)
    } else {
      None
    }
  }

  fn track_pointer(&mut self, world: WorldPos) -> InputEffects {
    self.pointer = Some(world);
    InputEffects::POINTER_MOVED
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bounds::WorldBounds;
  use crate::camera::ZoomLimits;
  use crate::color::PixelColor;

  struct Fixture {
    camera: CanvasCamera,
    store: ChunkStore,
    brush: Brush,
  }

  impl Fixture {
    fn new(scale: f64) -> Self {
      Self {
        camera: CanvasCamera::new(scale, ZoomLimits::default()),
        store: ChunkStore::new(WorldBounds::default()),
        brush: Brush::new((255, 0, 0), 100),
      }
    }

    fn target(&mut self) -> InputTarget<'_> {
      InputTarget {
        camera: &mut self.camera,
        store: &mut self.store,
        brush: &mut self.brush,
      }
    }
  }

  #[test]
  fn cooldown_drops_fast_second_edit() {
    let mut fx = Fixture::new(25.0);
    let mut input = InputController::default();
    let t0 = Instant::now();

    assert_eq!(
      input.draw_at(WorldPos::new(1, 1), &mut fx.target(), t0),
      EditOutcome::Applied
    );
    assert_eq!(
      input.draw_at(WorldPos::new(2, 1), &mut fx.target(), t0 + Duration::from_millis(50)),
      EditOutcome::CoolingDown
    );
    assert_eq!(
      input.draw_at(WorldPos::new(2, 1), &mut fx.target(), t0 + Duration::from_millis(200)),
      EditOutcome::Applied
    );
  }

  #[test]
  fn unchanged_color_is_rejected_before_cooldown() {
    let mut fx = Fixture::new(25.0);
    let mut input = InputController::default();
    let t0 = Instant::now();

    input.draw_at(WorldPos::new(10, 10), &mut fx.target(), t0);
    assert_eq!(
      input.draw_at(WorldPos::new(10, 10), &mut fx.target(), t0),
      EditOutcome::Unchanged
    );
  }

  #[test]
  fn secondary_drag_pans_by_raw_delta() {
    let mut fx = Fixture::new(1.0);
    let mut input = InputController::default();
    let now = Instant::now();

    input.pointer_down(PointerButton::Secondary, DVec2::new(10.0, 10.0), &mut fx.target(), now);
    let effects = input.pointer_move(DVec2::new(25.0, 4.0), &mut fx.target(), now);
    assert!(effects.contains(InputEffects::CAMERA_CHANGED));
    assert_eq!(fx.camera.offset(), DVec2::new(15.0, -6.0));

    input.pointer_up(PointerButton::Secondary);
    input.pointer_move(DVec2::new(100.0, 100.0), &mut fx.target(), now);
    assert_eq!(fx.camera.offset(), DVec2::new(15.0, -6.0));
  }

  #[test]
  fn shift_click_picks_color_without_drawing() {
    let mut fx = Fixture::new(25.0);
    fx.store.set_pixel(WorldPos::new(0, 0), PixelColor::Rgb(9, 8, 7));
    fx.store.discard_pending();
    let mut input = InputController::default();
    input.set_shift(true);

    let effects = input.pointer_down(
      PointerButton::Primary,
      DVec2::new(1.0, 1.0),
      &mut fx.target(),
      Instant::now(),
    );
    assert!(effects.contains(InputEffects::BRUSH_CHANGED));
    assert!(!effects.contains(InputEffects::DREW));
    assert_eq!(fx.brush.color(), PixelColor::Rgb(9, 8, 7));
    assert!(fx.store.pending().is_empty());
  }

  #[test]
  fn trackpad_pixels_accumulate_into_notches() {
    let mut notches = WheelNotches::default();
    assert_eq!(notches.feed(WheelDelta::Pixels(20.0)), 0);
    assert_eq!(notches.feed(WheelDelta::Pixels(20.0)), 0);
    assert_eq!(notches.feed(WheelDelta::Pixels(20.0)), 1);
    // Reversing direction drops the leftover 10 px.
    assert_eq!(notches.feed(WheelDelta::Pixels(-45.0)), 0);
    assert_eq!(notches.feed(WheelDelta::Pixels(-5.0)), -1);
    assert_eq!(notches.feed(WheelDelta::Pixels(10_000.0)), 10);
    assert_eq!(notches.feed(WheelDelta::Lines(3.0)), 1);
    assert_eq!(notches.feed(WheelDelta::Lines(-0.5)), -1);
  }

  #[test]
  fn gated_touch_still_tracks_the_pointer() {
    let mut fx = Fixture::new(1.0);
    let mut input = InputController::default();
    let now = Instant::now();

    input.touches(&[DVec2::new(10.0, 10.0)], &mut fx.target(), now);
    assert!(!input.is_drawing());
    let effects = input.touches(&[DVec2::new(30.0, 40.0)], &mut fx.target(), now);

    assert_eq!(effects, InputEffects::POINTER_MOVED);
    assert_eq!(input.pointer(), Some(WorldPos::new(30, 40)));
    assert!(fx.store.is_empty());
  }

  #[test]
  fn arrow_keys_pan_ten_pixels() {
    let mut fx = Fixture::new(3.0);
    let mut input = InputController::default();
    input.key(CanvasKey::PanLeft, &mut fx.target());
    input.key(CanvasKey::PanDown, &mut fx.target());
    assert_eq!(fx.camera.offset(), DVec2::new(10.0, -10.0));
  }
}
