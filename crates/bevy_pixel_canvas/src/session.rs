//! Canvas session: the explicit context object owning all engine state.
//!
//! Created when the session starts, dropped when it ends. Every event entry
//! point (pointer, touch, wheel, key, network pump, frame) is a method here,
//! so components never share state except through this object.

use std::time::Duration;

use bevy::math::DVec2;
use bevy::prelude::Resource;
// WASM compat: std::time::Instant panics on wasm32
use web_time::Instant;

use crate::brush::Brush;
use crate::camera::CanvasCamera;
use crate::config::CanvasConfig;
use crate::coords::WorldPos;
use crate::input::{
  CanvasKey, EditOutcome, InputController, InputEffects, InputTarget, PointerButton,
};
use crate::render::{PaintSurface, TextSink};
use crate::scheduler::FrameRequest;
use crate::store::ChunkStore;
use crate::sync::{SyncClient, SyncReport, SyncState, Transport};
use crate::viewport::{DrawPermission, FrameStats, StatusReadout, ViewportRenderer};

/// Canvas size used until the host reports one.
pub const DEFAULT_CANVAS_SIZE: (u32, u32) = (500, 500);

/// All state of one canvas session. Inserted as a resource by the plugin.
#[derive(Resource)]
pub struct CanvasSession {
  config: CanvasConfig,
  camera: CanvasCamera,
  store: ChunkStore,
  brush: Brush,
  input: InputController,
  sync: SyncClient,
  redraw: FrameRequest,
  renderer: ViewportRenderer,
  canvas: (u32, u32),
}

impl CanvasSession {
  pub fn new(config: CanvasConfig, transport: Box<dyn Transport>) -> Self {
    let mut redraw = FrameRequest::new();
    redraw.request();
    Self {
      camera: CanvasCamera::new(config.zoom.initial, config.zoom_limits()),
      store: ChunkStore::new(config.bounds()),
      brush: config.brush(),
      input: InputController::new(config.input_settings()),
      sync: SyncClient::new(transport, config.sync_timing()),
      redraw,
      renderer: ViewportRenderer::new(config.zoom.grid_min),
      canvas: DEFAULT_CANVAS_SIZE,
      config,
    }
  }

  pub fn config(&self) -> &CanvasConfig {
    &self.config
  }

  pub fn camera(&self) -> &CanvasCamera {
    &self.camera
  }

  pub fn store(&self) -> &ChunkStore {
    &self.store
  }

  pub fn brush(&self) -> &Brush {
    &self.brush
  }

  pub fn sync_state(&self) -> SyncState {
    self.sync.state()
  }

  pub fn latency(&self) -> Option<Duration> {
    self.sync.latency()
  }

  pub fn canvas_size(&self) -> (u32, u32) {
    self.canvas
  }

  /// Last world pixel under the pointer.
  pub fn pointer(&self) -> Option<WorldPos> {
    self.input.pointer()
  }

  pub fn is_redraw_requested(&self) -> bool {
    self.redraw.is_requested()
  }

  /// Requests a paint on the next frame.
  pub fn request_redraw(&mut self) {
    self.redraw.request();
  }

  /// Resizes the paint surface.
  pub fn resize(&mut self, width: u32, height: u32) {
    if self.canvas != (width, height) {
      self.canvas = (width, height);
      self.redraw.request();
    }
  }

  /// Centers the view on the middle of the drawable world.
  pub fn recenter(&mut self) {
    let bounds = self.store.bounds();
    let world_center = DVec2::new(bounds.width as f64, bounds.height as f64) * 0.5;
    let canvas = DVec2::new(self.canvas.0 as f64, self.canvas.1 as f64);
    self.camera.center_on(world_center, canvas);
    self.redraw.request();
  }

  /// Color source input: base color of the brush.
  pub fn set_brush_base(&mut self, base: (u8, u8, u8)) {
    self.brush.set_base(base);
    self.redraw.request();
  }

  /// Color source input: brightness in percent.
  pub fn set_brush_brightness(&mut self, brightness: u8) {
    self.brush.set_brightness(brightness);
    self.redraw.request();
  }

  pub fn set_shift(&mut self, held: bool) {
    self.input.set_shift(held);
  }

  pub fn pointer_down(&mut self, button: PointerButton, screen: DVec2, now: Instant) -> InputEffects {
    let (input, mut target) = self.split();
    let effects = input.pointer_down(button, screen, &mut target, now);
    self.apply(effects, now)
  }

  pub fn pointer_up(&mut self, button: PointerButton) {
    self.input.pointer_up(button);
  }

  pub fn pointer_move(&mut self, screen: DVec2, now: Instant) -> InputEffects {
    let (input, mut target) = self.split();
    let effects = input.pointer_move(screen, &mut target, now);
    self.apply(effects, now)
  }

  pub fn wheel(&mut self, screen: DVec2, delta: f64, now: Instant) -> InputEffects {
    let effects = self.input.wheel(screen, delta, &mut self.camera);
    self.apply(effects, now)
  }

  pub fn touches(&mut self, points: &[DVec2], now: Instant) -> InputEffects {
    let (input, mut target) = self.split();
    let effects = input.touches(points, &mut target, now);
    self.apply(effects, now)
  }

  pub fn key(&mut self, key: CanvasKey, now: Instant) -> InputEffects {
    let (input, mut target) = self.split();
    let effects = input.key(key, &mut target);
    self.apply(effects, now)
  }

  /// Paints at a world pixel through the same gates as pointer drawing.
  pub fn draw_at(&mut self, world: WorldPos, now: Instant) -> EditOutcome {
    let (input, mut target) = self.split();
    let outcome = input.draw_at(world, &mut target, now);
    if outcome == EditOutcome::Applied {
      self.apply(InputEffects::DREW, now);
    }
    outcome
  }

  /// Processes transport events and timers.
  pub fn pump(&mut self, now: Instant) -> SyncReport {
    let report = self.sync.pump(&mut self.store, now);
    if let Some((width, height)) = report.canvas_size {
      log::info!("Canvas resized by server to {}x{}", width, height);
      self.resize(width, height);
      self.recenter();
    }
    if report.redraw {
      self.redraw.request();
    }
    report
  }

  pub fn status(&self) -> StatusReadout {
    StatusReadout {
      permission: DrawPermission::evaluate(&self.camera, self.store.bounds(), self.pointer()),
      zoom: self.camera.scale(),
      sync: self.sync.state(),
      latency: self.sync.latency(),
    }
  }

  /// Pointer coordinate text, e.g. `(12, -3)`.
  pub fn coordinates_text(&self) -> Option<String> {
    self.pointer().map(|p| format!("({}, {})", p.x, p.y))
  }

  /// Paints if a redraw was requested since the last frame.
  ///
  /// Any number of triggers between two frames results in one paint.
  pub fn frame<S, T>(&mut self, surface: &mut S, text: &mut T) -> Option<FrameStats>
  where
    S: PaintSurface + ?Sized,
    T: TextSink + ?Sized,
  {
    if !self.redraw.take() {
      return None;
    }
    Some(self.render(surface, text))
  }

  /// Paints unconditionally and publishes the text readouts.
  pub fn render<S, T>(&self, surface: &mut S, text: &mut T) -> FrameStats
  where
    S: PaintSurface + ?Sized,
    T: TextSink + ?Sized,
  {
    let stats = self
      .renderer
      .paint(surface, &self.store, &self.camera, self.pointer());
    if let Some(coords) = self.coordinates_text() {
      text.set_coordinates(&coords);
    }
    text.set_status(&self.status().to_string());
    stats
  }

  fn split(&mut self) -> (&mut InputController, InputTarget<'_>) {
    (
      &mut self.input,
      InputTarget {
        camera: &mut self.camera,
        store: &mut self.store,
        brush: &mut self.brush,
      },
    )
  }

  fn apply(&mut self, effects: InputEffects, now: Instant) -> InputEffects {
    if effects.contains(InputEffects::DREW) {
      self.sync.note_local_edit(now);
    }
    if effects.needs_redraw() {
      self.redraw.request();
    }
    effects
  }
}
