//! Viewport rendering into the CPU frame buffer.

use bevy::math::DVec2;
use bevy_pixel_canvas::viewport::{BACKGROUND_COLOR, GRID_COLOR, PLACEHOLDER_COLOR, POINTER_COLOR};
use bevy_pixel_canvas::{
  CanvasCamera, CanvasConfig, CanvasSession, ChannelTransport, ChunkStore, FrameBuffer,
  PixelColor, PointerButton, TextSink, ViewportRenderer, WorldBounds, WorldPos, ZoomLimits,
};
use web_time::Instant;

const RED: PixelColor = PixelColor::Rgb(255, 0, 0);

fn camera(scale: f64, offset: DVec2) -> CanvasCamera {
  let mut camera = CanvasCamera::new(scale, ZoomLimits::default());
  camera.set_offset(offset);
  camera
}

#[derive(Default)]
struct Captured {
  coordinates: Vec<String>,
  status: Vec<String>,
}

impl TextSink for Captured {
  fn set_coordinates(&mut self, text: &str) {
    self.coordinates.push(text.to_string());
  }

  fn set_status(&mut self, text: &str) {
    self.status.push(text.to_string());
  }
}

#[test]
fn out_of_bounds_chunks_get_placeholder_tiles() {
  let store = ChunkStore::new(WorldBounds::new(500, 500));
  let mut fb = FrameBuffer::new(200, 200);
  let renderer = ViewportRenderer::default();

  renderer.paint(&mut fb, &store, &camera(1.0, DVec2::new(100.0, 100.0)), None);

  assert_eq!(fb.pixel(50, 50), Some(PLACEHOLDER_COLOR));
  assert_eq!(fb.pixel(150, 50), Some(PLACEHOLDER_COLOR));
  assert_eq!(fb.pixel(150, 150), Some(BACKGROUND_COLOR));
}

#[test]
fn only_visible_chunks_are_painted() {
  let mut store = ChunkStore::new(WorldBounds::new(500, 500));
  store.set_pixel(WorldPos::new(10, 10), RED);
  store.set_pixel(WorldPos::new(400, 400), RED);
  let mut fb = FrameBuffer::new(500, 500);
  let renderer = ViewportRenderer::default();

  let stats = renderer.paint(&mut fb, &store, &camera(1.0, DVec2::ZERO), None);
  // 13 x 13 chunks from -1 to 11, of which 10 x 10 are drawable.
  assert_eq!(stats.placeholders, 69);
  assert_eq!(stats.chunks, 2);
  assert!(!stats.grid);

  let stats = renderer.paint(&mut fb, &store, &camera(4.0, DVec2::ZERO), None);
  assert_eq!(stats.chunks, 1);
  assert_eq!(fb.pixel(41, 41), Some(RED.to_rgba()));
  assert_eq!(fb.pixel(45, 41), Some(BACKGROUND_COLOR));
}

#[test]
fn pointer_outline_is_one_device_pixel_wide() {
  let store = ChunkStore::new(WorldBounds::new(500, 500));
  let mut fb = FrameBuffer::new(200, 200);
  let renderer = ViewportRenderer::default();

  renderer.paint(
    &mut fb,
    &store,
    &camera(25.0, DVec2::ZERO),
    Some(WorldPos::new(2, 2)),
  );

  assert_eq!(fb.pixel(60, 50), Some(POINTER_COLOR));
  assert_eq!(fb.pixel(50, 60), Some(POINTER_COLOR));
  assert_eq!(fb.pixel(74, 60), Some(POINTER_COLOR));
  assert_eq!(fb.pixel(60, 60), Some(BACKGROUND_COLOR));
  assert_eq!(fb.pixel(60, 49), Some(BACKGROUND_COLOR));
}

#[test]
fn grid_overlay_appears_when_zoomed_in() {
  let store = ChunkStore::new(WorldBounds::new(500, 500));
  let mut fb = FrameBuffer::new(200, 200);
  let renderer = ViewportRenderer::new(30.0);

  let stats = renderer.paint(&mut fb, &store, &camera(30.0, DVec2::ZERO), None);
  assert!(stats.grid);
  assert_eq!(fb.pixel(30, 15), Some(GRID_COLOR));
  assert_eq!(fb.pixel(15, 60), Some(GRID_COLOR));
  assert_eq!(fb.pixel(15, 15), Some(BACKGROUND_COLOR));
}

#[test]
fn session_frame_publishes_status_and_coordinates() {
  let mut config = CanvasConfig::default();
  config.zoom.initial = 25.0;
  let (transport, _remote) = ChannelTransport::pair();
  let mut session = CanvasSession::new(config, Box::new(transport));
  let now = Instant::now();

  session.pointer_down(PointerButton::Primary, DVec2::new(60.0, 60.0), now);
  session.pointer_move(DVec2::new(61.0, 61.0), now);

  let mut fb = FrameBuffer::new(100, 100);
  let mut text = Captured::default();
  assert!(session.frame(&mut fb, &mut text).is_some());
  assert!(session.frame(&mut fb, &mut text).is_none());

  assert_eq!(text.coordinates, vec!["(2, 2)".to_string()]);
  assert_eq!(
    text.status,
    vec!["You may draw.\nZoom: 25.00x\nDisconnected".to_string()]
  );
  assert_eq!(fb.pixel(55, 55), Some(PixelColor::BLACK.to_rgba()));
}
