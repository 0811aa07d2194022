//! Gesture handling through the session: draw gates, pan, anchored zoom and
//! multi-touch transitions.

use std::time::Duration;

use bevy::math::DVec2;
use bevy_pixel_canvas::{
  CanvasConfig, CanvasKey, CanvasSession, ChannelTransport, ChunkPos, EditOutcome, InputEffects,
  PixelColor, PointerButton, WorldPos,
};
use web_time::Instant;

fn session_at(scale: f64) -> CanvasSession {
  let mut config = CanvasConfig::default();
  config.zoom.initial = scale;
  let (transport, _remote) = ChannelTransport::pair();
  CanvasSession::new(config, Box::new(transport))
}

#[test]
fn drawing_requires_zoom_above_threshold() {
  let now = Instant::now();

  let mut session = session_at(21.0);
  let effects = session.pointer_down(PointerButton::Primary, DVec2::new(30.0, 30.0), now);
  assert!(!effects.contains(InputEffects::DREW));
  assert!(session.store().is_empty());
  assert_eq!(session.draw_at(WorldPos::new(1, 1), now), EditOutcome::ZoomTooLow);

  let mut session = session_at(21.5);
  let effects = session.pointer_down(PointerButton::Primary, DVec2::new(30.0, 30.0), now);
  assert!(effects.contains(InputEffects::DREW));
  assert_eq!(session.store().get_pixel(WorldPos::new(1, 1)), PixelColor::BLACK);
}

#[test]
fn primary_drag_draws_at_cooldown_pace() {
  let mut session = session_at(25.0);
  let t0 = Instant::now();

  session.pointer_down(PointerButton::Primary, DVec2::new(10.0, 10.0), t0);
  session.pointer_move(DVec2::new(35.0, 10.0), t0 + Duration::from_millis(100));
  session.pointer_move(DVec2::new(60.0, 10.0), t0 + Duration::from_millis(250));
  session.pointer_up(PointerButton::Primary);
  session.pointer_move(DVec2::new(85.0, 10.0), t0 + Duration::from_secs(2));

  let store = session.store();
  assert_eq!(store.get_pixel(WorldPos::new(0, 0)), PixelColor::BLACK);
  assert_eq!(store.get_pixel(WorldPos::new(1, 0)), PixelColor::Background);
  assert_eq!(store.get_pixel(WorldPos::new(2, 0)), PixelColor::BLACK);
  assert_eq!(store.get_pixel(WorldPos::new(3, 0)), PixelColor::Background);
}

#[test]
fn pointer_down_out_of_bounds_does_not_start_a_stroke() {
  let mut session = session_at(25.0);
  let t0 = Instant::now();

  session.pointer_down(PointerButton::Primary, DVec2::new(-10.0, 10.0), t0);
  session.pointer_move(DVec2::new(10.0, 10.0), t0 + Duration::from_secs(1));
  assert!(session.store().is_empty());
  assert_eq!(session.pointer(), Some(WorldPos::new(0, 0)));
}

#[test]
fn wheel_zoom_keeps_world_point_under_cursor() {
  let mut session = session_at(3.0);
  let now = Instant::now();
  let cursor = DVec2::new(123.0, 77.0);
  let before = session.camera().screen_to_world_point(cursor);

  for _ in 0..5 {
    assert!(
      session
        .wheel(cursor, 1.0, now)
        .contains(InputEffects::CAMERA_CHANGED)
    );
  }
  let after = session.camera().screen_to_world_point(cursor);
  assert!((before - after).length() < 1e-9);
  assert!(session.camera().scale() > 3.0);
}

#[test]
fn wheel_zoom_past_limits_changes_nothing() {
  let mut session = session_at(48.0);
  let now = Instant::now();
  let camera = *session.camera();

  assert!(session.wheel(DVec2::new(5.0, 5.0), 1.0, now).is_empty());
  assert_eq!(*session.camera(), camera);
}

#[test]
fn two_finger_pinch_zooms_and_pans() {
  let mut session = session_at(1.0);
  let now = Instant::now();

  session.touches(&[DVec2::new(100.0, 100.0), DVec2::new(200.0, 100.0)], now);
  assert_eq!(session.camera().scale(), 1.0);

  // Fingers spread by 20px around a fixed centroid.
  let effects = session.touches(&[DVec2::new(90.0, 100.0), DVec2::new(210.0, 100.0)], now);
  assert!(effects.contains(InputEffects::CAMERA_CHANGED));
  assert!((session.camera().scale() - 1.2).abs() < 1e-12);
  let anchored = session
    .camera()
    .screen_to_world_point(DVec2::new(150.0, 100.0));
  assert!((anchored - DVec2::new(150.0, 100.0)).length() < 1e-9);

  // Both fingers slide right: pan only.
  let offset = session.camera().offset();
  session.touches(&[DVec2::new(100.0, 100.0), DVec2::new(220.0, 100.0)], now);
  assert!((session.camera().scale() - 1.2).abs() < 1e-12);
  assert_eq!(session.camera().offset(), offset + DVec2::new(10.0, 0.0));

  // Jitter below the thresholds is ignored.
  let offset = session.camera().offset();
  session.touches(&[DVec2::new(101.0, 101.0), DVec2::new(221.0, 101.0)], now);
  assert_eq!(session.camera().offset(), offset);
}

#[test]
fn touch_count_changes_reset_gestures() {
  let mut session = session_at(25.0);
  let t0 = Instant::now();

  let effects = session.touches(&[DVec2::new(30.0, 30.0)], t0);
  assert!(effects.contains(InputEffects::DREW));

  let later = t0 + Duration::from_secs(1);
  session.touches(&[DVec2::new(80.0, 30.0), DVec2::new(300.0, 300.0)], later);
  assert!(!session.store().pending().is_empty());
  assert_eq!(session.store().get_pixel(WorldPos::new(3, 1)), PixelColor::Background);

  // Lifting one finger re-enables drawing without painting immediately.
  let effects = session.touches(&[DVec2::new(80.0, 30.0)], later);
  assert!(!effects.contains(InputEffects::DREW));
  assert_eq!(session.store().get_pixel(WorldPos::new(3, 1)), PixelColor::Background);

  let effects = session.touches(&[DVec2::new(105.0, 30.0)], later + Duration::from_secs(1));
  assert!(effects.contains(InputEffects::DREW));
  assert_eq!(session.store().get_pixel(WorldPos::new(4, 1)), PixelColor::BLACK);

  session.touches(&[], later);
  let effects = session.touches(&[], later);
  assert!(effects.is_empty());
}

#[test]
fn eraser_paints_background() {
  let mut session = session_at(25.0);
  let t0 = Instant::now();
  session.draw_at(WorldPos::new(7, 7), t0);

  session.key(CanvasKey::ToggleEraser, t0);
  assert!(session.brush().is_eraser());
  assert_eq!(
    session.draw_at(WorldPos::new(7, 7), t0 + Duration::from_secs(1)),
    EditOutcome::Applied
  );
  assert_eq!(session.store().get_pixel(WorldPos::new(7, 7)), PixelColor::Background);
  assert!(session.store().contains(ChunkPos::new(0, 0)));
}
