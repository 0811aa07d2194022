//! Bevy integration.
//!
//! [`PixelCanvasPlugin`] inserts a [`CanvasSession`] resource and drives it
//! from the app loop:
//! - input systems feed pointer, wheel, touch and key events (when the input
//!   plugin is present)
//! - the sync system pumps transport events and timers every frame
//! - the paint system rasterizes into a [`FrameBuffer`] and uploads it to
//!   a sprite texture (when rendering is present)

use std::sync::Mutex;

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
// WASM compat: std::time::Instant panics on wasm32
use web_time::Instant;

use crate::config::CanvasConfig;
use crate::input::{CanvasKey, PointerButton, WheelDelta, WheelNotches};
use crate::render::{FrameBuffer, PaintSurface, TextSink, create_canvas_texture, upload_frame};
use crate::session::CanvasSession;
use crate::sync::{ChannelTransport, Transport};

/// Ordering of the canvas systems within `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PixelCanvasSet {
  Input,
  Sync,
  Paint,
}

/// Plugin running one collaborative canvas session.
pub struct PixelCanvasPlugin {
  pub config: CanvasConfig,
  transport: Mutex<Option<Box<dyn Transport>>>,
}

impl PixelCanvasPlugin {
  pub fn new(config: CanvasConfig, transport: impl Transport + 'static) -> Self {
    Self {
      config,
      transport: Mutex::new(Some(Box::new(transport))),
    }
  }

  /// A session with no connection; edits stay local and flushes drop.
  pub fn offline(config: CanvasConfig) -> Self {
    Self {
      config,
      transport: Mutex::new(None),
    }
  }
}

impl Plugin for PixelCanvasPlugin {
  fn build(&self, app: &mut App) {
    let transport = self
      .transport
      .lock()
      .ok()
      .and_then(|mut slot| slot.take())
      .unwrap_or_else(|| {
        info!("No transport configured, running offline");
        // The remote end is dropped at once, so the transport never opens.
        Box::new(ChannelTransport::pair().0)
      });

    app.insert_resource(CanvasSession::new(self.config.clone(), transport));

    app.configure_sets(
      Update,
      (
        PixelCanvasSet::Input,
        PixelCanvasSet::Sync,
        PixelCanvasSet::Paint,
      )
        .chain(),
    );

    app.add_systems(Update, pump_network.in_set(PixelCanvasSet::Sync));

    if app.is_plugin_added::<bevy::input::InputPlugin>() {
      app.add_systems(
        Update,
        (keyboard_input, pointer_input, wheel_input, touch_input)
          .chain()
          .in_set(PixelCanvasSet::Input),
      );
    }

    if app.is_plugin_added::<bevy::window::WindowPlugin>() {
      app.add_systems(Update, track_window_size.in_set(PixelCanvasSet::Input));
    }

    if app.is_plugin_added::<bevy::render::RenderPlugin>() {
      app
        .add_systems(Startup, spawn_canvas_view)
        .add_systems(Update, paint_canvas.in_set(PixelCanvasSet::Paint));
    }
  }
}

/// GPU side of the canvas: CPU frame buffer plus the texture it feeds.
#[derive(Resource)]
pub struct CanvasView {
  pub frame: FrameBuffer,
  pub image: Handle<Image>,
}

#[derive(Component)]
pub struct CanvasSprite;

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct CoordinatesText;

fn pump_network(
  mut session: ResMut<CanvasSession>,
  mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
  let report = session.pump(Instant::now());
  if let Some((width, height)) = report.canvas_size
    && let Ok(mut window) = windows.single_mut()
  {
    window.resolution.set(width as f32, height as f32);
  }
  if report.disconnected {
    warn!("Canvas connection lost");
  }
}

fn keyboard_input(mut session: ResMut<CanvasSession>, keys: Res<ButtonInput<KeyCode>>) {
  const BINDINGS: [(KeyCode, CanvasKey); 5] = [
    (KeyCode::ArrowLeft, CanvasKey::PanLeft),
    (KeyCode::ArrowRight, CanvasKey::PanRight),
    (KeyCode::ArrowUp, CanvasKey::PanUp),
    (KeyCode::ArrowDown, CanvasKey::PanDown),
    (KeyCode::KeyE, CanvasKey::ToggleEraser),
  ];

  session.set_shift(keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]));

  let now = Instant::now();
  for (code, key) in BINDINGS {
    if keys.just_pressed(code) {
      session.key(key, now);
    }
  }
}

fn pointer_input(
  mut session: ResMut<CanvasSession>,
  mouse_buttons: Res<ButtonInput<MouseButton>>,
  windows: Query<&Window, With<PrimaryWindow>>,
  mut last_cursor: Local<Option<Vec2>>,
) {
  let Ok(window) = windows.single() else {
    return;
  };
  let now = Instant::now();
  let cursor = window.cursor_position();

  if let Some(pos) = cursor
    && *last_cursor != cursor
  {
    session.pointer_move(pos.as_dvec2(), now);
  }
  *last_cursor = cursor;

  for (button, pointer) in [
    (MouseButton::Left, PointerButton::Primary),
    (MouseButton::Right, PointerButton::Secondary),
  ] {
    if mouse_buttons.just_pressed(button)
      && let Some(pos) = cursor
    {
      session.pointer_down(pointer, pos.as_dvec2(), now);
    }
    if mouse_buttons.just_released(button) {
      session.pointer_up(pointer);
    }
  }
}

fn wheel_input(
  mut session: ResMut<CanvasSession>,
  mut scroll_events: MessageReader<MouseWheel>,
  windows: Query<&Window, With<PrimaryWindow>>,
  mut notches: Local<WheelNotches>,
) {
  let cursor = windows.single().ok().and_then(|w| w.cursor_position());
  let now = Instant::now();
  for event in scroll_events.read() {
    let delta = match event.unit {
      MouseScrollUnit::Line => WheelDelta::Lines(event.y as f64),
      MouseScrollUnit::Pixel => WheelDelta::Pixels(event.y as f64),
    };
    let steps = notches.feed(delta);
    if let Some(pos) = cursor {
      for _ in 0..steps.unsigned_abs() {
        session.wheel(pos.as_dvec2(), steps.signum() as f64, now);
      }
    }
  }
}

fn touch_input(
  mut session: ResMut<CanvasSession>,
  touches: Res<Touches>,
  mut active: Local<Vec<(u64, Vec2)>>,
) {
  let had_touches = !active.is_empty();
  active.clear();
  active.extend(touches.iter().map(|t| (t.id(), t.position())));
  if active.is_empty() && !had_touches {
    return;
  }
  active.sort_by_key(|(id, _)| *id);

  let points: Vec<_> = active.iter().map(|(_, p)| p.as_dvec2()).collect();
  session.touches(&points, Instant::now());
}

fn track_window_size(
  mut session: ResMut<CanvasSession>,
  mut resize_events: MessageReader<WindowResized>,
) {
  if let Some(event) = resize_events.read().last() {
    session.resize(event.width.max(1.0) as u32, event.height.max(1.0) as u32);
  }
}

fn spawn_canvas_view(
  mut commands: Commands,
  mut images: ResMut<Assets<Image>>,
  mut session: ResMut<CanvasSession>,
  windows: Query<&Window, With<PrimaryWindow>>,
) {
  if let Ok(window) = windows.single() {
    session.resize(window.width() as u32, window.height() as u32);
  }
  let (width, height) = session.canvas_size();
  let image = create_canvas_texture(&mut images, width, height);

  commands.spawn(Camera2d);
  commands.spawn((
    Sprite {
      image: image.clone(),
      custom_size: Some(Vec2::new(width as f32, height as f32)),
      ..default()
    },
    CanvasSprite,
  ));
  commands.spawn((
    Text::new(""),
    TextFont {
      font_size: 16.0,
      ..default()
    },
    TextColor(Color::BLACK),
    Node {
      position_type: PositionType::Absolute,
      top: Val::Px(10.0),
      right: Val::Px(10.0),
      ..default()
    },
    StatusText,
  ));
  commands.spawn((
    Text::new(""),
    TextFont {
      font_size: 14.0,
      ..default()
    },
    TextColor(Color::BLACK),
    Node {
      position_type: PositionType::Absolute,
      bottom: Val::Px(10.0),
      left: Val::Px(10.0),
      ..default()
    },
    CoordinatesText,
  ));

  commands.insert_resource(CanvasView {
    frame: FrameBuffer::new(width, height),
    image,
  });
  session.request_redraw();
}

/// Text readouts produced by one paint.
#[derive(Default)]
struct TextUpdate {
  status: Option<String>,
  coordinates: Option<String>,
}

impl TextSink for TextUpdate {
  fn set_coordinates(&mut self, text: &str) {
    self.coordinates = Some(text.to_string());
  }

  fn set_status(&mut self, text: &str) {
    self.status = Some(text.to_string());
  }
}

fn paint_canvas(
  mut session: ResMut<CanvasSession>,
  view: Option<ResMut<CanvasView>>,
  mut images: ResMut<Assets<Image>>,
  mut sprites: Query<&mut Sprite, With<CanvasSprite>>,
  mut status_text: Query<&mut Text, (With<StatusText>, Without<CoordinatesText>)>,
  mut coordinates_text: Query<&mut Text, (With<CoordinatesText>, Without<StatusText>)>,
) {
  let Some(mut view) = view else {
    return;
  };

  let (width, height) = session.canvas_size();
  if view.frame.size() != (width, height) {
    view.frame.resize(width, height);
    for mut sprite in &mut sprites {
      sprite.custom_size = Some(Vec2::new(width as f32, height as f32));
    }
    session.request_redraw();
  }

  let mut text = TextUpdate::default();
  let view = &mut *view;
  if session.frame(&mut view.frame, &mut text).is_none() {
    return;
  }

  if let Some(image) = images.get_mut(&view.image) {
    upload_frame(&view.frame, image);
  }
  if let Some(status) = text.status
    && let Ok(mut node) = status_text.single_mut()
  {
    node.0 = status;
  }
  if let Some(coordinates) = text.coordinates
    && let Ok(mut node) = coordinates_text.single_mut()
  {
    node.0 = coordinates;
  }
}
