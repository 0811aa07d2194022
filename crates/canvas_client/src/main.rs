use std::path::PathBuf;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};
use bevy_pixel_canvas::session::DEFAULT_CANVAS_SIZE;
use bevy_pixel_canvas::{CanvasConfig, ConfigError, PixelCanvasPlugin};
use clap::Parser;

/// Collaborative pixel canvas client.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
  /// Path to the TOML configuration file.
  #[arg(long, default_value = "assets/config/canvas.config.toml")]
  config: PathBuf,

  /// Server address (`host:port`), overrides `[network] address`.
  #[arg(long)]
  server: Option<String>,
}

fn main() {
  let args = Args::parse();

  let (mut config, load_error) = match CanvasConfig::load(&args.config) {
    Ok(config) => (config, None),
    Err(e) => (CanvasConfig::default(), Some(e)),
  };
  if let Some(server) = args.server {
    config.network.address = server;
  }

  let (width, height) = DEFAULT_CANVAS_SIZE;
  let mut app = App::new();
  app.add_plugins(
    DefaultPlugins
      .set(ImagePlugin::default_nearest())
      .set(WindowPlugin {
        primary_window: Some(Window {
          resolution: WindowResolution::new(width, height),
          title: "Pixel Canvas".to_string(),
          // WASM: only Fifo (vsync) is supported on WebGL2
          present_mode: PresentMode::Fifo,
          #[cfg(target_family = "wasm")]
          canvas: Some("#bevy".to_string()),
          #[cfg(target_family = "wasm")]
          fit_canvas_to_parent: true,
          ..default()
        }),
        ..default()
      }),
  );

  // Logged after DefaultPlugins so the LogPlugin subscriber is installed.
  report_config(&args.config, load_error);

  app.insert_resource(ClearColor(Color::WHITE));
  app.add_plugins(canvas_plugin(config));
  app.run();
}

fn report_config(path: &std::path::Path, error: Option<ConfigError>) {
  match error {
    None => info!("Loaded config from {}", path.display()),
    Some(ConfigError::Io(e)) => {
      warn!("No config at {} ({}), using defaults", path.display(), e)
    }
    Some(e) => warn!("Invalid config {}: {}, using defaults", path.display(), e),
  }
}

#[cfg(not(target_family = "wasm"))]
fn canvas_plugin(config: CanvasConfig) -> PixelCanvasPlugin {
  use bevy_pixel_canvas::TcpTransport;

  let address = config.network.address.clone();
  info!("Connecting to {}", address);
  PixelCanvasPlugin::new(config, TcpTransport::connect(address))
}

// WASM: sockets are owned by the host page, which bridges them through a
// ChannelTransport. Without a bridge the canvas runs offline.
#[cfg(target_family = "wasm")]
fn canvas_plugin(config: CanvasConfig) -> PixelCanvasPlugin {
  PixelCanvasPlugin::offline(config)
}
