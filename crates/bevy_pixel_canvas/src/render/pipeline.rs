//! Canvas texture: the GPU image the frame buffer is copied into.

use bevy::asset::RenderAssetUsages;
use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use super::FrameBuffer;

fn extent(width: u32, height: u32) -> Extent3d {
  Extent3d {
    width: width.max(1),
    height: height.max(1),
    depth_or_array_layers: 1,
  }
}

/// Creates the canvas texture, initially white, sampled nearest-neighbor so
/// zoomed pixels stay sharp.
pub fn create_canvas_texture(images: &mut Assets<Image>, width: u32, height: u32) -> Handle<Image> {
  images.add(canvas_image(width, height))
}

fn canvas_image(width: u32, height: u32) -> Image {
  let mut image = Image::new_fill(
    extent(width, height),
    TextureDimension::D2,
    &[255, 255, 255, 255],
    TextureFormat::Rgba8UnormSrgb,
    RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
  );
  image.sampler = ImageSampler::nearest();
  image
}

/// Copies a painted frame into the canvas texture, resizing the texture
/// first if the frame size changed. Returns false if nothing was copied.
pub fn upload_frame(frame: &FrameBuffer, image: &mut Image) -> bool {
  let pixels = frame.pixels();
  let (width, height) = (pixels.width(), pixels.height());
  if width == 0 || height == 0 {
    return false;
  }
  let size = extent(width, height);
  if image.texture_descriptor.size != size {
    image.resize(size);
  }

  let bytes = pixels.as_bytes();
  match image.data.as_mut() {
    Some(data) if data.len() == bytes.len() => {
      data.copy_from_slice(bytes);
      true
    }
    _ => false,
  }
}
