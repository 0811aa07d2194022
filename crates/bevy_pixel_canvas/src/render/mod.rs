//! Rendering: paint surface abstraction, CPU frame buffer and GPU upload.

mod framebuffer;
mod pipeline;
mod surface;

pub use framebuffer::FrameBuffer;
pub use pipeline::{create_canvas_texture, upload_frame};
pub use surface::{PaintSurface, TextSink};

/// RGBA pixel with 8 bits per channel, using sRGB color space.
///
/// Re-exported from the `palette` crate for color handling.
pub type Rgba = palette::Srgba<u8>;

/// Creates an opaque RGB color (alpha = 255).
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
  Rgba::new(r, g, b, 255)
}
