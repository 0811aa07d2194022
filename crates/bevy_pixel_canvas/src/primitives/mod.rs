mod chunk;
mod surface;

pub use chunk::{Chunk, ChunkData};
pub use surface::{RgbaSurface, Surface};
