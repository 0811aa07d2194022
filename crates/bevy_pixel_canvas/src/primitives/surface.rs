//! Row-major 2D buffers.
//!
//! [`Surface`] backs both chunk color data (`Surface<PixelColor>`) and every
//! RGBA image the renderer touches: chunk render caches, the placeholder
//! tile and the frame buffer. Row 0 is the top row, matching screen and
//! world Y.

use std::ops::{Index, IndexMut};

use crate::render::Rgba;

// as_bytes() hands RGBA rows straight to the texture upload.
const _: () = assert!(std::mem::size_of::<Rgba>() == 4);

/// Fixed-size row-major buffer, indexed `y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface<T> {
  data: Box<[T]>,
  width: u32,
  height: u32,
}

/// RGBA pixels, laid out for direct texture upload.
pub type RgbaSurface = Surface<Rgba>;

impl<T: Clone + Default> Surface<T> {
  pub fn new(width: u32, height: u32) -> Self {
    Self::filled(width, height, T::default())
  }

  /// Wraps row-major data, padding with `T::default()` or truncating to
  /// exactly `width * height` elements.
  pub fn from_vec(width: u32, height: u32, mut data: Vec<T>) -> Self {
    data.resize(area(width, height), T::default());
    Self {
      data: data.into_boxed_slice(),
      width,
      height,
    }
  }
}

impl<T: Clone> Surface<T> {
  pub fn filled(width: u32, height: u32, value: T) -> Self {
    Self {
      data: vec![value; area(width, height)].into_boxed_slice(),
      width,
      height,
    }
  }
}

impl<T> Surface<T> {
  #[inline]
  pub fn width(&self) -> u32 {
    self.width
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.height
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Returns the element at (x, y), or `None` outside the surface.
  #[inline]
  pub fn get(&self, x: u32, y: u32) -> Option<&T> {
    if x < self.width && y < self.height {
      Some(&self.data[self.offset(x, y)])
    } else {
      None
    }
  }

  #[inline]
  pub fn as_slice(&self) -> &[T] {
    &self.data
  }

  #[inline]
  pub fn as_slice_mut(&mut self) -> &mut [T] {
    &mut self.data
  }

  #[inline]
  pub fn row(&self, y: u32) -> &[T] {
    let start = self.offset(0, y);
    &self.data[start..start + self.width as usize]
  }

  #[inline]
  pub fn row_mut(&mut self, y: u32) -> &mut [T] {
    let start = self.offset(0, y);
    let end = start + self.width as usize;
    &mut self.data[start..end]
  }

  /// Reinterprets the buffer as raw bytes for GPU upload.
  ///
  /// Only meaningful for `#[repr(C)]` element types without padding, such
  /// as [`Rgba`].
  #[inline]
  pub fn as_bytes(&self) -> &[u8] {
    let len = std::mem::size_of_val(&*self.data);
    // SAFETY: the boxed slice is contiguous and `len` covers exactly it.
    unsafe { std::slice::from_raw_parts(self.data.as_ptr().cast::<u8>(), len) }
  }

  #[inline]
  fn offset(&self, x: u32, y: u32) -> usize {
    (y as usize) * (self.width as usize) + (x as usize)
  }
}

fn area(width: u32, height: u32) -> usize {
  (width as usize) * (height as usize)
}

impl<T> Index<(u32, u32)> for Surface<T> {
  type Output = T;

  #[inline]
  fn index(&self, (x, y): (u32, u32)) -> &T {
    &self.data[self.offset(x, y)]
  }
}

impl<T> IndexMut<(u32, u32)> for Surface<T> {
  #[inline]
  fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut T {
    let i = self.offset(x, y);
    &mut self.data[i]
  }
}

impl<T> Index<usize> for Surface<T> {
  type Output = T;

  #[inline]
  fn index(&self, index: usize) -> &T {
    &self.data[index]
  }
}

impl<T> IndexMut<usize> for Surface<T> {
  #[inline]
  fn index_mut(&mut self, index: usize) -> &mut T {
    &mut self.data[index]
  }
}
