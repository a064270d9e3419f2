//! Owned RGBA pixel storage
//!
//! `PixelBuffer` is a flat, row-major, interleaved RGBA byte array with
//! bounds-checked accessors. All offset arithmetic in the crate lives here.

use image::RgbaImage;
use rayon::prelude::*;
use crate::error::{Result, PrismError};

/// Bytes per pixel (R, G, B, A)
pub const CHANNELS: usize = 4;

/// Index of the alpha channel inside a pixel
pub const ALPHA: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled (fully transparent black) buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * CHANNELS],
        }
    }

    /// Wrap raw RGBA bytes; the length must be exactly `width * height * 4`
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(PrismError::InvalidParameter(format!(
                "expected {} bytes for a {}x{} RGBA buffer, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn from_rgba_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    pub fn into_rgba_image(self) -> RgbaImage {
        // Length invariant is upheld by every constructor
        RgbaImage::from_raw(self.width, self.height, self.data)
            .unwrap_or_else(|| unreachable!("pixel buffer length out of sync with dimensions"))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    /// RGBA of pixel (x, y), or `None` outside the buffer
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    pub fn alpha(&self, x: u32, y: u32) -> Option<u8> {
        let i = self.offset(x, y)?;
        Some(self.data[i + ALPHA])
    }

    /// Overwrite R, G and B of pixel (x, y); alpha is left as it was
    pub fn set_color(&mut self, x: u32, y: u32, rgb: [u8; 3]) -> Result<()> {
        let i = self.offset(x, y).ok_or(PrismError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        self.data[i..i + 3].copy_from_slice(&rgb);
        Ok(())
    }

    /// Immutable rows of `width * 4` bytes, top to bottom
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(self.row_len())
    }

    /// Mutable rows of `width * 4` bytes, top to bottom
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        let row_len = self.row_len();
        self.data.chunks_exact_mut(row_len)
    }

    /// Mutable rows as a rayon parallel iterator
    pub fn par_rows_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, u8> {
        let row_len = self.row_len();
        self.data.par_chunks_exact_mut(row_len)
    }

    pub(crate) fn row_len(&self) -> usize {
        // chunks_exact panics on zero; an empty buffer has no rows either way
        (self.width as usize * CHANNELS).max(CHANNELS)
    }

    /// Number of pixels whose alpha is exactly zero
    pub fn transparent_count(&self) -> usize {
        self.data
            .chunks_exact(CHANNELS)
            .filter(|px| px[ALPHA] == 0)
            .count()
    }
}
