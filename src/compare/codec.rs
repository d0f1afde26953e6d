//! Image codec abstraction and the RGBA pixel buffer it produces.
//!
//! Comparison works on `PixelBuffer`, a row-major RGBA8 buffer with explicit
//! dimensions. Codecs translate between file payloads and that layout:
//! - `PngCodec` for PNG screenshots (the only format captured today)

use std::error::Error;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{ImageBuffer, ImageFormat, RgbaImage};

use super::types::{CompareError, CompareResult};
use crate::config;

/// Bytes per pixel in a `PixelBuffer`
pub const CHANNELS: usize = 4;

/// Row-major RGBA8 pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create an opaque black buffer with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_color(width, height, [0, 0, 0, 255])
    }

    /// Create a buffer filled with a single RGBA color
    pub fn with_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut buffer = Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * CHANNELS],
        };
        buffer.fill(color);
        buffer
    }

    /// Wrap raw RGBA bytes, returning `None` if the length does not match the dimensions
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * CHANNELS {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (width * height)
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Fill the entire buffer with a color
    pub fn fill(&mut self, color: [u8; 4]) {
        for chunk in self.data.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Draw a filled rectangle, clipped to the buffer bounds
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 4]) {
        for py in y..y.saturating_add(h).min(self.height) {
            for px in x..x.saturating_add(w).min(self.width) {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Get the color of a pixel; out-of-bounds reads return transparent black
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        match self.offset(x, y) {
            Some(idx) => [
                self.data[idx],
                self.data[idx + 1],
                self.data[idx + 2],
                self.data[idx + 3],
            ],
            None => [0, 0, 0, 0],
        }
    }

    /// Set the color of a pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if let Some(idx) = self.offset(x, y) {
            self.data[idx..idx + CHANNELS].copy_from_slice(&color);
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * CHANNELS)
    }
}

/// Trait for image codecs
///
/// `decode`/`encode` work on in-memory payloads; `read`/`write` add the file
/// handling and map failures to `CompareError` with the offending path.
pub trait ImageCodec {
    /// File extension (without the dot) handled by this codec
    fn extension(&self) -> &str;

    /// Decode a payload into an RGBA buffer
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer, Box<dyn Error + Send + Sync>>;

    /// Encode an RGBA buffer into a payload
    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>>;

    /// Read and decode an image file
    fn read(&self, path: &Path) -> CompareResult<PixelBuffer> {
        let data = fs::read(path).map_err(|e| CompareError::io(path, e))?;
        self.decode(&data).map_err(|e| CompareError::decode(path, e))
    }

    /// Encode and write an image file, creating parent directories as needed
    fn write(&self, path: &Path, buffer: &PixelBuffer) -> CompareResult<()> {
        let data = self.encode(buffer).map_err(|e| CompareError::encode(path, e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CompareError::io(parent, e))?;
        }
        fs::write(path, data).map_err(|e| CompareError::io(path, e))
    }
}

/// PNG codec backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn extension(&self) -> &str {
        config::DEFAULT_EXTENSION
    }

    fn decode(&self, data: &[u8]) -> Result<PixelBuffer, Box<dyn Error + Send + Sync>> {
        let img = image::load_from_memory_with_format(data, ImageFormat::Png)?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        PixelBuffer::from_raw(width, height, rgba.into_raw())
            .ok_or_else(|| "decoded buffer does not match its dimensions".into())
    }

    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        let img: RgbaImage =
            ImageBuffer::from_raw(buffer.width(), buffer.height(), buffer.as_bytes().to_vec())
                .ok_or("buffer size does not match dimensions")?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}
