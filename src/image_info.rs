//! Header-only image size detection.
//!
//! Only enough of a JPEG or PNG stream is read to find the pixel dimensions;
//! nothing is decoded. Input comes from untrusted uploads, so every read is
//! bounds-checked and any failure resolves to a fixed placeholder size.

use tracing::debug;

use crate::error::{Error, Result};

/// Dimensions assumed when the header cannot be read.
pub const PLACEHOLDER_WIDTH: u32 = 800;
pub const PLACEHOLDER_HEIGHT: u32 = 600;

const JPEG_SIGNATURE: [u8; 2] = [0xFF, 0xD8];
const PNG_SIGNATURE: [u8; 2] = [0x89, 0x50];

/// Baseline and progressive start-of-frame markers.
const JPEG_SOF_MARKERS: [u8; 2] = [0xC0, 0xC2];

/// IHDR width/height sit right after the 8-byte signature, the chunk length
/// and the chunk type.
const PNG_WIDTH_OFFSET: usize = 16;
const PNG_HEIGHT_OFFSET: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Identify the format from the first two bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes.get(..2)? {
            sig if sig == JPEG_SIGNATURE.as_slice() => Some(ImageFormat::Jpeg),
            sig if sig == PNG_SIGNATURE.as_slice() => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const PLACEHOLDER: Dimensions = Dimensions {
        width: PLACEHOLDER_WIDTH,
        height: PLACEHOLDER_HEIGHT,
    };
}

/// What the heuristic tier knows about an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
    /// width / height
    pub aspect_ratio: f64,
}

impl ImageMetadata {
    pub fn new(width: u32, height: u32, size_bytes: usize) -> Self {
        Self {
            width,
            height,
            size_bytes,
            aspect_ratio: width as f64 / height as f64,
        }
    }

    /// Read metadata from raw image bytes, never failing.
    ///
    /// Unknown formats and unreadable headers fall back to 800x600.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let dims = read_dimensions(bytes).unwrap_or_else(|err| {
            debug!(error = %err, "using placeholder image dimensions");
            Dimensions::PLACEHOLDER
        });
        Self::new(dims.width, dims.height, bytes.len())
    }
}

/// Read pixel dimensions from a JPEG or PNG header.
pub fn read_dimensions(bytes: &[u8]) -> Result<Dimensions> {
    let dims = match ImageFormat::detect(bytes) {
        Some(ImageFormat::Jpeg) => jpeg_dimensions(bytes)?,
        Some(ImageFormat::Png) => png_dimensions(bytes)?,
        None => return Err(Error::Decode("unrecognized image signature".into())),
    };
    if dims.width == 0 || dims.height == 0 {
        return Err(Error::Decode(format!(
            "header reports empty image {}x{}",
            dims.width, dims.height
        )));
    }
    Ok(dims)
}

/// Scan for the first start-of-frame marker and read its height and width.
pub fn jpeg_dimensions(bytes: &[u8]) -> Result<Dimensions> {
    let sof = bytes
        .windows(2)
        .enumerate()
        .skip(2)
        .find(|(_, pair)| pair[0] == 0xFF && JPEG_SOF_MARKERS.contains(&pair[1]))
        .map(|(offset, _)| offset)
        .ok_or_else(|| Error::Decode("no JPEG start-of-frame marker".into()))?;

    // Marker, segment length, sample precision, then height and width.
    let height = read_u16_be(bytes, sof + 5)?;
    let width = read_u16_be(bytes, sof + 7)?;
    Ok(Dimensions {
        width: u32::from(width),
        height: u32::from(height),
    })
}

/// Read IHDR width and height at their fixed offsets.
pub fn png_dimensions(bytes: &[u8]) -> Result<Dimensions> {
    Ok(Dimensions {
        width: read_u32_be(bytes, PNG_WIDTH_OFFSET)?,
        height: read_u32_be(bytes, PNG_HEIGHT_OFFSET)?,
    })
}

fn read_u16_be(bytes: &[u8], offset: usize) -> Result<u16> {
    let raw = bytes
        .get(offset..offset + 2)
        .ok_or_else(|| truncated(offset, bytes.len()))?;
    Ok(u16::from_be_bytes([raw[0], raw[1]]))
}

fn read_u32_be(bytes: &[u8], offset: usize) -> Result<u32> {
    let raw = bytes
        .get(offset..offset + 4)
        .ok_or_else(|| truncated(offset, bytes.len()))?;
    Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn truncated(offset: usize, len: usize) -> Error {
    Error::Decode(format!("header truncated: offset {offset} beyond {len} bytes"))
}
