//! Minimal image decoding for camera output: 8 and 16 bit RGB from
//! TIFF, PNG and JPEG files.

mod error;
mod jpeg_fmt;
mod png_fmt;
mod tiff_fmt;

use std::io::{Read, Seek, SeekFrom};

pub use error::ReadError;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// 8-bit unsigned RGB channels.
    Rgb8(Vec<[u8; 3]>),

    /// 16-bit unsigned RGB channels.
    Rgb16(Vec<[u16; 3]>),
}

impl ImageData {
    pub fn bit_depth(&self) -> usize {
        match self {
            Self::Rgb8(_) => 8,
            Self::Rgb16(_) => 16,
        }
    }

    /// Interleaved RGB values normalized to [0.0, 1.0].
    pub fn to_f32(&self) -> Vec<f32> {
        match self {
            Self::Rgb8(pixels) => {
                let norm = 1.0 / u8::MAX as f32;
                pixels
                    .iter()
                    .flat_map(|p| p.iter().map(move |&c| c as f32 * norm))
                    .collect()
            }
            Self::Rgb16(pixels) => {
                let norm = 1.0 / u16::MAX as f32;
                pixels
                    .iter()
                    .flat_map(|p| p.iter().map(move |&c| c as f32 * norm))
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub dimensions: (usize, usize),
    pub data: ImageData,
}

/// Loads an image, detecting the format from the file signature.
pub fn load<R: Read + Seek>(mut reader: R) -> Result<Image, ReadError> {
    let mut signature = [0u8; 4];
    reader.read_exact(&mut signature)?;
    reader.seek(SeekFrom::Start(0))?;

    match signature {
        [0x89, b'P', b'N', b'G'] => png_fmt::load(reader),
        [0xFF, 0xD8, _, _] => jpeg_fmt::load(reader),
        [b'I', b'I', 42, 0] | [b'M', b'M', 0, 42] => tiff_fmt::load(reader),

        // No formats matched.
        _ => Err(ReadError::UnknownFormat),
    }
}

/// Expands grayscale samples to RGB.
fn gray_to_rgb<T: Copy>(values: impl Iterator<Item = T>) -> Vec<[T; 3]> {
    values.map(|v| [v, v, v]).collect()
}
