use std::io::Read;

use crate::{error::ReadError, gray_to_rgb, Image, ImageData};

pub fn load<R: Read>(reader: R) -> Result<Image, ReadError> {
    let mut decoder = jpeg_decoder::Decoder::new(reader);
    decoder.read_info()?;

    let info = decoder.info().ok_or(ReadError::UnsupportedFeature)?;
    let dimensions = (info.width as usize, info.height as usize);
    let pixel_count = dimensions.0 * dimensions.1;

    let pixel_data = decoder.decode()?;

    use jpeg_decoder::PixelFormat::*;
    let data = match info.pixel_format {
        RGB24 if pixel_data.len() == pixel_count * 3 => {
            ImageData::Rgb8(pixel_data.chunks(3).map(|c| [c[0], c[1], c[2]]).collect())
        }
        L8 if pixel_data.len() == pixel_count => {
            ImageData::Rgb8(gray_to_rgb(pixel_data.iter().copied()))
        }
        L16 if pixel_data.len() == pixel_count * 2 => ImageData::Rgb16(gray_to_rgb(
            pixel_data.chunks(2).map(|c| u16::from_be_bytes([c[0], c[1]])),
        )),

        _ => return Err(ReadError::UnsupportedFeature),
    };

    Ok(Image {
        dimensions: dimensions,
        data: data,
    })
}
