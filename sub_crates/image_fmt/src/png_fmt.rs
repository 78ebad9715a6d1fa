use std::io::Read;

use crate::{error::ReadError, gray_to_rgb, Image, ImageData};

pub fn load<R: Read>(mut reader: R) -> Result<Image, ReadError> {
    let decoder = png::Decoder::new_with_limits(
        &mut reader,
        png::Limits {
            bytes: usize::MAX,
        },
    );
    let mut reader = decoder.read_info()?;

    let (color_type, bit_depth) = reader.output_color_type();
    let dimensions = {
        let info = reader.info();
        (info.width as usize, info.height as usize)
    };

    let mut pixel_data = vec![0u8; reader.output_buffer_size()];
    reader.next_frame(&mut pixel_data)?;

    let to_u16 = |c: &[u8]| u16::from_be_bytes([c[0], c[1]]);

    use png::{BitDepth::*, ColorType::*};
    let data = match (color_type, bit_depth) {
        (Rgb, Eight) => ImageData::Rgb8(pixel_data.chunks(3).map(|c| [c[0], c[1], c[2]]).collect()),
        (Rgb, Sixteen) => ImageData::Rgb16(
            pixel_data
                .chunks(6)
                .map(|c| [to_u16(&c[0..2]), to_u16(&c[2..4]), to_u16(&c[4..6])])
                .collect(),
        ),

        (Rgba, Eight) => ImageData::Rgb8(pixel_data.chunks(4).map(|c| [c[0], c[1], c[2]]).collect()),
        (Rgba, Sixteen) => ImageData::Rgb16(
            pixel_data
                .chunks(8)
                .map(|c| [to_u16(&c[0..2]), to_u16(&c[2..4]), to_u16(&c[4..6])])
                .collect(),
        ),

        (Grayscale, Eight) => ImageData::Rgb8(gray_to_rgb(pixel_data.iter().copied())),
        (Grayscale, Sixteen) => ImageData::Rgb16(gray_to_rgb(pixel_data.chunks(2).map(to_u16))),

        (GrayscaleAlpha, Eight) => ImageData::Rgb8(gray_to_rgb(pixel_data.chunks(2).map(|c| c[0]))),
        (GrayscaleAlpha, Sixteen) => {
            ImageData::Rgb16(gray_to_rgb(pixel_data.chunks(4).map(|c| to_u16(&c[0..2]))))
        }

        _ => return Err(ReadError::UnsupportedFeature),
    };

    Ok(Image {
        dimensions: dimensions,
        data: data,
    })
}
