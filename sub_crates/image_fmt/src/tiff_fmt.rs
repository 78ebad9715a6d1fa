use std::io::{Read, Seek};

use tiff::{decoder::DecodingResult, ColorType};

use crate::{error::ReadError, gray_to_rgb, Image, ImageData};

pub fn load<R: Read + Seek>(reader: R) -> Result<Image, ReadError> {
    let mut decoder =
        tiff::decoder::Decoder::new(reader)?.with_limits(tiff::decoder::Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let dimensions = (width as usize, height as usize);
    let colortype = decoder.colortype()?;
    let result = decoder.read_image()?;

    let data = match (colortype, result) {
        (ColorType::RGB(_), DecodingResult::U8(p)) => {
            ImageData::Rgb8(p.chunks(3).map(|c| [c[0], c[1], c[2]]).collect())
        }
        (ColorType::RGB(_), DecodingResult::U16(p)) => {
            ImageData::Rgb16(p.chunks(3).map(|c| [c[0], c[1], c[2]]).collect())
        }

        (ColorType::RGBA(_), DecodingResult::U8(p)) => {
            ImageData::Rgb8(p.chunks(4).map(|c| [c[0], c[1], c[2]]).collect())
        }
        (ColorType::RGBA(_), DecodingResult::U16(p)) => {
            ImageData::Rgb16(p.chunks(4).map(|c| [c[0], c[1], c[2]]).collect())
        }

        (ColorType::Gray(_), DecodingResult::U8(p)) => ImageData::Rgb8(gray_to_rgb(p.into_iter())),
        (ColorType::Gray(_), DecodingResult::U16(p)) => {
            ImageData::Rgb16(gray_to_rgb(p.into_iter()))
        }

        (ColorType::GrayA(_), DecodingResult::U8(p)) => {
            ImageData::Rgb8(gray_to_rgb(p.chunks(2).map(|c| c[0])))
        }
        (ColorType::GrayA(_), DecodingResult::U16(p)) => {
            ImageData::Rgb16(gray_to_rgb(p.chunks(2).map(|c| c[0])))
        }

        _ => return Err(ReadError::UnsupportedFeature),
    };

    Ok(Image {
        dimensions: dimensions,
        data: data,
    })
}
