use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result};
use tracing::{debug, info};

use sensor_analysis::{CrfModel, Image};

use crate::{ImageInfo, SourceImage};

pub fn load_image(path: &Path) -> Result<SourceImage, image_fmt::ReadError> {
    // Load image.
    let img = image_fmt::load(BufReader::new(File::open(&path)?))?;

    // Get exposure metadata from EXIF data.
    let (exposure_time, fstop, sensitivity) = {
        let mut exposure_time = None;
        let mut fstop = None;
        let mut sensitivity = None;

        let mut file = BufReader::new(File::open(&path)?);
        if let Ok(img_exif) = exif::Reader::new().read_from_container(&mut file) {
            if let Some(&exif::Value::Rational(ref n)) = img_exif
                .get_field(exif::Tag::ExposureTime, exif::In::PRIMARY)
                .map(|n| &n.value)
            {
                if n[0].num != 0 && n[0].denom != 0 {
                    exposure_time = Some(n[0]);
                }
            }
            if let Some(&exif::Value::Rational(ref n)) = img_exif
                .get_field(exif::Tag::FNumber, exif::In::PRIMARY)
                .map(|n| &n.value)
            {
                if n[0].num != 0 && n[0].denom != 0 {
                    fstop = Some(n[0]);
                }
            }
            if let Some(Some(n)) = img_exif
                .get_field(exif::Tag::PhotographicSensitivity, exif::In::PRIMARY)
                .map(|n| n.value.get_uint(0))
            {
                if n != 0 {
                    sensitivity = Some(n);
                }
            }
        }

        (exposure_time, fstop, sensitivity)
    };

    // Calculate over-all exposure.  Only ratios between the images of a
    // stack matter, so aperture and ISO are folded in when present.
    let total_exposure = match (exposure_time, fstop, sensitivity) {
        (Some(exp), Some(fst), Some(sns)) => {
            Some((sns as f64 * exp.to_f64() / (fst.to_f64() * fst.to_f64())) as f32)
        }
        (Some(exp), None, Some(sns)) => Some((sns as f64 * exp.to_f64()) as f32),
        (Some(exp), Some(fst), None) => Some((exp.to_f64() / (fst.to_f64() * fst.to_f64())) as f32),
        (Some(exp), None, None) => Some(exp.to_f64() as f32),
        _ => None,
    };
    debug!(path = %path.display(), exposure = ?total_exposure, "loaded image");

    // Fill in image info.
    let (width, height) = img.dimensions;
    let image_info = ImageInfo {
        filename: path
            .file_name()
            .map(|p| p.to_string_lossy().into())
            .unwrap_or_else(|| "".into()),
        full_filepath: path.to_string_lossy().into(),

        width,
        height,
        bit_depth: img.data.bit_depth(),
        exposure: total_exposure,

        exposure_time: exposure_time.map(|n| (n.num, n.denom)),
        fstop: fstop.map(|n| (n.num, n.denom)),
        iso: sensitivity,
    };

    Ok(SourceImage {
        image: Image::from_vec(
            width,
            height,
            3,
            total_exposure.unwrap_or(0.0),
            img.data.to_f32(),
        ),
        info: image_info,
    })
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LutFormat {
    Cube,
    Spi1d,
}

impl LutFormat {
    pub fn from_name(name: &str) -> Option<LutFormat> {
        match name.to_ascii_lowercase().as_str() {
            "cube" => Some(LutFormat::Cube),
            "spi1d" => Some(LutFormat::Spi1d),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            LutFormat::Cube => "cube",
            LutFormat::Spi1d => "spi1d",
        }
    }
}

/// Writes `<prefix>_to_linear.<ext>` (the inverse response) and
/// `linear_to_<prefix>.<ext>` (its inverse) into `dir`.
pub fn write_model_luts(
    model: &CrfModel,
    dir: &Path,
    prefix: &str,
    format: LutFormat,
) -> Result<()> {
    let to_linear: Vec<&[f32]> = model.channels().iter().map(|c| &c[..]).collect();
    let from_linear: Vec<Vec<f32>> = (0..model.channel_count())
        .map(|c| model.forward_curve(c))
        .collect();
    let from_linear: Vec<&[f32]> = from_linear.iter().map(|c| &c[..]).collect();

    for (name, tables) in [
        (format!("{}_to_linear.{}", prefix, format.extension()), &to_linear),
        (format!("linear_to_{}.{}", prefix, format.extension()), &from_linear),
    ]
    .iter()
    {
        let path = dir.join(name);
        let mut out = BufWriter::new(
            File::create(&path).with_context(|| format!("creating {}", path.display()))?,
        );
        let written = match format {
            LutFormat::Cube => lut::write_cube_1d(&mut out, name, (0.0, 1.0), tables),
            LutFormat::Spi1d => lut::write_spi1d(&mut out, (0.0, 1.0), tables),
        };
        written.with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {}", path.display());
    }

    Ok(())
}
