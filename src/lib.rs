pub mod job_helpers;
pub mod logger;

pub use job_helpers::{load_image, write_model_luts, LutFormat};

#[derive(Debug)]
pub struct SourceImage {
    pub image: sensor_analysis::Image,
    pub info: ImageInfo,
}

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub filename: String,
    pub full_filepath: String,

    pub width: usize,
    pub height: usize,
    pub bit_depth: usize,
    pub exposure: Option<f32>,

    pub exposure_time: Option<(u32, u32)>, // Ratio.
    pub fstop: Option<(u32, u32)>,         // Ratio.
    pub iso: Option<u32>,
}
