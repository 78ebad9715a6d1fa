/// A floating point image with interleaved channels.
///
/// Pixel values are nominally in [0.0, 1.0].  `exposure` is the
/// exposure time in seconds that the image was captured with, and is
/// only meaningful for images that are part of an exposure stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub exposure: f32,
    pub data: Vec<f32>,
}

impl Image {
    /// Creates a black image.
    pub fn new(width: usize, height: usize, channels: usize, exposure: f32) -> Image {
        Image {
            width: width,
            height: height,
            channels: channels,
            exposure: exposure,
            data: vec![0.0; width * height * channels],
        }
    }

    /// Wraps existing interleaved pixel data.
    ///
    /// Panics if `data` doesn't have exactly `width * height * channels`
    /// elements.
    pub fn from_vec(
        width: usize,
        height: usize,
        channels: usize,
        exposure: f32,
        data: Vec<f32>,
    ) -> Image {
        assert_eq!(data.len(), width * height * channels);
        Image {
            width: width,
            height: height,
            channels: channels,
            exposure: exposure,
            data: data,
        }
    }

    /// Builds an image by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn<F>(width: usize, height: usize, channels: usize, exposure: f32, f: F) -> Image
    where
        F: Fn(usize, usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(width * height * channels);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Image::from_vec(width, height, channels, exposure, data)
    }

    /// Returns true if the image has at least one pixel and one channel.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.channels > 0
    }

    #[inline(always)]
    pub fn get(&self, x: usize, y: usize, channel: usize) -> f32 {
        self.data[(y * self.width + x) * self.channels + channel]
    }

    /// Iterates over the values of a single channel in scanline order.
    pub fn channel_values(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        debug_assert!(channel < self.channels);
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
    }

    /// Whether the two images have the same dimensions and channel count.
    pub fn similar_type(&self, other: &Image) -> bool {
        self.width == other.width && self.height == other.height && self.channels == other.channels
    }
}

/// Quantizes a normalized value to an 8-bit device code.
#[inline(always)]
pub fn to_code(value: f32) -> u8 {
    let v = (value * 255.0).round();
    if v.is_nan() {
        0
    } else {
        v.max(0.0).min(255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_are_interleaved() {
        let img = Image::from_fn(3, 2, 2, 1.0, |x, y, c| (x + y * 10 + c * 100) as f32);
        assert_eq!(img.get(2, 1, 0), 12.0);
        assert_eq!(img.get(2, 1, 1), 112.0);
        assert_eq!(img.channel_values(1).count(), 6);
        assert_eq!(img.channel_values(1).next(), Some(100.0));
    }

    #[test]
    fn to_code_rounds_and_clamps() {
        assert_eq!(to_code(0.0), 0);
        assert_eq!(to_code(1.0), 255);
        assert_eq!(to_code(1.5), 255);
        assert_eq!(to_code(-0.2), 0);
        assert_eq!(to_code(128.0 / 255.0), 128);
        assert_eq!(to_code(f32::NAN), 0);
    }
}
