use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("UnknownFormat: could not determine the image file format.")]
    UnknownFormat,

    #[error("UnsupportedFeature: the image file uses a feature that is currently unsupported such that image loading isn't possible.")]
    UnsupportedFeature,
}

//-------------------------------------------------------------
// From impls.

impl From<tiff::TiffError> for ReadError {
    fn from(other: tiff::TiffError) -> Self {
        use tiff::TiffError::*;
        match other {
            IoError(e) => Self::Io(e),
            FormatError(_) => Self::UnknownFormat,
            _ => Self::UnsupportedFeature,
        }
    }
}

impl From<png::DecodingError> for ReadError {
    fn from(other: png::DecodingError) -> Self {
        use png::DecodingError::*;
        match other {
            IoError(e) => Self::Io(e),
            Format(_) => Self::UnknownFormat,
            _ => Self::UnsupportedFeature,
        }
    }
}

impl From<jpeg_decoder::Error> for ReadError {
    fn from(other: jpeg_decoder::Error) -> Self {
        use jpeg_decoder::Error::*;
        match other {
            Io(e) => Self::Io(e),
            Format(_) => Self::UnknownFormat,
            _ => Self::UnsupportedFeature,
        }
    }
}
