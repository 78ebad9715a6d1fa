use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CrfError {
    #[error("InsufficientData: at least two exposures with pixel data are required")]
    InsufficientData,

    #[error("DimensionMismatch: images differ in size or channel count")]
    DimensionMismatch,

    #[error("UnsupportedBackend: no least-squares solver is available")]
    UnsupportedBackend,

    #[error("ChannelCountMismatch: response has {model} channels, image has {image}")]
    ChannelCountMismatch { model: usize, image: usize },

    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, CrfError>;
