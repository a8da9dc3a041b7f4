use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadError {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("UnknownFormat: could not determine the image file format.")]
    UnknownFormat,

    #[error("UnsupportedFeature: the image file uses a feature that is currently unsupported such that image loading isn't possible.")]
    UnsupportedFeature,

    #[error("Corrupt: {0}")]
    Corrupt(String),
}

//-------------------------------------------------------------
// From impls.

impl From<tiff::TiffError> for ReadError {
    fn from(other: tiff::TiffError) -> Self {
        use tiff::TiffError::*;
        match other {
            IoError(e) => Self::IO(e),
            IntSizeError | UnsupportedError(_) => Self::UnsupportedFeature,
            e => Self::Corrupt(e.to_string()),
        }
    }
}

impl From<png::DecodingError> for ReadError {
    fn from(other: png::DecodingError) -> Self {
        match other {
            png::DecodingError::IoError(e) => Self::IO(e),
            e => Self::Corrupt(e.to_string()),
        }
    }
}

impl From<jpeg_decoder::Error> for ReadError {
    fn from(other: jpeg_decoder::Error) -> Self {
        match other {
            jpeg_decoder::Error::Io(e) => Self::IO(e),
            jpeg_decoder::Error::Unsupported(_) => Self::UnsupportedFeature,
            e => Self::Corrupt(e.to_string()),
        }
    }
}
