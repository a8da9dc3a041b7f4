//! Command line tools for recovering camera response curves from exposure
//! brackets and merging brackets into HDR images.

pub mod cli;
pub mod export;
pub mod job_helpers;
pub mod logger;

/// An 8-bit RGB image loaded from disk, along with its exposure metadata.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Interleaved 8-bit RGB.
    pub image: Vec<u8>,
    pub info: ImageInfo,
}

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub filename: String,
    pub full_filepath: String,

    pub width: usize,
    pub height: usize,
    pub bit_depth: usize,

    /// Relative exposure, combining exposure time, f-number, and ISO where
    /// available.
    pub exposure: Option<f32>,

    pub exposure_time: Option<(u32, u32)>, // Ratio.
    pub fstop: Option<(u32, u32)>,         // Ratio.
    pub iso: Option<u32>,
}
