//! Minimal loaders for the LDR formats cameras produce: JPEG, PNG, and
//! TIFF.  Everything is decoded to interleaved RGB; alpha is dropped.

mod error;
mod jpeg_fmt;
mod png_fmt;
mod tiff_fmt;

use std::io::{Read, Seek, SeekFrom};

pub use error::ReadError;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageBuf {
    /// 8-bit unsigned RGB channels, interleaved.
    Rgb8(Vec<u8>),

    /// 16-bit unsigned RGB channels, interleaved.
    Rgb16(Vec<u16>),
}

impl ImageBuf {
    pub fn bit_depth(&self) -> usize {
        match self {
            Self::Rgb8(_) => 8,
            Self::Rgb16(_) => 16,
        }
    }

    /// Converts to 8-bit, dropping the low bits of 16-bit data.
    pub fn to_rgb8(self) -> Vec<u8> {
        match self {
            Self::Rgb8(buf) => buf,
            Self::Rgb16(buf) => buf.iter().map(|&v| (v >> 8) as u8).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub dimensions: (usize, usize),
    pub data: ImageBuf,
}

impl Image {
    pub fn width(&self) -> usize {
        self.dimensions.0
    }

    pub fn height(&self) -> usize {
        self.dimensions.1
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Format {
    Jpeg,
    Png,
    Tiff,
}

fn sniff_format(header: &[u8]) -> Option<Format> {
    match header {
        [0xFF, 0xD8, 0xFF, ..] => Some(Format::Jpeg),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Format::Png),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some(Format::Tiff),
        _ => None,
    }
}

/// Loads an image, determining its format from the file signature.
pub fn load<R: Read + Seek>(mut reader: R) -> Result<Image, ReadError> {
    let mut header = [0u8; 8];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    reader.seek(SeekFrom::Start(0))?;

    match sniff_format(&header[..filled]) {
        Some(Format::Jpeg) => jpeg_fmt::load(reader),
        Some(Format::Png) => png_fmt::load(reader),
        Some(Format::Tiff) => tiff_fmt::load(reader),
        None => Err(ReadError::UnknownFormat),
    }
}

/// Expands a single-channel buffer to RGB.
fn gray_to_rgb<T: Copy>(data: &[T]) -> Vec<T> {
    data.iter().flat_map(|&c| [c, c, c]).collect()
}

/// Strips every `stride`th element, keeping the first `keep` of each group.
fn drop_alpha<T: Copy>(data: &[T], stride: usize, keep: usize) -> Vec<T> {
    data.chunks_exact(stride)
        .flat_map(|c| c[..keep].iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_png(
        width: u32,
        height: u32,
        color: png::ColorType,
        depth: png::BitDepth,
        data: &[u8],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn sniff() {
        assert_eq!(sniff_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(Format::Jpeg));
        assert_eq!(sniff_format(b"II*\0abcd"), Some(Format::Tiff));
        assert_eq!(sniff_format(b"MM\0*abcd"), Some(Format::Tiff));
        assert_eq!(sniff_format(b"GIF89a"), None);
        assert_eq!(sniff_format(&[]), None);
    }

    #[test]
    fn unknown_format() {
        let r = load(Cursor::new(b"not an image".to_vec()));
        assert!(matches!(r, Err(ReadError::UnknownFormat)));
    }

    #[test]
    fn png_rgb8() {
        let data: Vec<u8> = (0..2 * 3 * 3).map(|i| i as u8 * 10).collect();
        let file = encode_png(2, 3, png::ColorType::Rgb, png::BitDepth::Eight, &data);
        let img = load(Cursor::new(file)).unwrap();
        assert_eq!(img.dimensions, (2, 3));
        assert_eq!(img.data, ImageBuf::Rgb8(data));
    }

    #[test]
    fn png_rgba16_drops_alpha() {
        let file = encode_png(
            1,
            1,
            png::ColorType::Rgba,
            png::BitDepth::Sixteen,
            &[0x12, 0x34, 0x00, 0xFF, 0xAB, 0xCD, 0xFF, 0xFF],
        );
        let img = load(Cursor::new(file)).unwrap();
        assert_eq!(img.data, ImageBuf::Rgb16(vec![0x1234, 0x00FF, 0xABCD]));
        assert_eq!(img.data.bit_depth(), 16);
        assert_eq!(img.data.to_rgb8(), vec![0x12, 0x00, 0xAB]);
    }

    #[test]
    fn png_gray_expands() {
        let file = encode_png(2, 1, png::ColorType::Grayscale, png::BitDepth::Eight, &[7, 9]);
        let img = load(Cursor::new(file)).unwrap();
        assert_eq!(img.data, ImageBuf::Rgb8(vec![7, 7, 7, 9, 9, 9]));
    }

    #[test]
    fn truncated_png_is_an_error() {
        let data = [1u8; 4 * 4 * 3];
        let mut file = encode_png(4, 4, png::ColorType::Rgb, png::BitDepth::Eight, &data);
        file.truncate(40);
        assert!(load(Cursor::new(file)).is_err());
    }
}
