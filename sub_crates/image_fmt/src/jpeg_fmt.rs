use std::io::Read;

use crate::{error::ReadError, gray_to_rgb, Image, ImageBuf};

pub fn load<R: Read>(reader: R) -> Result<Image, ReadError> {
    let mut decoder = jpeg_decoder::Decoder::new(reader);
    let pixel_data = decoder.decode()?;

    let info = decoder
        .info()
        .ok_or_else(|| ReadError::Corrupt("missing JPEG header".into()))?;
    let dimensions = (info.width as usize, info.height as usize);
    let pixel_count = dimensions.0 * dimensions.1;

    use jpeg_decoder::PixelFormat::*;
    let data = match info.pixel_format {
        RGB24 if pixel_data.len() == pixel_count * 3 => ImageBuf::Rgb8(pixel_data),
        L8 if pixel_data.len() == pixel_count => ImageBuf::Rgb8(gray_to_rgb(&pixel_data)),
        L16 if pixel_data.len() == pixel_count * 2 => {
            // NOTE: jpeg-decoder doesn't document the endianness of
            // their 16-bit buffers, but examining the code in that
            // crate indicates that it's native endian.
            let gray: Vec<u16> = pixel_data
                .chunks_exact(2)
                .map(|c| u16::from_ne_bytes([c[0], c[1]]))
                .collect();
            ImageBuf::Rgb16(gray_to_rgb(&gray))
        }
        RGB24 | L8 | L16 => {
            return Err(ReadError::Corrupt(
                "decoded JPEG data has the wrong size".into(),
            ))
        }

        _ => return Err(ReadError::UnsupportedFeature),
    };

    Ok(Image {
        dimensions: dimensions,
        data: data,
    })
}
