use std::io::Read;

use crate::{drop_alpha, error::ReadError, gray_to_rgb, Image, ImageBuf};

pub fn load<R: Read>(reader: R) -> Result<Image, ReadError> {
    let mut decoder = png::Decoder::new_with_limits(
        reader,
        png::Limits {
            bytes: std::usize::MAX,
        },
    );
    // Palettes and sub-byte depths come out as plain 8-bit data.
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info()?;

    let (color_type, bit_depth) = reader.output_color_type();
    let mut pixel_data = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut pixel_data)?;
    pixel_data.truncate(frame.buffer_size());
    let dimensions = (frame.width as usize, frame.height as usize);

    use png::{BitDepth::*, ColorType::*};
    let data = match (color_type, bit_depth) {
        (Rgb, Eight) => ImageBuf::Rgb8(pixel_data),
        (Rgb, Sixteen) => ImageBuf::Rgb16(to_u16(&pixel_data)),

        (Rgba, Eight) => ImageBuf::Rgb8(drop_alpha(&pixel_data, 4, 3)),
        (Rgba, Sixteen) => ImageBuf::Rgb16(drop_alpha(&to_u16(&pixel_data), 4, 3)),

        (Grayscale, Eight) => ImageBuf::Rgb8(gray_to_rgb(&pixel_data)),
        (Grayscale, Sixteen) => ImageBuf::Rgb16(gray_to_rgb(&to_u16(&pixel_data))),

        (GrayscaleAlpha, Eight) => ImageBuf::Rgb8(gray_to_rgb(&drop_alpha(&pixel_data, 2, 1))),
        (GrayscaleAlpha, Sixteen) => {
            ImageBuf::Rgb16(gray_to_rgb(&drop_alpha(&to_u16(&pixel_data), 2, 1)))
        }

        _ => return Err(ReadError::UnsupportedFeature),
    };

    Ok(Image {
        dimensions: dimensions,
        data: data,
    })
}

// PNG stores 16-bit samples big endian.
fn to_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect()
}
