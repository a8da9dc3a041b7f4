use std::io::{Read, Seek};

use tiff::{decoder::DecodingResult, ColorType};

use crate::{drop_alpha, error::ReadError, gray_to_rgb, Image, ImageBuf};

pub fn load<R: Read + Seek>(reader: R) -> Result<Image, ReadError> {
    let mut decoder =
        tiff::decoder::Decoder::new(reader)?.with_limits(tiff::decoder::Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let colortype = decoder.colortype()?;
    let data = decoder.read_image()?;

    let data = match (colortype, data) {
        (ColorType::RGB(_), DecodingResult::U8(pixel_data)) => ImageBuf::Rgb8(pixel_data),
        (ColorType::RGB(_), DecodingResult::U16(pixel_data)) => ImageBuf::Rgb16(pixel_data),

        (ColorType::RGBA(_), DecodingResult::U8(pixel_data)) => {
            ImageBuf::Rgb8(drop_alpha(&pixel_data, 4, 3))
        }
        (ColorType::RGBA(_), DecodingResult::U16(pixel_data)) => {
            ImageBuf::Rgb16(drop_alpha(&pixel_data, 4, 3))
        }

        (ColorType::Gray(_), DecodingResult::U8(pixel_data)) => {
            ImageBuf::Rgb8(gray_to_rgb(&pixel_data))
        }
        (ColorType::Gray(_), DecodingResult::U16(pixel_data)) => {
            ImageBuf::Rgb16(gray_to_rgb(&pixel_data))
        }

        (ColorType::GrayA(_), DecodingResult::U8(pixel_data)) => {
            ImageBuf::Rgb8(gray_to_rgb(&drop_alpha(&pixel_data, 2, 1)))
        }
        (ColorType::GrayA(_), DecodingResult::U16(pixel_data)) => {
            ImageBuf::Rgb16(gray_to_rgb(&drop_alpha(&pixel_data, 2, 1)))
        }

        _ => return Err(ReadError::UnsupportedFeature),
    };

    Ok(Image {
        dimensions: (width as usize, height as usize),
        data: data,
    })
}
