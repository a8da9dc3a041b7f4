//! Writing Radiance .hdr (RGBE) images.

mod rgbe;

use std::io::Write;

pub use rgbe::{decode as decode_rgbe, encode as encode_rgbe};

/// Writes a flat (non run-length encoded) Radiance .hdr image.
///
/// `image` is in row-major order, top row first.  Every pixel is multiplied
/// by `exposure` before encoding.
pub fn write_hdr<W: Write>(
    out: &mut W,
    image: &[[f32; 3]],
    width: usize,
    height: usize,
    exposure: f32,
) -> std::io::Result<()> {
    assert_eq!(image.len(), width * height);

    out.write_all(b"#?RADIANCE\n")?;
    out.write_all(b"FORMAT=32-bit_rle_rgbe\n\n")?;
    out.write_all(format!("-Y {} +X {}\n", height, width).as_bytes())?;

    let mut scanline = Vec::with_capacity(width * 4);
    for row in image.chunks(width.max(1)) {
        scanline.clear();
        for pixel in row {
            let adjusted = [
                pixel[0] * exposure,
                pixel[1] * exposure,
                pixel[2] * exposure,
            ];
            scanline.extend_from_slice(&rgbe::encode(adjusted));
        }
        out.write_all(&scanline)?;
    }
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &[u8] = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 2 +X 3\n";

    #[test]
    fn header_and_pixels() {
        let image = vec![[1.0, 0.5, 0.25]; 6];
        let mut out = Vec::new();
        write_hdr(&mut out, &image, 3, 2, 1.0).unwrap();

        assert!(out.starts_with(HEADER));
        let pixels = &out[HEADER.len()..];
        assert_eq!(pixels.len(), 6 * 4);
        for p in pixels.chunks(4) {
            assert_eq!(p, &[128, 64, 32, 129]);
        }
    }

    #[test]
    fn exposure_scales_pixels() {
        let image = vec![[1.0, 1.0, 1.0]; 6];
        let mut out = Vec::new();
        write_hdr(&mut out, &image, 3, 2, 4.0).unwrap();
        let p = &out[HEADER.len()..HEADER.len() + 4];
        assert_eq!(decode_rgbe([p[0], p[1], p[2], p[3]]), [4.0, 4.0, 4.0]);
    }

    #[test]
    #[should_panic]
    fn size_mismatch_panics() {
        let mut out = Vec::new();
        let _ = write_hdr(&mut out, &[[0.0; 3]; 5], 3, 2, 1.0);
    }
}
