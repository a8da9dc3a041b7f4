//! The shared-exponent RGBE pixel encoding of Radiance .hdr files.
//!
//! Each pixel is four bytes: three 8-bit mantissas and one exponent byte
//! with a bias of 128.  An exponent byte of zero means black.

const EXP_BIAS: i32 = 128;

/// Largest encodable channel value, 255/256 * 2^127.
const MAX_VALUE: f32 = 1.694e38;

/// Below this everything encodes to black.
const MIN_VALUE: f32 = 1.0e-32;

/// Encodes an RGB triple.
///
/// Negative and NaN channels encode as zero, and values too large for
/// the format are clamped.
pub fn encode(rgb: [f32; 3]) -> [u8; 4] {
    let clamp = |v: f32| if v > 0.0 { v.min(MAX_VALUE) } else { 0.0 };
    let rgb = [clamp(rgb[0]), clamp(rgb[1]), clamp(rgb[2])];

    let largest = rgb[0].max(rgb[1]).max(rgb[2]);
    if largest < MIN_VALUE {
        return [0, 0, 0, 0];
    }

    // Pick the exponent so the largest mantissa lands in [128, 256).
    let mut exp = largest.log2().floor() as i32 + 1;
    let mut scale = 2.0f32.powi(8 - exp);
    if largest * scale >= 256.0 {
        exp += 1;
        scale *= 0.5;
    }

    [
        (rgb[0] * scale) as u8,
        (rgb[1] * scale) as u8,
        (rgb[2] * scale) as u8,
        (exp + EXP_BIAS) as u8,
    ]
}

/// Decodes an RGBE pixel.
pub fn decode(rgbe: [u8; 4]) -> [f32; 3] {
    if rgbe[3] == 0 {
        return [0.0; 3];
    }
    let scale = 2.0f32.powi(rgbe[3] as i32 - EXP_BIAS - 8);
    [
        rgbe[0] as f32 * scale,
        rgbe[1] as f32 * scale,
        rgbe[2] as f32 * scale,
    ]
}
