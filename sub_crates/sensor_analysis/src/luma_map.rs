//! Luma maps: monotonic curves over [0.0, 1.0] stored as evenly spaced
//! tables, used to hand recovered responses to LUT writers.

use crate::response::ChannelResponse;
use crate::utils::{lerp_curve_at_y, lerp_slice, Curve};

/// Converts a recovered response into a luma map with `resolution` entries.
///
/// The map goes from normalized code value to linear exposure normalized
/// so that code value 0 maps to 0.0 and the brightest code value to 1.0.
/// Any dips in the recovered curve (typically near the clipped ends) are
/// flattened so the map stays monotonic.
pub fn luma_map_from_response(response: &ChannelResponse, resolution: usize) -> Vec<f32> {
    assert!(resolution >= 2);

    let mut table: Vec<f64> = response.linear_response().to_vec();
    for i in 1..table.len() {
        table[i] = table[i].max(table[i - 1]);
    }

    let floor = table[0];
    let ceiling = table[table.len() - 1];
    let norm = if ceiling > floor {
        1.0 / (ceiling - floor)
    } else {
        0.0
    };
    let table: Vec<f32> = table
        .iter()
        .map(|v| ((v - floor) * norm) as f32)
        .collect();

    (0..resolution)
        .map(|i| lerp_slice(&table, i as f32 / (resolution - 1) as f32))
        .collect()
}

/// Calculates the inverse of a luma map.
///
/// Assumes the slice represents a semi-monotonic function in the range
/// [0.0, 1.0].
pub fn invert_luma_map(slice: &[f32]) -> Vec<f32> {
    let resolution = slice.len();

    let mut curve: Curve = Vec::with_capacity(resolution);
    let mut prev_x = 0.0;
    let mut prev_y = 0.0;
    for (i, y) in slice.iter().copied().enumerate() {
        let x = (i as f32 / (resolution - 1) as f32).max(prev_x);
        let y = y.max(prev_y);
        curve.push((x, y));
        prev_x = x;
        prev_y = y;
    }
    // Flat runs would make the inverse ambiguous.
    curve.dedup_by_key(|p| p.1);

    let mut flipped = Vec::with_capacity(resolution);
    let mut prev_x = 0.0;
    for i in 0..resolution {
        let y = i as f32 / (resolution - 1) as f32;
        let x = lerp_curve_at_y(&curve, y).max(prev_x);
        flipped.push(x);
        prev_x = x;
    }

    flipped
}

/// Evaluates the given luma map at `t`.
///
/// `t` should be in the range [0.0, 1.0], and (assuming a valid luma
/// map) the output will also be in [0.0, 1.0] and will be monotonic
/// with `t`.
#[inline]
pub fn eval_luma_map(luma_map: &[f32], t: f32) -> f32 {
    debug_assert!(t >= 0.0 && t <= 1.0);
    lerp_slice(luma_map, t)
}
