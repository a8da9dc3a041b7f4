//! Merging an exposure set into a radiance map once its response curves
//! are known.

use rayon::prelude::*;

use crate::exposure_set::{ExposureSet, CHANNELS};
use crate::pipeline::ResponseCurves;

/// A linear, floating point image of scene radiance (up to an unknown
/// global scale).
#[derive(Debug, Clone, PartialEq)]
pub struct RadianceMap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[f32; CHANNELS]>,
}

impl RadianceMap {
    /// The largest channel value of any pixel.
    pub fn max_value(&self) -> f32 {
        self.pixels
            .iter()
            .flat_map(|p| p.iter().copied())
            .fold(0.0f32, f32::max)
    }
}

/// Merges every exposure of `exposures` into a single radiance map.
///
/// Each pixel's log radiance is the weighted average over exposures of
/// `g(Z) - ln t`, using the same weights the curves were solved with.
/// Rows are merged in parallel.
pub fn assemble_radiance_map(exposures: &ExposureSet, curves: &ResponseCurves) -> RadianceMap {
    let width = exposures.width();
    let height = exposures.height();
    let log_times: Vec<f64> = exposures.exposure_times().iter().map(|t| t.ln()).collect();
    let weights = &curves.weights;

    let rows: Vec<Vec<[f32; CHANNELS]>> = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut row = Vec::with_capacity(width);
            for x in 0..width {
                let offset = y * width + x;
                let mut pixel = [0.0f32; CHANNELS];
                for chan in 0..CHANNELS {
                    let response = &curves.channels[chan];
                    let mut sum = 0.0f64;
                    let mut weight_sum = 0.0f64;
                    let mut plain_sum = 0.0f64;
                    for (j, log_t) in log_times.iter().enumerate() {
                        let z = exposures.intensity(j, offset, chan);
                        let log_e = response.log_response(z) - log_t;
                        let w = weights.get(z);
                        sum += w * log_e;
                        weight_sum += w;
                        plain_sum += log_e;
                    }
                    let log_e = if weight_sum > 0.0 {
                        sum / weight_sum
                    } else {
                        plain_sum / log_times.len() as f64
                    };
                    pixel[chan] = log_e.exp() as f32;
                }
                row.push(pixel);
            }
            row
        })
        .collect();

    tracing::debug!(width, height, "assembled radiance map");

    RadianceMap {
        width: width,
        height: height,
        pixels: rows.concat(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ChannelResponse;
    use crate::weighting::{WeightTable, WeightingCurve, LEVELS};
    use approx::assert_relative_eq;

    // A perfectly linear sensor: g(z) = ln(z / 128).
    fn linear_curves(weighting: WeightingCurve) -> ResponseCurves {
        let mut crf = [0.0f64; LEVELS];
        for (z, g) in crf.iter_mut().enumerate() {
            *g = (z.max(1) as f64 / 128.0).ln();
        }
        let chan = ChannelResponse {
            crf: crf,
            log_irradiance: Vec::new(),
            fit_error: 0.0,
        };
        ResponseCurves {
            channels: [chan.clone(), chan.clone(), chan],
            sample_indices: Vec::new(),
            weights: WeightTable::new(weighting),
        }
    }

    #[test]
    fn consistent_exposures_give_their_radiance() {
        // Radiance (0.25, 0.5, 0.75) relative to z = 128, shot at t = 1 and t = 2.
        let a: Vec<u8> = [32u8, 64, 96].repeat(6);
        let b: Vec<u8> = [64u8, 128, 192].repeat(6);
        let set = ExposureSet::new(3, 2, vec![&a[..], &b[..]], vec![1.0, 2.0]).unwrap();

        for weighting in [WeightingCurve::Hat, WeightingCurve::Ramp] {
            let map = assemble_radiance_map(&set, &linear_curves(weighting));
            assert_eq!(map.width, 3);
            assert_eq!(map.height, 2);
            assert_eq!(map.pixels.len(), 6);
            for p in map.pixels.iter() {
                assert_relative_eq!(p[0], 0.25, epsilon = 1e-6);
                assert_relative_eq!(p[1], 0.5, epsilon = 1e-6);
                assert_relative_eq!(p[2], 0.75, epsilon = 1e-6);
            }
            assert_relative_eq!(map.max_value(), 0.75, epsilon = 1e-6);
        }
    }

    #[test]
    fn pixels_stay_in_row_major_order() {
        let a: Vec<u8> = (0..4u8).flat_map(|i| [32 * (i + 1); 3]).collect();
        let b = a.clone();
        let set = ExposureSet::new(2, 2, vec![&a[..], &b[..]], vec![1.0, 1.0]).unwrap();
        let map = assemble_radiance_map(&set, &linear_curves(WeightingCurve::Hat));
        for (i, p) in map.pixels.iter().enumerate() {
            assert_relative_eq!(p[1], 0.25 * (i + 1) as f32, epsilon = 1e-6);
        }
    }
}
