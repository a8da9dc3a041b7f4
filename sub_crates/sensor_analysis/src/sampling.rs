//! Picks a spread-out subset of pixels and gathers their intensities
//! across all exposures.

use crate::error::{Error, Result};
use crate::exposure_set::{ExposureSet, CHANNELS};
use crate::weighting::LEVELS;

/// Returns how many pixels to sample for `exposure_count` exposures of an
/// image with `pixel_count` pixels.
///
/// The response system has `LEVELS + samples` unknowns and
/// `samples * exposure_count` data equations, so this sizes `samples` to
/// keep it comfortably over-determined: `2 * (2 * (LEVELS - 1) / (N - 1))`,
/// capped at the pixel count.
pub fn sample_count(exposure_count: usize, pixel_count: usize) -> Result<usize> {
    if exposure_count < 2 {
        return Err(Error::InvalidInput(format!(
            "at least 2 exposures are needed, but {} were given",
            exposure_count
        )));
    }

    let samples = ((2 * (LEVELS - 1)) / (exposure_count - 1) * 2).min(pixel_count);
    if samples == 0 {
        return Err(Error::DegenerateInput(format!(
            "no pixels can be sampled from {} exposures of {} pixels",
            exposure_count, pixel_count
        )));
    }

    Ok(samples)
}

/// Linear pixel offsets spread evenly across an image of `pixel_count`
/// pixels, in ascending order.
///
/// Walks the image with a fixed stride.  If that misses the last pixel and
/// there's room left, the last pixel is appended so the far corner is
/// always represented.  Never returns more than `samples` offsets.
pub fn sample_indices(pixel_count: usize, samples: usize) -> Result<Vec<usize>> {
    if samples == 0 || samples > pixel_count {
        return Err(Error::DegenerateInput(format!(
            "cannot take {} samples from {} pixels",
            samples, pixel_count
        )));
    }

    let step = (pixel_count + samples - 1) / samples;
    let mut indices: Vec<usize> = (0..pixel_count).step_by(step).collect();

    if indices.len() < samples && indices.last() != Some(&(pixel_count - 1)) {
        indices.push(pixel_count - 1);
    }

    Ok(indices)
}

/// The intensities of one channel at every sampled pixel, `samples x N`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    exposures: usize,
    data: Vec<u8>,
}

impl SampleMatrix {
    /// Builds a matrix from row-major data, one row per sample.
    ///
    /// `data` must be a whole number of rows of `exposures` entries.
    pub fn from_rows(exposures: usize, data: Vec<u8>) -> Result<SampleMatrix> {
        if exposures == 0 || data.len() % exposures != 0 {
            return Err(Error::InvalidInput(format!(
                "{} intensities don't split into rows of {} exposures",
                data.len(),
                exposures
            )));
        }
        Ok(SampleMatrix {
            exposures: exposures,
            data: data,
        })
    }

    pub fn samples(&self) -> usize {
        self.data.len() / self.exposures
    }

    pub fn exposures(&self) -> usize {
        self.exposures
    }

    /// Intensity of sample `i` in exposure `j`.
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> u8 {
        self.data[i * self.exposures + j]
    }

    /// All exposures of sample `i`.
    pub fn row(&self, i: usize) -> &[u8] {
        &self.data[(i * self.exposures)..((i + 1) * self.exposures)]
    }
}

/// `ln(exposure time)` for each sample and exposure, `samples x N`.
///
/// Every row is the same, but it's kept as a full matrix so each data
/// equation of the solver reads its own entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LogExposureMatrix {
    exposures: usize,
    data: Vec<f64>,
}

impl LogExposureMatrix {
    pub fn new(samples: usize, exposure_times: &[f64]) -> LogExposureMatrix {
        let log_times: Vec<f64> = exposure_times.iter().map(|t| t.ln()).collect();
        let mut data = Vec::with_capacity(samples * log_times.len());
        for _ in 0..samples {
            data.extend_from_slice(&log_times);
        }
        LogExposureMatrix {
            exposures: exposure_times.len(),
            data: data,
        }
    }

    pub fn samples(&self) -> usize {
        if self.exposures == 0 {
            0
        } else {
            self.data.len() / self.exposures
        }
    }

    pub fn exposures(&self) -> usize {
        self.exposures
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.exposures + j]
    }
}

/// Everything the response solver needs from an exposure set: the
/// sampled pixel offsets, one `SampleMatrix` per channel, and the shared
/// log exposure matrix.
///
/// Row `i` of every channel matrix refers to pixel `indices[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub indices: Vec<usize>,
    pub channels: [SampleMatrix; CHANNELS],
    pub log_exposure: LogExposureMatrix,
}

impl SampleSet {
    /// Samples the given exposure set.
    ///
    /// Each channel is gathered on its own task, and the results are
    /// joined before returning.
    pub fn gather(exposures: &ExposureSet) -> Result<SampleSet> {
        let samples = sample_count(exposures.len(), exposures.pixel_count())?;
        let indices = sample_indices(exposures.pixel_count(), samples)?;

        let (r0, (r1, r2)) = rayon::join(
            || gather_channel(exposures, &indices, 0),
            || {
                rayon::join(
                    || gather_channel(exposures, &indices, 1),
                    || gather_channel(exposures, &indices, 2),
                )
            },
        );

        let log_exposure = LogExposureMatrix::new(indices.len(), exposures.exposure_times());

        tracing::debug!(
            requested = samples,
            sampled = indices.len(),
            exposures = exposures.len(),
            "gathered pixel samples"
        );

        Ok(SampleSet {
            indices: indices,
            channels: [r0?, r1?, r2?],
            log_exposure: log_exposure,
        })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

fn gather_channel(
    exposures: &ExposureSet,
    indices: &[usize],
    channel: usize,
) -> Result<SampleMatrix> {
    let n = exposures.len();
    let mut data = Vec::with_capacity(indices.len() * n);
    for &offset in indices {
        for j in 0..n {
            data.push(exposures.intensity(j, offset, channel));
        }
    }
    SampleMatrix::from_rows(n, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_exposure_is_rejected() {
        assert!(matches!(sample_count(1, 100), Err(Error::InvalidInput(_))));
        assert!(matches!(sample_count(0, 100), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn counts_are_even_and_capped() {
        assert_eq!(sample_count(2, 1_000_000).unwrap(), 1020);
        assert_eq!(sample_count(3, 1_000_000).unwrap(), 510);
        assert_eq!(sample_count(4, 1_000_000).unwrap(), 340);
        assert_eq!(sample_count(7, 1_000_000).unwrap(), 170);
        assert_eq!(sample_count(3, 16).unwrap(), 16);
    }

    #[test]
    fn counts_stay_in_range() {
        for n in 2..40 {
            for pixels in [1, 2, 15, 16, 100, 511, 4096] {
                let s = sample_count(n, pixels).unwrap();
                assert!(s > 0 && s <= pixels);
            }
        }
    }

    #[test]
    fn too_many_exposures_is_degenerate() {
        assert!(matches!(
            sample_count(1000, 1_000_000),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn indices_ascend_and_reach_the_corner() {
        for pixels in 1..300 {
            for samples in 1..=pixels.min(40) {
                let indices = sample_indices(pixels, samples).unwrap();
                assert!(!indices.is_empty());
                assert!(indices.len() <= samples);
                assert!(indices.windows(2).all(|w| w[0] < w[1]));
                assert_eq!(indices[0], 0);

                // The stride alone, without the appended corner.
                let step = (pixels + samples - 1) / samples;
                let strided = (pixels + step - 1) / step;
                if strided < samples {
                    assert_eq!(*indices.last().unwrap(), pixels - 1);
                }
            }
        }
    }

    #[test]
    fn corner_is_appended() {
        // Full: the corner would be a fourth sample.
        assert_eq!(sample_indices(10, 3).unwrap(), vec![0, 4, 8]);
        assert_eq!(sample_indices(11, 4).unwrap(), vec![0, 3, 6, 9]);
        assert_eq!(sample_indices(10, 4).unwrap(), vec![0, 3, 6, 9]);
        // Room for one more, so the corner is appended.
        assert_eq!(sample_indices(9, 4).unwrap(), vec![0, 3, 6, 8]);
    }

    #[test]
    fn bad_sample_counts_are_degenerate() {
        assert!(matches!(sample_indices(10, 0), Err(Error::DegenerateInput(_))));
        assert!(matches!(sample_indices(10, 11), Err(Error::DegenerateInput(_))));
    }

    #[test]
    fn sample_matrix_shape_is_checked() {
        let z = SampleMatrix::from_rows(3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(z.samples(), 2);
        assert_eq!(z.row(1), &[4, 5, 6]);

        assert!(matches!(
            SampleMatrix::from_rows(3, vec![1, 2, 3, 4]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            SampleMatrix::from_rows(0, Vec::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn gather_keeps_channels_in_step() {
        // 4x1 image whose channels are (x, 10 + x, 20 + x), scaled per exposure.
        let a: Vec<u8> = (0..4u8).flat_map(|x| [x, 10 + x, 20 + x]).collect();
        let b: Vec<u8> = a.iter().map(|v| v * 2).collect();
        let set = ExposureSet::new(4, 1, vec![&a[..], &b[..]], vec![0.5, 2.0]).unwrap();
        let samples = SampleSet::gather(&set).unwrap();

        assert_eq!(samples.indices, vec![0, 1, 2, 3]);
        assert_eq!(samples.len(), 4);
        for (i, &offset) in samples.indices.iter().enumerate() {
            let x = offset as u8;
            assert_eq!(samples.channels[0].row(i), &[x, x * 2]);
            assert_eq!(samples.channels[1].row(i), &[10 + x, (10 + x) * 2]);
            assert_eq!(samples.channels[2].get(i, 1), (20 + x) * 2);
        }

        assert_eq!(samples.log_exposure.samples(), 4);
        assert_eq!(samples.log_exposure.exposures(), 2);
        for i in 0..4 {
            assert_eq!(samples.log_exposure.get(i, 0), 0.5f64.ln());
            assert_eq!(samples.log_exposure.get(i, 1), 2.0f64.ln());
        }
    }
}
