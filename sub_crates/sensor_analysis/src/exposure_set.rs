use crate::error::{Error, Result};

/// Number of interleaved channels in every input buffer.
pub const CHANNELS: usize = 3;

/// A set of aligned, equally sized 8-bit RGB exposures of the same scene,
/// along with the exposure time of each.
///
/// The pixel buffers are borrowed: whoever decoded the images keeps
/// ownership and must keep them alive for as long as the set is in use.
/// Alignment is assumed, not checked.
#[derive(Debug, Clone)]
pub struct ExposureSet<'a> {
    width: usize,
    height: usize,
    images: Vec<&'a [u8]>,
    exposure_times: Vec<f64>,
}

impl<'a> ExposureSet<'a> {
    /// Validates and bundles the given exposures.
    ///
    /// Each buffer must be `width * height * 3` bytes, interleaved,
    /// row-major.  `exposure_times[i]` is the exposure time of `images[i]`.
    pub fn new(
        width: usize,
        height: usize,
        images: Vec<&'a [u8]>,
        exposure_times: Vec<f64>,
    ) -> Result<ExposureSet<'a>> {
        if images.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "at least 2 exposures are needed, but {} were given",
                images.len()
            )));
        }
        if images.len() != exposure_times.len() {
            return Err(Error::InvalidInput(format!(
                "{} images were given with {} exposure times",
                images.len(),
                exposure_times.len()
            )));
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(format!(
                "images must not be empty, but are {}x{}",
                width, height
            )));
        }

        let expected_len = width * height * CHANNELS;
        for (i, img) in images.iter().enumerate() {
            if img.len() != expected_len {
                return Err(Error::InvalidInput(format!(
                    "image {} has {} bytes, but a {}x{} RGB image needs {}",
                    i,
                    img.len(),
                    width,
                    height,
                    expected_len
                )));
            }
        }
        for (i, &time) in exposure_times.iter().enumerate() {
            if !(time > 0.0 && time.is_finite()) {
                return Err(Error::InvalidInput(format!(
                    "exposure time {} of image {} is not a positive number",
                    time, i
                )));
            }
        }

        Ok(ExposureSet {
            width: width,
            height: height,
            images: images,
            exposure_times: exposure_times,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Number of exposures in the set.  Always at least 2.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn images(&self) -> &[&'a [u8]] {
        &self.images
    }

    pub fn exposure_times(&self) -> &[f64] {
        &self.exposure_times
    }

    /// The intensity of `channel` at the given linear pixel offset
    /// (`y * width + x`) in exposure `exposure`.
    #[inline(always)]
    pub fn intensity(&self, exposure: usize, offset: usize, channel: usize) -> u8 {
        debug_assert!(channel < CHANNELS);
        self.images[exposure][offset * CHANNELS + channel]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: usize, height: usize, v: u8) -> Vec<u8> {
        vec![v; width * height * CHANNELS]
    }

    #[test]
    fn single_exposure_is_invalid() {
        let img = gray(4, 4, 10);
        let err = ExposureSet::new(4, 4, vec![&img[..]], vec![1.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn mismatched_dimensions_are_invalid() {
        let a = gray(4, 4, 10);
        let b = gray(4, 3, 10);
        let err = ExposureSet::new(4, 4, vec![&a[..], &b[..]], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn time_count_must_match() {
        let a = gray(2, 2, 10);
        let b = gray(2, 2, 20);
        let err = ExposureSet::new(2, 2, vec![&a[..], &b[..]], vec![1.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn non_positive_times_are_invalid() {
        let a = gray(2, 2, 10);
        let b = gray(2, 2, 20);
        for t in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = ExposureSet::new(2, 2, vec![&a[..], &b[..]], vec![1.0, t]).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
    }

    #[test]
    fn empty_images_are_invalid() {
        let err = ExposureSet::new(0, 4, vec![&[][..], &[][..]], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn intensity_respects_interleaving() {
        // 2x1 image: pixel 0 = (1, 2, 3), pixel 1 = (4, 5, 6).
        let a = vec![1u8, 2, 3, 4, 5, 6];
        let b = vec![7u8, 8, 9, 10, 11, 12];
        let set = ExposureSet::new(2, 1, vec![&a[..], &b[..]], vec![1.0, 2.0]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.pixel_count(), 2);
        assert_eq!(set.intensity(0, 1, 0), 4);
        assert_eq!(set.intensity(0, 1, 2), 6);
        assert_eq!(set.intensity(1, 0, 1), 8);
    }
}
