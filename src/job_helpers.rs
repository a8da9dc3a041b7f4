use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use thiserror::Error;

use sensor_analysis::ExposureSet;

use crate::{ImageInfo, SourceImage};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: image_fmt::ReadError,
    },

    #[error("{path} is {found:?}, but the other images are {expected:?}")]
    MismatchedDimensions {
        path: PathBuf,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("{0} has no exposure information; pass exposure times explicitly")]
    MissingExposure(PathBuf),

    #[error("got {found} exposure times for {expected} images")]
    ExposureCount { expected: usize, found: usize },

    #[error("no input images")]
    NoImages,
}

/// Loads an image as 8-bit RGB and reads its exposure metadata from EXIF.
pub fn load_image(path: &Path) -> Result<SourceImage, LoadError> {
    let read_err = |source: image_fmt::ReadError| LoadError::Read {
        path: path.to_path_buf(),
        source: source,
    };

    // Load image.
    let file = File::open(path).map_err(|e| read_err(e.into()))?;
    let img = image_fmt::load(BufReader::new(file)).map_err(read_err)?;
    let (width, height) = img.dimensions;
    let bit_depth = img.data.bit_depth();
    let pixels = img.data.to_rgb8();

    // Get exposure metadata from EXIF data.
    let (exposure_time, fstop, sensitivity) = {
        let mut exposure_time = None;
        let mut fstop = None;
        let mut sensitivity = None;

        let mut file = BufReader::new(File::open(path).map_err(|e| read_err(e.into()))?);
        if let Ok(img_exif) = exif::Reader::new().read_from_container(&mut file) {
            if let Some(&exif::Value::Rational(ref n)) = img_exif
                .get_field(exif::Tag::ExposureTime, exif::In::PRIMARY)
                .map(|n| &n.value)
            {
                if n[0].num != 0 && n[0].denom != 0 {
                    exposure_time = Some(n[0]);
                }
            }
            if let Some(&exif::Value::Rational(ref n)) = img_exif
                .get_field(exif::Tag::FNumber, exif::In::PRIMARY)
                .map(|n| &n.value)
            {
                if n[0].num != 0 && n[0].denom != 0 {
                    fstop = Some(n[0]);
                }
            }
            if let Some(Some(n)) = img_exif
                .get_field(exif::Tag::PhotographicSensitivity, exif::In::PRIMARY)
                .map(|n| n.value.get_uint(0))
            {
                if n != 0 {
                    sensitivity = Some(n);
                }
            }
        } else {
            tracing::debug!("{}: no EXIF data", path.display());
        }

        (exposure_time, fstop, sensitivity)
    };

    // Calculate over-all exposure.
    let total_exposure = match (exposure_time, fstop, sensitivity) {
        (Some(exp), Some(fst), Some(sns)) => {
            Some((sns as f64 * exp.to_f64() / (fst.to_f64() * fst.to_f64())) as f32)
        }
        (Some(exp), None, Some(sns)) => Some((sns as f64 * exp.to_f64()) as f32),
        (Some(exp), Some(fst), None) => Some((exp.to_f64() / (fst.to_f64() * fst.to_f64())) as f32),
        (Some(exp), None, None) => Some(exp.to_f64() as f32),
        _ => None,
    };

    let image_info = ImageInfo {
        filename: path
            .file_name()
            .map(|p| p.to_string_lossy().into())
            .unwrap_or_else(|| "".into()),
        full_filepath: path.to_string_lossy().into(),

        width: width,
        height: height,
        bit_depth: bit_depth,
        exposure: total_exposure,

        exposure_time: exposure_time.map(|n| (n.num, n.denom)),
        fstop: fstop.map(|n| (n.num, n.denom)),
        iso: sensitivity,
    };

    tracing::debug!(
        "Loaded {}: {}x{}, {}-bit, exposure {:?}",
        image_info.filename,
        width,
        height,
        bit_depth,
        total_exposure
    );

    Ok(SourceImage {
        image: pixels,
        info: image_info,
    })
}

/// Loads all of `paths` in parallel, in order, and checks that they share
/// the same dimensions.
pub fn load_images<P: AsRef<Path> + Sync>(paths: &[P]) -> Result<Vec<SourceImage>, LoadError> {
    if paths.is_empty() {
        return Err(LoadError::NoImages);
    }

    let images = paths
        .par_iter()
        .map(|p| load_image(p.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let expected = (images[0].info.width, images[0].info.height);
    for img in images.iter().skip(1) {
        let found = (img.info.width, img.info.height);
        if found != expected {
            return Err(LoadError::MismatchedDimensions {
                path: PathBuf::from(&img.info.full_filepath),
                expected: expected,
                found: found,
            });
        }
    }

    tracing::info!(
        "Loaded {} images of {}x{}",
        images.len(),
        expected.0,
        expected.1
    );

    Ok(images)
}

/// A set of loaded images paired with exposure values, sorted from the
/// shortest exposure to the longest.
#[derive(Debug)]
pub struct Bracket {
    pub width: usize,
    pub height: usize,
    pub images: Vec<SourceImage>,
    pub exposures: Vec<f64>,
}

impl Bracket {
    /// Pairs `images` with exposure values.
    ///
    /// If `times` is given it must have one entry per image, in the same
    /// order.  Otherwise each image's EXIF-derived exposure is used.
    pub fn new(images: Vec<SourceImage>, times: Option<&[f64]>) -> Result<Bracket, LoadError> {
        if images.is_empty() {
            return Err(LoadError::NoImages);
        }

        let exposures: Vec<f64> = match times {
            Some(times) => {
                if times.len() != images.len() {
                    return Err(LoadError::ExposureCount {
                        expected: images.len(),
                        found: times.len(),
                    });
                }
                times.to_vec()
            }
            None => images
                .iter()
                .map(|img| {
                    img.info.exposure.map(|e| e as f64).ok_or_else(|| {
                        LoadError::MissingExposure(PathBuf::from(&img.info.full_filepath))
                    })
                })
                .collect::<Result<_, _>>()?,
        };

        let mut pairs: Vec<(SourceImage, f64)> = images.into_iter().zip(exposures).collect();
        pairs.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (images, exposures): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();

        Ok(Bracket {
            width: images[0].info.width,
            height: images[0].info.height,
            images: images,
            exposures: exposures,
        })
    }

    /// Borrows the bracket as an exposure set for response recovery.
    pub fn exposure_set(&self) -> sensor_analysis::Result<ExposureSet<'_>> {
        ExposureSet::new(
            self.width,
            self.height,
            self.images.iter().map(|img| &img.image[..]).collect(),
            self.exposures.clone(),
        )
    }
}

/// Ensures that a directory path exists and that we have permission to
/// write to it.  If it doesn't exists, this will attempt to create it.
///
/// Will return an error if:
/// - The path exists, but is not a directory.
/// - The path exists, but we don't have permission to write to it.
/// - The path doesn't exist, and we are unable to create it.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    let path: &Path = path.as_ref();

    if !path.exists() {
        std::fs::create_dir_all(path)?;
    } else {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "Specified path is not a directory",
            ));
        }
        if metadata.permissions().readonly() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "Specified path is read only",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32, value: u8) -> PathBuf {
        let path = dir.join(name);
        let file = std::io::BufWriter::new(File::create(&path).unwrap());
        let mut encoder = png::Encoder::new(file, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        let data = vec![value; (width * height * 3) as usize];
        writer.write_image_data(&data).unwrap();
        path
    }

    #[test]
    fn load_png_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 3, 2, 77);

        let img = load_image(&path).unwrap();
        assert_eq!(img.info.filename, "a.png");
        assert_eq!((img.info.width, img.info.height), (3, 2));
        assert_eq!(img.info.bit_depth, 8);
        assert_eq!(img.info.exposure, None);
        assert_eq!(img.image, vec![77; 18]);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Read {
                source: image_fmt::ReadError::IO(_),
                ..
            }
        ));
    }

    #[test]
    fn load_images_checks_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 4, 4, 10);
        let b = write_png(dir.path(), "b.png", 4, 4, 20);
        let c = write_png(dir.path(), "c.png", 4, 3, 30);

        let images = load_images(&[&a, &b]).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].image[0], 20);

        match load_images(&[&a, &b, &c]) {
            Err(LoadError::MismatchedDimensions {
                expected, found, ..
            }) => {
                assert_eq!(expected, (4, 4));
                assert_eq!(found, (4, 3));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let none: [PathBuf; 0] = [];
        assert!(matches!(load_images(&none), Err(LoadError::NoImages)));
    }

    #[test]
    fn bracket_sorts_by_exposure() {
        let dir = tempfile::tempdir().unwrap();
        let paths = [
            write_png(dir.path(), "mid.png", 2, 2, 100),
            write_png(dir.path(), "long.png", 2, 2, 200),
            write_png(dir.path(), "short.png", 2, 2, 50),
        ];
        let images = load_images(&paths).unwrap();

        let bracket = Bracket::new(images, Some(&[1.0, 4.0, 0.25])).unwrap();
        assert_eq!(bracket.exposures, vec![0.25, 1.0, 4.0]);
        let names: Vec<&str> = bracket
            .images
            .iter()
            .map(|i| i.info.filename.as_str())
            .collect();
        assert_eq!(names, vec!["short.png", "mid.png", "long.png"]);

        let set = bracket.exposure_set().unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.intensity(0, 0, 0), 50);
        assert_eq!(set.intensity(2, 3, 2), 200);
    }

    #[test]
    fn bracket_needs_exposures() {
        let dir = tempfile::tempdir().unwrap();
        let paths = [
            write_png(dir.path(), "a.png", 2, 2, 100),
            write_png(dir.path(), "b.png", 2, 2, 200),
        ];

        let images = load_images(&paths).unwrap();
        assert!(matches!(
            Bracket::new(images.clone(), None),
            Err(LoadError::MissingExposure(_))
        ));
        assert!(matches!(
            Bracket::new(images, Some(&[1.0])),
            Err(LoadError::ExposureCount {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn ensure_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("x").join("y");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir_exists(&nested).unwrap();

        let file = write_png(dir.path(), "f.png", 1, 1, 0);
        assert!(ensure_dir_exists(&file).is_err());
    }
}
