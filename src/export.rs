//! Writing recovered curves to disk as lookup tables.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

/// On-disk LUT format for the exported curves.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LutFormat {
    /// One three-channel `.cube` file per direction.
    Cube,

    /// One single-channel `.spi1d` file per direction and channel.
    Spi1d,
}

impl Default for LutFormat {
    fn default() -> Self {
        LutFormat::Cube
    }
}

const CHANNEL_NAMES: [&str; 3] = ["r", "g", "b"];

/// Writes the sensor-to-linear and linear-to-sensor LUTs into `out_dir`,
/// returning the paths written.
///
/// Each table maps `[0, 1]` to `[0, 1]`.
pub fn write_luts(
    out_dir: &Path,
    format: LutFormat,
    to_linear: &[Vec<f32>; 3],
    to_sensor: &[Vec<f32>; 3],
) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (stem, title, tables) in [
        ("sensor_to_linear", "sensor to linear", to_linear),
        ("linear_to_sensor", "linear to sensor", to_sensor),
    ] {
        match format {
            LutFormat::Cube => {
                let path = out_dir.join(format!("{}.cube", stem));
                write_file(&path, |out| {
                    lut::write_cube_1d(out, title, (0.0, 1.0), &tables[0], &tables[1], &tables[2])
                })?;
                written.push(path);
            }
            LutFormat::Spi1d => {
                for (name, table) in CHANNEL_NAMES.iter().zip(tables.iter()) {
                    let path = out_dir.join(format!("{}_{}.spi1d", stem, name));
                    write_file(&path, |out| lut::write_spi1d(out, (0.0, 1.0), table))?;
                    written.push(path);
                }
            }
        }
    }

    Ok(written)
}

fn write_file<F>(path: &Path, f: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let mut out = BufWriter::new(File::create(path)?);
    f(&mut out)?;
    out.flush()?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}
