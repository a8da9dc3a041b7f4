//! Writes recovered response curves as lookup tables and plain tables.

use std::io::{self, Write};

/// Writes one channel as an OpenColorIO `.spi1d` LUT sampled evenly over
/// the input `domain`.
pub fn write_spi1d<W: Write>(out: &mut W, domain: (f32, f32), table: &[f32]) -> io::Result<()> {
    if table.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "spi1d table must have at least one entry",
        ));
    }

    writeln!(out, "Version 1")?;
    writeln!(out, "From {:.7} {:.7}", domain.0, domain.1)?;
    writeln!(out, "Length {}", table.len())?;
    writeln!(out, "Components 1")?;
    writeln!(out, "{{")?;
    for v in table {
        writeln!(out, "  {:.7}", v)?;
    }
    writeln!(out, "}}")
}

/// Writes three channels as a titled 1D `.cube` LUT sampled evenly over the
/// input `domain`.
///
/// Panics if the tables differ in length.
pub fn write_cube_1d<W: Write>(
    out: &mut W,
    title: &str,
    domain: (f32, f32),
    table_r: &[f32],
    table_g: &[f32],
    table_b: &[f32],
) -> io::Result<()> {
    assert!(table_r.len() == table_g.len() && table_r.len() == table_b.len());

    let (lo, hi) = domain;
    writeln!(out, "TITLE \"{}\"", title)?;
    writeln!(out, "DOMAIN_MIN {0:.7} {0:.7} {0:.7}", lo)?;
    writeln!(out, "DOMAIN_MAX {0:.7} {0:.7} {0:.7}", hi)?;
    writeln!(out, "LUT_1D_SIZE {}", table_r.len())?;
    for i in 0..table_r.len() {
        writeln!(out, "{:.7} {:.7} {:.7}", table_r[i], table_g[i], table_b[i])?;
    }

    Ok(())
}

/// Writes per-channel log response curves as CSV, one row per code value:
/// `z,r,g,b`.
pub fn write_response_csv<W: Write>(
    out: &mut W,
    curve_r: &[f64],
    curve_g: &[f64],
    curve_b: &[f64],
) -> io::Result<()> {
    assert!(curve_r.len() == curve_g.len() && curve_r.len() == curve_b.len());

    writeln!(out, "z,r,g,b")?;
    for (z, ((r, g), b)) in curve_r
        .iter()
        .zip(curve_g.iter())
        .zip(curve_b.iter())
        .enumerate()
    {
        writeln!(out, "{},{:.9},{:.9},{:.9}", z, r, g, b)?;
    }

    Ok(())
}
