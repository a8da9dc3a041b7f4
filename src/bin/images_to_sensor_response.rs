use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use clap::{App, Arg};

use hdr_tools::{cli, export, job_helpers, logger};
use sensor_analysis::{invert_luma_map, recover_response_curves};

fn main() -> anyhow::Result<()> {
    let matches = App::new("Images to Sensor Response")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Estimates sensor response curves from a set of differently exposed images of the same scene")
        .args(&cli::solve_args())
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("DIR")
                .help("directory to write the LUTs and response table to")
                .default_value("."),
        )
        .arg(
            Arg::with_name("resolution")
                .short("r")
                .long("resolution")
                .value_name("N")
                .help("number of entries in each LUT")
                .default_value("4096"),
        )
        .arg(cli::lut_format_arg())
        .get_matches();

    logger::init(matches.is_present("verbose"));

    let config = cli::response_config(&matches)?;
    let times = cli::exposure_times(&matches)?;
    let format = cli::lut_format(&matches)?;
    let resolution: usize = matches
        .value_of("resolution")
        .unwrap_or("4096")
        .parse()
        .context("invalid LUT resolution")?;
    if resolution < 2 {
        anyhow::bail!("LUT resolution must be at least 2");
    }
    let out_dir = Path::new(matches.value_of("output").unwrap_or("."));
    job_helpers::ensure_dir_exists(out_dir)
        .with_context(|| format!("cannot write to {}", out_dir.display()))?;

    let images = job_helpers::load_images(&cli::input_paths(&matches))?;
    let bracket = job_helpers::Bracket::new(images, times.as_deref())?;
    let exposures = bracket.exposure_set()?;

    // Estimate sensor response curves from the image-exposure pairs.
    let curves = recover_response_curves(&exposures, &config)?;
    tracing::info!("Average fit error: {:.5}", curves.fit_error());

    let to_linear = curves.linearizing_luma_maps(resolution);
    let to_sensor = [
        invert_luma_map(&to_linear[0]),
        invert_luma_map(&to_linear[1]),
        invert_luma_map(&to_linear[2]),
    ];

    // Write out sensor response curve lookup tables.
    export::write_luts(out_dir, format, &to_linear, &to_sensor)
        .with_context(|| format!("failed to write LUTs to {}", out_dir.display()))?;

    let path = out_dir.join("response.csv");
    let mut out = BufWriter::new(File::create(&path)?);
    lut::write_response_csv(
        &mut out,
        &curves.channels[0].crf,
        &curves.channels[1].crf,
        &curves.channels[2].crf,
    )
    .and_then(|_| out.flush())
    .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());

    Ok(())
}
