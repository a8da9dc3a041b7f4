use std::{fs::File, io::BufWriter, path::Path};

use anyhow::Context;
use clap::{App, Arg};

use hdr_tools::{cli, job_helpers, logger};
use sensor_analysis::{assemble_radiance_map, recover_response_curves};

fn main() -> anyhow::Result<()> {
    let matches = App::new("HDRI Merge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Merges LDR images into an HDRI")
        .args(&cli::solve_args())
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("FILE")
                .help("the .hdr file to write")
                .required(true),
        )
        .arg(
            Arg::with_name("exposure")
                .short("e")
                .long("exposure")
                .value_name("SCALE")
                .help("multiplier applied to the merged radiance before writing")
                .default_value("1.0"),
        )
        .get_matches();

    logger::init(matches.is_present("verbose"));

    let config = cli::response_config(&matches)?;
    let times = cli::exposure_times(&matches)?;
    let exposure: f32 = matches
        .value_of("exposure")
        .unwrap_or("1.0")
        .parse()
        .context("invalid exposure scale")?;
    let out_path = Path::new(matches.value_of("output").unwrap_or("out.hdr"));

    let images = job_helpers::load_images(&cli::input_paths(&matches))?;
    let bracket = job_helpers::Bracket::new(images, times.as_deref())?;
    let exposures = bracket.exposure_set()?;

    let curves = recover_response_curves(&exposures, &config)?;
    tracing::info!("Average fit error: {:.5}", curves.fit_error());

    let hdri = assemble_radiance_map(&exposures, &curves);
    tracing::info!(
        "Merged {}x{} radiance map, peak value {:.3}",
        hdri.width,
        hdri.height,
        hdri.max_value()
    );

    let mut out = BufWriter::new(
        File::create(out_path).with_context(|| format!("cannot create {}", out_path.display()))?,
    );
    hdr::write_hdr(&mut out, &hdri.pixels, hdri.width, hdri.height, exposure)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    tracing::info!("Wrote {}", out_path.display());

    Ok(())
}
