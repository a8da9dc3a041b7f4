//! Command line arguments shared by the binaries.

use anyhow::{bail, Context};
use clap::{Arg, ArgMatches};

use sensor_analysis::{ResponseConfig, SolveMethod, WeightingCurve};

use crate::export::LutFormat;

/// The arguments every response-solving binary accepts: input images,
/// exposure overrides, solver tunables, and verbosity.
pub fn solve_args<'a, 'b>() -> Vec<Arg<'a, 'b>> {
    vec![
        Arg::with_name("INPUT")
            .help("input image files, all of the same scene and size")
            .required(true)
            .multiple(true)
            .index(1),
        Arg::with_name("times")
            .short("t")
            .long("times")
            .value_name("SECONDS")
            .help(
                "comma separated exposure times, one per input image in the same order \
                 (default: read from EXIF)",
            )
            .takes_value(true)
            .multiple(true)
            .require_delimiter(true),
        Arg::with_name("lambda")
            .short("l")
            .long("lambda")
            .value_name("LAMBDA")
            .help("weight of the curve smoothness term")
            .default_value("10"),
        Arg::with_name("weighting")
            .long("weighting")
            .value_name("CURVE")
            .help("pixel weighting curve")
            .possible_values(&["hat", "ramp"])
            .default_value("hat"),
        Arg::with_name("solver")
            .long("solver")
            .value_name("METHOD")
            .help("least squares method")
            .possible_values(&["svd", "normal"])
            .default_value("svd"),
        Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .help("log debug output"),
    ]
}

/// `--format`, for binaries that export LUTs.
pub fn lut_format_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("format")
        .short("f")
        .long("format")
        .value_name("FORMAT")
        .help("LUT file format; spi1d writes one file per channel")
        .possible_values(&["cube", "spi1d"])
        .default_value("cube")
}

pub fn lut_format(matches: &ArgMatches) -> anyhow::Result<LutFormat> {
    match matches.value_of("format") {
        None | Some("cube") => Ok(LutFormat::Cube),
        Some("spi1d") => Ok(LutFormat::Spi1d),
        Some(other) => bail!("unknown LUT format '{}'", other),
    }
}

pub fn input_paths<'m>(matches: &'m ArgMatches) -> Vec<&'m str> {
    matches.values_of("INPUT").map(|v| v.collect()).unwrap_or_default()
}

/// Parses `--times`, if given.
pub fn exposure_times(matches: &ArgMatches) -> anyhow::Result<Option<Vec<f64>>> {
    match matches.values_of("times") {
        None => Ok(None),
        Some(values) => {
            let times = values
                .map(|v| {
                    v.trim()
                        .parse::<f64>()
                        .with_context(|| format!("invalid exposure time '{}'", v))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(Some(times))
        }
    }
}

/// Builds the solver configuration from the parsed arguments.
pub fn response_config(matches: &ArgMatches) -> anyhow::Result<ResponseConfig> {
    let mut config = ResponseConfig::default();

    if let Some(lambda) = matches.value_of("lambda") {
        config.lambda = lambda
            .parse()
            .with_context(|| format!("invalid lambda '{}'", lambda))?;
    }

    config.weighting = match matches.value_of("weighting") {
        None | Some("hat") => WeightingCurve::Hat,
        Some("ramp") => WeightingCurve::Ramp,
        Some(other) => bail!("unknown weighting curve '{}'", other),
    };

    config.method = match matches.value_of("solver") {
        None | Some("svd") => SolveMethod::Svd,
        Some("normal") => SolveMethod::NormalEquations,
        Some(other) => bail!("unknown solver '{}'", other),
    };

    Ok(config)
}
