//! A crate for computing various things about camera sensors.
//!
//! The main entry point is [`recover_response_curves`], which takes a set
//! of differently exposed 8-bit images of the same static scene and
//! recovers, per channel, the camera's log response curve along with the
//! log irradiance of a sampled subset of pixels.  The recovered curves can
//! then be used to merge the exposures into a radiance map
//! ([`assemble_radiance_map`]) or exported as luma maps
//! ([`ResponseCurves::linearizing_luma_maps`]).
//!
//! ```no_run
//! use sensor_analysis::{recover_response_curves, ExposureSet, ResponseConfig};
//!
//! # fn load() -> (usize, usize, Vec<Vec<u8>>, Vec<f64>) { unimplemented!() }
//! let (width, height, images, times) = load();
//! let set = ExposureSet::new(
//!     width,
//!     height,
//!     images.iter().map(|i| &i[..]).collect(),
//!     times,
//! )?;
//! let curves = recover_response_curves(&set, &ResponseConfig::default())?;
//! println!("{:?}", &curves.channels[0].crf[..]);
//! # Ok::<(), sensor_analysis::Error>(())
//! ```

mod error;
mod exposure_set;
mod luma_map;
mod pipeline;
mod radiance;
mod utils;

pub mod response;
pub mod sampling;
pub mod weighting;

pub use error::{Error, Result};
pub use exposure_set::{ExposureSet, CHANNELS};
pub use luma_map::{eval_luma_map, invert_luma_map, luma_map_from_response};
pub use pipeline::{recover_response_curves, solve_channels, ResponseConfig, ResponseCurves};
pub use radiance::{assemble_radiance_map, RadianceMap};
pub use response::{ChannelResponse, SolveMethod};
pub use sampling::SampleSet;
pub use weighting::{WeightTable, WeightingCurve};
