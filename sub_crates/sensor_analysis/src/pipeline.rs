use crate::error::Result;
use crate::exposure_set::{ExposureSet, CHANNELS};
use crate::luma_map::luma_map_from_response;
use crate::response::{solve_response, ChannelResponse, SolveMethod, DEFAULT_LAMBDA};
use crate::sampling::SampleSet;
use crate::weighting::{WeightTable, WeightingCurve};

/// Tunables for response curve recovery.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResponseConfig {
    /// Weight of the smoothness penalty.
    pub lambda: f64,
    pub weighting: WeightingCurve,
    pub method: SolveMethod,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        ResponseConfig {
            lambda: DEFAULT_LAMBDA,
            weighting: WeightingCurve::default(),
            method: SolveMethod::default(),
        }
    }
}

/// The recovered response of every channel of an exposure set.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurves {
    /// One response per channel, in the channel order of the input buffers.
    pub channels: [ChannelResponse; CHANNELS],

    /// The pixel offset of each entry in the channels' `log_irradiance`.
    pub sample_indices: Vec<usize>,

    /// The weights the curves were solved with.
    pub weights: WeightTable,
}

impl ResponseCurves {
    /// Per-channel maps from normalized code value to normalized linear
    /// exposure, both in [0.0, 1.0].
    ///
    /// `resolution` is the number of entries of each map.
    pub fn linearizing_luma_maps(&self, resolution: usize) -> [Vec<f32>; CHANNELS] {
        [
            luma_map_from_response(&self.channels[0], resolution),
            luma_map_from_response(&self.channels[1], resolution),
            luma_map_from_response(&self.channels[2], resolution),
        ]
    }

    /// Average of the channels' fit errors.
    pub fn fit_error(&self) -> f64 {
        self.channels.iter().map(|c| c.fit_error).sum::<f64>() / CHANNELS as f64
    }
}

/// Recovers the response curve of each channel of `exposures`.
///
/// The sample set and weight table are built once and shared, and the
/// channels are solved concurrently.
pub fn recover_response_curves(
    exposures: &ExposureSet,
    config: &ResponseConfig,
) -> Result<ResponseCurves> {
    let _span = tracing::info_span!("recover_response_curves").entered();
    tracing::info!(
        "Recovering response curves from {} exposures of {}x{}",
        exposures.len(),
        exposures.width(),
        exposures.height()
    );

    let weights = WeightTable::new(config.weighting);
    let samples = SampleSet::gather(exposures)?;
    tracing::info!("Sampled {} pixels", samples.len());

    solve_channels(&samples, weights, config)
}

/// Solves each channel of an already gathered sample set.
pub fn solve_channels(
    samples: &SampleSet,
    weights: WeightTable,
    config: &ResponseConfig,
) -> Result<ResponseCurves> {
    let solve = |chan: usize| {
        solve_response(
            &samples.channels[chan],
            &samples.log_exposure,
            &weights,
            config.lambda,
            config.method,
        )
    };

    let (r0, (r1, r2)) = rayon::join(|| solve(0), || rayon::join(|| solve(1), || solve(2)));
    let channels = [r0?, r1?, r2?];

    for (chan, response) in channels.iter().enumerate() {
        tracing::info!("Channel {}: fit error {:.5}", chan, response.fit_error);
    }

    Ok(ResponseCurves {
        channels: channels,
        sample_indices: samples.indices.clone(),
        weights: weights,
    })
}
