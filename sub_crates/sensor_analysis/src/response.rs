//! Recovery of a single channel's camera response curve.
//!
//! This solves for the log response `g(z)` at each of the 256 intensities
//! and the log irradiance `ln E_i` at each sampled pixel, given that every
//! observation obeys `g(Z_ij) = ln E_i + ln t_j`.  The system is solved in
//! the weighted least-squares sense, with a second-difference smoothness
//! penalty on `g` and `g(128)` pinned to zero to fix the otherwise free
//! additive constant.
//!
//! Each `ln E_i` only appears in the data equations of its own sample, so
//! it's eliminated in closed form first, leaving a system over just the 256
//! curve values regardless of the sample count.

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};
use crate::sampling::{LogExposureMatrix, SampleMatrix};
use crate::weighting::{WeightTable, LEVELS};

/// Default weight of the smoothness term relative to the data term.
pub const DEFAULT_LAMBDA: f64 = 10.0;

/// The intensity whose log response is pinned to zero.
pub const PINNED_LEVEL: usize = 128;

// Relative singular value (or Cholesky pivot) below which the system is
// considered rank deficient.
const SVD_RCOND: f64 = 1.0e-10;
const CHOLESKY_RCOND: f64 = 1.0e-7;

/// How the over-determined system is solved.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SolveMethod {
    /// Householder QR of the reduced system, then an SVD of its square
    /// `R` factor.  Reliably detects rank-deficient systems.
    Svd,

    /// Cholesky factorization of the reduced normal equations.  Faster,
    /// at the cost of squaring the condition number.
    NormalEquations,
}

impl Default for SolveMethod {
    fn default() -> Self {
        SolveMethod::Svd
    }
}

/// The recovered response of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelResponse {
    /// `ln` of the relative exposure that produces each intensity.
    pub crf: [f64; LEVELS],

    /// `ln` of the irradiance at each sampled pixel, in sample order.
    pub log_irradiance: Vec<f64>,

    /// Weighted RMS residual of the data equations.
    pub fit_error: f64,
}

impl ChannelResponse {
    /// The response curve exponentiated out of the log domain.
    pub fn linear_response(&self) -> [f64; LEVELS] {
        let mut linear = [0.0f64; LEVELS];
        for (l, g) in linear.iter_mut().zip(self.crf.iter()) {
            *l = g.exp();
        }
        linear
    }

    #[inline(always)]
    pub fn log_response(&self, z: u8) -> f64 {
        self.crf[z as usize]
    }
}

/// Recovers the response curve of one channel from its samples.
///
/// `samples` and `log_exposure` must have the same shape.  `lambda` scales
/// the smoothness penalty and must be non-negative.
pub fn solve_response(
    samples: &SampleMatrix,
    log_exposure: &LogExposureMatrix,
    weights: &WeightTable,
    lambda: f64,
    method: SolveMethod,
) -> Result<ChannelResponse> {
    let sample_count = samples.samples();
    let exposure_count = samples.exposures();
    if sample_count == 0 {
        return Err(Error::DegenerateInput("no samples to solve from".into()));
    }
    if log_exposure.samples() != sample_count || log_exposure.exposures() != exposure_count {
        return Err(Error::InvalidInput(format!(
            "{}x{} samples don't match {}x{} log exposures",
            sample_count,
            exposure_count,
            log_exposure.samples(),
            log_exposure.exposures()
        )));
    }
    if !(lambda >= 0.0 && lambda.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "smoothness weight must be a non-negative number, got {}",
            lambda
        )));
    }

    let system = build_system(samples, log_exposure, weights, lambda);
    let (a, b) = system.reduce();
    tracing::debug!(
        rows = system.row_count(),
        cols = system.col_count(),
        reduced_rows = a.nrows(),
        ?method,
        "solving response system"
    );

    let g = match method {
        SolveMethod::Svd => solve_svd(a, b)?,
        SolveMethod::NormalEquations => solve_normal_equations(&a, &b)?,
    };

    let mut crf = [0.0f64; LEVELS];
    for (c, v) in crf.iter_mut().zip(g.iter()) {
        *c = *v;
    }
    let log_irradiance = system.log_irradiance(&crf);

    if crf.iter().chain(log_irradiance.iter()).any(|v| !v.is_finite()) {
        return Err(Error::SingularSystem(
            "solution contains non-finite values".into(),
        ));
    }

    // Residual of the data equations only.
    let mut err_sum = 0.0;
    let mut weight_sum = 0.0;
    for (k, obs) in system.data.iter().enumerate() {
        let r = crf[obs.level] - log_irradiance[k / exposure_count] - obs.log_exposure;
        err_sum += obs.weight * r * r;
        weight_sum += obs.weight;
    }
    let fit_error = if weight_sum > 0.0 {
        (err_sum / weight_sum).sqrt()
    } else {
        0.0
    };

    Ok(ChannelResponse {
        crf: crf,
        log_irradiance: log_irradiance,
        fit_error: fit_error,
    })
}

/// One data equation: `w * (g(level) - ln E_i) = w * ln t_j`.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Observation {
    level: usize,
    weight: f64,
    log_exposure: f64,
}

/// The weighted least-squares system `A x ≈ b`, stored by equation.
///
/// The unknowns are the `LEVELS` log response values followed by one log
/// irradiance per sample.  In row order the equations are: one data row per
/// observation (sample-major), the pin row `g(PINNED_LEVEL) = 0`, and one
/// smoothness row `λ W[z] (g(z - 1) - 2 g(z) + g(z + 1)) = 0` for each
/// interior intensity `z` in `1..=LEVELS - 2`.  `A` is sized with
/// `samples * N + LEVELS + 1` rows; the last two stay empty.
#[derive(Debug, Clone)]
struct ResponseSystem {
    samples: usize,
    exposures: usize,
    data: Vec<Observation>,

    /// `λ W[z]` of the smoothness row centered on `z = i + 1`.
    smoothness: Vec<f64>,
}

impl ResponseSystem {
    fn row_count(&self) -> usize {
        self.samples * self.exposures + LEVELS + 1
    }

    fn col_count(&self) -> usize {
        LEVELS + self.samples
    }

    fn observations(&self, sample: usize) -> &[Observation] {
        &self.data[(sample * self.exposures)..((sample + 1) * self.exposures)]
    }

    /// Eliminates the log irradiances, giving a system over the curve only.
    ///
    /// For sample `i` with weights `u_j`, the best `ln E_i` for a given `g`
    /// is the `u²`-weighted mean of `g(Z_ij) - ln t_j`, which leaves the
    /// sample's data rows projected onto the complement of `u`.  The pin and
    /// smoothness rows don't involve `ln E` and carry over unchanged.
    fn reduce(&self) -> (DMatrix<f64>, DVector<f64>) {
        let n = self.exposures;
        let rows = self.data.len() + 1 + self.smoothness.len();
        let mut a = DMatrix::<f64>::zeros(rows, LEVELS);
        let mut b = DVector::<f64>::zeros(rows);

        let mut k = 0;
        for i in 0..self.samples {
            let obs = self.observations(i);
            let norm2: f64 = obs.iter().map(|o| o.weight * o.weight).sum();
            for j in 0..n {
                for (l, o) in obs.iter().enumerate() {
                    let mut p = -obs[j].weight * o.weight / norm2;
                    if l == j {
                        p += 1.0;
                    }
                    a[(k, o.level)] += p * o.weight;
                    b[k] += p * o.weight * o.log_exposure;
                }
                k += 1;
            }
        }

        a[(k, PINNED_LEVEL)] = 1.0;
        k += 1;

        for (i, &s) in self.smoothness.iter().enumerate() {
            let z = i + 1;
            a[(k, z - 1)] = s;
            a[(k, z)] = -2.0 * s;
            a[(k, z + 1)] = s;
            k += 1;
        }
        debug_assert_eq!(k, rows);

        (a, b)
    }

    /// The least-squares `ln E_i` of every sample for the curve `crf`.
    fn log_irradiance(&self, crf: &[f64; LEVELS]) -> Vec<f64> {
        (0..self.samples)
            .map(|i| {
                let obs = self.observations(i);
                let mut num = 0.0;
                let mut den = 0.0;
                for o in obs {
                    let w2 = o.weight * o.weight;
                    num += w2 * (crf[o.level] - o.log_exposure);
                    den += w2;
                }
                num / den
            })
            .collect()
    }
}

fn build_system(
    samples: &SampleMatrix,
    log_exposure: &LogExposureMatrix,
    weights: &WeightTable,
    lambda: f64,
) -> ResponseSystem {
    let sample_count = samples.samples();
    let exposure_count = samples.exposures();

    let mut data = Vec::with_capacity(sample_count * exposure_count);
    for i in 0..sample_count {
        for j in 0..exposure_count {
            let z = samples.get(i, j);
            data.push(Observation {
                level: z as usize,
                weight: weights.get(z),
                log_exposure: log_exposure.get(i, j),
            });
        }
    }

    let smoothness = (1..(LEVELS - 1))
        .map(|z| lambda * weights.at(z))
        .collect();

    ResponseSystem {
        samples: sample_count,
        exposures: exposure_count,
        data: data,
        smoothness: smoothness,
    }
}

fn solve_svd(a: DMatrix<f64>, mut b: DVector<f64>) -> Result<DVector<f64>> {
    // A = QR, and R has the same singular values as A.
    let qr = a.qr();
    qr.q_tr_mul(&mut b);
    let r = qr.r();
    let qtb = b.rows(0, r.nrows()).into_owned();

    let svd = r.svd(true, true);
    let max_sv = svd.singular_values.max();
    let min_sv = svd.singular_values.min();
    if !(max_sv > 0.0 && min_sv > max_sv * SVD_RCOND) {
        return Err(Error::SingularSystem(format!(
            "rank deficient (singular values span {:e} to {:e})",
            min_sv, max_sv
        )));
    }

    svd.solve(&qtb, max_sv * SVD_RCOND)
        .map_err(|e| Error::SingularSystem(e.to_string()))
}

fn solve_normal_equations(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    let ata = a.tr_mul(a);
    let atb = a.tr_mul(b);

    let chol = ata.cholesky().ok_or_else(|| {
        Error::SingularSystem("normal equations are not positive definite".into())
    })?;

    let pivots = chol.l_dirty().diagonal();
    let (min_pivot, max_pivot) = (pivots.min(), pivots.max());
    if !(max_pivot > 0.0 && min_pivot > max_pivot * CHOLESKY_RCOND) {
        return Err(Error::SingularSystem(format!(
            "rank deficient (Cholesky pivots span {:e} to {:e})",
            min_pivot, max_pivot
        )));
    }

    Ok(chol.solve(&atb))
}
