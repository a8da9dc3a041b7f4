//! Confidence weights over 8-bit pixel intensities.

const Z_MIN: usize = 0;
const Z_MAX: usize = 255;
const Z_MID: usize = (Z_MIN + Z_MAX) / 2;

/// Number of distinct 8-bit intensities.
pub const LEVELS: usize = Z_MAX - Z_MIN + 1;

/// The shape of the weighting curve.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WeightingCurve {
    /// Symmetric hat: rises from 1 at `Z_MIN` to 128 at the middle, then
    /// falls back to 1 at `Z_MAX`.  Down-weights both noisy dark pixels
    /// and saturated bright ones.
    Hat,

    /// Monotonically rising ramp, `z + 1` over the whole range.  Only
    /// dark pixels are down-weighted.
    Ramp,
}

impl Default for WeightingCurve {
    fn default() -> Self {
        WeightingCurve::Hat
    }
}

impl WeightingCurve {
    /// Evaluates the curve at intensity `z`.
    ///
    /// Prefer a `WeightTable` anywhere this would be called per-pixel.
    pub fn eval(self, z: u8) -> f64 {
        let z = z as usize;
        let w = match self {
            WeightingCurve::Hat => {
                if z <= Z_MID {
                    z - Z_MIN + 1
                } else {
                    Z_MAX - z + 1
                }
            }
            WeightingCurve::Ramp => z - Z_MIN + 1,
        };
        w as f64
    }
}

/// A precomputed `WeightingCurve`, indexed by intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    curve: WeightingCurve,
    table: [f64; LEVELS],
}

impl WeightTable {
    pub fn new(curve: WeightingCurve) -> WeightTable {
        let mut table = [0.0f64; LEVELS];
        for z in 0..LEVELS {
            table[z] = curve.eval(z as u8);
        }
        WeightTable {
            curve: curve,
            table: table,
        }
    }

    pub fn curve(&self) -> WeightingCurve {
        self.curve
    }

    #[inline(always)]
    pub fn get(&self, z: u8) -> f64 {
        self.table[z as usize]
    }

    /// The weight by index, for intensities held as `usize`.
    ///
    /// Panics if `z` is out of range.
    #[inline(always)]
    pub fn at(&self, z: usize) -> f64 {
        self.table[z]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.table[..]
    }
}
