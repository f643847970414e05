//! Radial basis function network: a weighted sum of Gaussian bumps mapping
//! the three radar distances to a steering command. The network computes in
//! normalized output units; `normalize_steering`/`denormalize_steering` are
//! the exact affine inverses that connect those units to wheel degrees.

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use swarmdrive_shared::{SensorReadings, SPREAD_FLOOR, WHEEL_ANGLE_LIMIT};

use crate::errors::ConfigError;

/// Map a steering angle in degrees onto the network's [0, 1] output domain.
pub fn normalize_steering(deg: f64) -> f64 {
    (deg + WHEEL_ANGLE_LIMIT) / (2.0 * WHEEL_ANGLE_LIMIT)
}

/// Inverse of [`normalize_steering`]. Unclamped on purpose so the pair
/// stays exactly invertible.
pub fn denormalize_steering(value: f64) -> f64 {
    value * 2.0 * WHEEL_ANGLE_LIMIT - WHEEL_ANGLE_LIMIT
}

/// Network parameters: `weights[0]` is the bias, `weights[i + 1]` scales
/// the Gaussian at `centers[i]` with spread `spreads[i]`.
///
/// Spreads are strictly positive. The validating constructors enforce this;
/// the optimizer keeps its flat encodings above `SPREAD_FLOOR` so decoded
/// parameters never violate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbfnParameters {
    pub centers: Vec<DVec3>,
    pub spreads: Vec<f64>,
    pub weights: Vec<f64>,
}

impl RbfnParameters {
    pub fn new(
        centers: Vec<DVec3>,
        spreads: Vec<f64>,
        weights: Vec<f64>,
    ) -> Result<Self, ConfigError> {
        let params = Self {
            centers,
            spreads,
            weights,
        };
        params.validate()?;
        Ok(params)
    }

    /// Draw parameters for `nneuron` Gaussians: centers uniform per
    /// dimension inside `input_range`, spreads uniform in (0, sd_max],
    /// weights uniform in [-1, 1] normalized units.
    pub fn random(
        nneuron: usize,
        input_range: (f64, f64),
        sd_max: f64,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        if nneuron == 0 {
            return Err(ConfigError::ZeroNeurons);
        }
        if !(sd_max > SPREAD_FLOOR) || !sd_max.is_finite() {
            return Err(ConfigError::InvalidSdMax(sd_max));
        }
        let (lo, hi) = input_range;
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(ConfigError::InvalidInputRange(lo, hi));
        }

        let centers = (0..nneuron)
            .map(|_| {
                DVec3::new(
                    rng.gen_range(lo..hi),
                    rng.gen_range(lo..hi),
                    rng.gen_range(lo..hi),
                )
            })
            .collect();
        let spreads = (0..nneuron)
            .map(|_| sd_max * (1.0 - rng.gen::<f64>()))
            .collect();
        let weights = (0..nneuron + 1).map(|_| rng.gen_range(-1.0..1.0)).collect();

        Self::new(centers, spreads, weights)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.centers.len();
        if n == 0 {
            return Err(ConfigError::ZeroNeurons);
        }
        if self.spreads.len() != n {
            return Err(ConfigError::SpreadCount {
                expected: n,
                got: self.spreads.len(),
            });
        }
        if self.weights.len() != n + 1 {
            return Err(ConfigError::WeightCount {
                expected: n + 1,
                got: self.weights.len(),
            });
        }
        for &spread in &self.spreads {
            if !(spread > 0.0) || !spread.is_finite() {
                return Err(ConfigError::InvalidSpread(spread));
            }
        }
        Ok(())
    }

    pub fn nneuron(&self) -> usize {
        self.centers.len()
    }

    /// Length of the flat encoding for `nneuron` Gaussians.
    pub fn encoded_len(nneuron: usize) -> usize {
        5 * nneuron + 1
    }

    /// Flatten into the optimizer's vector layout:
    /// `[weights (n+1) | centers (3n, x y z per neuron) | spreads (n)]`.
    pub fn encode(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(Self::encoded_len(self.nneuron()));
        flat.extend_from_slice(&self.weights);
        for center in &self.centers {
            flat.extend_from_slice(&center.to_array());
        }
        flat.extend_from_slice(&self.spreads);
        flat
    }

    /// Inverse of [`encode`](Self::encode). The caller guarantees the
    /// vector has the layout above with positive spread components.
    pub(crate) fn decode(flat: &[f64], nneuron: usize) -> Self {
        debug_assert_eq!(flat.len(), Self::encoded_len(nneuron));
        let weights = flat[..nneuron + 1].to_vec();
        let centers = flat[nneuron + 1..4 * nneuron + 1]
            .chunks_exact(3)
            .map(|c| DVec3::new(c[0], c[1], c[2]))
            .collect();
        let spreads = flat[4 * nneuron + 1..].to_vec();
        Self {
            centers,
            spreads,
            weights,
        }
    }

    /// Forward evaluation in normalized output units.
    pub fn forward(&self, x: DVec3) -> f64 {
        let mut out = self.weights[0];
        for i in 0..self.nneuron() {
            let dist_sq = (x - self.centers[i]).length_squared();
            let spread = self.spreads[i];
            out += self.weights[i + 1] * (-dist_sq / (2.0 * spread * spread)).exp();
        }
        out
    }
}

/// A validated network ready to steer the vehicle. Persist the parameters,
/// not the wrapper: reconstructing through [`Rbfn::new`] re-validates them.
#[derive(Debug, Clone)]
pub struct Rbfn {
    params: RbfnParameters,
}

impl Rbfn {
    pub fn new(params: RbfnParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &RbfnParameters {
        &self.params
    }

    /// Normalized output for a raw input vector.
    pub fn forward(&self, x: DVec3) -> f64 {
        self.params.forward(x)
    }

    /// Steering command in degrees for the current radar readings.
    pub fn steer(&self, readings: &SensorReadings) -> f64 {
        denormalize_steering(self.forward(DVec3::from(readings.as_array())))
    }
}
