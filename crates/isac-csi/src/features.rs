//! Statistical feature extraction from CSI frames.
//!
//! Every frame is reduced to the same fixed-length vector regardless of how
//! many subcarriers it carries, so one trained model serves any bandwidth.

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use isac_core::{CsiFrame, Error, Result};

use crate::frame::validate_frame;

/// Number of features produced per frame
pub const FEATURE_COUNT: usize = 8;

/// Feature names in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "ls_re_mean",
    "ls_re_std",
    "ls_im_mean",
    "ls_im_std",
    "mag_mean",
    "mag_std",
    "phase_circular_variance",
    "spectral_spread",
];

/// Fixed-length feature vector for one CSI frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look a feature up by name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }
}

/// Stateless CSI feature extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Compute the feature vector of a frame
    pub fn extract(&self, frame: &CsiFrame) -> Result<FeatureVector> {
        validate_frame(frame)?;

        let estimates: Vec<Complex<f64>> = frame.samples.iter().map(|s| s.as_complex()).collect();

        let (re_mean, re_std) = mean_std(estimates.iter().map(|c| c.re));
        let (im_mean, im_std) = mean_std(estimates.iter().map(|c| c.im));

        let magnitudes: Vec<f64> = estimates.iter().map(|c| c.norm()).collect();
        let (mag_mean, mag_std) = mean_std(magnitudes.iter().copied());

        let phase_variance = circular_variance(&estimates);
        let spread = spectral_spread(frame, &magnitudes);

        let features = FeatureVector([
            re_mean,
            re_std,
            im_mean,
            im_std,
            mag_mean,
            mag_std,
            phase_variance,
            spread,
        ]);

        if let Some(i) = features.0.iter().position(|v| !v.is_finite()) {
            return Err(Error::invalid_frame(
                frame.timestamp.as_str(),
                format!("feature {} overflows", FEATURE_NAMES[i]),
            ));
        }

        Ok(features)
    }
}

/// Mean and sample standard deviation (n - 1 denominator)
///
/// A single value has zero spread.
fn mean_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count();
    if n == 0 {
        return (0.0, 0.0);
    }

    let mean = values.clone().sum::<f64>() / n as f64;
    if n == 1 {
        return (mean, 0.0);
    }

    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, variance.sqrt())
}

/// Circular variance of the per-bin phases, in [0, 1]
///
/// Zero-magnitude estimates carry no phase and are skipped.
fn circular_variance(estimates: &[Complex<f64>]) -> f64 {
    let unit: Vec<Complex<f64>> = estimates
        .iter()
        .filter(|c| c.norm() > 0.0)
        .map(|c| *c / c.norm())
        .collect();

    if unit.is_empty() {
        return 0.0;
    }

    let resultant = unit.iter().sum::<Complex<f64>>() / unit.len() as f64;
    (1.0 - resultant.norm()).clamp(0.0, 1.0)
}

/// Power-weighted standard deviation of subcarrier index around the spectral centroid
///
/// Powers are taken relative to the strongest bin so large estimates cannot overflow.
fn spectral_spread(frame: &CsiFrame, magnitudes: &[f64]) -> f64 {
    let peak = magnitudes.iter().copied().fold(0.0, f64::max);
    if peak <= 0.0 {
        return 0.0;
    }

    let powers: Vec<f64> = magnitudes.iter().map(|m| (m / peak).powi(2)).collect();
    let total: f64 = powers.iter().sum();

    let centroid = frame
        .samples
        .iter()
        .zip(&powers)
        .map(|(s, p)| s.bin as f64 * p)
        .sum::<f64>()
        / total;

    let variance = frame
        .samples
        .iter()
        .zip(&powers)
        .map(|(s, p)| (s.bin as f64 - centroid).powi(2) * p)
        .sum::<f64>()
        / total;

    variance.sqrt()
}
