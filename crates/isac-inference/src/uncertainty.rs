//! Presence decision and uncertainty from a classifier probability.

use isac_core::{Error, Result};

/// Probability at or above which a human is reported present
pub const PRESENCE_THRESHOLD: f64 = 0.5;

/// Thresholded decision plus its ambiguity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenceAssessment {
    pub probability: f64,
    pub human_presence: bool,
    pub uncertainty_percent: f64,
}

fn check_probability(probability: f64) -> Result<()> {
    if (0.0..=1.0).contains(&probability) {
        Ok(())
    } else {
        tracing::error!(probability, "Classifier produced probability outside [0, 1]");
        Err(Error::InvalidProbability(probability))
    }
}

/// Uncertainty in percent: 100 at p = 0.5, 0 at p = 0 or p = 1
///
/// Equal to `200 * min(p, 1 - p)`, computed from the distance to the decision
/// boundary so that exact inputs give exact outputs.
pub fn uncertainty_percent(probability: f64) -> Result<f64> {
    check_probability(probability)?;
    let distance = (probability - PRESENCE_THRESHOLD).abs();
    Ok((100.0 - 200.0 * distance).clamp(0.0, 100.0))
}

pub fn assess(probability: f64) -> Result<PresenceAssessment> {
    let uncertainty_percent = uncertainty_percent(probability)?;
    Ok(PresenceAssessment {
        probability,
        human_presence: probability >= PRESENCE_THRESHOLD,
        uncertainty_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes() {
        assert_eq!(uncertainty_percent(0.5).unwrap(), 100.0);
        assert_eq!(uncertainty_percent(0.0).unwrap(), 0.0);
        assert_eq!(uncertainty_percent(1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_symmetry() {
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let a = uncertainty_percent(p).unwrap();
            let b = uncertainty_percent(1.0 - p).unwrap();
            assert!((a - b).abs() < 1e-9, "asymmetric at p={p}: {a} vs {b}");
            assert!((0.0..=100.0).contains(&a));
        }
    }

    #[test]
    fn test_matches_min_formula() {
        for p in [0.05, 0.25, 0.4, 0.6, 0.77, 0.99] {
            let expected = 200.0 * f64::min(p, 1.0 - p);
            assert!((uncertainty_percent(p).unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_point_nine_is_twenty() {
        let a = assess(0.9).unwrap();
        assert!(a.human_presence);
        assert_eq!(a.uncertainty_percent, 20.0);
    }

    #[test]
    fn test_decision_threshold_inclusive() {
        assert!(assess(0.5).unwrap().human_presence);
        assert!(!assess(0.4999).unwrap().human_presence);
    }

    #[test]
    fn test_out_of_range_rejected() {
        for p in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                uncertainty_percent(p),
                Err(Error::InvalidProbability(_))
            ));
        }
    }
}
