//! Topology state machine with hysteresis.
//!
//! ```text
//!                mean > threshold
//!   Monostatic ──────────────────────▶ Multistatic
//!        ▲                                  │
//!        └──────────────────────────────────┘
//!          mean < threshold - margin
//! ```
//!
//! Between the two bounds the current topology is held, which keeps an area
//! hovering near the threshold from switching on every request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use isac_core::{AreaId, Error, Result, Topology, TopologyState};

/// Switching thresholds shared by all areas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyPolicy {
    /// Mean uncertainty (percent) above which a monostatic area goes multistatic
    pub switch_threshold: f64,
    /// How far below the threshold a multistatic area must drop to go back
    pub hysteresis_margin: f64,
}

impl Default for TopologyPolicy {
    fn default() -> Self {
        Self {
            switch_threshold: 40.0,
            hysteresis_margin: 10.0,
        }
    }
}

impl TopologyPolicy {
    pub fn new(switch_threshold: f64, hysteresis_margin: f64) -> Result<Self> {
        let policy = Self {
            switch_threshold,
            hysteresis_margin,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.switch_threshold) {
            return Err(Error::Config(format!(
                "switch threshold must be within [0, 100], got {}",
                self.switch_threshold
            )));
        }
        if !(0.0..=self.switch_threshold).contains(&self.hysteresis_margin) {
            return Err(Error::Config(format!(
                "hysteresis margin must be within [0, {}], got {}",
                self.switch_threshold, self.hysteresis_margin
            )));
        }
        Ok(())
    }

    pub fn initial_state(&self) -> TopologyState {
        TopologyState::new(self.switch_threshold, self.hysteresis_margin)
    }
}

/// Next topology given the current one and a batch's mean uncertainty
pub fn next_topology(
    current: Topology,
    mean_uncertainty: f64,
    switch_threshold: f64,
    hysteresis_margin: f64,
) -> Topology {
    match current {
        Topology::Monostatic if mean_uncertainty > switch_threshold => Topology::Multistatic,
        Topology::Multistatic if mean_uncertainty < switch_threshold - hysteresis_margin => {
            Topology::Monostatic
        }
        held => held,
    }
}

/// Outcome of one topology decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyDecision {
    pub area_id: AreaId,
    pub previous: Topology,
    pub current: Topology,
    pub topology_switched: bool,
    pub mean_uncertainty: f64,
    /// Revision of the area's state after this decision
    pub revision: u64,
}

/// Apply one decision to a state, producing the successor state
pub fn apply_decision(
    state: &TopologyState,
    mean_uncertainty: f64,
    now: DateTime<Utc>,
) -> Result<TopologyState> {
    if !mean_uncertainty.is_finite() || !(0.0..=100.0).contains(&mean_uncertainty) {
        return Err(Error::InvalidUncertainty(mean_uncertainty));
    }

    let current = next_topology(
        state.current,
        mean_uncertainty,
        state.switch_threshold,
        state.hysteresis_margin,
    );

    Ok(TopologyState {
        current,
        last_decision_uncertainty: Some(mean_uncertainty),
        revision: state.revision + 1,
        updated_at: Some(now),
        ..state.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(state: &TopologyState, mean: f64) -> TopologyState {
        apply_decision(state, mean, Utc::now()).unwrap()
    }

    #[test]
    fn test_hysteresis_sequence() {
        let s0 = TopologyPolicy::new(50.0, 10.0).unwrap().initial_state();

        let s1 = decide(&s0, 60.0);
        assert_eq!(s1.current, Topology::Multistatic);

        let s2 = decide(&s1, 45.0);
        assert_eq!(s2.current, Topology::Multistatic);

        let s3 = decide(&s2, 35.0);
        assert_eq!(s3.current, Topology::Monostatic);
        assert_eq!(s3.revision, 3);
        assert_eq!(s3.last_decision_uncertainty, Some(35.0));
    }

    #[test]
    fn test_bounds_are_strict() {
        assert_eq!(
            next_topology(Topology::Monostatic, 50.0, 50.0, 10.0),
            Topology::Monostatic
        );
        assert_eq!(
            next_topology(Topology::Multistatic, 40.0, 50.0, 10.0),
            Topology::Multistatic
        );
        assert_eq!(
            next_topology(Topology::Multistatic, 39.99, 50.0, 10.0),
            Topology::Monostatic
        );
    }

    #[test]
    fn test_monostatic_held_below_threshold() {
        for mean in [0.0, 20.0, 45.0, 50.0] {
            assert_eq!(
                next_topology(Topology::Monostatic, mean, 50.0, 10.0),
                Topology::Monostatic
            );
        }
    }

    #[test]
    fn test_zero_margin_behaves_as_single_threshold() {
        assert_eq!(
            next_topology(Topology::Multistatic, 39.0, 40.0, 0.0),
            Topology::Monostatic
        );
        assert_eq!(
            next_topology(Topology::Multistatic, 40.0, 40.0, 0.0),
            Topology::Multistatic
        );
    }

    #[test]
    fn test_invalid_mean_rejected() {
        let s0 = TopologyPolicy::default().initial_state();
        for mean in [-1.0, 100.5, f64::NAN] {
            assert!(matches!(
                apply_decision(&s0, mean, Utc::now()),
                Err(Error::InvalidUncertainty(_))
            ));
        }
    }

    #[test]
    fn test_policy_validation() {
        assert!(TopologyPolicy::new(50.0, 10.0).is_ok());
        assert!(TopologyPolicy::new(120.0, 10.0).is_err());
        assert!(TopologyPolicy::new(50.0, -1.0).is_err());
        assert!(TopologyPolicy::new(20.0, 30.0).is_err());
        assert!(TopologyPolicy::default().validate().is_ok());
    }
}
