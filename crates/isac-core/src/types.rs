//! Fundamental types for the ISAC presence-sensing system.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Logical sensing area identifier (e.g. a room)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(pub String);

impl AreaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AreaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Sensing unit (radio) identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque, sortable frame timestamp.
///
/// Sensing units emit whatever identifier their capture clock produces; the
/// core only compares and echoes it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameTimestamp(pub String);

impl FrameTimestamp {
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One least-squares channel estimate for a single subcarrier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CsiSample {
    /// Subcarrier index
    pub bin: i32,
    /// Real part of the LS estimate
    pub ls_re: f64,
    /// Imaginary part of the LS estimate
    pub ls_im: f64,
}

impl CsiSample {
    pub fn new(bin: i32, ls_re: f64, ls_im: f64) -> Self {
        Self { bin, ls_re, ls_im }
    }

    pub fn as_complex(&self) -> Complex<f64> {
        Complex::new(self.ls_re, self.ls_im)
    }

    pub fn is_finite(&self) -> bool {
        self.ls_re.is_finite() && self.ls_im.is_finite()
    }
}

/// One CSI snapshot captured by a single sensing unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsiFrame {
    pub timestamp: FrameTimestamp,

    /// Sensing unit that captured this frame
    #[serde(rename = "suId", alias = "sourceId")]
    pub source_id: UnitId,

    /// One sample per subcarrier, bins unique within the frame
    pub samples: Vec<CsiSample>,
}

impl CsiFrame {
    pub fn new(timestamp: FrameTimestamp, source_id: UnitId, samples: Vec<CsiSample>) -> Self {
        Self {
            timestamp,
            source_id,
            samples,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.samples.len()
    }

    /// Sorted subcarrier indices present in this frame
    pub fn bins(&self) -> Vec<i32> {
        let mut bins: Vec<i32> = self.samples.iter().map(|s| s.bin).collect();
        bins.sort_unstable();
        bins
    }
}

/// Per-frame presence decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResult {
    pub timestamp: FrameTimestamp,
    pub human_presence: bool,
    /// Decision ambiguity in [0, 100]
    pub uncertainty_percent: f64,
}

/// Sensing topology of an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// A single radio unit observes the area
    #[default]
    Monostatic,
    /// Several spatially distinct radio units observe the area
    Multistatic,
}

impl Topology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Monostatic => "monostatic",
            Topology::Multistatic => "multistatic",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monostatic" => Ok(Topology::Monostatic),
            "multistatic" => Ok(Topology::Multistatic),
            other => Err(Error::InvalidInput(format!("unknown topology '{other}'"))),
        }
    }
}

/// Topology control record of one sensing area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyState {
    pub current: Topology,
    pub switch_threshold: f64,
    pub hysteresis_margin: f64,
    /// Mean uncertainty of the last decided batch, if any
    pub last_decision_uncertainty: Option<f64>,
    /// Number of decisions recorded for this area
    pub revision: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TopologyState {
    pub fn new(switch_threshold: f64, hysteresis_margin: f64) -> Self {
        Self {
            current: Topology::Monostatic,
            switch_threshold,
            hysteresis_margin,
            last_decision_uncertainty: None,
            revision: 0,
            updated_at: None,
        }
    }

    /// Uncertainty below which a multistatic area falls back to monostatic
    pub fn release_threshold(&self) -> f64 {
        self.switch_threshold - self.hysteresis_margin
    }
}
