//! CSI acquisition interfaces for sensing units.
//!
//! A sensing unit is one radio observing an area. A frame source answers
//! batch requests for an area, deciding which units participate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use isac_core::{AreaId, CsiFrame, Error, Result, Topology, UnitId};

/// Upper bound on frames per request
pub const MAX_SAMPLES_PER_REQUEST: usize = 50;

/// Capture scenario requested from a sensing unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SensingMode {
    /// Frames recorded with a person present
    Human = 1,
    /// Frames recorded in an empty area
    NoHuman = 2,
    /// Each frame drawn from either recording at random
    Variable = 3,
}

impl SensingMode {
    pub const ALL: [SensingMode; 3] = [SensingMode::Human, SensingMode::NoHuman, SensingMode::Variable];
}

impl TryFrom<u8> for SensingMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(SensingMode::Human),
            2 => Ok(SensingMode::NoHuman),
            3 => Ok(SensingMode::Variable),
            other => Err(Error::InvalidInput(format!("unsupported sensing mode {other}"))),
        }
    }
}

impl From<SensingMode> for u8 {
    fn from(mode: SensingMode) -> Self {
        mode as u8
    }
}

/// Static description of what a sensing unit offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub su_id: UnitId,
    pub area_id: AreaId,
    pub modes: Vec<SensingMode>,
    pub num_bins: usize,
}

/// Trait for a single sensing unit
#[async_trait]
pub trait SensingUnit: Send + Sync {
    fn id(&self) -> &UnitId;

    /// Area this unit observes
    fn area(&self) -> &AreaId;

    fn capability(&self) -> Capability;

    /// Capture `num_frames` CSI frames in the given mode
    async fn capture(&self, mode: SensingMode, num_frames: usize) -> Result<Vec<CsiFrame>>;
}

/// A batch request against a frame source
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRequest {
    pub area_id: AreaId,
    /// Frames requested from each participating unit
    pub num_samples: usize,
    pub mode: SensingMode,
    /// Topology currently in force for the area
    pub topology: Topology,
}

impl FrameRequest {
    pub fn new(area_id: AreaId, num_samples: usize, mode: SensingMode) -> Self {
        Self {
            area_id,
            num_samples,
            mode,
            topology: Topology::default(),
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SAMPLES_PER_REQUEST).contains(&self.num_samples) {
            return Err(Error::InvalidInput(format!(
                "numSamples must be within 1..={MAX_SAMPLES_PER_REQUEST}, got {}",
                self.num_samples
            )));
        }
        Ok(())
    }
}

/// Supplies ordered CSI frame batches for an area
///
/// Fails with [`Error::Unavailable`] when no data can be obtained.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn frames(&self, request: &FrameRequest) -> Result<Vec<CsiFrame>>;
}
