//! Sensing orchestrator: frame acquisition, inference and topology control.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use isac_core::{AreaId, CsiFrame, Error, PresenceResult, Result, Topology};
use isac_csi::acquisition::{FrameRequest, FrameSource, SensingMode};
use isac_inference::{mean_uncertainty, InferenceEngine};

use crate::controller::TopologyController;

/// Response to a sensing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensingOutcome {
    pub topology_switched: bool,
    pub current_topology: Topology,
    pub results: Vec<PresenceResult>,
}

/// Runs sensing requests end to end
///
/// Callers are trusted to have authorized the area; no identity checks
/// happen here.
pub struct SensingOrchestrator {
    source: Arc<dyn FrameSource>,
    engine: InferenceEngine,
    controller: Arc<TopologyController>,
}

impl SensingOrchestrator {
    pub fn new(
        source: Arc<dyn FrameSource>,
        engine: InferenceEngine,
        controller: Arc<TopologyController>,
    ) -> Self {
        Self {
            source,
            engine,
            controller,
        }
    }

    pub fn controller(&self) -> &TopologyController {
        &self.controller
    }

    /// Infer presence on a supplied batch and update the area's topology
    pub async fn process(&self, area_id: &AreaId, frames: &[CsiFrame]) -> Result<SensingOutcome> {
        let results = self.engine.infer(frames)?;
        let mean = mean_uncertainty(&results).ok_or(Error::EmptyBatch)?;

        let decision = self.controller.decide(area_id, mean).await?;

        tracing::info!(
            area = %area_id,
            frames = results.len(),
            mean_uncertainty = mean,
            topology = %decision.current,
            switched = decision.topology_switched,
            "Sensing batch processed"
        );

        Ok(SensingOutcome {
            topology_switched: decision.topology_switched,
            current_topology: decision.current,
            results,
        })
    }

    /// Acquire frames for an area under its current topology, then process them
    pub async fn sense(
        &self,
        area_id: &AreaId,
        num_samples: usize,
        mode: SensingMode,
    ) -> Result<SensingOutcome> {
        let topology = self.controller.current(area_id).await?;
        let request = FrameRequest::new(area_id.clone(), num_samples, mode).with_topology(topology);
        request.validate()?;

        let frames = match self.source.frames(&request).await {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(area = %area_id, error = %e, "Frame acquisition failed");
                return Err(e);
            }
        };

        self.process(area_id, &frames).await
    }
}
