//! Sensing unit registry and topology-aware frame aggregation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;

use isac_core::{AreaId, CsiFrame, Error, Result, Topology, UnitId};

use crate::acquisition::{Capability, FrameRequest, FrameSource, SensingUnit};

/// Registry of sensing units, grouped by the area they observe
///
/// Acts as the frame source for the sensing pipeline. A monostatic area is
/// served by its primary (first registered) unit; a multistatic area by all
/// of its units, concatenated in registration order.
pub struct UnitRegistry {
    units: Vec<Arc<dyn SensingUnit>>,
    capture_timeout: Duration,
}

impl UnitRegistry {
    pub fn new(capture_timeout: Duration) -> Self {
        Self {
            units: Vec::new(),
            capture_timeout,
        }
    }

    pub fn register<U: SensingUnit + 'static>(&mut self, unit: U) -> &mut Self {
        self.units.push(Arc::new(unit));
        self
    }

    pub fn with_unit<U: SensingUnit + 'static>(mut self, unit: U) -> Self {
        self.register(unit);
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.units.iter().map(|u| u.id().clone()).collect()
    }

    /// Units observing an area, in registration order
    pub fn units_for(&self, area: &AreaId) -> Vec<Arc<dyn SensingUnit>> {
        self.units
            .iter()
            .filter(|u| u.area() == area)
            .cloned()
            .collect()
    }

    pub fn capabilities(&self) -> BTreeMap<UnitId, Capability> {
        self.units
            .iter()
            .map(|u| (u.id().clone(), u.capability()))
            .collect()
    }

    fn participants(&self, area: &AreaId, topology: Topology) -> Vec<Arc<dyn SensingUnit>> {
        let mut units = self.units_for(area);
        if topology == Topology::Monostatic {
            units.truncate(1);
        }
        units
    }

    async fn capture_from(
        &self,
        unit: Arc<dyn SensingUnit>,
        request: &FrameRequest,
    ) -> Result<Vec<CsiFrame>> {
        match tokio::time::timeout(
            self.capture_timeout,
            unit.capture(request.mode, request.num_samples),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Unavailable(format!(
                "sensing unit {} timed out after {}ms",
                unit.id(),
                self.capture_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl FrameSource for UnitRegistry {
    async fn frames(&self, request: &FrameRequest) -> Result<Vec<CsiFrame>> {
        request.validate()?;

        let units = self.participants(&request.area_id, request.topology);
        if units.is_empty() {
            tracing::warn!(area = %request.area_id, "No sensing units registered for area");
            return Err(Error::Unavailable(format!(
                "no sensing units for area {}",
                request.area_id
            )));
        }

        tracing::debug!(
            area = %request.area_id,
            topology = %request.topology,
            units = units.len(),
            num_samples = request.num_samples,
            "Acquiring CSI frames"
        );

        let batches = try_join_all(units.into_iter().map(|u| self.capture_from(u, request))).await?;
        Ok(batches.into_iter().flatten().collect())
    }
}
