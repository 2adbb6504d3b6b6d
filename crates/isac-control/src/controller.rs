//! Per-area topology controller.
//!
//! Each area has its own async lock. A decision holds it across
//! read-decide-checkpoint and nothing else, so decisions for one area are
//! serialized while different areas proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use isac_core::{AreaId, Result, Topology, TopologyState};

use crate::store::TopologyStore;
use crate::topology::{apply_decision, TopologyDecision, TopologyPolicy};

type AreaSlot = Arc<Mutex<Option<TopologyState>>>;

/// Sole writer of every area's [`TopologyState`]
pub struct TopologyController {
    policy: TopologyPolicy,
    store: Arc<dyn TopologyStore>,
    slots: parking_lot::Mutex<HashMap<AreaId, AreaSlot>>,
}

impl TopologyController {
    pub fn new(policy: TopologyPolicy, store: Arc<dyn TopologyStore>) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            store,
            slots: parking_lot::Mutex::new(HashMap::new()),
        })
    }

    pub fn policy(&self) -> &TopologyPolicy {
        &self.policy
    }

    /// Number of areas with an in-memory slot
    pub fn tracked_areas(&self) -> usize {
        self.slots.lock().len()
    }

    fn existing_slot(&self, area: &AreaId) -> Option<AreaSlot> {
        self.slots.lock().get(area).cloned()
    }

    fn slot(&self, area: &AreaId) -> AreaSlot {
        self.slots
            .lock()
            .entry(area.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    /// Resolve an area's state: cached, stored, or initial
    ///
    /// Stored records keep their topology; thresholds follow the current policy.
    async fn resolve(&self, area: &AreaId, cached: &Option<TopologyState>) -> Result<TopologyState> {
        if let Some(state) = cached {
            return Ok(state.clone());
        }

        match self.store.load(area).await? {
            Some(mut state) => {
                if state.switch_threshold != self.policy.switch_threshold
                    || state.hysteresis_margin != self.policy.hysteresis_margin
                {
                    tracing::debug!(
                        area = %area,
                        stored_threshold = state.switch_threshold,
                        stored_margin = state.hysteresis_margin,
                        "Applying current policy to stored topology record"
                    );
                    state.switch_threshold = self.policy.switch_threshold;
                    state.hysteresis_margin = self.policy.hysteresis_margin;
                }
                Ok(state)
            }
            None => Ok(self.policy.initial_state()),
        }
    }

    /// Preload every stored area; returns the number restored
    pub async fn restore(&self) -> Result<usize> {
        let areas = self.store.areas().await?;
        for area in &areas {
            let slot = self.slot(area);
            let mut guard = slot.lock().await;
            let state = self.resolve(area, &guard).await?;
            tracing::info!(area = %area, topology = %state.current, revision = state.revision, "Restored topology state");
            *guard = Some(state);
        }
        Ok(areas.len())
    }

    /// Decide the topology of an area from a batch's mean uncertainty
    ///
    /// The new state is checkpointed before it becomes visible; if the
    /// checkpoint fails the area keeps its previous state.
    pub async fn decide(&self, area: &AreaId, mean_uncertainty: f64) -> Result<TopologyDecision> {
        let slot = self.slot(area);
        let mut guard = slot.lock().await;

        let state = self.resolve(area, &guard).await?;
        let next = apply_decision(&state, mean_uncertainty, Utc::now())?;
        self.store.save(area, &next).await?;

        let decision = TopologyDecision {
            area_id: area.clone(),
            previous: state.current,
            current: next.current,
            topology_switched: state.current != next.current,
            mean_uncertainty,
            revision: next.revision,
        };
        *guard = Some(next);
        drop(guard);

        if decision.topology_switched {
            tracing::info!(
                area = %area,
                from = %decision.previous,
                to = %decision.current,
                mean_uncertainty,
                "Topology switched"
            );
        } else {
            tracing::debug!(area = %area, topology = %decision.current, mean_uncertainty, "Topology held");
        }

        Ok(decision)
    }

    /// Snapshot of an area's state
    ///
    /// Only decisions and restores create slots; reading an unknown area
    /// resolves it from the store and leaves nothing behind.
    pub async fn state(&self, area: &AreaId) -> Result<TopologyState> {
        match self.existing_slot(area) {
            Some(slot) => {
                let guard = slot.lock().await;
                self.resolve(area, &guard).await
            }
            None => self.resolve(area, &None).await,
        }
    }

    pub async fn current(&self, area: &AreaId) -> Result<Topology> {
        Ok(self.state(area).await?.current)
    }
}
