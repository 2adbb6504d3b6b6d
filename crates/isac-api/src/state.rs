//! Shared application state for the HTTP handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use isac_control::SensingOrchestrator;
use isac_core::UnitId;
use isac_csi::Capability;

/// Cloned into every handler; the inner state is shared
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    orchestrator: SensingOrchestrator,
    capabilities: BTreeMap<UnitId, Capability>,
}

impl AppState {
    pub fn new(orchestrator: SensingOrchestrator, capabilities: BTreeMap<UnitId, Capability>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                orchestrator,
                capabilities,
            }),
        }
    }

    pub fn orchestrator(&self) -> &SensingOrchestrator {
        &self.inner.orchestrator
    }

    pub fn capabilities(&self) -> &BTreeMap<UnitId, Capability> {
        &self.inner.capabilities
    }

    pub fn registered_units(&self) -> usize {
        self.inner.capabilities.len()
    }
}
