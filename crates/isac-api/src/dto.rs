//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

use isac_core::{AreaId, CsiFrame};
use isac_csi::SensingMode;

/// Body of `POST /sensing-requests`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensingRequest {
    pub area_id: AreaId,
    pub num_samples: usize,
    pub su_mode: SensingMode,
}

/// Body of `POST /process-csi`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCsiRequest {
    pub area_id: AreaId,
    pub frames: Vec<CsiFrame>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub registered_units: usize,
}
