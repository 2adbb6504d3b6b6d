//! HTTP handlers.
//!
//! Handlers only translate between JSON and the orchestrator; every sensing
//! rule lives below this layer.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::Instrument;
use uuid::Uuid;

use isac_control::SensingOutcome;
use isac_core::{AreaId, TopologyState, UnitId};
use isac_csi::Capability;

use crate::dto::{HealthResponse, ProcessCsiRequest, SensingRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /sensing-requests`: acquire frames for an area and infer presence
pub async fn create_sensing_request(
    State(state): State<AppState>,
    Json(request): Json<SensingRequest>,
) -> ApiResult<Json<SensingOutcome>> {
    let span = tracing::info_span!(
        "sensing_request",
        request_id = %Uuid::new_v4(),
        area = %request.area_id,
        mode = ?request.su_mode,
    );

    let outcome = state
        .orchestrator()
        .sense(&request.area_id, request.num_samples, request.su_mode)
        .instrument(span)
        .await?;

    Ok(Json(outcome))
}

/// `POST /process-csi`: infer presence on caller-supplied frames
pub async fn process_csi(
    State(state): State<AppState>,
    Json(request): Json<ProcessCsiRequest>,
) -> ApiResult<Json<SensingOutcome>> {
    let span = tracing::info_span!(
        "process_csi",
        request_id = %Uuid::new_v4(),
        area = %request.area_id,
        frames = request.frames.len(),
    );

    let outcome = state
        .orchestrator()
        .process(&request.area_id, &request.frames)
        .instrument(span)
        .await?;

    Ok(Json(outcome))
}

/// `GET /areas/:area_id/topology`
///
/// Areas that never saw a decision report the initial monostatic state.
pub async fn get_topology(
    State(state): State<AppState>,
    Path(area_id): Path<String>,
) -> ApiResult<Json<TopologyState>> {
    let topology = state.orchestrator().controller().state(&AreaId::new(area_id)).await?;
    Ok(Json(topology))
}

/// `GET /capabilities`
pub async fn list_capabilities(State(state): State<AppState>) -> Json<BTreeMap<UnitId, Capability>> {
    Json(state.capabilities().clone())
}

/// `GET /healthz`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        registered_units: state.registered_units(),
    })
}
