//! # ISAC-API
//!
//! HTTP service for presence sensing with adaptive topology control.
//!
//! ## Endpoints
//!
//! - `POST /sensing-requests` - Acquire frames for an area and infer presence
//! - `POST /process-csi` - Infer presence on caller-supplied CSI frames
//! - `GET /areas/{area_id}/topology` - Current topology state of an area
//! - `GET /capabilities` - Registered sensing units and their capabilities
//! - `GET /healthz` - Health check

pub mod config;
pub mod dto;
pub mod error;
pub mod export;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use crate::config::*;
pub use dto::*;
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use server::*;
pub use state::*;
