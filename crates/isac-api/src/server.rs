//! Server assembly from configuration.

use std::sync::Arc;

use isac_control::{
    JsonTopologyStore, MemoryTopologyStore, SensingOrchestrator, TopologyController, TopologyStore,
};
use isac_core::{Error, Result};
use isac_csi::{DatasetSensingUnit, UnitRegistry};
use isac_inference::{load_classifier, InferenceEngine};

use crate::config::{ApiConfig, StoreKind};
use crate::routes::router;
use crate::state::AppState;

/// Wire model, sensing units and topology store into the shared state
pub async fn build_state(config: &ApiConfig) -> Result<AppState> {
    let classifier = load_classifier(&config.model.path)?;

    let mut registry = UnitRegistry::new(config.acquisition.timeout());
    for unit in &config.units {
        registry.register(DatasetSensingUnit::from_config(unit)?);
    }
    if registry.is_empty() {
        tracing::warn!("No sensing units configured; only /process-csi can serve requests");
    }
    let capabilities = registry.capabilities();

    let store: Arc<dyn TopologyStore> = match config.store.kind {
        StoreKind::Memory => Arc::new(MemoryTopologyStore::new()),
        StoreKind::Json => Arc::new(JsonTopologyStore::open(&config.store.dir).await?),
    };

    let controller = TopologyController::new(config.topology, store)?;
    let restored = controller.restore().await?;

    tracing::info!(
        units = registry.len(),
        restored_areas = restored,
        store = ?config.store.kind,
        switch_threshold = config.topology.switch_threshold,
        hysteresis_margin = config.topology.hysteresis_margin,
        "Sensing service initialised"
    );

    let orchestrator = SensingOrchestrator::new(
        Arc::new(registry),
        InferenceEngine::new(classifier),
        Arc::new(controller),
    );

    Ok(AppState::new(orchestrator, capabilities))
}

/// Serve the HTTP API until Ctrl+C
pub async fn serve(config: ApiConfig) -> Result<()> {
    let state = build_state(&config).await?;
    let app = router(state, &config.http);

    let listener = tokio::net::TcpListener::bind(config.http.bind_addr)
        .await
        .map_err(|e| Error::Config(format!("cannot bind {}: {e}", config.http.bind_addr)))?;
    tracing::info!("HTTP server listening on {}", config.http.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(serve_failure)?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Serve-loop failures are reported as configuration errors
fn serve_failure(err: std::io::Error) -> Error {
    Error::Config(format!("server error: {err}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelConfig, StoreConfig};
    use isac_core::{AreaId, Topology};
    use isac_csi::{DatasetUnitConfig, SensingMode};

    const MODEL: &str = r#"{ "kind": "logistic",
        "weights": [0.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0], "bias": -2.0 }"#;

    const RECORDING: &str = "timestamp,bin,ls_re,ls_im\n\
        t1,0,0.9,0.1\n\
        t1,1,0.8,0.2\n";

    fn config(dir: &std::path::Path) -> ApiConfig {
        std::fs::write(dir.join("model.json"), MODEL).unwrap();
        std::fs::write(dir.join("human.csv"), RECORDING).unwrap();
        std::fs::write(dir.join("no_human.csv"), RECORDING).unwrap();

        ApiConfig {
            model: ModelConfig {
                path: dir.join("model.json"),
            },
            store: StoreConfig {
                kind: StoreKind::Json,
                dir: dir.join("topology"),
            },
            units: vec![DatasetUnitConfig {
                id: "SU-1".into(),
                area: "room-101".into(),
                human_csv: dir.join("human.csv"),
                no_human_csv: dir.join("no_human.csv"),
                seed: Some(5),
            }],
            ..ApiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_build_state_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let state = build_state(&config(dir.path())).await.unwrap();

        assert_eq!(state.registered_units(), 1);
        let outcome = state
            .orchestrator()
            .sense(&AreaId::new("room-101"), 3, SensingMode::Human)
            .await
            .unwrap();
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.current_topology, Topology::Monostatic);
        assert!(dir.path().join("topology/room-101.json").exists());
    }

    #[test]
    fn test_serve_failure_is_config_error() {
        let err = serve_failure(std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"));
        match err {
            Error::Config(msg) => assert!(msg.contains("address in use")),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.model.path = dir.path().join("absent.json");
        assert!(matches!(build_state(&config).await, Err(Error::Model(_))));
    }
}
