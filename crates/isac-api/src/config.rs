//! API server configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use isac_control::TopologyPolicy;
use isac_core::{Error, Result};
use isac_csi::DatasetUnitConfig;

/// Environment variable prefix, e.g. `ISAC__HTTP__BIND_ADDR`
pub const ENV_PREFIX: &str = "ISAC";

/// Complete server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// HTTP server configuration
    pub http: HttpConfig,

    /// Topology switching policy
    pub topology: TopologyPolicy,

    /// Presence model artifact
    pub model: ModelConfig,

    /// Topology state persistence
    pub store: StoreConfig,

    /// Frame acquisition
    pub acquisition: AcquisitionConfig,

    /// Dataset-backed sensing units
    pub units: Vec<DatasetUnitConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// HTTP bind address
    pub bind_addr: SocketAddr,

    /// Request timeout (seconds)
    pub timeout_secs: u64,

    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            timeout_secs: 30,
            max_body_size: 4 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the JSON model artifact
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/presence.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,

    /// Directory of per-area records (json store only)
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            dir: PathBuf::from("state/topology"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Per-unit capture timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self { timeout_ms: 2_000 }
    }
}

impl AcquisitionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ApiConfig {
    /// Load configuration from file
    pub fn from_file(path: &str) -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from an optional file plus the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let loaded = match path {
            Some(path) => Self::from_file(&path.to_string_lossy()),
            None => Self::from_env(),
        };
        let config = loaded.map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.topology.validate()?;

        if self.http.timeout_secs == 0 {
            return Err(Error::Config("http.timeout_secs must be positive".into()));
        }
        if self.http.max_body_size == 0 {
            return Err(Error::Config("http.max_body_size must be positive".into()));
        }
        if self.acquisition.timeout_ms == 0 {
            return Err(Error::Config("acquisition.timeout_ms must be positive".into()));
        }

        let mut seen = HashSet::new();
        for unit in &self.units {
            if unit.id.is_empty() || unit.area.is_empty() {
                return Err(Error::Config("sensing units need an id and an area".into()));
            }
            if !seen.insert(unit.id.as_str()) {
                return Err(Error::Config(format!("duplicate sensing unit id {}", unit.id)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.http.bind_addr.port(), 8080);
        assert_eq!(config.topology.switch_threshold, 40.0);
        assert_eq!(config.store.kind, StoreKind::Memory);
        assert!(config.units.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("isac.toml");
        std::fs::write(
            &path,
            r#"
[http]
bind_addr = "127.0.0.1:9000"

[topology]
switch_threshold = 55.0

[store]
kind = "json"
dir = "/var/lib/isac"

[[units]]
id = "SU-1"
area = "room-101"
human_csv = "data/human.csv"
no_human_csv = "data/no_human.csv"
seed = 3
"#,
        )
        .unwrap();

        let config = ApiConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.http.bind_addr.port(), 9000);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.topology.switch_threshold, 55.0);
        assert_eq!(config.topology.hysteresis_margin, 10.0);
        assert_eq!(config.store.kind, StoreKind::Json);
        assert_eq!(config.units.len(), 1);
        assert_eq!(config.units[0].seed, Some(3));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let mut config = ApiConfig::default();
        config.topology.hysteresis_margin = 90.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_units_rejected() {
        let unit = DatasetUnitConfig {
            id: "SU-1".into(),
            area: "room-101".into(),
            human_csv: "h.csv".into(),
            no_human_csv: "n.csv".into(),
            seed: None,
        };
        let config = ApiConfig {
            units: vec![unit.clone(), unit],
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
