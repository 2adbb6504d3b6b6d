//! Persistence of per-area topology state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use isac_core::{AreaId, Error, Result, TopologyState};

/// Keyed storage of topology records, one per area
#[async_trait]
pub trait TopologyStore: Send + Sync {
    async fn load(&self, area: &AreaId) -> Result<Option<TopologyState>>;

    /// Checkpoint the state after a decision
    async fn save(&self, area: &AreaId, state: &TopologyState) -> Result<()>;

    /// Areas with a stored record
    async fn areas(&self) -> Result<Vec<AreaId>>;
}

/// Volatile store; state lives as long as the process
#[derive(Default)]
pub struct MemoryTopologyStore {
    states: RwLock<HashMap<AreaId, TopologyState>>,
}

impl MemoryTopologyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TopologyStore for MemoryTopologyStore {
    async fn load(&self, area: &AreaId) -> Result<Option<TopologyState>> {
        Ok(self.states.read().get(area).cloned())
    }

    async fn save(&self, area: &AreaId, state: &TopologyState) -> Result<()> {
        self.states.write().insert(area.clone(), state.clone());
        Ok(())
    }

    async fn areas(&self) -> Result<Vec<AreaId>> {
        let mut areas: Vec<AreaId> = self.states.read().keys().cloned().collect();
        areas.sort();
        Ok(areas)
    }
}

/// One JSON file per area in a directory
///
/// Writes go to a temporary file that is renamed over the record, so a
/// crash never leaves a truncated checkpoint.
pub struct JsonTopologyStore {
    dir: PathBuf,
}

impl JsonTopologyStore {
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::Persistence(format!("cannot create state dir {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, area: &AreaId) -> PathBuf {
        self.dir.join(format!("{}.json", encode_area(area)))
    }
}

#[async_trait]
impl TopologyStore for JsonTopologyStore {
    async fn load(&self, area: &AreaId) -> Result<Option<TopologyState>> {
        let path = self.record_path(area);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Persistence(format!("cannot read {}: {e}", path.display()))),
        }
    }

    async fn save(&self, area: &AreaId, state: &TopologyState) -> Result<()> {
        let path = self.record_path(area);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(state)?;

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn areas(&self) -> Result<Vec<AreaId>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut areas = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            match decode_area(stem) {
                Some(area) => areas.push(area),
                None => tracing::warn!(file = stem, "Skipping unrecognised topology record"),
            }
        }

        areas.sort();
        Ok(areas)
    }
}

fn is_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Percent-encode an area id into a file stem
fn encode_area(area: &AreaId) -> String {
    let mut out = String::with_capacity(area.as_str().len());
    for &b in area.as_str().as_bytes() {
        if is_safe(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn decode_area(stem: &str) -> Option<AreaId> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok().map(AreaId)
}
