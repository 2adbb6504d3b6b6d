//! Recorded CSI datasets and the sensing unit that replays them.
//!
//! Recordings are CSV files with one row per subcarrier estimate:
//!
//! ```text
//! timestamp,bin,ls_re,ls_im
//! 2024-03-01 10:00:00.000,-26,0.412,-0.118
//! ```
//!
//! Rows sharing a timestamp form one frame.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use isac_core::{AreaId, CsiFrame, CsiSample, Error, FrameTimestamp, Result, UnitId};

use crate::acquisition::{Capability, SensingMode, SensingUnit};

#[derive(Debug, Deserialize)]
struct CsiRow {
    timestamp: String,
    bin: i32,
    ls_re: f64,
    ls_im: f64,
}

/// A set of recorded frames, ordered by timestamp
#[derive(Debug, Clone, Default)]
pub struct Recording {
    frames: Vec<(FrameTimestamp, Vec<CsiSample>)>,
}

impl Recording {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::Reader::from_path(path.as_ref()).map_err(|e| {
            Error::Config(format!("cannot open recording {}: {e}", path.as_ref().display()))
        })?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut grouped: BTreeMap<String, Vec<CsiSample>> = BTreeMap::new();

        for row in reader.deserialize() {
            let row: CsiRow = row?;
            grouped
                .entry(row.timestamp)
                .or_default()
                .push(CsiSample::new(row.bin, row.ls_re, row.ls_im));
        }

        let frames = grouped
            .into_iter()
            .map(|(ts, samples)| (FrameTimestamp::new(ts), samples))
            .collect();

        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of distinct subcarrier indices across the recording
    pub fn bin_count(&self) -> usize {
        self.frames
            .iter()
            .flat_map(|(_, samples)| samples.iter().map(|s| s.bin))
            .collect::<BTreeSet<_>>()
            .len()
    }

    fn frame(&self, index: usize, unit: &UnitId) -> CsiFrame {
        let (ts, samples) = &self.frames[index];
        CsiFrame::new(ts.clone(), unit.clone(), samples.clone())
    }
}

/// Configuration of one dataset-backed sensing unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetUnitConfig {
    pub id: String,
    pub area: String,
    /// Recording with a person present
    pub human_csv: PathBuf,
    /// Recording of the empty area
    pub no_human_csv: PathBuf,
    /// Fixed RNG seed; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Sensing unit replaying recorded CSI
pub struct DatasetSensingUnit {
    id: UnitId,
    area: AreaId,
    human: Recording,
    no_human: Recording,
    rng: Mutex<StdRng>,
}

impl DatasetSensingUnit {
    pub fn new(id: UnitId, area: AreaId, human: Recording, no_human: Recording) -> Result<Self> {
        if human.is_empty() || no_human.is_empty() {
            return Err(Error::Config(format!(
                "sensing unit {id} needs non-empty human and no-human recordings"
            )));
        }

        Ok(Self {
            id,
            area,
            human,
            no_human,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn from_config(config: &DatasetUnitConfig) -> Result<Self> {
        let human = Recording::from_path(&config.human_csv)?;
        let no_human = Recording::from_path(&config.no_human_csv)?;

        let unit = Self::new(
            UnitId::new(&config.id),
            AreaId::new(&config.area),
            human,
            no_human,
        )?;

        tracing::info!(
            unit = %unit.id,
            area = %unit.area,
            human_frames = unit.human.len(),
            no_human_frames = unit.no_human.len(),
            "Loaded dataset sensing unit"
        );

        Ok(match config.seed {
            Some(seed) => unit.with_seed(seed),
            None => unit,
        })
    }

    fn pick(&self, rng: &mut StdRng, mode: SensingMode) -> CsiFrame {
        let recording = match mode {
            SensingMode::Human => &self.human,
            SensingMode::NoHuman => &self.no_human,
            SensingMode::Variable => {
                if rng.gen_bool(0.5) {
                    &self.human
                } else {
                    &self.no_human
                }
            }
        };

        let index = rng.gen_range(0..recording.len());
        recording.frame(index, &self.id)
    }
}

#[async_trait]
impl SensingUnit for DatasetSensingUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn area(&self) -> &AreaId {
        &self.area
    }

    fn capability(&self) -> Capability {
        Capability {
            su_id: self.id.clone(),
            area_id: self.area.clone(),
            modes: SensingMode::ALL.to_vec(),
            num_bins: self.human.bin_count(),
        }
    }

    async fn capture(&self, mode: SensingMode, num_frames: usize) -> Result<Vec<CsiFrame>> {
        let mut rng = self.rng.lock();
        Ok((0..num_frames).map(|_| self.pick(&mut rng, mode)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HUMAN: &str = "timestamp,bin,ls_re,ls_im\n\
        t2,0,0.9,0.1\n\
        t2,1,0.8,0.2\n\
        t1,0,0.7,0.3\n\
        t1,1,0.6,0.4\n";

    const EMPTY_ROOM: &str = "timestamp,bin,ls_re,ls_im\n\
        e1,0,0.1,0.0\n\
        e1,1,0.1,0.0\n";

    fn unit() -> DatasetSensingUnit {
        DatasetSensingUnit::new(
            UnitId::new("SU-1"),
            AreaId::new("room-101"),
            Recording::from_reader(HUMAN.as_bytes()).unwrap(),
            Recording::from_reader(EMPTY_ROOM.as_bytes()).unwrap(),
        )
        .unwrap()
        .with_seed(42)
    }

    #[test]
    fn test_recording_groups_by_timestamp() {
        let rec = Recording::from_reader(HUMAN.as_bytes()).unwrap();
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.bin_count(), 2);

        let first = rec.frame(0, &UnitId::new("SU-1"));
        assert_eq!(first.timestamp, FrameTimestamp::new("t1"));
        assert_eq!(first.samples.len(), 2);
    }

    #[test]
    fn test_malformed_row_is_error() {
        let bad = "timestamp,bin,ls_re,ls_im\nt1,zero,0.1,0.2\n";
        assert!(matches!(
            Recording::from_reader(bad.as_bytes()),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_empty_recording_rejected() {
        let empty = Recording::from_reader("timestamp,bin,ls_re,ls_im\n".as_bytes()).unwrap();
        let human = Recording::from_reader(HUMAN.as_bytes()).unwrap();
        assert!(DatasetSensingUnit::new(UnitId::new("SU-1"), AreaId::new("a"), human, empty).is_err());
    }

    #[tokio::test]
    async fn test_capture_modes() {
        let unit = unit();

        let frames = unit.capture(SensingMode::NoHuman, 5).await.unwrap();
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| f.timestamp.as_str() == "e1"));
        assert!(frames.iter().all(|f| f.source_id == UnitId::new("SU-1")));

        let frames = unit.capture(SensingMode::Human, 5).await.unwrap();
        assert!(frames.iter().all(|f| f.timestamp.as_str().starts_with('t')));
    }

    #[tokio::test]
    async fn test_seeded_capture_is_reproducible() {
        let a = unit().capture(SensingMode::Variable, 20).await.unwrap();
        let b = unit().capture(SensingMode::Variable, 20).await.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_capability() {
        let cap = unit().capability();
        assert_eq!(cap.num_bins, 2);
        assert_eq!(cap.modes.len(), 3);
        assert_eq!(cap.area_id, AreaId::new("room-101"));
    }

    #[tokio::test]
    async fn test_from_config_files() {
        let dir = tempfile::tempdir().unwrap();
        let human_path = dir.path().join("1-short.csv");
        let empty_path = dir.path().join("2-short.csv");
        std::fs::File::create(&human_path).unwrap().write_all(HUMAN.as_bytes()).unwrap();
        std::fs::File::create(&empty_path).unwrap().write_all(EMPTY_ROOM.as_bytes()).unwrap();

        let config = DatasetUnitConfig {
            id: "SU-9".into(),
            area: "room-102".into(),
            human_csv: human_path,
            no_human_csv: empty_path,
            seed: Some(7),
        };
        let unit = DatasetSensingUnit::from_config(&config).unwrap();
        assert_eq!(unit.id(), &UnitId::new("SU-9"));
        assert_eq!(unit.capture(SensingMode::Human, 3).await.unwrap().len(), 3);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let config = DatasetUnitConfig {
            id: "SU-1".into(),
            area: "room-101".into(),
            human_csv: "/nonexistent/1.csv".into(),
            no_human_csv: "/nonexistent/2.csv".into(),
            seed: None,
        };
        assert!(matches!(
            DatasetSensingUnit::from_config(&config),
            Err(Error::Config(_))
        ));
    }
}
