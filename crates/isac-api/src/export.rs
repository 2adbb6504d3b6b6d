//! CSV export of sensing outcomes.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use isac_control::SensingOutcome;
use isac_core::{AreaId, Result, Topology};

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    timestamp: &'a str,
    human_presence: bool,
    uncertainty_percent: f64,
    area_id: &'a str,
    topology_switched: bool,
    current_topology: Topology,
}

/// Write one row per presence result; returns the number of rows written
pub fn write_csv<W: Write>(writer: W, area_id: &AreaId, outcome: &SensingOutcome) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    for result in &outcome.results {
        wtr.serialize(ExportRow {
            timestamp: result.timestamp.as_str(),
            human_presence: result.human_presence,
            uncertainty_percent: result.uncertainty_percent,
            area_id: area_id.as_str(),
            topology_switched: outcome.topology_switched,
            current_topology: outcome.current_topology,
        })?;
    }

    wtr.flush()?;
    Ok(outcome.results.len())
}

pub fn export_csv<P: AsRef<Path>>(path: P, area_id: &AreaId, outcome: &SensingOutcome) -> Result<usize> {
    let file = std::fs::File::create(path.as_ref())?;
    let rows = write_csv(file, area_id, outcome)?;
    tracing::info!(path = %path.as_ref().display(), rows, "Exported sensing results");
    Ok(rows)
}
