//! CSI frame validation and batch dimensionality checks.

use std::collections::HashSet;

use isac_core::{CsiFrame, Error, Result};

/// Validate a single frame's integrity
///
/// A frame must carry at least one sample, every subcarrier index at most once,
/// and only finite channel estimates.
pub fn validate_frame(frame: &CsiFrame) -> Result<()> {
    if frame.samples.is_empty() {
        return Err(Error::invalid_frame(frame.timestamp.as_str(), "frame has no samples"));
    }

    let mut seen = HashSet::with_capacity(frame.samples.len());
    for sample in &frame.samples {
        if !seen.insert(sample.bin) {
            return Err(Error::invalid_frame(
                frame.timestamp.as_str(),
                format!("duplicate bin {}", sample.bin),
            ));
        }
        if !sample.is_finite() {
            return Err(Error::invalid_frame(
                frame.timestamp.as_str(),
                format!("non-finite estimate at bin {}", sample.bin),
            ));
        }
    }

    Ok(())
}

/// The set of subcarrier indices shared by every frame of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinLayout {
    bins: Vec<i32>,
}

impl BinLayout {
    /// Derive the layout from a reference frame
    pub fn of(frame: &CsiFrame) -> Self {
        Self { bins: frame.bins() }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bins(&self) -> &[i32] {
        &self.bins
    }

    /// Reject a frame whose subcarrier set differs from this layout
    pub fn check(&self, frame: &CsiFrame) -> Result<()> {
        let bins = frame.bins();
        if bins == self.bins {
            return Ok(());
        }

        let reason = match self.bins.iter().find(|b| bins.binary_search(b).is_err()) {
            Some(missing) => format!("missing bin {missing} present in batch layout"),
            None => format!(
                "bin layout mismatch: expected {} bins, got {}",
                self.bins.len(),
                bins.len()
            ),
        };
        Err(Error::invalid_frame(frame.timestamp.as_str(), reason))
    }
}

/// Check that every frame is well-formed and all share one bin layout
pub fn validate_batch(frames: &[CsiFrame]) -> Result<Option<BinLayout>> {
    let Some(first) = frames.first() else {
        return Ok(None);
    };

    validate_frame(first)?;
    let layout = BinLayout::of(first);

    for frame in &frames[1..] {
        validate_frame(frame)?;
        layout.check(frame)?;
    }

    Ok(Some(layout))
}
