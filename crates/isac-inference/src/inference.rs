//! Inference engine turning CSI batches into per-frame presence results.

use std::sync::Arc;

use isac_core::{CsiFrame, PresenceResult, Result};
use isac_csi::features::FeatureExtractor;
use isac_csi::frame::validate_batch;

use crate::classifier::PresenceClassifier;
use crate::uncertainty::assess;

/// Stateless batch inference engine
///
/// The whole batch fails on the first invalid frame; a partial result set is
/// never returned.
#[derive(Clone)]
pub struct InferenceEngine {
    extractor: FeatureExtractor,
    classifier: Arc<dyn PresenceClassifier>,
}

impl InferenceEngine {
    pub fn new(classifier: Arc<dyn PresenceClassifier>) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            classifier,
        }
    }

    /// Run inference on a batch, one result per frame in input order
    pub fn infer(&self, frames: &[CsiFrame]) -> Result<Vec<PresenceResult>> {
        let layout = validate_batch(frames)?;

        let results = frames
            .iter()
            .map(|frame| self.infer_frame(frame))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            frames = results.len(),
            bins = layout.map(|l| l.len()).unwrap_or(0),
            present = results.iter().filter(|r| r.human_presence).count(),
            "Batch inference complete"
        );

        Ok(results)
    }

    fn infer_frame(&self, frame: &CsiFrame) -> Result<PresenceResult> {
        let features = self.extractor.extract(frame)?;
        let probability = self.classifier.score(&features)?;
        let assessment = assess(probability)?;

        Ok(PresenceResult {
            timestamp: frame.timestamp.clone(),
            human_presence: assessment.human_presence,
            uncertainty_percent: assessment.uncertainty_percent,
        })
    }
}

/// Mean uncertainty of a batch; `None` for an empty batch
pub fn mean_uncertainty(results: &[PresenceResult]) -> Option<f64> {
    if results.is_empty() {
        return None;
    }
    Some(results.iter().map(|r| r.uncertainty_percent).sum::<f64>() / results.len() as f64)
}
