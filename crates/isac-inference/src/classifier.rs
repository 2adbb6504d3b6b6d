//! Presence classifiers over CSI feature vectors.
//!
//! The engine only depends on [`PresenceClassifier`]. Concrete models are
//! trained offline and shipped as JSON artifacts tagged by `kind`:
//!
//! ```json
//! { "kind": "tree_ensemble",
//!   "trees": [ { "nodes": [
//!       { "type": "split", "feature": 4, "threshold": 0.8, "left": 1, "right": 2 },
//!       { "type": "leaf", "probability": 0.1 },
//!       { "type": "leaf", "probability": 0.9 } ] } ] }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use isac_core::{Error, Result};
use isac_csi::features::{FeatureVector, FEATURE_COUNT};

/// Scores a feature vector with the probability that a human is present
///
/// Implementations must be deterministic and free of side effects.
pub trait PresenceClassifier: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<f64>;
}

/// Node of a binary decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go `left` when `features[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Check structure: children point forward and stay in range, so every
    /// walk from the root terminates at a leaf.
    fn validate(&self, tree_index: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::Model(format!("tree {tree_index} has no nodes")));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(Error::Model(format!(
                            "tree {tree_index} node {i}: feature index {feature} out of range"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(Error::Model(format!(
                            "tree {tree_index} node {i}: non-finite threshold"
                        )));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(Error::Model(format!(
                                "tree {tree_index} node {i}: invalid child index {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { probability } => {
                    if !(0.0..=1.0).contains(&probability) {
                        return Err(Error::Model(format!(
                            "tree {tree_index} node {i}: leaf probability {probability} outside [0, 1]"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn leaf_probability(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[feature] <= threshold { left } else { right };
                }
                TreeNode::Leaf { probability } => return probability,
            }
        }
    }
}

/// Forest of decision trees; the score is the mean leaf probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    pub fn new(trees: Vec<DecisionTree>) -> Result<Self> {
        let ensemble = Self { trees };
        ensemble.validate()?;
        Ok(ensemble)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::Model("tree ensemble has no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl PresenceClassifier for TreeEnsemble {
    fn score(&self, features: &FeatureVector) -> Result<f64> {
        let x = features.as_slice();
        let total: f64 = self.trees.iter().map(|t| t.leaf_probability(x)).sum();
        Ok(total / self.trees.len() as f64)
    }
}

/// Logistic regression: `sigmoid(w · x + b)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self> {
        let model = Self { weights, bias };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(Error::Model(format!(
                "logistic model expects {FEATURE_COUNT} weights, got {}",
                self.weights.len()
            )));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::Model("logistic model has non-finite parameters".into()));
        }
        Ok(())
    }
}

impl PresenceClassifier for LogisticModel {
    fn score(&self, features: &FeatureVector) -> Result<f64> {
        let z: f64 = self
            .weights
            .iter()
            .zip(features.as_slice())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

/// Serialized, pre-trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    TreeEnsemble(TreeEnsemble),
    Logistic(LogisticModel),
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Model(format!("invalid model artifact: {e}")))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Model(format!("cannot read model {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::TreeEnsemble(_) => "tree_ensemble",
            ModelArtifact::Logistic(_) => "logistic",
        }
    }

    /// Validate the artifact and wrap it as a shareable classifier
    pub fn into_classifier(self) -> Result<Arc<dyn PresenceClassifier>> {
        match self {
            ModelArtifact::TreeEnsemble(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
            ModelArtifact::Logistic(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
        }
    }
}

/// Load a classifier from a JSON artifact on disk
pub fn load_classifier<P: AsRef<Path>>(path: P) -> Result<Arc<dyn PresenceClassifier>> {
    let artifact = ModelArtifact::load(path.as_ref())?;
    tracing::info!(
        kind = artifact.kind(),
        path = %path.as_ref().display(),
        "Loaded presence model"
    );
    artifact.into_classifier()
}
