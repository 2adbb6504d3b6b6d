//! # ISAC-Inference
//!
//! Presence inference over CSI batches.
//!
//! Each frame flows through three stages:
//!
//! 1. **Feature Extraction**: fixed-length statistics of the frame
//! 2. **Classification**: a pre-trained model scores the probability of presence
//! 3. **Uncertainty**: presence is `p >= 0.5`, uncertainty is `200 * min(p, 1 - p)`
//!
//! The classifier is a trait object so any trained model (tree ensemble,
//! logistic regression, neural network) plugs in without touching the engine.

pub mod classifier;
pub mod inference;
pub mod uncertainty;

pub use classifier::*;
pub use inference::*;
pub use uncertainty::*;
