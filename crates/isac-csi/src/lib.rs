//! # ISAC-CSI
//!
//! Channel State Information handling for presence sensing.
//!
//! A CSI frame is one snapshot of least-squares channel estimates, one complex
//! value per OFDM subcarrier, captured by a single sensing unit. This crate
//! validates frames, reduces them to fixed-length feature vectors and acquires
//! them from sensing units.
//!
//! ## Stages
//!
//! 1. **Acquisition**: Sensing units capture frames; the registry selects which
//!    units participate according to the area's topology
//! 2. **Validation**: Frames must be finite, carry unique bins, and a batch must
//!    share one bin layout
//! 3. **Feature Extraction**: Per-frame statistics over real/imaginary parts,
//!    magnitude, phase coherence and spectral spread

pub mod acquisition;
pub mod dataset;
pub mod features;
pub mod frame;
pub mod registry;

pub use acquisition::*;
pub use dataset::*;
pub use features::*;
pub use frame::*;
pub use registry::*;
