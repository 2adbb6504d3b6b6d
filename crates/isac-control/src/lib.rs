//! # ISAC-Control
//!
//! Adaptive sensing topology control.
//!
//! After every inference batch the mean uncertainty of its results is fed to
//! a per-area state machine that holds or switches between monostatic
//! (single radio) and multistatic (several radios) sensing. The orchestrator
//! ties frame acquisition, inference and this control loop together.

pub mod controller;
pub mod orchestrator;
pub mod store;
pub mod topology;

pub use controller::*;
pub use orchestrator::*;
pub use store::*;
pub use topology::*;
