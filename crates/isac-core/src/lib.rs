//! # ISAC-Core
//!
//! Core types and errors for CSI-based human presence sensing with
//! adaptive monostatic/multistatic topology control.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
