//! Shared types and logic for the Smart Irrigation Platform
//!
//! This crate contains the pure agronomic core shared between the backend
//! server and the browser helpers (via WASM): weather aggregation, feature
//! derivation for the irrigation model and crop growth phase classification.

pub mod features;
pub mod models;
pub mod phase;
pub mod types;
pub mod validation;

pub use features::*;
pub use models::*;
pub use phase::*;
pub use types::*;
pub use validation::*;
