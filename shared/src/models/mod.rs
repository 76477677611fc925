//! Domain models for the Smart Irrigation Platform

mod crop;
mod irrigation;
mod weather;

pub use crop::*;
pub use irrigation::*;
pub use weather::*;
