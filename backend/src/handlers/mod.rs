//! HTTP request handlers

pub mod chat;
pub mod health;
pub mod predict;

pub use chat::*;
pub use health::*;
pub use predict::*;
