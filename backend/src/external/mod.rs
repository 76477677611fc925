//! External collaborators: the persisted irrigation model and the
//! text-generation service.

pub mod gemini;
pub mod model;

pub use gemini::{Explainer, GeminiClient, PlaceholderExplainer, EXPLANATION_PLACEHOLDER};
pub use model::{LinearModel, Oracle};
