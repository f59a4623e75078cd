//! Task Generation Service.
//!
//! - [`model::TaskModel`] -- one prompt in, raw reply text out.
//! - [`gemini::GeminiClient`] -- [`TaskModel`](model::TaskModel) over the
//!   Gemini `generateContent` REST endpoint.
//! - [`generator::TaskGenerator`] -- prompt, call once, parse, and fall back
//!   to the fixed list on any failure. Never returns an error.

pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod model;

pub use config::GenerationConfig;
pub use error::GenerationError;
pub use generator::{Generated, TaskGenerator};
pub use model::TaskModel;
