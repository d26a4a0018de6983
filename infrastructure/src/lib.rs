//! Infrastructure layer for toolguard
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading and the
//! wiring that turns a loaded config into a pipeline.

pub mod adjudicator;
pub mod bootstrap;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use adjudicator::ChatCompletionsAdjudicator;
pub use bootstrap::{build_pipeline, build_registry};
pub use config::{ConfigLoader, FileConfig, SchemaLoadError};
pub use logging::JsonlDecisionLogger;
