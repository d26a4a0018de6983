//! Application-level configuration.
//!
//! - [`PipelineConfig`]: guard and loop-detection windows, adjudicator deadline

pub mod pipeline_config;

pub use pipeline_config::PipelineConfig;
