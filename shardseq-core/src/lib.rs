//! Core types for data-parallel batch sampling: the validated sampler
//! configuration and the errors raised while building or resuming a sampler.

pub mod config;
pub mod error;

pub use config::{SamplerConfig, SamplerParams, SamplerSection, SamplingStrategy, MAX_TOTAL_SAMPLES};
pub use error::SamplerError;
