use shardseq_core::SamplerError;
use thiserror::Error;

/// Errors raised while turning sampled index batches into data.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum DataError {
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error("Index out of bounds: index {index} for dataset of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Dataset has {len} items but the sampler draws from {total_samples} samples")]
    DatasetTooSmall { len: usize, total_samples: usize },

    #[error("Invalid sample index {0}: only the padding index -1 may be negative")]
    InvalidIndex(i64),
}
