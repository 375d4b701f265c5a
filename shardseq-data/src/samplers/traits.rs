// shardseq-data/src/samplers/traits.rs

use crate::batch::Batch;
use shardseq_core::{SamplerConfig, SamplerError};
use std::fmt::Debug;

/// Iterator over the batches of one pass.
pub type Batches = Box<dyn Iterator<Item = Batch> + Send + Sync>;

/// A BatchSampler decides which dataset indices the calling rank reads on
/// every training step.
///
/// Samplers are used by `DataLoader` to generate a sequence of index batches
/// to fetch from a `Dataset`. They hold no iteration state: each call to
/// [`iter`](BatchSampler::iter) starts a fresh pass at the configured
/// `consumed_samples`.
pub trait BatchSampler: Debug + Send + Sync {
    /// The validated configuration this sampler was built from.
    fn config(&self) -> &SamplerConfig;

    /// Starts a pass over the remaining batches for this rank.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured cursor cannot be resumed by this
    /// strategy.
    fn iter(&self) -> Result<Batches, SamplerError>;

    /// Exact number of batches a full pass yields.
    ///
    /// # Errors
    ///
    /// Same conditions as [`iter`](BatchSampler::iter).
    fn num_batches(&self) -> Result<usize, SamplerError>;

    /// Number of global batches remaining, see [`SamplerConfig::length`].
    fn len(&self) -> usize {
        self.config().length()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
