// dataloader.rs
//! # DataLoader
//!
//! Resolves the index batches of a [`BatchSampler`] against a [`Dataset`].
//!
//! ```rust
//! use shardseq_core::SamplerParams;
//! use shardseq_data::dataloader::DataLoader;
//! use shardseq_data::datasets::VecDataset;
//! use shardseq_data::samplers::SequentialShardSampler;
//!
//! let config = SamplerParams::new(6, 0, 2, 0, 1).validate().expect("valid config");
//! let sampler = SequentialShardSampler::new(config);
//! let dataset = VecDataset::new(vec![10, 20, 30, 40, 50, 60]);
//! let loader = DataLoader::new(dataset, sampler).expect("aligned cursor");
//! for batch in loader {
//!     let batch = batch.expect("indices in range");
//!     println!("{:?} -> resume at {}", batch.samples, batch.consumed_samples);
//! }
//! ```
//!
//! Padding entries ([`PAD_INDEX`](crate::batch::PAD_INDEX)) come out as `None`
//! so the training loop can mask them out of the loss.

use crate::batch::{Batch, PAD_INDEX};
use crate::datasets::Dataset;
use crate::error::DataError;
use crate::samplers::{BatchSampler, Batches};
use log::debug;

/// A batch of fetched samples; `None` marks padding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedBatch<T> {
    pub samples: Vec<Option<T>>,
    /// Resume cursor reached after this batch, see [`Batch::consumed_samples`].
    pub consumed_samples: usize,
}

impl<T> LoadedBatch<T> {
    /// Number of real (non-padding) samples.
    pub fn num_samples(&self) -> usize {
        self.samples.iter().filter(|sample| sample.is_some()).count()
    }
}

/// Iterates one pass of a sampler, fetching every sampled index from the
/// dataset.
///
/// # Type parameters
/// - `D`: the dataset, implementing [`Dataset`].
/// - `S`: the sampler, implementing [`BatchSampler`].
pub struct DataLoader<D: Dataset, S: BatchSampler> {
    /// The source dataset.
    pub dataset: D,
    /// The sampler producing index batches.
    pub sampler: S,
    batches: Batches,
}

impl<D: Dataset, S: BatchSampler> DataLoader<D, S> {
    /// Creates a new DataLoader and starts the sampler's pass.
    ///
    /// # Errors
    ///
    /// - `DataError::DatasetTooSmall` if the dataset holds fewer items than
    ///   the sampler's `total_samples`.
    /// - `DataError::Sampler` if the sampler cannot start its pass.
    pub fn new(dataset: D, sampler: S) -> Result<Self, DataError> {
        let total_samples = sampler.config().total_samples();
        if dataset.len() < total_samples {
            return Err(DataError::DatasetTooSmall {
                len: dataset.len(),
                total_samples,
            });
        }
        let batches = sampler.iter()?;
        debug!(
            "DataLoader: {} global batches remaining for rank {}",
            sampler.len(),
            sampler.config().data_parallel_rank()
        );
        Ok(Self {
            dataset,
            sampler,
            batches,
        })
    }

    fn load(&self, batch: Batch) -> Result<LoadedBatch<D::Item>, DataError> {
        let samples = batch
            .indices
            .iter()
            .map(|&idx| match idx {
                PAD_INDEX => Ok(None),
                idx => usize::try_from(idx)
                    .map_err(|_| DataError::InvalidIndex(idx))
                    .and_then(|idx| self.dataset.get(idx))
                    .map(Some),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LoadedBatch {
            samples,
            consumed_samples: batch.consumed_samples,
        })
    }
}

impl<D: Dataset, S: BatchSampler> Iterator for DataLoader<D, S> {
    type Item = Result<LoadedBatch<D::Item>, DataError>;

    /// Returns the next fetched batch.
    ///
    /// - `Some(Ok(batch))`: the batch, padding mapped to `None`.
    /// - `Some(Err(e))`: an index could not be fetched.
    /// - `None`: the pass is over.
    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.batches.next()?;
        Some(self.load(batch))
    }
}

#[cfg(test)]
#[path = "dataloader_test.rs"]
mod tests;
