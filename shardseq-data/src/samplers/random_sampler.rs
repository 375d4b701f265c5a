// shardseq-data/src/samplers/random_sampler.rs

use super::traits::{BatchSampler, Batches};
use crate::batch::{to_index, Batch};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shardseq_core::{SamplerConfig, SamplerError, SamplingStrategy};

/// A sampler that shuffles each rank's bucket of indices once per epoch.
///
/// The first `total_samples - total_samples % step` indices (`step` being
/// `micro_batch_size * data_parallel_size`) are split into one contiguous
/// bucket per rank. Every epoch, all ranks draw the same permutation of
/// `[0, bucket_size)` from an RNG seeded with the epoch number, and each
/// offsets it by the start of its own bucket. The remainder of
/// `total_samples` is never sampled.
///
/// Because the permutation depends only on the epoch, a pass started from any
/// step-aligned `consumed_samples` reproduces the rest of that epoch exactly.
/// A pass ends at the epoch boundary.
#[derive(Debug, Clone, Copy)]
pub struct RandomShardSampler {
    config: SamplerConfig,
}

/// Where a pass starts, derived from the configured cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EpochPosition {
    epoch: usize,
    bucket_size: usize,
    bucket_offset: usize,
    bucket_start: usize,
}

impl RandomShardSampler {
    /// Creates a new `RandomShardSampler`.
    ///
    /// # Errors
    ///
    /// * `SamplerError::PaddingUnsupported` if padding to the global batch is
    ///   requested.
    /// * `SamplerError::InsufficientSamples` if `total_samples` does not cover
    ///   a single step.
    pub fn new(config: SamplerConfig) -> Result<Self, SamplerError> {
        if config.pad_samples_to_global_batch_size() {
            return Err(SamplerError::PaddingUnsupported {
                strategy: SamplingStrategy::Random,
            });
        }
        let step_samples = config.micro_batch_times_data_parallel_size();
        if config.total_samples() < step_samples {
            return Err(SamplerError::InsufficientSamples {
                total_samples: config.total_samples(),
                step_samples,
            });
        }
        info!(
            "Instantiating RandomShardSampler with total_samples: {} and consumed_samples: {}",
            config.total_samples(),
            config.consumed_samples()
        );
        Ok(RandomShardSampler { config })
    }

    /// Samples at the end of the index space that no epoch ever visits.
    pub fn last_batch_size(&self) -> usize {
        self.config.total_samples() % self.config.micro_batch_times_data_parallel_size()
    }

    /// Size of the pool shuffled each epoch.
    pub fn active_total_samples(&self) -> usize {
        self.config.total_samples() - self.last_batch_size()
    }

    /// Epoch the configured cursor falls in.
    pub fn epoch(&self) -> usize {
        self.config.consumed_samples() / self.active_total_samples()
    }

    fn position(&self) -> Result<EpochPosition, SamplerError> {
        let step = self.config.micro_batch_times_data_parallel_size();
        let active_total_samples = self.active_total_samples();
        let consumed_samples = self.config.consumed_samples();
        let epoch = consumed_samples / active_total_samples;
        let epoch_samples = consumed_samples % active_total_samples;
        if epoch_samples % step != 0 {
            return Err(SamplerError::MisalignedResume {
                consumed_samples,
                epoch,
                epoch_samples,
                step_samples: step,
            });
        }

        let bucket_size = (self.config.total_samples() / step) * self.config.micro_batch_size();
        Ok(EpochPosition {
            epoch,
            bucket_size,
            bucket_offset: epoch_samples / self.config.data_parallel_size(),
            bucket_start: self.config.data_parallel_rank() * bucket_size,
        })
    }

    /// Starts a pass over the rest of the current epoch.
    ///
    /// # Errors
    ///
    /// Returns `SamplerError::MisalignedResume` if `consumed_samples` does not
    /// land on a step boundary within its epoch.
    pub fn batches(&self) -> Result<RandomBatches, SamplerError> {
        let position = self.position()?;
        debug!(
            "RandomShardSampler: epoch {}, bucket size {}, bucket offset {}, rank {} starts at {}",
            position.epoch,
            position.bucket_size,
            position.bucket_offset,
            self.config.data_parallel_rank(),
            position.bucket_start
        );

        let remaining = epoch_permutation(position.epoch, position.bucket_size)
            .split_off(position.bucket_offset);

        Ok(RandomBatches {
            remaining: remaining.into_iter(),
            bucket_start: position.bucket_start,
            micro_batch_size: self.config.micro_batch_size(),
            step_samples: self.config.micro_batch_times_data_parallel_size(),
            drop_last: self.config.drop_last(),
            consumed_samples: self.config.consumed_samples(),
        })
    }
}

/// Permutation of `[0, len)` shared by every rank for `epoch`.
pub fn epoch_permutation(epoch: usize, len: usize) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(epoch as u64);
    let mut permutation: Vec<usize> = (0..len).collect();
    permutation.shuffle(&mut rng);
    permutation
}

impl BatchSampler for RandomShardSampler {
    fn config(&self) -> &SamplerConfig {
        &self.config
    }

    fn iter(&self) -> Result<Batches, SamplerError> {
        Ok(Box::new(self.batches()?))
    }

    fn num_batches(&self) -> Result<usize, SamplerError> {
        let position = self.position()?;
        let remaining = position.bucket_size - position.bucket_offset;
        let micro_batch_size = self.config.micro_batch_size();
        let partial = usize::from(remaining % micro_batch_size != 0 && !self.config.drop_last());
        Ok(remaining / micro_batch_size + partial)
    }
}

/// Lazy iterator returned by [`RandomShardSampler::batches`].
#[derive(Debug, Clone)]
pub struct RandomBatches {
    remaining: std::vec::IntoIter<usize>,
    bucket_start: usize,
    micro_batch_size: usize,
    step_samples: usize,
    drop_last: bool,
    consumed_samples: usize,
}

impl Iterator for RandomBatches {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        let bucket_start = self.bucket_start;
        let indices: Vec<i64> = self
            .remaining
            .by_ref()
            .take(self.micro_batch_size)
            .map(|offset| to_index(bucket_start + offset))
            .collect();

        if indices.is_empty() {
            return None;
        }
        if indices.len() == self.micro_batch_size {
            self.consumed_samples += self.step_samples;
            return Some(Batch::new(indices, self.consumed_samples));
        }
        // Partial batch: the cursor does not move.
        if self.drop_last {
            None
        } else {
            Some(Batch::new(indices, self.consumed_samples))
        }
    }
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;
