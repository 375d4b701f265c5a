// shardseq-data/src/samplers/shard_sampler.rs

use super::random_sampler::RandomShardSampler;
use super::sequential_sampler::SequentialShardSampler;
use super::traits::{BatchSampler, Batches};
use shardseq_core::{SamplerConfig, SamplerError, SamplerSection, SamplingStrategy};

/// Either sampling strategy, chosen at runtime from a [`SamplingStrategy`].
#[derive(Debug, Clone, Copy)]
pub enum ShardSampler {
    Sequential(SequentialShardSampler),
    Random(RandomShardSampler),
}

impl ShardSampler {
    /// Builds the sampler for `strategy`.
    ///
    /// # Errors
    ///
    /// Propagates the strategy's own construction errors.
    pub fn new(strategy: SamplingStrategy, config: SamplerConfig) -> Result<Self, SamplerError> {
        match strategy {
            SamplingStrategy::Sequential => Ok(ShardSampler::Sequential(SequentialShardSampler::new(config))),
            SamplingStrategy::Random => RandomShardSampler::new(config).map(ShardSampler::Random),
        }
    }

    /// Validates a configuration section and builds its sampler.
    pub fn from_section(section: SamplerSection) -> Result<Self, SamplerError> {
        let config = section.params.validate()?;
        Self::new(section.strategy, config)
    }

    pub fn strategy(&self) -> SamplingStrategy {
        match self {
            ShardSampler::Sequential(_) => SamplingStrategy::Sequential,
            ShardSampler::Random(_) => SamplingStrategy::Random,
        }
    }
}

impl BatchSampler for ShardSampler {
    fn config(&self) -> &SamplerConfig {
        match self {
            ShardSampler::Sequential(sampler) => sampler.config(),
            ShardSampler::Random(sampler) => sampler.config(),
        }
    }

    fn iter(&self) -> Result<Batches, SamplerError> {
        match self {
            ShardSampler::Sequential(sampler) => sampler.iter(),
            ShardSampler::Random(sampler) => sampler.iter(),
        }
    }

    fn num_batches(&self) -> Result<usize, SamplerError> {
        match self {
            ShardSampler::Sequential(sampler) => sampler.num_batches(),
            ShardSampler::Random(sampler) => sampler.num_batches(),
        }
    }
}
