//! Per-rank batch sampling for data-parallel training.
//!
//! Every training process builds one sampler with the same sampling
//! parameters and its own `data_parallel_rank`. Iterating it yields the index
//! micro-batches that rank consumes on each step, together with the resume
//! cursor to checkpoint:
//!
//! - [`SequentialShardSampler`]: contiguous windows in index order, with
//!   optional padding of the last partial global batch.
//! - [`RandomShardSampler`]: per-rank buckets shuffled once per epoch,
//!   resumable at any step boundary.
//! - [`ShardSampler`]: either of the above, picked from a [`SamplingStrategy`].

pub mod batch;
pub mod dataloader;
pub mod datasets;
pub mod error;
pub mod samplers;

// Re-export main components
pub use batch::{Batch, PAD_INDEX};
pub use dataloader::{DataLoader, LoadedBatch};
pub use datasets::{Dataset, VecDataset};
pub use error::DataError;
pub use samplers::{BatchSampler, RandomShardSampler, SequentialShardSampler, ShardSampler};
pub use shardseq_core::{SamplerConfig, SamplerError, SamplerParams, SamplerSection, SamplingStrategy};
