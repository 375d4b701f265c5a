pub mod traits;
pub mod sequential_sampler;
pub mod random_sampler;
pub mod shard_sampler;

pub use traits::{BatchSampler, Batches};
pub use sequential_sampler::{SequentialBatches, SequentialShardSampler};
pub use random_sampler::{RandomBatches, RandomShardSampler};
pub use shard_sampler::ShardSampler;
