use shardseq_data::{Batch, BatchSampler, SamplerParams, SamplingStrategy, ShardSampler};
use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

// Helper to initialize logger only once for all tests in a test binary.
#[allow(dead_code)]
pub fn setup_logger() {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Collects a full pass of the sampler built from `params`.
#[allow(dead_code)]
pub fn collect_batches(strategy: SamplingStrategy, params: SamplerParams) -> Vec<Batch> {
    let config = params.validate().expect("valid config");
    let sampler = ShardSampler::new(strategy, config).expect("valid sampler");
    sampler.iter().expect("pass starts").collect()
}
