//! Walks every rank of a small data-parallel job through one pass, then
//! resumes rank 0 from a mid-epoch checkpoint cursor.
//!
//! Run with `RUST_LOG=debug` to see the sampler's epoch and bucket derivation.

use shardseq_data::{
    BatchSampler, SamplerError, SamplerParams, SamplingStrategy, ShardSampler,
};

fn main() -> Result<(), SamplerError> {
    let _ = env_logger::builder().is_test(false).try_init();

    let data_parallel_size = 2;
    let total_samples = 22;

    for strategy in [SamplingStrategy::Sequential, SamplingStrategy::Random] {
        println!("\n--- {strategy:?} ---");
        for rank in 0..data_parallel_size {
            let config = SamplerParams::new(total_samples, 0, 2, rank, data_parallel_size)
                .with_drop_last(false)
                .validate()?;
            let sampler = ShardSampler::new(strategy, config)?;
            println!(
                "rank {rank}: {} global batches, {} local batches",
                sampler.len(),
                sampler.num_batches()?
            );
            for (step, batch) in sampler.iter()?.enumerate() {
                println!("  step {step}: {:?} (resume at {})", batch.indices, batch.consumed_samples);
            }
        }
    }

    // Pretend the job stopped after two steps of the shuffled pass.
    let params = SamplerParams::new(total_samples, 0, 2, 0, data_parallel_size);
    let sampler = ShardSampler::new(SamplingStrategy::Random, params.clone().validate()?)?;
    let checkpoint = sampler
        .iter()?
        .nth(1)
        .map(|batch| batch.consumed_samples)
        .unwrap_or(0);
    println!("\n--- resume rank 0 at consumed_samples = {checkpoint} ---");
    let resumed = ShardSampler::new(
        SamplingStrategy::Random,
        SamplerParams {
            consumed_samples: checkpoint,
            ..params
        }
        .validate()?,
    )?;
    for batch in resumed.iter()? {
        println!("  {:?}", batch.indices);
    }
    Ok(())
}
