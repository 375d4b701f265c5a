// shardseq-data/src/samplers/sequential_sampler_test.rs

use super::*;
use shardseq_core::{SamplerParams, MAX_TOTAL_SAMPLES};

fn sampler(params: SamplerParams) -> SequentialShardSampler {
    SequentialShardSampler::new(params.validate().expect("valid config"))
}

fn indices(sampler: &SequentialShardSampler) -> Vec<Vec<i64>> {
    sampler.batches().map(|batch| batch.indices).collect()
}

#[test]
fn test_sequential_windows_per_rank() {
    let rank0 = sampler(SamplerParams::new(10, 0, 2, 0, 2));
    let rank1 = sampler(SamplerParams::new(10, 0, 2, 1, 2));
    assert_eq!(indices(&rank0), vec![vec![0, 1], vec![4, 5]]);
    assert_eq!(indices(&rank1), vec![vec![2, 3], vec![6, 7]]);
    assert_eq!(rank0.len(), 3);
    assert_eq!(rank0.num_batches().unwrap(), 2);
}

#[test]
fn test_sequential_cursor_advances_per_step() {
    let rank1 = sampler(SamplerParams::new(10, 0, 2, 1, 2));
    let cursors: Vec<usize> = rank1.batches().map(|batch| batch.consumed_samples).collect();
    assert_eq!(cursors, vec![4, 8]);
}

#[test]
fn test_sequential_keeps_tail_without_padding() {
    let rank0 = sampler(SamplerParams::new(10, 0, 2, 0, 2).with_drop_last(false));
    let rank1 = sampler(SamplerParams::new(10, 0, 2, 1, 2).with_drop_last(false));
    assert_eq!(indices(&rank0), vec![vec![0, 1], vec![4, 5], vec![8, 9]]);
    // Rank 1's slice of the tail starts past its end.
    assert_eq!(indices(&rank1), vec![vec![2, 3], vec![6, 7], vec![]]);
    assert_eq!(rank0.len(), 3);
    assert_eq!(rank1.num_batches().unwrap(), 3);

    let last = rank1.batches().last().expect("tail batch");
    assert_eq!(last.consumed_samples, 10);
}

#[test]
fn test_sequential_short_tail_batch() {
    // Windows [2, 6) and [6, 10) leave index 10 alone.
    let rank0 = sampler(SamplerParams::new(11, 2, 2, 0, 2).with_drop_last(false));
    assert_eq!(indices(&rank0), vec![vec![2, 3], vec![6, 7], vec![10]]);

    let rank1 = sampler(SamplerParams::new(11, 2, 2, 1, 2).with_drop_last(false));
    assert_eq!(indices(&rank1), vec![vec![4, 5], vec![8, 9], vec![]]);
}

#[test]
fn test_sequential_tail_clamped_to_rank_slice() {
    let rank0 = sampler(SamplerParams::new(11, 0, 2, 0, 2).with_drop_last(false));
    assert_eq!(indices(&rank0), vec![vec![0, 1], vec![4, 5], vec![8, 9]]);
    let rank1 = sampler(SamplerParams::new(11, 0, 2, 1, 2).with_drop_last(false));
    assert_eq!(indices(&rank1), vec![vec![2, 3], vec![6, 7], vec![10]]);
}

#[test]
fn test_sequential_drop_last_discards_tail() {
    let rank0 = sampler(SamplerParams::new(11, 2, 2, 0, 2));
    assert_eq!(indices(&rank0), vec![vec![2, 3], vec![6, 7]]);
    assert_eq!(rank0.num_batches().unwrap(), 2);
}

#[test]
fn test_sequential_pads_tail_to_global_batch() {
    let params = |rank| {
        SamplerParams::new(11, 2, 2, rank, 2)
            .with_drop_last(false)
            .with_global_batch_size(4)
            .with_pad_samples_to_global_batch_size(true)
    };
    let rank0 = sampler(params(0));
    let batches: Vec<Batch> = rank0.batches().collect();
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[2].indices, vec![10, PAD_INDEX]);
    assert_eq!(batches[2].consumed_samples, 11);

    let rank1 = sampler(params(1));
    let last = rank1.batches().last().expect("padded batch");
    assert_eq!(last.indices, vec![PAD_INDEX, PAD_INDEX]);
}

#[test]
fn test_sequential_padding_spans_global_batch() {
    // Global batch of two steps: every rank pads the tail with two batches.
    let rank0 = sampler(
        SamplerParams::new(11, 0, 2, 0, 2)
            .with_drop_last(false)
            .with_global_batch_size(8)
            .with_pad_samples_to_global_batch_size(true),
    );
    let batches: Vec<Batch> = rank0.batches().collect();
    let tail: Vec<Vec<i64>> = batches[2..].iter().map(|b| b.indices.clone()).collect();
    assert_eq!(tail, vec![vec![8, 9], vec![PAD_INDEX, PAD_INDEX]]);
    assert_eq!(rank0.num_batches().unwrap(), 4);
    assert!(batches.iter().all(|b| b.len() == 2));
    assert!(batches.iter().all(|b| b.consumed_samples <= 11));
}

#[test]
fn test_sequential_padding_with_unit_micro_batch() {
    let params = |rank| {
        SamplerParams::new(7, 0, 1, rank, 4)
            .with_drop_last(false)
            .with_global_batch_size(4)
            .with_pad_samples_to_global_batch_size(true)
    };
    let tails: Vec<Vec<i64>> = (0..4)
        .map(|rank| sampler(params(rank)).batches().last().unwrap().indices)
        .collect();
    assert_eq!(tails, vec![vec![4], vec![5], vec![6], vec![PAD_INDEX]]);
}

#[test]
fn test_sequential_no_tail_when_divisible() {
    let rank0 = sampler(
        SamplerParams::new(8, 0, 2, 0, 2)
            .with_drop_last(false)
            .with_global_batch_size(4)
            .with_pad_samples_to_global_batch_size(true),
    );
    assert_eq!(indices(&rank0), vec![vec![0, 1], vec![4, 5]]);
    assert_eq!(rank0.num_batches().unwrap(), 2);
    assert_eq!(rank0.len(), 2);
}

#[test]
fn test_sequential_iteration_is_repeatable() {
    let rank0 = sampler(SamplerParams::new(20, 4, 2, 0, 2));
    let first: Vec<Batch> = rank0.iter().unwrap().collect();
    let second: Vec<Batch> = rank0.iter().unwrap().collect();
    assert_eq!(first, second);
}

#[test]
fn test_sequential_iterator_is_lazy() {
    let rank0 = sampler(SamplerParams::new(usize::MAX / 2, 0, 2, 0, 2));
    let first: Vec<Batch> = rank0.batches().take(2).collect();
    assert_eq!(first[1].indices, vec![4, 5]);
}

#[test]
fn test_sequential_indices_near_upper_bound() {
    let params = |rank| {
        SamplerParams::new(MAX_TOTAL_SAMPLES, MAX_TOTAL_SAMPLES - 5, 2, rank, 2).with_drop_last(false)
    };
    let top = i64::MAX;
    assert_eq!(indices(&sampler(params(0))), vec![vec![top - 5, top - 4], vec![top - 1]]);
    assert_eq!(indices(&sampler(params(1))), vec![vec![top - 3, top - 2], vec![]]);
    let last = sampler(params(0)).batches().last().unwrap();
    assert_eq!(last.consumed_samples, MAX_TOTAL_SAMPLES);
}

#[test]
fn test_sequential_padded_tail_near_upper_bound() {
    let rank0 = sampler(
        SamplerParams::new(MAX_TOTAL_SAMPLES, MAX_TOTAL_SAMPLES - 5, 2, 0, 2)
            .with_drop_last(false)
            .with_global_batch_size(4)
            .with_pad_samples_to_global_batch_size(true),
    );
    let batches: Vec<Batch> = rank0.batches().collect();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[1].indices, vec![i64::MAX - 1, PAD_INDEX]);
    assert_eq!(batches[1].consumed_samples, MAX_TOTAL_SAMPLES);
}

#[test]
fn test_sequential_tail_with_huge_step() {
    let micro_batch_size = usize::MAX / 2;
    let rank0 = sampler(SamplerParams::new(100, 99, micro_batch_size, 0, 2).with_drop_last(false));
    let rank1 = sampler(SamplerParams::new(100, 99, micro_batch_size, 1, 2).with_drop_last(false));
    assert_eq!(indices(&rank0), vec![vec![99]]);
    assert_eq!(indices(&rank1), vec![vec![]]);
    assert_eq!(rank0.num_batches().unwrap(), 1);
    assert_eq!(rank0.batches().last().unwrap().consumed_samples, 100);
}

#[test]
fn test_sequential_padded_offsets_stop_before_overflow() {
    let data_parallel_size = usize::MAX / 2;
    let last_rank = sampler(
        SamplerParams::new(3, 0, 1, data_parallel_size - 1, data_parallel_size)
            .with_drop_last(false)
            .with_global_batch_size(2 * data_parallel_size)
            .with_pad_samples_to_global_batch_size(true),
    );
    let batches: Vec<Batch> = last_rank.batches().collect();
    assert_eq!(batches.len(), 2);
    assert!(batches.iter().all(|batch| batch.indices == vec![PAD_INDEX]));
    assert!(batches.iter().all(|batch| batch.consumed_samples == 3));
    assert_eq!(last_rank.num_batches().unwrap(), 2);
}
