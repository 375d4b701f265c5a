// shardseq-data/src/samplers/sequential_sampler.rs

use super::traits::{BatchSampler, Batches};
use crate::batch::{index_range, Batch, PAD_INDEX};
use log::{debug, info};
use shardseq_core::{SamplerConfig, SamplerError};

/// Splits `[consumed_samples, total_samples)` into windows of
/// `micro_batch_size * data_parallel_size` indices, in order, and yields the
/// contiguous slice of each window owned by this rank.
///
/// Rank `r` reads `[r * micro_batch_size, (r + 1) * micro_batch_size)` of
/// every window, so the ranks of one step cover the window exactly once.
///
/// A trailing partial window is dropped when `drop_last` is set. Otherwise it
/// is either padded with [`PAD_INDEX`] up to the global batch size (when
/// `pad_samples_to_global_batch_size` is set), or sliced like a full window,
/// which can leave this rank with a short or empty last batch.
#[derive(Debug, Clone, Copy)]
pub struct SequentialShardSampler {
    config: SamplerConfig,
}

impl SequentialShardSampler {
    /// Creates a new `SequentialShardSampler`.
    pub fn new(config: SamplerConfig) -> Self {
        info!(
            "Instantiating SequentialShardSampler with total_samples: {} and consumed_samples: {}",
            config.total_samples(),
            config.consumed_samples()
        );
        SequentialShardSampler { config }
    }

    /// Starts a pass. Never fails for this strategy.
    pub fn batches(&self) -> SequentialBatches {
        SequentialBatches {
            config: self.config,
            window_start: self.config.consumed_samples(),
            phase: Phase::Windows,
        }
    }
}

impl BatchSampler for SequentialShardSampler {
    fn config(&self) -> &SamplerConfig {
        &self.config
    }

    fn iter(&self) -> Result<Batches, SamplerError> {
        Ok(Box::new(self.batches()))
    }

    fn num_batches(&self) -> Result<usize, SamplerError> {
        let step = self.config.micro_batch_times_data_parallel_size();
        let available = self.config.available_samples();
        let full = available / step;
        if available % step == 0 || self.config.drop_last() {
            return Ok(full);
        }
        let tail = match self.config.global_batch_size() {
            Some(global_batch_size) if self.config.pad_samples_to_global_batch_size() => {
                global_batch_size / step
            }
            _ => 1,
        };
        Ok(full + tail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Emitting full windows.
    Windows,
    /// Emitting padded batches over the trailing partial window; `offset` is
    /// the next position inside the global batch.
    PaddedTail { offset: usize },
    Done,
}

/// Lazy iterator returned by [`SequentialShardSampler::batches`].
#[derive(Debug, Clone)]
pub struct SequentialBatches {
    config: SamplerConfig,
    window_start: usize,
    phase: Phase,
}

impl SequentialBatches {
    fn next_window(&mut self) -> Option<Batch> {
        let total = self.config.total_samples();
        let step = self.config.micro_batch_times_data_parallel_size();
        let micro_batch_size = self.config.micro_batch_size();
        let rank_offset = self.config.data_parallel_rank() * micro_batch_size;

        // `window_start <= total` always holds; compare by difference so huge
        // steps cannot overflow.
        if total - self.window_start >= step {
            let start = self.window_start + rank_offset;
            self.window_start += step;
            return Some(Batch::new(
                index_range(start, start + micro_batch_size).collect(),
                self.window_start,
            ));
        }

        let tail_len = total - self.window_start;
        if tail_len == 0 || self.config.drop_last() {
            self.phase = Phase::Done;
            return None;
        }
        if self.config.pad_samples_to_global_batch_size() {
            debug!(
                "Padding trailing {} samples to the global batch for rank {}",
                tail_len,
                self.config.data_parallel_rank()
            );
            self.phase = Phase::PaddedTail {
                offset: self.config.data_parallel_rank(),
            };
            return self.next_padded();
        }

        // Same rank slice as a full window, clamped to what is left.
        self.phase = Phase::Done;
        let start = rank_offset.min(tail_len);
        let end = (rank_offset + micro_batch_size).min(tail_len);
        Some(Batch::new(
            index_range(self.window_start + start, self.window_start + end).collect(),
            total,
        ))
    }

    fn next_padded(&mut self) -> Option<Batch> {
        let Phase::PaddedTail { offset } = self.phase else {
            return None;
        };
        let Some(global_batch_size) = self.config.global_batch_size() else {
            self.phase = Phase::Done;
            return None;
        };
        if offset >= global_batch_size {
            self.phase = Phase::Done;
            return None;
        }

        let total = self.config.total_samples();
        let step = self.config.micro_batch_times_data_parallel_size();
        let micro_batch_size = self.config.micro_batch_size();
        let rank = self.config.data_parallel_rank();
        let tail_len = total - self.window_start;

        self.phase = match offset.checked_add(step) {
            Some(offset) => Phase::PaddedTail { offset },
            None => Phase::Done,
        };

        let start = offset.min(tail_len);
        let end = offset.saturating_add(micro_batch_size).min(tail_len);
        let mut indices: Vec<i64> =
            index_range(self.window_start + start, self.window_start + end).collect();
        indices.resize(micro_batch_size, PAD_INDEX);

        let cursor = self
            .window_start
            .saturating_add(offset - rank)
            .saturating_add(step)
            .min(total);
        Some(Batch::new(indices, cursor))
    }
}

impl Iterator for SequentialBatches {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        match self.phase {
            Phase::Windows => self.next_window(),
            Phase::PaddedTail { .. } => self.next_padded(),
            Phase::Done => None,
        }
    }
}

#[cfg(test)]
#[path = "sequential_sampler_test.rs"]
mod tests;
