// shardseq-data/src/batch.rs

use shardseq_core::MAX_TOTAL_SAMPLES;

/// Index marking an absent sample in a padded batch.
///
/// Consumers must skip it when fetching data and exclude it from loss and
/// metric aggregation.
pub const PAD_INDEX: i64 = -1;

/// One micro-batch of dataset indices for a single rank.
///
/// `consumed_samples` is the global resume cursor reached once the step that
/// produced this batch has been consumed by every rank. Persisting it in a
/// checkpoint and constructing a new sampler with it resumes right after this
/// batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub indices: Vec<i64>,
    pub consumed_samples: usize,
}

impl Batch {
    pub fn new(indices: Vec<i64>, consumed_samples: usize) -> Self {
        Batch {
            indices,
            consumed_samples,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of `PAD_INDEX` entries.
    pub fn num_padding(&self) -> usize {
        self.indices.iter().filter(|&&idx| idx == PAD_INDEX).count()
    }

    /// The real (non-padding) indices, in order.
    pub fn sample_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices
            .iter()
            .filter_map(|&idx| usize::try_from(idx).ok())
    }
}

/// Converts a dataset position into a batch index.
///
/// Validated configs keep every position below `MAX_TOTAL_SAMPLES`, so the
/// conversion never saturates and never produces `PAD_INDEX`.
pub(crate) fn to_index(idx: usize) -> i64 {
    debug_assert!(idx < MAX_TOTAL_SAMPLES);
    i64::try_from(idx).unwrap_or(i64::MAX)
}

/// Converts a half-open range of dataset positions into batch indices.
pub(crate) fn index_range(start: usize, end: usize) -> impl Iterator<Item = i64> {
    (start..end).map(to_index)
}
