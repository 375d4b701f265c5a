// shardseq-core/src/config.rs

//! Sampling configuration shared by every batch sampling strategy.
//!
//! Raw parameters ([`SamplerParams`]) come from the caller or from a job
//! configuration file; they are checked once and turned into an immutable
//! [`SamplerConfig`]. Invalid combinations are rejected here so that no
//! training step is ever attempted with a bad layout.

use crate::error::SamplerError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Largest accepted `total_samples`: every sample index must fit the `i64`
/// entries of a batch, where `-1` is reserved for padding.
pub const MAX_TOTAL_SAMPLES: usize = i64::MAX as usize;

fn default_drop_last() -> bool {
    true
}

/// Unvalidated construction parameters for a sampler.
///
/// Deserializes from a config section such as:
///
/// ```json
/// { "total_samples": 1000, "consumed_samples": 0, "micro_batch_size": 4,
///   "data_parallel_rank": 0, "data_parallel_size": 8 }
/// ```
///
/// `drop_last` defaults to `true`, `global_batch_size` to `None` and
/// `pad_samples_to_global_batch_size` to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerParams {
    pub total_samples: usize,
    pub consumed_samples: usize,
    pub micro_batch_size: usize,
    pub data_parallel_rank: usize,
    pub data_parallel_size: usize,
    #[serde(default = "default_drop_last")]
    pub drop_last: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_batch_size: Option<usize>,
    #[serde(default)]
    pub pad_samples_to_global_batch_size: bool,
}

impl SamplerParams {
    /// Creates parameters with the default `drop_last = true`, no global batch
    /// size and no padding.
    pub fn new(
        total_samples: usize,
        consumed_samples: usize,
        micro_batch_size: usize,
        data_parallel_rank: usize,
        data_parallel_size: usize,
    ) -> Self {
        SamplerParams {
            total_samples,
            consumed_samples,
            micro_batch_size,
            data_parallel_rank,
            data_parallel_size,
            drop_last: true,
            global_batch_size: None,
            pad_samples_to_global_batch_size: false,
        }
    }

    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    pub fn with_global_batch_size(mut self, global_batch_size: usize) -> Self {
        self.global_batch_size = Some(global_batch_size);
        self
    }

    pub fn with_pad_samples_to_global_batch_size(mut self, pad: bool) -> Self {
        self.pad_samples_to_global_batch_size = pad;
        self
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, checked in this order: total
    /// samples (non-zero, at most [`MAX_TOTAL_SAMPLES`]), consumed samples,
    /// micro batch size, data parallel size, rank, step size overflow, global
    /// batch size, padding policy.
    pub fn validate(self) -> Result<SamplerConfig, SamplerError> {
        if self.total_samples == 0 {
            return Err(SamplerError::NoSamples {
                total_samples: self.total_samples,
            });
        }
        if self.total_samples > MAX_TOTAL_SAMPLES {
            return Err(SamplerError::TooManySamples {
                total_samples: self.total_samples,
                max: MAX_TOTAL_SAMPLES,
            });
        }
        if self.consumed_samples >= self.total_samples {
            return Err(SamplerError::NoSamplesLeft {
                consumed_samples: self.consumed_samples,
                total_samples: self.total_samples,
            });
        }
        if self.micro_batch_size == 0 {
            return Err(SamplerError::InvalidMicroBatchSize(self.micro_batch_size));
        }
        if self.data_parallel_size == 0 {
            return Err(SamplerError::InvalidDataParallelSize(self.data_parallel_size));
        }
        if self.data_parallel_rank >= self.data_parallel_size {
            return Err(SamplerError::RankOutOfRange {
                rank: self.data_parallel_rank,
                size: self.data_parallel_size,
            });
        }
        let step_samples = self
            .micro_batch_size
            .checked_mul(self.data_parallel_size)
            .ok_or(SamplerError::StepOverflow {
                micro_batch_size: self.micro_batch_size,
                data_parallel_size: self.data_parallel_size,
            })?;
        if let Some(global_batch_size) = self.global_batch_size {
            if global_batch_size == 0 {
                return Err(SamplerError::InvalidGlobalBatchSize(global_batch_size));
            }
            if global_batch_size % step_samples != 0 {
                return Err(SamplerError::GlobalBatchNotDivisible {
                    global_batch_size,
                    micro_batch_size: self.micro_batch_size,
                    data_parallel_size: self.data_parallel_size,
                });
            }
        }
        if self.pad_samples_to_global_batch_size && self.global_batch_size.is_none() {
            return Err(SamplerError::PaddingWithoutGlobalBatchSize);
        }

        debug!(
            "Validated sampler config: rank {}/{}, micro_batch_size {}, samples {}/{}",
            self.data_parallel_rank,
            self.data_parallel_size,
            self.micro_batch_size,
            self.consumed_samples,
            self.total_samples
        );
        Ok(SamplerConfig {
            total_samples: self.total_samples,
            consumed_samples: self.consumed_samples,
            micro_batch_size: self.micro_batch_size,
            data_parallel_rank: self.data_parallel_rank,
            data_parallel_size: self.data_parallel_size,
            drop_last: self.drop_last,
            global_batch_size: self.global_batch_size,
            pad_samples_to_global_batch_size: self.pad_samples_to_global_batch_size,
        })
    }
}

/// A validated, immutable sampling configuration.
///
/// Only obtainable through [`SamplerConfig::new`] or [`SamplerParams::validate`]
/// (deserialization goes through the latter too), so every instance satisfies:
///
/// - `0 <= consumed_samples < total_samples <= MAX_TOTAL_SAMPLES`
/// - `micro_batch_size * data_parallel_size` does not overflow
/// - `micro_batch_size > 0`, `data_parallel_size > 0`
/// - `data_parallel_rank < data_parallel_size`
/// - `global_batch_size`, if set, is a positive multiple of
///   `micro_batch_size * data_parallel_size`
/// - padding is enabled only together with a global batch size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SamplerParams", into = "SamplerParams")]
pub struct SamplerConfig {
    total_samples: usize,
    consumed_samples: usize,
    micro_batch_size: usize,
    data_parallel_rank: usize,
    data_parallel_size: usize,
    drop_last: bool,
    global_batch_size: Option<usize>,
    pad_samples_to_global_batch_size: bool,
}

impl SamplerConfig {
    /// Validates the full parameter set in one call.
    ///
    /// # Errors
    ///
    /// See [`SamplerParams::validate`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        total_samples: usize,
        consumed_samples: usize,
        micro_batch_size: usize,
        data_parallel_rank: usize,
        data_parallel_size: usize,
        drop_last: bool,
        global_batch_size: Option<usize>,
        pad_samples_to_global_batch_size: bool,
    ) -> Result<Self, SamplerError> {
        SamplerParams {
            total_samples,
            consumed_samples,
            micro_batch_size,
            data_parallel_rank,
            data_parallel_size,
            drop_last,
            global_batch_size,
            pad_samples_to_global_batch_size,
        }
        .validate()
    }

    /// Returns a copy of this configuration resumed at `consumed_samples`.
    ///
    /// # Errors
    ///
    /// Returns `SamplerError::NoSamplesLeft` if the new cursor is past the end.
    pub fn with_consumed_samples(&self, consumed_samples: usize) -> Result<Self, SamplerError> {
        SamplerParams {
            consumed_samples,
            ..SamplerParams::from(*self)
        }
        .validate()
    }

    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    pub fn consumed_samples(&self) -> usize {
        self.consumed_samples
    }

    pub fn micro_batch_size(&self) -> usize {
        self.micro_batch_size
    }

    pub fn data_parallel_rank(&self) -> usize {
        self.data_parallel_rank
    }

    pub fn data_parallel_size(&self) -> usize {
        self.data_parallel_size
    }

    pub fn drop_last(&self) -> bool {
        self.drop_last
    }

    pub fn global_batch_size(&self) -> Option<usize> {
        self.global_batch_size
    }

    pub fn pad_samples_to_global_batch_size(&self) -> bool {
        self.pad_samples_to_global_batch_size
    }

    /// Samples consumed across all ranks by one sampler step.
    ///
    /// The product was checked for overflow during validation.
    pub fn micro_batch_times_data_parallel_size(&self) -> usize {
        self.micro_batch_size * self.data_parallel_size
    }

    /// Samples not yet consumed.
    pub fn available_samples(&self) -> usize {
        self.total_samples - self.consumed_samples
    }

    /// Number of global batches remaining from the current cursor.
    ///
    /// With a global batch size this counts global batches (rounded down when
    /// `drop_last`, up otherwise); without one it counts sampler steps,
    /// rounded up.
    pub fn length(&self) -> usize {
        let available = self.available_samples();
        match self.global_batch_size {
            Some(global_batch_size) if self.drop_last => available / global_batch_size,
            Some(global_batch_size) => available.div_ceil(global_batch_size),
            None => available.div_ceil(self.micro_batch_times_data_parallel_size()),
        }
    }
}

impl TryFrom<SamplerParams> for SamplerConfig {
    type Error = SamplerError;

    fn try_from(params: SamplerParams) -> Result<Self, Self::Error> {
        params.validate()
    }
}

impl From<SamplerConfig> for SamplerParams {
    fn from(config: SamplerConfig) -> Self {
        SamplerParams {
            total_samples: config.total_samples,
            consumed_samples: config.consumed_samples,
            micro_batch_size: config.micro_batch_size,
            data_parallel_rank: config.data_parallel_rank,
            data_parallel_size: config.data_parallel_size,
            drop_last: config.drop_last,
            global_batch_size: config.global_batch_size,
            pad_samples_to_global_batch_size: config.pad_samples_to_global_batch_size,
        }
    }
}

/// Order in which a rank walks its share of the index space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingStrategy {
    /// Contiguous windows in index order.
    #[default]
    Sequential,
    /// Per-rank buckets shuffled once per epoch.
    Random,
}

/// A sampler section of a job configuration: the strategy plus its parameters.
///
/// ```json
/// { "strategy": "random", "total_samples": 64, "consumed_samples": 16,
///   "micro_batch_size": 2, "data_parallel_rank": 1, "data_parallel_size": 4 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerSection {
    #[serde(default)]
    pub strategy: SamplingStrategy,
    #[serde(flatten)]
    pub params: SamplerParams,
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
