use crate::config::SamplingStrategy;
use thiserror::Error;

/// Errors raised while validating a sampling configuration or starting an
/// iteration pass.
#[derive(Error, Debug, PartialEq, Eq, Clone)] // PartialEq for easier testing
pub enum SamplerError {
    #[error("No sample to consume: total_samples is {total_samples}")]
    NoSamples { total_samples: usize },

    #[error("No samples left to consume: consumed_samples {consumed_samples} >= total_samples {total_samples}")]
    NoSamplesLeft {
        consumed_samples: usize,
        total_samples: usize,
    },

    #[error("total_samples {total_samples} exceeds the largest sample index representable in a batch ({max})")]
    TooManySamples { total_samples: usize, max: usize },

    #[error("micro_batch_size must be greater than 0, but got {0}")]
    InvalidMicroBatchSize(usize),

    #[error("data_parallel_size must be greater than 0, but got {0}")]
    InvalidDataParallelSize(usize),

    #[error("data_parallel_rank should be smaller than data_parallel_size, but {rank} >= {size}")]
    RankOutOfRange { rank: usize, size: usize },

    #[error("micro_batch_size ({micro_batch_size}) x data_parallel_size ({data_parallel_size}) overflows")]
    StepOverflow {
        micro_batch_size: usize,
        data_parallel_size: usize,
    },

    #[error("global_batch_size must be greater than 0, but got {0}")]
    InvalidGlobalBatchSize(usize),

    #[error(
        "global_batch_size ({global_batch_size}) is not divisible by \
         micro_batch_size ({micro_batch_size}) x data_parallel_size ({data_parallel_size})"
    )]
    GlobalBatchNotDivisible {
        global_batch_size: usize,
        micro_batch_size: usize,
        data_parallel_size: usize,
    },

    #[error("pad_samples_to_global_batch_size can be true only when global_batch_size is set")]
    PaddingWithoutGlobalBatchSize,

    #[error("{strategy:?} sampling does not support sample padding")]
    PaddingUnsupported { strategy: SamplingStrategy },

    #[error(
        "total_samples ({total_samples}) is smaller than one step of \
         micro_batch_size x data_parallel_size ({step_samples})"
    )]
    InsufficientSamples {
        total_samples: usize,
        step_samples: usize,
    },

    #[error(
        "consumed_samples {consumed_samples} is not aligned to a step boundary: \
         {epoch_samples} samples into epoch {epoch} is not a multiple of {step_samples}"
    )]
    MisalignedResume {
        consumed_samples: usize,
        epoch: usize,
        epoch_samples: usize,
        step_samples: usize,
    },
}
