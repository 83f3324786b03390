// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Descriptions of the stages that make up a pipe.

use std::fmt;

/// Size in bytes of one sample.
pub const SAMPLE_UNIT_SIZE: usize = size_of::<f32>();

/// Number of samples the source and sink work in.
pub const DEFAULT_GRANULARITY: usize = 32768;

/// What a stage does, along with the bound that applies to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageRole {
    /// Produces samples in blocks of `granularity`.
    Source { granularity: usize },

    /// Passes on the first `sample_count` samples then ends the stream.
    Truncator { sample_count: u64 },

    /// Copies at most `copy_bound` samples per invocation.
    Copy { copy_bound: u64 },

    /// Consumes samples in blocks of `granularity`.
    Sink { granularity: usize },
}

impl StageRole {
    #[must_use]
    pub fn has_input(&self) -> bool {
        !matches!(self, StageRole::Source { .. })
    }

    #[must_use]
    pub fn has_output(&self) -> bool {
        !matches!(self, StageRole::Sink { .. })
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageRole::Source { granularity } => write!(f, "source({granularity})"),
            StageRole::Truncator { sample_count } => write!(f, "truncator({sample_count})"),
            StageRole::Copy { copy_bound } => write!(f, "copy({copy_bound})"),
            StageRole::Sink { granularity } => write!(f, "sink({granularity})"),
        }
    }
}

/// One node of a pipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageDescriptor {
    pub role: StageRole,
    pub sample_unit_size: usize,
}

impl StageDescriptor {
    #[must_use]
    pub fn new(role: StageRole, sample_unit_size: usize) -> Self {
        Self {
            role,
            sample_unit_size,
        }
    }
}
