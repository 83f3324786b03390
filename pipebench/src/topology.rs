// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The complete flowgraph: a set of identical, independent pipes.

use crate::config::Configuration;
use crate::error::BenchError;
use crate::pipeline::{Pipeline, build_pipeline, validate};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    pipes: Vec<Pipeline>,
}

impl Topology {
    #[must_use]
    pub fn pipes(&self) -> &[Pipeline] {
        &self.pipes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.pipes.iter().map(Pipeline::node_count).sum()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.pipes.iter().map(Pipeline::edge_count).sum()
    }
}

/// Build `pipe_count` copies of the pipe described by `config`.
///
/// The configuration is checked before any pipe is built so that either the
/// whole topology is returned or none of it.
pub fn assemble(config: &Configuration) -> Result<Topology, BenchError> {
    validate(
        config.stage_count,
        config.copy_bound,
        config.sample_unit_size,
        config.granularity,
    )?;

    let pipes = (0..config.pipe_count)
        .map(|_| {
            build_pipeline(
                config.stage_count,
                config.sample_count,
                config.copy_bound,
                config.sample_unit_size,
                config.granularity,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Topology { pipes })
}
