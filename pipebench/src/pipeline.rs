// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Build the description of a single linear pipe.
//!
//! A pipe is held as an arena of [`StageDescriptor`]s in chain order plus a
//! list of [`Edge`]s that refer to stages by their position in the arena:
//!
//! ```text
//! Source -> Truncator -> Copy x stage_count -> Sink
//! ```

use pipebench_components::types::{MAX_BLOCK_BYTES, block_bytes};

use crate::error::BenchError;
use crate::invalid_config;
use crate::stage::{StageDescriptor, StageRole};

/// A connection from an output port of one stage to an input port of another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub from_port: usize,
    pub to: usize,
    pub to_port: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<StageDescriptor>,
    edges: Vec<Edge>,
}

impl Pipeline {
    #[must_use]
    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn push(&mut self, role: StageRole, sample_unit_size: usize) {
        let index = self.stages.len();
        self.stages.push(StageDescriptor::new(role, sample_unit_size));
        if index > 0 {
            self.edges.push(Edge {
                from: index - 1,
                from_port: 0,
                to: index,
                to_port: 0,
            });
        }
    }
}

/// Check the parameters that every pipe is built from.
pub fn validate(
    stage_count: usize,
    copy_bound: u64,
    sample_unit_size: usize,
    granularity: usize,
) -> Result<(), BenchError> {
    if stage_count < 1 {
        return invalid_config!("stage count must be at least 1");
    }
    if copy_bound == 0 {
        return invalid_config!("copy bound must be at least 1");
    }
    if sample_unit_size == 0 {
        return invalid_config!("sample unit size must be non-zero");
    }
    if granularity == 0 {
        return invalid_config!("granularity must be non-zero");
    }
    if block_bytes(sample_unit_size, granularity).is_none() {
        return invalid_config!(
            "granularity {granularity} makes blocks larger than {MAX_BLOCK_BYTES} bytes"
        );
    }
    Ok(())
}

/// Build one pipe of `stage_count` copy stages.
///
/// `sample_count` may be zero, in which case the truncator ends the stream
/// before any samples pass.
pub fn build_pipeline(
    stage_count: usize,
    sample_count: u64,
    copy_bound: u64,
    sample_unit_size: usize,
    granularity: usize,
) -> Result<Pipeline, BenchError> {
    validate(stage_count, copy_bound, sample_unit_size, granularity)?;

    let mut pipeline = Pipeline {
        stages: Vec::with_capacity(stage_count + 3),
        edges: Vec::with_capacity(stage_count + 2),
    };
    pipeline.push(StageRole::Source { granularity }, sample_unit_size);
    pipeline.push(StageRole::Truncator { sample_count }, sample_unit_size);
    for _ in 0..stage_count {
        pipeline.push(StageRole::Copy { copy_bound }, sample_unit_size);
    }
    pipeline.push(StageRole::Sink { granularity }, sample_unit_size);

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{DEFAULT_GRANULARITY, SAMPLE_UNIT_SIZE};

    #[test]
    fn minimal_chain() {
        let pipeline = build_pipeline(1, 1000, 64, SAMPLE_UNIT_SIZE, DEFAULT_GRANULARITY).unwrap();
        let roles: Vec<StageRole> = pipeline.stages().iter().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![
                StageRole::Source {
                    granularity: DEFAULT_GRANULARITY
                },
                StageRole::Truncator { sample_count: 1000 },
                StageRole::Copy { copy_bound: 64 },
                StageRole::Sink {
                    granularity: DEFAULT_GRANULARITY
                },
            ]
        );
        assert_eq!(pipeline.edge_count(), 3);
    }

    #[test]
    fn edges_are_adjacent() {
        let pipeline = build_pipeline(6, 100, 512, SAMPLE_UNIT_SIZE, 16).unwrap();
        assert_eq!(pipeline.node_count(), 9);
        assert_eq!(pipeline.edge_count(), 8);
        for (i, edge) in pipeline.edges().iter().enumerate() {
            assert_eq!(edge.from, i);
            assert_eq!(edge.to, i + 1);
            assert_eq!((edge.from_port, edge.to_port), (0, 0));
            assert!(pipeline.stages()[edge.from].role.has_output());
            assert!(pipeline.stages()[edge.to].role.has_input());
        }
    }

    #[test]
    fn zero_samples_allowed() {
        assert!(build_pipeline(2, 0, 8, SAMPLE_UNIT_SIZE, 16).is_ok());
    }

    #[test]
    fn rejected_parameters() {
        for (stages, copy_bound, unit, granularity) in [
            (0, 512, 4, 16),
            (1, 0, 4, 16),
            (1, 512, 0, 16),
            (1, 512, 4, 0),
            (1, 512, 4, 1 << 62),
            (1, 512, 4, usize::MAX),
        ] {
            let result = build_pipeline(stages, 10, copy_bound, unit, granularity);
            assert!(matches!(result, Err(BenchError::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn granularity_limited_by_block_size() {
        let largest = MAX_BLOCK_BYTES / SAMPLE_UNIT_SIZE;
        assert!(validate(1, 512, SAMPLE_UNIT_SIZE, largest).is_ok());

        let err = validate(1, 512, SAMPLE_UNIT_SIZE, largest + 1).unwrap_err();
        assert!(err.to_string().contains("makes blocks larger than"));
        assert!(validate(1, 512, SAMPLE_UNIT_SIZE, 4_611_686_018_427_387_904).is_err());
    }
}
