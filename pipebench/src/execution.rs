// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Build a [`Topology`] inside a [`FlowEngine`].

use crate::error::BenchError;
use crate::flow_engine::FlowEngine;
use crate::stage::{StageDescriptor, StageRole};
use crate::topology::Topology;

/// Name used for a stage, unique within its pipe.
#[must_use]
pub fn stage_name(pipe: usize, position: usize, stage: &StageDescriptor) -> String {
    let local = match stage.role {
        StageRole::Source { .. } => "source".to_string(),
        StageRole::Truncator { .. } => "head".to_string(),
        // Copy stages follow the source and truncator
        StageRole::Copy { .. } => format!("copy{}", position.saturating_sub(2)),
        StageRole::Sink { .. } => "sink".to_string(),
    };
    format!("pipe{pipe}::{local}")
}

fn make_node<E: FlowEngine>(
    engine: &mut E,
    name: &str,
    stage: &StageDescriptor,
) -> Result<E::Node, BenchError> {
    let unit_size = stage.sample_unit_size;
    match stage.role {
        StageRole::Source { granularity } => engine.make_source(name, unit_size, granularity),
        StageRole::Truncator { sample_count } => {
            engine.make_truncator(name, unit_size, sample_count)
        }
        StageRole::Copy { copy_bound } => engine.make_copy(name, unit_size, copy_bound),
        StageRole::Sink { granularity } => engine.make_sink(name, unit_size, granularity),
    }
}

/// Create one engine node per stage and one connection per edge.
///
/// Returns the nodes, grouped by pipe and in chain order.
pub fn realize<E: FlowEngine>(
    engine: &mut E,
    topology: &Topology,
) -> Result<Vec<Vec<E::Node>>, BenchError> {
    let mut all_nodes = Vec::with_capacity(topology.pipes().len());
    for (pipe, pipeline) in topology.pipes().iter().enumerate() {
        let nodes = pipeline
            .stages()
            .iter()
            .enumerate()
            .map(|(position, stage)| make_node(engine, &stage_name(pipe, position, stage), stage))
            .collect::<Result<Vec<_>, _>>()?;

        for edge in pipeline.edges() {
            engine.connect(
                &nodes[edge.from],
                edge.from_port,
                &nodes[edge.to],
                edge.to_port,
            )?;
        }
        all_nodes.push(nodes);
    }
    Ok(all_nodes)
}
