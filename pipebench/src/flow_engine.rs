// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The interface between the benchmark and the engine that executes it.

use crate::error::BenchError;

/// An engine that a flowgraph can be built in and run on.
///
/// Node names are hierarchical paths using `::` as a separator, for example
/// `pipe0::copy2`.
pub trait FlowEngine {
    /// Handle to a stage created in the engine.
    type Node;

    fn make_source(
        &mut self,
        name: &str,
        unit_size: usize,
        granularity: usize,
    ) -> Result<Self::Node, BenchError>;

    fn make_truncator(
        &mut self,
        name: &str,
        unit_size: usize,
        sample_count: u64,
    ) -> Result<Self::Node, BenchError>;

    fn make_copy(
        &mut self,
        name: &str,
        unit_size: usize,
        copy_bound: u64,
    ) -> Result<Self::Node, BenchError>;

    fn make_sink(
        &mut self,
        name: &str,
        unit_size: usize,
        granularity: usize,
    ) -> Result<Self::Node, BenchError>;

    /// Connect output `from_port` of `from` to input `to_port` of `to`.
    fn connect(
        &mut self,
        from: &Self::Node,
        from_port: usize,
        to: &Self::Node,
        to_port: usize,
    ) -> Result<(), BenchError>;

    /// Execute the flowgraph, returning once every pipe has finished.
    fn run(&mut self) -> Result<(), BenchError>;
}
