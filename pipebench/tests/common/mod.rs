// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use pipebench::error::BenchError;
use pipebench::flow_engine::FlowEngine;

/// A call made on a [`RecordingEngine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Source(String, usize, usize),
    Truncator(String, usize, u64),
    Copy(String, usize, u64),
    Sink(String, usize, usize),
    Connect(usize, usize, usize, usize),
    Run,
}

/// An engine that records what it is asked to do. Nodes are numbered in
/// creation order.
#[derive(Default)]
pub struct RecordingEngine {
    pub calls: Vec<Call>,
    num_nodes: usize,
}

impl RecordingEngine {
    fn node(&mut self, call: Call) -> Result<usize, BenchError> {
        self.calls.push(call);
        self.num_nodes += 1;
        Ok(self.num_nodes - 1)
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn connections(&self) -> Vec<(usize, usize)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Connect(from, _, to, _) => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl FlowEngine for RecordingEngine {
    type Node = usize;

    fn make_source(
        &mut self,
        name: &str,
        unit_size: usize,
        granularity: usize,
    ) -> Result<usize, BenchError> {
        self.node(Call::Source(name.to_string(), unit_size, granularity))
    }

    fn make_truncator(
        &mut self,
        name: &str,
        unit_size: usize,
        sample_count: u64,
    ) -> Result<usize, BenchError> {
        self.node(Call::Truncator(name.to_string(), unit_size, sample_count))
    }

    fn make_copy(
        &mut self,
        name: &str,
        unit_size: usize,
        copy_bound: u64,
    ) -> Result<usize, BenchError> {
        self.node(Call::Copy(name.to_string(), unit_size, copy_bound))
    }

    fn make_sink(
        &mut self,
        name: &str,
        unit_size: usize,
        granularity: usize,
    ) -> Result<usize, BenchError> {
        self.node(Call::Sink(name.to_string(), unit_size, granularity))
    }

    fn connect(
        &mut self,
        from: &usize,
        from_port: usize,
        to: &usize,
        to_port: usize,
    ) -> Result<(), BenchError> {
        self.calls.push(Call::Connect(*from, from_port, *to, to_port));
        Ok(())
    }

    fn run(&mut self) -> Result<(), BenchError> {
        self.calls.push(Call::Run);
        Ok(())
    }
}
