// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A [`FlowEngine`] that runs the flowgraph on the pipebench engine.
//!
//! Each node becomes one of the components from `pipebench-components`,
//! created under an entity hierarchy that follows the node names, so that a
//! node named `pipe0::copy2` logs as `top::pipe0::copy2`.
//!
//! The engine returns as soon as no stage can make progress. That happens
//! both when every pipe has drained and when the flowgraph has deadlocked, so
//! after each run every sink is checked against the sample count of the
//! truncator in the same pipe.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use pipebench_components::copy::CopyRand;
use pipebench_components::sink::LatencySink;
use pipebench_components::source::NullSource;
use pipebench_components::truncator::Truncator;
use pipebench_components::types::SampleBlock;
use pipebench_engine::engine::Engine;
use pipebench_engine::port::PortStateResult;
use pipebench_engine::sim_error;
use pipebench_engine::types::{SimError, SimResult};
use pipebench_track::entity::Entity;
use pipebench_track::{Tracker, debug, info};

use crate::error::BenchError;
use crate::flow_engine::FlowEngine;

/// A stage created in a [`SimFlowEngine`].
#[derive(Clone)]
pub enum SimNode {
    Source(Rc<NullSource>),
    Truncator(Rc<Truncator>),
    Copy(Rc<CopyRand>),
    Sink(Rc<LatencySink>),
}

impl SimNode {
    #[must_use]
    pub fn entity(&self) -> &Rc<Entity> {
        match self {
            SimNode::Source(s) => &s.entity,
            SimNode::Truncator(t) => &t.entity,
            SimNode::Copy(c) => &c.entity,
            SimNode::Sink(s) => &s.entity,
        }
    }

    fn has_output(&self) -> bool {
        !matches!(self, SimNode::Sink(_))
    }

    fn port_rx(&self) -> PortStateResult<SampleBlock> {
        match self {
            SimNode::Source(s) => sim_error!(format!("{s} has no input port")),
            SimNode::Truncator(t) => t.port_rx(),
            SimNode::Copy(c) => c.port_rx(),
            SimNode::Sink(s) => s.port_rx(),
        }
    }

    fn connect_port_tx(&self, port_state: PortStateResult<SampleBlock>) -> SimResult {
        match self {
            SimNode::Source(s) => s.connect_port_tx(port_state),
            SimNode::Truncator(t) => t.connect_port_tx(port_state),
            SimNode::Copy(c) => c.connect_port_tx(port_state),
            SimNode::Sink(s) => sim_error!(format!("{s} has no output port")),
        }
    }
}

impl fmt::Display for SimNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity().fmt(f)
    }
}

pub struct SimFlowEngine {
    engine: Engine,
    seed: u64,
    num_copies: u64,
    groups: HashMap<String, Rc<Entity>>,
    expected: HashMap<String, u64>,
    sinks: Vec<(String, Rc<LatencySink>)>,
}

impl SimFlowEngine {
    /// Create an engine that logs through `tracker`.
    ///
    /// Copy stage `i` (in creation order) draws its copy sizes from a
    /// generator seeded with `seed + i`.
    #[must_use]
    pub fn new(tracker: &Tracker, seed: u64) -> Self {
        Self {
            engine: Engine::new(tracker),
            seed,
            num_copies: 0,
            groups: HashMap::new(),
            expected: HashMap::new(),
            sinks: Vec::new(),
        }
    }

    #[must_use]
    pub fn top(&self) -> &Rc<Entity> {
        self.engine.top()
    }

    /// All sinks, in creation order.
    pub fn sinks(&self) -> impl Iterator<Item = &Rc<LatencySink>> {
        self.sinks.iter().map(|(_, sink)| sink)
    }

    fn group_entity(&mut self, group: &str) -> Rc<Entity> {
        if let Some(entity) = self.groups.get(group) {
            return entity.clone();
        }

        let (parent, local) = match group.rsplit_once("::") {
            Some((parent_group, local)) => (self.group_entity(parent_group), local),
            None => (self.engine.top().clone(), group),
        };
        let entity = Rc::new(Entity::new(&parent, local));
        self.groups.insert(group.to_string(), entity.clone());
        entity
    }

    /// Split a node name into its parent entity, the parent's path and the
    /// node's own name.
    fn place<'a>(&mut self, name: &'a str) -> (Rc<Entity>, &'a str, &'a str) {
        match name.rsplit_once("::") {
            Some((group, local)) => (self.group_entity(group), group, local),
            None => (self.engine.top().clone(), "", name),
        }
    }

    fn check_sinks(&self) -> Result<(), BenchError> {
        for (group, sink) in &self.sinks {
            let received = sink.num_sunk();
            if let Some(&expected) = self.expected.get(group) {
                if received != expected {
                    return Err(BenchError::Incomplete {
                        sink: sink.entity.to_string(),
                        received,
                        expected,
                    });
                }
            }
            info!(sink.entity ;
                "{} samples ({} bytes), {}",
                received,
                sink.num_bytes(),
                sink.latency_summary()
            );
        }
        Ok(())
    }
}

impl FlowEngine for SimFlowEngine {
    type Node = SimNode;

    fn make_source(
        &mut self,
        name: &str,
        unit_size: usize,
        granularity: usize,
    ) -> Result<SimNode, BenchError> {
        let (parent, _, local) = self.place(name);
        let source =
            NullSource::new_and_register(&self.engine, &parent, local, unit_size, granularity)?;
        Ok(SimNode::Source(source))
    }

    fn make_truncator(
        &mut self,
        name: &str,
        _unit_size: usize,
        sample_count: u64,
    ) -> Result<SimNode, BenchError> {
        let (parent, group, local) = self.place(name);
        let truncator = Truncator::new_and_register(&self.engine, &parent, local, sample_count)?;
        self.expected.insert(group.to_string(), sample_count);
        Ok(SimNode::Truncator(truncator))
    }

    fn make_copy(
        &mut self,
        name: &str,
        _unit_size: usize,
        copy_bound: u64,
    ) -> Result<SimNode, BenchError> {
        let (parent, _, local) = self.place(name);
        let seed = self.seed.wrapping_add(self.num_copies);
        let copy = CopyRand::new_and_register(&self.engine, &parent, local, copy_bound, seed)?;
        self.num_copies += 1;
        Ok(SimNode::Copy(copy))
    }

    fn make_sink(
        &mut self,
        name: &str,
        _unit_size: usize,
        granularity: usize,
    ) -> Result<SimNode, BenchError> {
        let (parent, group, local) = self.place(name);
        let sink = LatencySink::new_and_register(&self.engine, &parent, local, granularity)?;
        self.sinks.push((group.to_string(), sink.clone()));
        Ok(SimNode::Sink(sink))
    }

    fn connect(
        &mut self,
        from: &SimNode,
        from_port: usize,
        to: &SimNode,
        to_port: usize,
    ) -> Result<(), BenchError> {
        if from_port != 0 || to_port != 0 {
            return Err(SimError(format!(
                "No such port: {from}.{from_port} => {to}.{to_port}"
            ))
            .into());
        }
        if !from.has_output() {
            return Err(SimError(format!("{from} has no output port")).into());
        }
        debug!(from.entity() ; "Connect {} => {}", from, to);

        from.connect_port_tx(to.port_rx())?;
        Ok(())
    }

    fn run(&mut self) -> Result<(), BenchError> {
        debug!(self.engine.top() ; "Running {} pipes", self.sinks.len());
        self.engine.run()?;
        self.check_sinks()
    }
}
