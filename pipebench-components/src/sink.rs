// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A data sink that measures latency.
//!
//! A [LatencySink] accepts and discards everything received on its input
//! port, counting samples and bytes. Each block that still carries the
//! creation stamp of a sample on a `granularity` boundary contributes one
//! latency measurement.
//!
//! # Ports
//!
//! This component has:
//!  - One [input port](pipebench_engine::port::InPort): `rx`

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use pipebench_engine::engine::Engine;
use pipebench_engine::port::{InPort, PortStateResult};
use pipebench_engine::sim_error;
use pipebench_engine::traits::{Runnable, TotalBytes};
use pipebench_engine::types::{SimError, SimResult};
use pipebench_track::enter;
use pipebench_track::entity::Entity;
use pipebench_track::id::Identified;

use crate::types::{LatencySummary, SampleBlock};
use crate::{port_rx, take_option};

pub struct LatencySink {
    pub entity: Rc<Entity>,
    granularity: u64,
    sunk_count: RefCell<u64>,
    sunk_bytes: RefCell<u64>,
    latency: RefCell<LatencySummary>,
    rx: RefCell<Option<InPort<SampleBlock>>>,
}

impl LatencySink {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        granularity: usize,
    ) -> Result<Rc<Self>, SimError> {
        if granularity == 0 {
            return sim_error!(format!("{parent}::{name}: granularity must be non-zero"));
        }

        let entity = Rc::new(Entity::new(parent, name));
        let rx = InPort::new(&entity, "rx");
        let rc_self = Rc::new(Self {
            entity,
            granularity: granularity as u64,
            sunk_count: RefCell::new(0),
            sunk_bytes: RefCell::new(0),
            latency: RefCell::new(LatencySummary::default()),
            rx: RefCell::new(Some(rx)),
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    pub fn port_rx(&self) -> PortStateResult<SampleBlock> {
        port_rx!(self.rx, state)
    }

    /// Number of samples received.
    #[must_use]
    pub fn num_sunk(&self) -> u64 {
        *self.sunk_count.borrow()
    }

    #[must_use]
    pub fn num_bytes(&self) -> u64 {
        *self.sunk_bytes.borrow()
    }

    #[must_use]
    pub fn latency_summary(&self) -> LatencySummary {
        *self.latency.borrow()
    }
}

impl fmt::Display for LatencySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

#[async_trait(?Send)]
impl Runnable for LatencySink {
    async fn run(&self) -> SimResult {
        let rx = take_option!(self.rx ; self.entity);
        loop {
            let block = rx.get()?.await;
            enter!(self.entity ; block.id());

            if let Some(created) = block.created() {
                if block.offset() % self.granularity == 0 {
                    self.latency.borrow_mut().record(created.elapsed());
                }
            }
            *self.sunk_count.borrow_mut() += block.num_samples() as u64;
            *self.sunk_bytes.borrow_mut() += block.total_bytes() as u64;
        }
    }
}
