// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A null data source.
//!
//! The [NullSource] produces an endless stream of zero-filled
//! [SampleBlock]s, each `granularity` samples long and stamped with the time
//! it was created. It relies on a downstream
//! [Truncator](crate::truncator::Truncator) to bound the stream.
//!
//! # Ports
//!
//! This component has:
//!  - One [output port](pipebench_engine::port::OutPort): `tx`

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use async_trait::async_trait;
use pipebench_engine::engine::Engine;
use pipebench_engine::port::{OutPort, PortStateResult};
use pipebench_engine::sim_error;
use pipebench_engine::traits::Runnable;
use pipebench_engine::types::{SimError, SimResult};
use pipebench_track::entity::Entity;
use pipebench_track::id::Identified;
use pipebench_track::{create_id, exit};

use crate::types::{SampleBlock, block_bytes};
use crate::{connect_tx, take_option};

pub struct NullSource {
    pub entity: Rc<Entity>,
    unit_size: usize,
    granularity: usize,
    num_produced: RefCell<u64>,
    tx: RefCell<Option<OutPort<SampleBlock>>>,
}

impl NullSource {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        unit_size: usize,
        granularity: usize,
    ) -> Result<Rc<Self>, SimError> {
        if unit_size == 0 || granularity == 0 {
            return sim_error!(format!(
                "{parent}::{name}: unit size ({unit_size}) and granularity ({granularity}) must be non-zero"
            ));
        }
        if block_bytes(unit_size, granularity).is_none() {
            return sim_error!(format!(
                "{parent}::{name}: blocks of {granularity} samples of {unit_size} bytes are too large"
            ));
        }

        let entity = Rc::new(Entity::new(parent, name));
        let tx = OutPort::new(&entity, "tx");
        let rc_self = Rc::new(Self {
            entity,
            unit_size,
            granularity,
            num_produced: RefCell::new(0),
            tx: RefCell::new(Some(tx)),
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    pub fn connect_port_tx(&self, port_state: PortStateResult<SampleBlock>) -> SimResult {
        connect_tx!(self.tx, connect ; port_state)
    }

    /// Number of samples handed downstream so far.
    #[must_use]
    pub fn num_produced(&self) -> u64 {
        *self.num_produced.borrow()
    }
}

impl fmt::Display for NullSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

#[async_trait(?Send)]
impl Runnable for NullSource {
    async fn run(&self) -> SimResult {
        let tx = take_option!(self.tx ; self.entity);
        let mut offset = 0;
        loop {
            let block = SampleBlock::zeroed(
                create_id!(self.entity),
                offset,
                self.unit_size,
                self.granularity,
            )?
            .stamped(Instant::now());
            exit!(self.entity ; block.id());
            offset += self.granularity as u64;

            tx.put(block)?.await;
            *self.num_produced.borrow_mut() = offset;
        }
    }
}
