// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Bound a stream to a fixed number of samples.
//!
//! The [Truncator] forwards blocks unchanged until the next block would take
//! the stream past `sample_count`. That block is cut short, forwarded, and the
//! truncator then stops. Once it has stopped nothing more enters the rest of
//! the pipe, which is how a pipe reaches its end.
//!
//! # Ports
//!
//! This component has:
//!  - One [input port](pipebench_engine::port::InPort): `rx`
//!  - One [output port](pipebench_engine::port::OutPort): `tx`

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use pipebench_engine::engine::Engine;
use pipebench_engine::port::{InPort, OutPort, PortStateResult};
use pipebench_engine::traits::Runnable;
use pipebench_engine::types::{SimError, SimResult};
use pipebench_track::entity::Entity;
use pipebench_track::id::Identified;
use pipebench_track::{debug, enter, exit};

use crate::types::SampleBlock;
use crate::{connect_tx, port_rx, take_option};

pub struct Truncator {
    pub entity: Rc<Entity>,
    sample_count: u64,
    num_forwarded: RefCell<u64>,
    rx: RefCell<Option<InPort<SampleBlock>>>,
    tx: RefCell<Option<OutPort<SampleBlock>>>,
}

impl Truncator {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        sample_count: u64,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rx = InPort::new(&entity, "rx");
        let tx = OutPort::new(&entity, "tx");
        let rc_self = Rc::new(Self {
            entity,
            sample_count,
            num_forwarded: RefCell::new(0),
            rx: RefCell::new(Some(rx)),
            tx: RefCell::new(Some(tx)),
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    pub fn connect_port_tx(&self, port_state: PortStateResult<SampleBlock>) -> SimResult {
        connect_tx!(self.tx, connect ; port_state)
    }

    pub fn port_rx(&self) -> PortStateResult<SampleBlock> {
        port_rx!(self.rx, state)
    }

    #[must_use]
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Number of samples passed downstream so far.
    #[must_use]
    pub fn num_forwarded(&self) -> u64 {
        *self.num_forwarded.borrow()
    }
}

impl fmt::Display for Truncator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

#[async_trait(?Send)]
impl Runnable for Truncator {
    async fn run(&self) -> SimResult {
        let rx = take_option!(self.rx ; self.entity);
        let tx = take_option!(self.tx ; self.entity);

        let mut remaining = self.sample_count;
        while remaining > 0 {
            let mut block = rx.get()?.await;
            enter!(self.entity ; block.id());

            let num_samples = block.num_samples() as u64;
            if num_samples > remaining {
                // remaining < num_samples, which is a usize
                block.truncate(remaining as usize);
            }
            let forwarded = block.num_samples() as u64;
            remaining -= forwarded;

            exit!(self.entity ; block.id());
            tx.put(block)?.await;
            *self.num_forwarded.borrow_mut() += forwarded;
        }

        debug!(self.entity ; "Stream ended after {} samples", self.num_forwarded());
        Ok(())
    }
}
