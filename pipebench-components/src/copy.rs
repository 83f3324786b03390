// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A copy stage that moves a random number of samples per call.
//!
//! For each block received, [CopyRand] repeatedly picks a count in
//! `1..=copy_bound`, copies that many samples (or whatever is left of the
//! block) into a new block and puts it downstream. Every put is one
//! invocation of the stage, so `copy_bound` controls how finely work is
//! chopped up as it moves through the pipe.
//!
//! The random counts come from a [`StdRng`] seeded at construction so that a
//! given seed always produces the same sequence of block sizes.
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
use pipebench_engine::sim_error;
use pipebench_engine::traits::Runnable;
use pipebench_engine::types::{SimError, SimResult};
use pipebench_track::entity::Entity;
use pipebench_track::id::Identified;
use pipebench_track::{create_id, enter, exit, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::SampleBlock;
use crate::{connect_tx, port_rx, take_option};

pub struct CopyRand {
    pub entity: Rc<Entity>,
    copy_bound: usize,
    rng: RefCell<StdRng>,
    num_copies: RefCell<u64>,
    largest_copy: RefCell<usize>,
    rx: RefCell<Option<InPort<SampleBlock>>>,
    tx: RefCell<Option<OutPort<SampleBlock>>>,
}

impl CopyRand {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        copy_bound: u64,
        seed: u64,
    ) -> Result<Rc<Self>, SimError> {
        if copy_bound == 0 {
            return sim_error!(format!("{parent}::{name}: copy bound must be non-zero"));
        }
        let copy_bound = usize::try_from(copy_bound).map_err(|_| {
            SimError(format!(
                "{parent}::{name}: copy bound {copy_bound} does not fit in memory"
            ))
        })?;

        let entity = Rc::new(Entity::new(parent, name));
        let rx = InPort::new(&entity, "rx");
        let tx = OutPort::new(&entity, "tx");
        let rc_self = Rc::new(Self {
            entity,
            copy_bound,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            num_copies: RefCell::new(0),
            largest_copy: RefCell::new(0),
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

    /// Number of blocks put downstream so far.
    #[must_use]
    pub fn num_copies(&self) -> u64 {
        *self.num_copies.borrow()
    }

    /// The most samples moved by a single put.
    #[must_use]
    pub fn largest_copy(&self) -> usize {
        *self.largest_copy.borrow()
    }

    fn next_copy_len(&self, available: usize) -> usize {
        let wanted = self.rng.borrow_mut().gen_range(1..=self.copy_bound);
        wanted.min(available)
    }
}

impl fmt::Display for CopyRand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

#[async_trait(?Send)]
impl Runnable for CopyRand {
    async fn run(&self) -> SimResult {
        let rx = take_option!(self.rx ; self.entity);
        let tx = take_option!(self.tx ; self.entity);

        loop {
            let block = rx.get()?.await;
            enter!(self.entity ; block.id());

            let num_samples = block.num_samples();
            let mut start = 0;
            while start < num_samples {
                let len = self.next_copy_len(num_samples - start);
                let piece = block.slice(create_id!(self.entity), start, len);
                start += len;

                trace!(self.entity ; "Copy {}", piece);
                exit!(self.entity ; piece.id());
                tx.put(piece)?.await;

                *self.num_copies.borrow_mut() += 1;
                let mut largest = self.largest_copy.borrow_mut();
                *largest = (*largest).max(len);
            }
        }
    }
}
