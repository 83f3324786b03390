// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Ports connect stages together.
//!
//! Each connection is a single-slot rendezvous between one [`OutPort`] and one
//! [`InPort`]. A `put()` does not complete until the value has been taken by
//! the matching `get()`, which gives natural back-pressure through the
//! flowgraph.

use std::cell::RefCell;
use std::fmt;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use futures::Future;
use futures::future::FusedFuture;
use pipebench_track::connect;
use pipebench_track::entity::Entity;

use crate::sim_error;
use crate::traits::SimObject;
use crate::types::{SimError, SimResult};

pub type PortStateResult<T> = Result<Rc<PortState<T>>, SimError>;
pub type PortGetResult<T> = Result<PortGet<T>, SimError>;
pub type PortPutResult<T> = Result<PortPut<T>, SimError>;

/// State shared between a connected [`OutPort`] / [`InPort`] pair.
pub struct PortState<T>
where
    T: SimObject,
{
    value: RefCell<Option<T>>,
    waiting_get: RefCell<Option<Waker>>,
    waiting_put: RefCell<Option<Waker>>,
    pub in_port_entity: Rc<Entity>,
}

impl<T> PortState<T>
where
    T: SimObject,
{
    fn new(in_port_entity: Rc<Entity>) -> Self {
        Self {
            value: RefCell::new(None),
            waiting_get: RefCell::new(None),
            waiting_put: RefCell::new(None),
            in_port_entity,
        }
    }
}

pub struct InPort<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    state: Rc<PortState<T>>,
    connected: RefCell<bool>,
}

impl<T> fmt::Display for InPort<T>
where
    T: SimObject,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

impl<T> InPort<T>
where
    T: SimObject,
{
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let entity = Rc::new(Entity::new(parent, name));
        Self {
            entity: entity.clone(),
            state: Rc::new(PortState::new(entity)),
            connected: RefCell::new(false),
        }
    }

    /// Hand out the shared state so that an [`OutPort`] can connect to it.
    ///
    /// An `InPort` can only be connected once.
    pub fn state(&self) -> PortStateResult<T> {
        if *self.connected.borrow() {
            return sim_error!(format!("{self} already connected"));
        }

        *self.connected.borrow_mut() = true;
        Ok(self.state.clone())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    pub fn get(&self) -> PortGetResult<T> {
        if !*self.connected.borrow() {
            return sim_error!(format!("{self} not connected"));
        }

        Ok(PortGet {
            state: self.state.clone(),
            done: false,
        })
    }
}

pub struct OutPort<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    state: Option<Rc<PortState<T>>>,
}

impl<T> fmt::Display for OutPort<T>
where
    T: SimObject,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

impl<T> OutPort<T>
where
    T: SimObject,
{
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let entity = Rc::new(Entity::new(parent, name));
        Self {
            entity,
            state: None,
        }
    }

    pub fn connect(&mut self, port_state: PortStateResult<T>) -> SimResult {
        let port_state = port_state?;

        if self.state.is_some() {
            return sim_error!(format!("{self} already connected"));
        }

        connect!(self.entity ; port_state.in_port_entity);
        self.state = Some(port_state);
        Ok(())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.is_some()
    }

    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    pub fn put(&self, value: T) -> PortPutResult<T> {
        let state = match self.state.as_ref() {
            Some(s) => s.clone(),
            None => return sim_error!(format!("{self} not connected")),
        };
        Ok(PortPut {
            state,
            value: RefCell::new(Some(value)),
            done: RefCell::new(false),
        })
    }
}

pub struct PortPut<T>
where
    T: SimObject,
{
    state: Rc<PortState<T>>,
    value: RefCell<Option<T>>,
    done: RefCell<bool>,
}

impl<T> Future for PortPut<T>
where
    T: SimObject,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.value.take() {
            Some(value) => {
                // The state is shared between exactly one put/get pair so the slot
                // must be empty at this point.
                assert!(self.state.value.borrow().is_none());

                *self.state.value.borrow_mut() = Some(value);
                if let Some(waker) = self.state.waiting_get.borrow_mut().take() {
                    waker.wake();
                }
                *self.state.waiting_put.borrow_mut() = Some(cx.waker().clone());
                Poll::Pending
            }
            None => {
                if self.state.value.borrow().is_some() {
                    // Spurious wake-up, the value has not been consumed yet
                    *self.state.waiting_put.borrow_mut() = Some(cx.waker().clone());
                    return Poll::Pending;
                }

                // Value already sent, woken because it has been consumed
                *self.done.borrow_mut() = true;
                Poll::Ready(())
            }
        }
    }
}

impl<T> FusedFuture for PortPut<T>
where
    T: SimObject,
{
    fn is_terminated(&self) -> bool {
        *self.done.borrow()
    }
}

pub struct PortGet<T>
where
    T: SimObject,
{
    state: Rc<PortState<T>>,
    done: bool,
}

impl<T> Future for PortGet<T>
where
    T: SimObject,
{
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let value = self.state.value.borrow_mut().take();
        if let Some(value) = value {
            self.done = true;
            if let Some(waker) = self.state.waiting_put.borrow_mut().take() {
                waker.wake();
            }
            Poll::Ready(value)
        } else {
            *self.state.waiting_get.borrow_mut() = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

impl<T> FusedFuture for PortGet<T>
where
    T: SimObject,
{
    fn is_terminated(&self) -> bool {
        self.done
    }
}
