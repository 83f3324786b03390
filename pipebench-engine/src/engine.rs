// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The engine owns the executor and the registry of stages to run.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use pipebench_track::entity::{Entity, toplevel};
use pipebench_track::tracker::stderr_tracker;
use pipebench_track::{Tracker, debug, trace};

use crate::executor::{self, Executor, Spawner};
use crate::types::{Component, SimResult};

pub struct Registry {
    pub entity: Rc<Entity>,
    components: RefCell<Vec<Component>>,
}

impl Registry {
    fn new(parent: &Rc<Entity>) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "registry")),
            components: RefCell::new(Vec::new()),
        }
    }

    pub fn spawn_components(&self, spawner: &Spawner) {
        let mut guard = self.components.borrow_mut();

        trace!(self.entity ; "Spawning {} components", guard.len());

        for component in guard.drain(..) {
            spawner.spawn(async move { component.run().await });
        }
    }

    pub fn register(&self, component: Component) {
        let mut guard = self.components.borrow_mut();
        guard.push(component);
    }

    #[must_use]
    pub fn num_components(&self) -> usize {
        self.components.borrow().len()
    }
}

pub struct Engine {
    pub executor: Executor,
    spawner: Spawner,
    toplevel: Rc<Entity>,
    tracker: Tracker,
    registry: Registry,
}

impl Engine {
    /// Create a standalone engine.
    #[must_use]
    pub fn new(tracker: &Tracker) -> Self {
        let toplevel = toplevel(tracker, "top");
        let (executor, spawner) = executor::new_executor_and_spawner(&toplevel);
        let registry = Registry::new(&toplevel);
        Self {
            executor,
            spawner,
            toplevel,
            tracker: tracker.clone(),
            registry,
        }
    }

    /// Register a component that will be run as the flowgraph starts
    pub fn register(&self, component: Component) {
        self.registry.register(component);
    }

    /// Number of components waiting to be spawned by the next [`run`](Self::run)
    #[must_use]
    pub fn num_registered(&self) -> usize {
        self.registry.num_components()
    }

    /// Spawn all registered components and run until nothing can make progress.
    pub fn run(&mut self) -> SimResult {
        debug!(self.toplevel ; "Running {} components", self.registry.num_components());
        self.registry.spawn_components(&self.spawner);
        self.executor.run()
    }

    pub fn spawn(&self, future: impl Future<Output = SimResult> + 'static) {
        self.spawner.spawn(future);
    }

    #[must_use]
    pub fn top(&self) -> &Rc<Entity> {
        &self.toplevel
    }

    #[must_use]
    pub fn tracker(&self) -> Tracker {
        self.tracker.clone()
    }
}

/// Create a default engine that sends [`Track`](pipebench_track::Track) events
/// to stderr.
impl Default for Engine {
    fn default() -> Self {
        let tracker = stderr_tracker(log::Level::Warn);
        Self::new(&tracker)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Stages left parked on a port form reference cycles with their wakers
        self.executor.shutdown();

        // The tracker can be using a buffered writer and so it needs to be shut down
        // cleanly to ensure that it is flushed properly.
        self.tracker.shutdown();
    }
}
