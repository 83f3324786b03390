// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Single-threaded executor.
//!
//! Tasks are polled in rounds. A task that returns `Poll::Pending` is dropped
//! from the queue and only polled again once something calls its waker. The
//! executor returns as soon as a round finishes with no tasks woken, which is
//! the point at which the flowgraph can make no more progress.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use pipebench_track::entity::Entity;
use pipebench_track::trace;

use crate::types::SimResult;

fn task_raw_waker(task: Rc<Task>) -> RawWaker {
    let vtable = &RawWakerVTable::new(clone_raw_waker, wake_task, wake_task_by_ref, drop_task);
    let ptr = Rc::into_raw(task) as *const ();
    RawWaker::new(ptr, vtable)
}

fn waker_for_task(task: Rc<Task>) -> Waker {
    unsafe { Waker::from_raw(task_raw_waker(task)) }
}

unsafe fn clone_raw_waker(data: *const ()) -> RawWaker {
    unsafe {
        // Tasks are always wrapped in a reference counter to allow them to be shared
        // read-only.
        Rc::increment_strong_count(data as *const Task);
        let vtable = &RawWakerVTable::new(clone_raw_waker, wake_task, wake_task_by_ref, drop_task);
        RawWaker::new(data, vtable)
    }
}

unsafe fn wake_task(data: *const ()) {
    unsafe {
        let rc_task = Rc::from_raw(data as *const Task);
        rc_task.schedule();
    }
}

unsafe fn wake_task_by_ref(data: *const ()) {
    unsafe {
        Rc::increment_strong_count(data as *const Task);
        wake_task(data);
    }
}

unsafe fn drop_task(data: *const ()) {
    unsafe {
        drop(Rc::from_raw(data as *const Task));
    }
}

struct Task {
    future: RefCell<Pin<Box<dyn Future<Output = SimResult>>>>,
    executor_state: Rc<ExecutorState>,
    completed: Cell<bool>,
}

impl Task {
    fn new(
        future: impl Future<Output = SimResult> + 'static,
        executor_state: Rc<ExecutorState>,
    ) -> Task {
        Task {
            future: RefCell::new(Box::pin(future)),
            executor_state,
            completed: Cell::new(false),
        }
    }

    fn schedule(self: Rc<Self>) {
        if !self.completed.get() {
            let state = self.executor_state.clone();
            state.new_tasks.borrow_mut().push(self);
        }
    }

    fn poll(&self, context: &mut Context) -> Poll<SimResult> {
        if self.completed.get() {
            // Stale wake-up of a task that has already returned
            return Poll::Ready(Ok(()));
        }

        let result = self.future.borrow_mut().as_mut().poll(context);
        if result.is_ready() {
            self.completed.set(true);
        }
        result
    }

    /// Drop the future so that everything it holds is released.
    fn cancel(&self) {
        self.completed.set(true);
        let future = std::mem::replace(
            &mut *self.future.borrow_mut(),
            Box::pin(std::future::ready(Ok(()))),
        );
        drop(future);
    }
}

struct ExecutorState {
    task_queue: RefCell<Vec<Rc<Task>>>,
    new_tasks: RefCell<Vec<Rc<Task>>>,
    spawned: RefCell<Vec<Rc<Task>>>,
}

impl ExecutorState {
    fn new() -> Self {
        Self {
            task_queue: RefCell::new(Vec::new()),
            new_tasks: RefCell::new(Vec::new()),
            spawned: RefCell::new(Vec::new()),
        }
    }
}

/// Single-threaded executor
///
/// This is a thin-wrapper (using [`Rc`]) around the real executor, so that this
/// struct can be cloned and passed around.
///
/// See the [module documentation] for more details.
///
/// [module documentation]: index.html
#[derive(Clone)]
pub struct Executor {
    pub entity: Rc<Entity>,
    state: Rc<ExecutorState>,
}

impl Executor {
    /// Poll tasks until none are runnable.
    ///
    /// Returns the first error returned by any task.
    pub fn run(&self) -> SimResult {
        let mut rounds: u64 = 0;
        while !self.state.new_tasks.borrow().is_empty() {
            self.step()?;
            rounds += 1;
        }
        trace!(self.entity ; "No runnable tasks after {} rounds", rounds);
        Ok(())
    }

    /// Cancel every task that has not completed.
    ///
    /// A task parked on a port is referenced by the waker stored in that port,
    /// so it is only freed once its future has been dropped.
    pub fn shutdown(&self) {
        self.state.task_queue.borrow_mut().clear();
        self.state.new_tasks.borrow_mut().clear();
        let spawned: Vec<Rc<Task>> = self.state.spawned.borrow_mut().drain(..).collect();
        for task in spawned {
            task.cancel();
        }
    }

    /// Poll every task that has been woken since the last step.
    fn step(&self) -> SimResult {
        // Append new tasks created since the last step into the task queue
        let mut task_queue = self.state.task_queue.borrow_mut();
        task_queue.append(&mut self.state.new_tasks.borrow_mut());

        for task in task_queue.drain(..) {
            let waker = waker_for_task(task.clone());
            let mut context = Context::from_waker(&waker);

            match task.poll(&mut context) {
                Poll::Ready(Err(e)) => {
                    // Error - return early
                    return Err(e);
                }
                Poll::Ready(Ok(())) => {
                    // Otherwise, drop task as it is complete
                }
                Poll::Pending => {
                    // Task will have parked itself waiting somewhere
                }
            }
        }
        drop(task_queue);
        self.state
            .spawned
            .borrow_mut()
            .retain(|task| !task.completed.get());
        Ok(())
    }
}

/// `Spawner` spawns new futures into the executor.
#[derive(Clone)]
pub struct Spawner {
    state: Rc<ExecutorState>,
}

impl Spawner {
    pub fn spawn(&self, future: impl Future<Output = SimResult> + 'static) {
        let task = Rc::new(Task::new(future, self.state.clone()));
        self.state.spawned.borrow_mut().push(task.clone());
        self.state.new_tasks.borrow_mut().push(task);
    }
}

#[must_use]
pub fn new_executor_and_spawner(top: &Rc<Entity>) -> (Executor, Spawner) {
    let state = Rc::new(ExecutorState::new());
    let entity = Rc::new(Entity::new(top, "executor"));
    (
        Executor {
            entity,
            state: state.clone(),
        },
        Spawner { state },
    )
}

#[cfg(test)]
mod tests {
    use pipebench_track::entity::toplevel;
    use pipebench_track::tracker::dev_null_tracker;

    use super::*;

    #[test]
    fn runs_to_completion() {
        let top = toplevel(&dev_null_tracker(), "top");
        let (executor, spawner) = new_executor_and_spawner(&top);

        let count = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let count = count.clone();
            spawner.spawn(async move {
                count.set(count.get() + 1);
                Ok(())
            });
        }
        executor.run().unwrap();
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn first_error_returned() {
        let top = toplevel(&dev_null_tracker(), "top");
        let (executor, spawner) = new_executor_and_spawner(&top);
        spawner.spawn(async { crate::sim_error!("broken stage") });
        let err = executor.run().unwrap_err();
        assert_eq!(err.to_string(), "Error: broken stage");
    }

    #[test]
    fn parked_task_does_not_block_completion() {
        let top = toplevel(&dev_null_tracker(), "top");
        let (executor, spawner) = new_executor_and_spawner(&top);
        spawner.spawn(async {
            futures::future::pending::<()>().await;
            Ok(())
        });
        executor.run().unwrap();
    }

    #[test]
    fn shutdown_releases_parked_tasks() {
        let top = toplevel(&dev_null_tracker(), "top");
        let (executor, spawner) = new_executor_and_spawner(&top);

        let held = Rc::new(());
        let weak = Rc::downgrade(&held);
        spawner.spawn(async move {
            futures::future::pending::<()>().await;
            drop(held);
            Ok(())
        });
        executor.run().unwrap();
        assert!(weak.upgrade().is_some());

        executor.shutdown();
        assert!(weak.upgrade().is_none());
    }
}
