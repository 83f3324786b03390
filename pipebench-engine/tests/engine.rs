// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use pipebench_engine::run_simulation;
use pipebench_engine::test_helpers::start_test;
use pipebench_engine::traits::Runnable;
use pipebench_engine::types::SimResult;

struct Counter {
    runs: Rc<Cell<usize>>,
}

#[async_trait(?Send)]
impl Runnable for Counter {
    async fn run(&self) -> SimResult {
        self.runs.set(self.runs.get() + 1);
        Ok(())
    }
}

#[test]
fn all_spawned() {
    let mut engine = start_test(file!());

    let runs = Rc::new(Cell::new(0));
    for _ in 0..5 {
        engine.register(Rc::new(Counter { runs: runs.clone() }));
    }
    assert_eq!(engine.num_registered(), 5);

    run_simulation!(engine);
    assert_eq!(runs.get(), 5);
    assert_eq!(engine.num_registered(), 0);
}

#[test]
fn empty_engine_runs() {
    let mut engine = start_test(file!());
    run_simulation!(engine);
}
