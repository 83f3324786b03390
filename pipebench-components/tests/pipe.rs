// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use pipebench_components::connect_port;
use pipebench_components::copy::CopyRand;
use pipebench_components::sink::LatencySink;
use pipebench_components::source::NullSource;
use pipebench_components::truncator::Truncator;
use pipebench_engine::engine::Engine;
use pipebench_engine::run_simulation;
use pipebench_engine::test_helpers::start_test;

const UNIT_SIZE: usize = 4;

struct Pipe {
    source: Rc<NullSource>,
    head: Rc<Truncator>,
    copies: Vec<Rc<CopyRand>>,
    sink: Rc<LatencySink>,
}

fn build_pipe(
    engine: &Engine,
    granularity: usize,
    samples: u64,
    num_copies: usize,
    copy_bound: u64,
    seed: u64,
) -> Pipe {
    let top = engine.top();
    let source =
        NullSource::new_and_register(engine, top, "source", UNIT_SIZE, granularity).unwrap();
    let head = Truncator::new_and_register(engine, top, "head", samples).unwrap();
    connect_port!(source, tx => head, rx).unwrap();

    let mut copies: Vec<Rc<CopyRand>> = Vec::new();
    for i in 0..num_copies {
        let name = format!("copy{i}");
        let copy =
            CopyRand::new_and_register(engine, top, &name, copy_bound, seed + i as u64).unwrap();
        match copies.last() {
            Some(prev) => connect_port!(prev, tx => copy, rx).unwrap(),
            None => connect_port!(head, tx => copy, rx).unwrap(),
        }
        copies.push(copy);
    }

    let sink = LatencySink::new_and_register(engine, top, "sink", granularity).unwrap();
    match copies.last() {
        Some(last) => connect_port!(last, tx => sink, rx).unwrap(),
        None => connect_port!(head, tx => sink, rx).unwrap(),
    }

    Pipe {
        source,
        head,
        copies,
        sink,
    }
}

#[test]
fn sink_receives_truncated_stream() {
    let mut engine = start_test(file!());
    let pipe = build_pipe(&engine, 256, 1000, 3, 64, 1);
    run_simulation!(engine);

    assert_eq!(pipe.head.num_forwarded(), 1000);
    assert_eq!(pipe.sink.num_sunk(), 1000);
    assert_eq!(pipe.sink.num_bytes(), 1000 * UNIT_SIZE as u64);

    // The source stalls once the truncator stops taking blocks
    assert!(pipe.source.num_produced() >= 1000);
    assert!(pipe.source.num_produced() < 1000 + 2 * 256);
}

#[test]
fn copies_respect_bound() {
    let mut engine = start_test(file!());
    let pipe = build_pipe(&engine, 1024, 10_000, 2, 7, 5);
    run_simulation!(engine);

    assert_eq!(pipe.sink.num_sunk(), 10_000);
    for copy in &pipe.copies {
        assert!(copy.largest_copy() <= 7);
        // At least one put per `copy_bound` samples
        assert!(copy.num_copies() >= 10_000 / 7);
    }
}

#[test]
fn copy_bound_of_one() {
    let mut engine = start_test(file!());
    let pipe = build_pipe(&engine, 16, 100, 1, 1, 0);
    run_simulation!(engine);

    assert_eq!(pipe.sink.num_sunk(), 100);
    assert_eq!(pipe.copies[0].num_copies(), 100);
    assert_eq!(pipe.copies[0].largest_copy(), 1);
}

#[test]
fn zero_samples() {
    let mut engine = start_test(file!());
    let pipe = build_pipe(&engine, 32, 0, 2, 16, 0);
    run_simulation!(engine);

    assert_eq!(pipe.sink.num_sunk(), 0);
    assert_eq!(pipe.sink.latency_summary().count, 0);
    assert_eq!(pipe.copies[0].num_copies(), 0);
}

#[test]
fn same_seed_same_copies() {
    let run = |seed| {
        let mut engine = start_test(file!());
        let pipe = build_pipe(&engine, 512, 5000, 1, 100, seed);
        run_simulation!(engine);
        pipe.copies[0].num_copies()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn latency_measured_per_granule() {
    let mut engine = start_test(file!());
    let pipe = build_pipe(&engine, 100, 1000, 2, 33, 3);
    run_simulation!(engine);

    // One stamped block per 100 samples makes it to the sink
    let summary = pipe.sink.latency_summary();
    assert_eq!(summary.count, 10);
    assert!(summary.min <= summary.max);
}

#[test]
fn parallel_pipes_are_independent() {
    let mut engine = start_test(file!());
    let short = build_pipe(&engine, 64, 100, 1, 10, 0);
    let long = build_pipe(&engine, 64, 10_000, 3, 10, 0);
    run_simulation!(engine);

    assert_eq!(short.sink.num_sunk(), 100);
    assert_eq!(long.sink.num_sunk(), 10_000);
}

#[test]
fn stages_released_with_engine() {
    let mut engine = start_test(file!());
    let pipe = build_pipe(&engine, 64, 100, 2, 16, 0);
    run_simulation!(engine);
    assert_eq!(pipe.sink.num_sunk(), 100);

    // The source is left parked on a put once the truncator has finished
    let source = Rc::downgrade(&pipe.source);
    let copy = Rc::downgrade(&pipe.copies[1]);
    drop(pipe);
    assert!(source.upgrade().is_some());

    drop(engine);
    assert!(source.upgrade().is_none());
    assert!(copy.upgrade().is_none());
}
