// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Run one complete benchmark.

use crate::config::Configuration;
use crate::error::BenchError;
use crate::execution::realize;
use crate::flow_engine::FlowEngine;
use crate::report::Record;
use crate::timing::measure;
use crate::topology::assemble;

/// Assemble the flowgraph, build it in `engine` and time how long it takes to
/// run.
///
/// Only the run itself is timed. Nothing is passed to the engine if the
/// configuration is invalid.
pub fn run_benchmark<E: FlowEngine>(
    config: &Configuration,
    engine: &mut E,
) -> Result<Record, BenchError> {
    let topology = assemble(config)?;
    realize(engine, &topology)?;

    let timed = measure(|| engine.run());
    timed.result?;

    Ok(Record::new(config, &timed.measurement))
}
