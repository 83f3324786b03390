// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Run the null/random-copy flowgraph benchmark.
//!
//! See `lib.rs` for details.

use pipebench::config::Config;
use pipebench::error::BenchError;
use pipebench::harness::run_benchmark;
use pipebench::sim_engine::SimFlowEngine;
use pipebench_track::builder::setup_tracker;
use pipebench_track::info;

fn main() -> Result<(), BenchError> {
    let config = Config::parse_all_sources()?;
    let tracker =
        setup_tracker(&config.tracker_config()).map_err(|e| BenchError::Config(e.to_string()))?;

    let configuration = config.configuration();
    let mut engine = SimFlowEngine::new(&tracker, configuration.seed);
    let top = engine.top().clone();
    info!(top ;
        "Pushing {} samples through {} pipes of {} copy stages (max copy {}, granularity {}).",
        configuration.sample_count,
        configuration.pipe_count,
        configuration.stage_count,
        configuration.copy_bound,
        configuration.granularity
    );

    let record = run_benchmark(&configuration, &mut engine)?;
    info!(top ; "Run took {:.6}s", record.elapsed_seconds);
    println!("{record}");
    Ok(())
}
