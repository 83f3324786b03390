// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Measure how long it takes to push samples through parallel pipes.
//!
//! The benchmark builds `pipes` independent pipes, each made of:
//!
//! ```text
//! source -> head -> copy0 -> ... -> copy{stages-1} -> sink
//! ```
//!
//! The `head` truncator limits each pipe to `samples` samples and every copy
//! stage moves a random number of samples, at most `max_copy`, per call. The
//! flowgraph is built, run to completion and the time taken by the run is
//! printed as one line:
//!
//! ```text
//!    3,    2,     1,              1000,        64,legacy,      0.001234567000000
//! ```
//!
//! The flowgraph is described independently of the engine that executes it
//! (see [`topology`] and [`pipeline`]) and handed to an engine through the
//! [`FlowEngine`](flow_engine::FlowEngine) trait.
//! [`SimFlowEngine`](sim_engine::SimFlowEngine) runs it on the pipebench
//! engine.
//!
//! ```rust
//! use pipebench::config::Configuration;
//! use pipebench::harness::run_benchmark;
//! use pipebench::sim_engine::SimFlowEngine;
//! use pipebench_track::tracker::dev_null_tracker;
//!
//! let config = Configuration {
//!     pipe_count: 2,
//!     stage_count: 2,
//!     sample_count: 10_000,
//!     copy_bound: 64,
//!     ..Configuration::default()
//! };
//! let mut engine = SimFlowEngine::new(&dev_null_tracker(), config.seed);
//! let record = run_benchmark(&config, &mut engine).unwrap();
//! assert_eq!(record.pipe_count, 2);
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod flow_engine;
pub mod harness;
pub mod pipeline;
pub mod report;
pub mod sim_engine;
pub mod stage;
pub mod timing;
pub mod topology;
