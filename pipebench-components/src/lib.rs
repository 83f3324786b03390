// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The stages that make up a pipebench pipe.
//!
//! A pipe is a linear chain:
//!
//! ```text
//! NullSource -> Truncator -> CopyRand -> ... -> CopyRand -> LatencySink
//! ```
//!
//! All stages exchange [`SampleBlock`](crate::types::SampleBlock)s and are
//! [`Runnable`](pipebench_engine::traits::Runnable) components registered with
//! the [`Engine`](pipebench_engine::engine::Engine) as they are created.
//!
//! ```rust
//! use pipebench_components::connect_port;
//! use pipebench_components::copy::CopyRand;
//! use pipebench_components::sink::LatencySink;
//! use pipebench_components::source::NullSource;
//! use pipebench_components::truncator::Truncator;
//! use pipebench_engine::engine::Engine;
//! use pipebench_engine::run_simulation;
//!
//! let mut engine = Engine::default();
//! let top = engine.top().clone();
//! let source = NullSource::new_and_register(&engine, &top, "source", 4, 1024).unwrap();
//! let head = Truncator::new_and_register(&engine, &top, "head", 5000).unwrap();
//! let copy = CopyRand::new_and_register(&engine, &top, "copy", 64, 0).unwrap();
//! let sink = LatencySink::new_and_register(&engine, &top, "sink", 1024).unwrap();
//!
//! connect_port!(source, tx => head, rx).unwrap();
//! connect_port!(head, tx => copy, rx).unwrap();
//! connect_port!(copy, tx => sink, rx).unwrap();
//! run_simulation!(engine);
//! assert_eq!(sink.num_sunk(), 5000);
//! ```

pub mod connect;
pub mod copy;
pub mod sink;
pub mod source;
pub mod truncator;
pub mod types;
