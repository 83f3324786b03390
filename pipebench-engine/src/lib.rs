// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! The engine that executes pipebench flowgraphs.
//!
//! Every stage of a flowgraph is a component implementing
//! [`Runnable`](crate::traits::Runnable). Components are registered with the
//! [`Engine`](crate::engine::Engine) as they are created and all of them are
//! spawned on a single-threaded [executor](crate::executor) when the engine is
//! run. Stages exchange data through [ports](crate::port), each of which holds
//! at most one value at a time.
//!
//! A run finishes when no task can make progress. Stages that are still
//! waiting on a port at that point are simply abandoned, so it is up to the
//! caller to check that the expected amount of data reached each sink.
//!
//! ```rust
//! use pipebench_engine::engine::Engine;
//! use pipebench_engine::port::{InPort, OutPort};
//! use pipebench_engine::run_simulation;
//!
//! let mut engine = Engine::default();
//! let mut tx = OutPort::new(engine.top(), "tx");
//! let rx = InPort::new(engine.top(), "rx");
//! tx.connect(rx.state()).unwrap();
//!
//! engine.spawn(async move {
//!     for i in 0..4_i32 {
//!         tx.put(i)?.await;
//!     }
//!     Ok(())
//! });
//! engine.spawn(async move {
//!     for i in 0..4_i32 {
//!         assert_eq!(rx.get()?.await, i);
//!     }
//!     Ok(())
//! });
//! run_simulation!(engine);
//! ```

pub mod engine;
pub mod executor;
pub mod port;
pub mod test_helpers;
pub mod traits;
pub mod types;

#[macro_export]
/// Spawn all component run() functions and then run the flowgraph.
macro_rules! run_simulation {
    ($engine:ident) => {
        $engine.run().unwrap();
    };
    ($engine:ident, $expect:expr) => {
        match $engine.run() {
            Ok(()) => panic!("Expected an error!"),
            Err(e) => assert_eq!(format!("{e}").as_str(), $expect),
        }
    };
}
