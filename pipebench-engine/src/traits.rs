// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A set of common traits used across the engine.

use core::mem::size_of;
use std::fmt::{Debug, Display};

use async_trait::async_trait;
use pipebench_track::id::Identified;

use crate::types::SimResult;

/// The `TotalBytes` trait is used to determine how many bytes an object
/// represents
pub trait TotalBytes {
    fn total_bytes(&self) -> usize;
}

/// A super-trait that objects that are passed between stages have to
/// implement
///
///  - Clone:       Allows the application to keep copies of objects sent
///    around.
///  - Debug:       In order to print "{:?}" objects have to at least implement
///    Debug.
///  - Display:     Used when logging.
///  - Identified:  Allows objects to be followed through the flowgraph.
///  - TotalBytes:  Allows throughput accounting.
///  - 'static:     Due to the way that futures are implemented, the lifetimes
///    need to be `static.
pub trait SimObject: Clone + Debug + Display + Identified + TotalBytes + 'static {}

/// A component that the [`Engine`](crate::engine::Engine) spawns when a run
/// starts.
///
/// A component that has finished its work returns `Ok(())`. A component that
/// is waiting on a port that will never be serviced again simply stays parked,
/// which does not prevent the run from completing.
#[async_trait(?Send)]
pub trait Runnable {
    async fn run(&self) -> SimResult {
        Ok(())
    }
}

// Implementations for basic types that can be sent around for testing

impl TotalBytes for i32 {
    fn total_bytes(&self) -> usize {
        size_of::<i32>()
    }
}

impl SimObject for i32 {}

impl TotalBytes for usize {
    fn total_bytes(&self) -> usize {
        size_of::<usize>()
    }
}

impl SimObject for usize {}
