// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Errors reported by the benchmark.

use std::error::Error;
use std::fmt;

use pipebench_engine::types::SimError;

#[derive(Debug)]
pub enum BenchError {
    /// The requested flowgraph cannot be built. Raised before any engine call.
    InvalidConfiguration(String),

    /// The engine failed to create, connect or run a stage.
    Engine(SimError),

    /// The engine returned before a sink received its whole stream.
    Incomplete {
        sink: String,
        received: u64,
        expected: u64,
    },

    /// A configuration file or environment variable could not be read.
    Config(String),
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BenchError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {msg}"),
            BenchError::Engine(e) => e.fmt(f),
            BenchError::Incomplete {
                sink,
                received,
                expected,
            } => write!(
                f,
                "Deadlock: {sink} received {received} of {expected} samples"
            ),
            BenchError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl Error for BenchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BenchError::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SimError> for BenchError {
    fn from(e: SimError) -> Self {
        BenchError::Engine(e)
    }
}

#[macro_export]
/// Return a [BenchError::InvalidConfiguration] built from a format string
macro_rules! invalid_config {
    ($($arg:tt)+) => {
        Err($crate::error::BenchError::InvalidConfiguration(format!($($arg)+)))
    };
}
