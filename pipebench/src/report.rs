// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The one-line result record.

use std::fmt;

use crate::config::Configuration;
use crate::timing::Measurement;

/// The result of one benchmark run.
///
/// Displays as a single fixed-column line:
///
/// ```text
/// run, pipes,  stages,   samples,max_copy,legacy,   elapsed_seconds
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record {
    pub run_id: i64,
    pub pipe_count: usize,
    pub stage_count: usize,
    pub sample_count: u64,
    pub copy_bound: u64,
    pub elapsed_seconds: f64,
}

impl Record {
    #[must_use]
    pub fn new(config: &Configuration, measurement: &Measurement) -> Self {
        Self {
            run_id: config.run_id,
            pipe_count: config.pipe_count,
            stage_count: config.stage_count,
            sample_count: config.sample_count,
            copy_bound: config.copy_bound,
            elapsed_seconds: measurement.elapsed_seconds(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:4}, {:4},  {:4},   {:15},{:10},legacy,   {:20.15}",
            self.run_id,
            self.pipe_count,
            self.stage_count,
            self.sample_count,
            self.copy_bound,
            self.elapsed_seconds
        )
    }
}
