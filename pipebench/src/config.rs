// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Benchmark configuration.
//!
//! Settings are gathered from several sources. Later sources take priority
//! over earlier ones:
//!
//!  1. built-in defaults,
//!  2. a TOML file named with `--conf-file`,
//!  3. environment variables prefixed `PIPEBENCH_` (e.g. `PIPEBENCH_PIPES=8`),
//!  4. command-line arguments.
//!
//! Every field of [`Config`] is an `Option` so that the command line only
//! overrides what the user actually passed.

use std::path::PathBuf;

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pipebench_track::builder::{STDERR_FILE, TrackerConfig};
use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::stage::{DEFAULT_GRANULARITY, SAMPLE_UNIT_SIZE};

/// Prefix of environment variables that configure the benchmark.
pub const ENV_PREFIX: &str = "PIPEBENCH_";

#[derive(Parser, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[command(about = "Run Buffer Flow Graph")]
pub struct Config {
    /// Run Number
    #[arg(short = 'r', long = "run", allow_negative_numbers = true)]
    pub run: Option<i64>,

    /// Number of pipes
    #[arg(short = 'p', long = "pipes")]
    pub pipes: Option<usize>,

    /// Number of stages
    #[arg(short = 's', long = "stages")]
    pub stages: Option<usize>,

    #[arg(
        short = 'm',
        long = "max_copy",
        help = "Maximum number of samples to copy in one go."
    )]
    pub max_copy: Option<u64>,

    /// Number of samples
    #[arg(short = 'n', long = "samples")]
    pub samples: Option<u64>,

    /// Seed for the random copy sizes
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of samples the source produces and the sink consumes at a time
    #[arg(long)]
    pub granularity: Option<usize>,

    /// Level of log message to display
    #[arg(long)]
    pub log_level: Option<log::Level>,

    /// Set a regular expression for which entities should have logging level
    /// set to `--log-level`. Others will have level set to `Error`.
    #[arg(long)]
    pub log_filter_regex: Option<String>,

    /// File to write log messages to (`-` for stderr)
    #[arg(long)]
    pub log_file: Option<String>,

    /// TOML file to read settings from
    #[arg(long)]
    #[serde(skip)]
    pub conf_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run: Some(0),
            pipes: Some(5),
            stages: Some(6),
            max_copy: Some(512),
            samples: Some(15_000_000),
            seed: Some(0),
            granularity: Some(DEFAULT_GRANULARITY),
            log_level: Some(log::Level::Warn),
            log_filter_regex: Some(String::new()),
            log_file: Some(STDERR_FILE.to_string()),
            conf_file: None,
        }
    }
}

impl Config {
    /// Read the command line and combine it with all other sources.
    pub fn parse_all_sources() -> Result<Config, BenchError> {
        Config::from_cli(Config::parse())
    }

    /// Combine already-parsed command-line arguments with the other sources.
    pub fn from_cli(cli: Config) -> Result<Config, BenchError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(conf_file) = &cli.conf_file {
            if !conf_file.is_file() {
                return Err(BenchError::Config(format!(
                    "{} not found",
                    conf_file.display()
                )));
            }
            figment = figment.merge(Toml::file(conf_file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let config: Config = figment
            .extract()
            .map_err(|e| BenchError::Config(e.to_string()))?;
        Ok(config.clap_merge(cli))
    }

    fn clap_merge(mut self, cli: Config) -> Config {
        if cli.run.is_some() {
            self.run = cli.run;
        }
        if cli.pipes.is_some() {
            self.pipes = cli.pipes;
        }
        if cli.stages.is_some() {
            self.stages = cli.stages;
        }
        if cli.max_copy.is_some() {
            self.max_copy = cli.max_copy;
        }
        if cli.samples.is_some() {
            self.samples = cli.samples;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        if cli.granularity.is_some() {
            self.granularity = cli.granularity;
        }
        if cli.log_level.is_some() {
            self.log_level = cli.log_level;
        }
        if cli.log_filter_regex.is_some() {
            self.log_filter_regex = cli.log_filter_regex;
        }
        if cli.log_file.is_some() {
            self.log_file = cli.log_file;
        }
        self.conf_file = cli.conf_file;
        self
    }

    /// The settings that shape and identify a run.
    #[must_use]
    pub fn configuration(&self) -> Configuration {
        let defaults = Config::default();
        Configuration {
            run_id: self.run.or(defaults.run).unwrap_or_default(),
            pipe_count: self.pipes.or(defaults.pipes).unwrap_or_default(),
            stage_count: self.stages.or(defaults.stages).unwrap_or_default(),
            sample_count: self.samples.or(defaults.samples).unwrap_or_default(),
            copy_bound: self.max_copy.or(defaults.max_copy).unwrap_or_default(),
            sample_unit_size: SAMPLE_UNIT_SIZE,
            granularity: self.granularity.unwrap_or(DEFAULT_GRANULARITY),
            seed: self.seed.unwrap_or_default(),
        }
    }

    /// The settings for the log tracker.
    #[must_use]
    pub fn tracker_config(&self) -> TrackerConfig<'_> {
        TrackerConfig {
            level: self.log_level.unwrap_or(log::Level::Warn),
            filter_regex: self.log_filter_regex.as_deref().unwrap_or(""),
            file: self.log_file.as_deref().unwrap_or(STDERR_FILE),
        }
    }
}

/// The resolved settings of one benchmark run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Configuration {
    pub run_id: i64,
    pub pipe_count: usize,
    pub stage_count: usize,
    pub sample_count: u64,
    pub copy_bound: u64,
    pub sample_unit_size: usize,
    pub granularity: usize,
    pub seed: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Config::default().configuration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert_eq!(config.run_id, 0);
        assert_eq!(config.pipe_count, 5);
        assert_eq!(config.stage_count, 6);
        assert_eq!(config.copy_bound, 512);
        assert_eq!(config.sample_count, 15_000_000);
        assert_eq!(config.granularity, 32768);
        assert_eq!(config.sample_unit_size, 4);
    }

    #[test]
    fn short_flags() {
        let cli = Config::try_parse_from([
            "null_rand_flowgraph",
            "-r",
            "3",
            "-p",
            "2",
            "-s",
            "1",
            "-m",
            "64",
            "-n",
            "1000",
        ])
        .unwrap();
        let config = Config::default().clap_merge(cli).configuration();
        assert_eq!(config.run_id, 3);
        assert_eq!(config.pipe_count, 2);
        assert_eq!(config.stage_count, 1);
        assert_eq!(config.copy_bound, 64);
        assert_eq!(config.sample_count, 1000);
    }

    #[test]
    fn long_flags() {
        let cli = Config::try_parse_from([
            "null_rand_flowgraph",
            "--run=-1",
            "--pipes=8",
            "--stages=3",
            "--max_copy=128",
            "--samples=0",
            "--log-level=debug",
        ])
        .unwrap();
        let merged = Config::default().clap_merge(cli);
        let config = merged.configuration();
        assert_eq!(config.run_id, -1);
        assert_eq!(config.pipe_count, 8);
        assert_eq!(config.stage_count, 3);
        assert_eq!(config.copy_bound, 128);
        assert_eq!(config.sample_count, 0);
        assert_eq!(merged.tracker_config().level, log::Level::Debug);
    }

    #[test]
    fn unset_flags_keep_lower_priority_values() {
        let cli = Config::try_parse_from(["null_rand_flowgraph", "-p", "1"]).unwrap();
        assert_eq!(cli.stages, None);

        let base = Config {
            stages: Some(9),
            ..Config::default()
        };
        let config = base.clap_merge(cli).configuration();
        assert_eq!(config.pipe_count, 1);
        assert_eq!(config.stage_count, 9);
    }

    #[test]
    fn help_requested() {
        let err = Config::try_parse_from(["null_rand_flowgraph", "-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        let help = err.to_string();
        assert!(help.contains("Maximum number of samples to copy in one go."));
        assert!(help.contains("--max_copy"));
    }

    #[test]
    fn bad_value_rejected() {
        assert!(Config::try_parse_from(["null_rand_flowgraph", "--pipes", "many"]).is_err());
    }
}
