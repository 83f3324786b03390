// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Library functions to build trackers as defined by the user.

use std::io::BufWriter;
use std::rc::Rc;
use std::{fs, io};

use crate::tracker::{EntityManager, TextTracker, TrackConfigError};
use crate::{Tracker, Writer};

/// Name used for the log file to indicate that `stderr` should be used.
pub const STDERR_FILE: &str = "-";

/// Configuration options for the text tracker.
pub struct TrackerConfig<'a> {
    /// Set the level at which the tracker should be enabled.
    pub level: log::Level,

    /// A regular expression to match which entities should have `level`
    /// applied. All others will only emit errors. An empty string applies
    /// `level` to all entities.
    pub filter_regex: &'a str,

    /// The name of the file to which the tracker will write, or
    /// [`STDERR_FILE`].
    pub file: &'a str,
}

impl Default for TrackerConfig<'_> {
    fn default() -> Self {
        Self {
            level: log::Level::Warn,
            filter_regex: "",
            file: STDERR_FILE,
        }
    }
}

/// Create a text tracker as described by the [`TrackerConfig`].
///
/// The user can pass a filter regular expression which will set the level only
/// for matching entities and set all other entities to only emit errors.
pub fn setup_tracker(config: &TrackerConfig) -> Result<Tracker, TrackConfigError> {
    let default_level = if config.filter_regex.is_empty() {
        config.level
    } else {
        log::Level::Error
    };

    let mut entity_manager = EntityManager::new(default_level);
    if !config.filter_regex.is_empty() {
        entity_manager.add_entity_level_filter(config.filter_regex, config.level)?;
    }

    let writer: Writer = if config.file.is_empty() || config.file == STDERR_FILE {
        Box::new(BufWriter::new(io::stderr()))
    } else {
        let file = fs::File::create(config.file).map_err(|e| {
            TrackConfigError(format!("Unable to create log file {}: {e}", config.file))
        })?;
        Box::new(BufWriter::new(file))
    };
    Ok(Rc::new(TextTracker::new(entity_manager, writer)))
}
