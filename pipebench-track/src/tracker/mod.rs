// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Define the [`Track`] trait and a number of [`Tracker`]s.

/// Include the /dev/null tracker.
pub mod dev_null;
/// Include the text-based tracker.
pub mod text;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::rc::Rc;

pub use dev_null::DevNullTracker;
use regex::Regex;
pub use text::TextTracker;

use crate::{Id, ROOT};

/// Error used to return configuration errors
#[derive(Debug)]
pub struct TrackConfigError(pub String);

impl fmt::Display for TrackConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tracker configuration error: {}", self.0)
    }
}

impl std::error::Error for TrackConfigError {}

/// This is the interface that is supported by all [`Tracker`]s.
pub trait Track {
    /// Allocate a new global ID
    fn unique_id(&self) -> Id;

    /// Determine whether tracking is enabled at `level` for an entity looked
    /// up by its ID.
    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool;

    /// Record an entity being created.
    fn add_entity(&self, id: Id, entity_name: &str);

    /// Track when an object with the given ID arrives.
    fn enter(&self, enter_into: Id, enter_obj: Id);

    /// Track when an object with the given ID leaves.
    fn exit(&self, exit_from: Id, exit_obj: Id);

    /// Track when an object with the given ID is created.
    fn create(&self, created_by: Id, created_obj: Id, num_bytes: usize, name: &str);

    /// Track when an object with the given ID is destroyed.
    fn destroy(&self, destroyed_by: Id, destroyed_obj: Id);

    /// Track when an entity is connected to another entity
    fn connect(&self, connect_from: Id, connect_to: Id);

    /// Track a log message of the given level.
    fn log(&self, msg_by: Id, level: log::Level, msg: fmt::Arguments);

    /// Perform any pre-exit shutdown/cleanup
    fn shutdown(&self);
}

/// The type of a [`Tracker`] that is shared across entities.
pub type Tracker = Rc<dyn Track>;

/// Create a [`Tracker`] that prints all track events at or above `level` to
/// `stderr`.
#[must_use]
pub fn stderr_tracker(level: log::Level) -> Tracker {
    let entity_manager = EntityManager::new(level);
    let stderr_writer = Box::new(io::BufWriter::new(io::stderr()));
    let tracker: Tracker = Rc::new(TextTracker::new(entity_manager, stderr_writer));
    tracker
}

/// Create a [`Tracker`] that suppresses all track events.
#[must_use]
pub fn dev_null_tracker() -> Tracker {
    let tracker: Tracker = Rc::new(DevNullTracker {});
    tracker
}

/// The [`EntityManager`] is responsible for determining entity log levels.
///
/// This manager is also used to allocate unique [`Id`] values.
pub struct EntityManager {
    /// Level of tracking events to output.
    default_entity_level: log::Level,

    /// List of regular expressions mapping entity names to log levels.
    regex_to_entity_level: Vec<(Regex, log::Level)>,

    /// Used to assign unique IDs.
    unique_id: RefCell<u64>,

    /// Keep track of entities that have log levels different to the default.
    log_entity_lookup: RefCell<HashMap<Id, log::Level>>,
}

impl EntityManager {
    /// Constructor with default [`log::Level`]
    #[must_use]
    pub fn new(default_entity_level: log::Level) -> Self {
        Self {
            default_entity_level,
            regex_to_entity_level: Vec::new(),
            unique_id: RefCell::new(ROOT.0 + 1),
            log_entity_lookup: RefCell::new(HashMap::new()),
        }
    }

    fn unique_id(&self) -> Id {
        let mut guard = self.unique_id.borrow_mut();
        let id = *guard;
        *guard += 1;
        Id(id)
    }

    fn is_log_enabled_at_level(&self, id: Id, level: log::Level) -> bool {
        match self.log_entity_lookup.borrow().get(&id) {
            None => level <= self.default_entity_level,
            Some(entity_level) => level <= *entity_level,
        }
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        let entity_level = self.log_level_for(entity_name);
        if entity_level != self.default_entity_level {
            self.log_entity_lookup.borrow_mut().insert(id, entity_level);
        }
    }

    fn log_level_for(&self, entity_name: &str) -> log::Level {
        for (regex, level) in &self.regex_to_entity_level {
            if regex.is_match(entity_name) {
                return *level;
            }
        }
        self.default_entity_level
    }

    /// Add a filter regular expression to set matching entities to a given
    /// level.
    ///
    /// The first filter added that matches an entity wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pipebench_track::tracker::EntityManager;
    /// let mut manager = EntityManager::new(log::Level::Warn);
    /// manager.add_entity_level_filter(".*pipe0.*", log::Level::Trace).unwrap();
    /// ```
    pub fn add_entity_level_filter(
        &mut self,
        regex_str: &str,
        level: log::Level,
    ) -> Result<(), TrackConfigError> {
        match Regex::new(regex_str) {
            Ok(regex) => self.regex_to_entity_level.push((regex, level)),
            Err(e) => {
                return Err(TrackConfigError(format!(
                    "Failed to parse regex {regex_str}:\n{e}\n"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;

    fn entity_paths() -> Vec<&'static str> {
        vec!["top", "top::pipe0", "top::pipe0::copy0", "top::pipe1::copy0"]
    }

    #[test]
    fn no_filters() {
        let manager = EntityManager::new(Level::Error);

        for p in entity_paths() {
            assert_eq!(manager.log_level_for(p), Level::Error);
        }
    }

    #[test]
    fn filter_pipe0_trace() {
        let mut manager = EntityManager::new(Level::Error);
        manager
            .add_entity_level_filter(r".*pipe0.*", Level::Trace)
            .unwrap();

        let expected_levels = [Level::Error, Level::Trace, Level::Trace, Level::Error];

        for (i, p) in entity_paths().iter().enumerate() {
            assert_eq!(manager.log_level_for(p), expected_levels[i]);
        }
    }

    #[test]
    fn first_filter_wins() {
        let mut manager = EntityManager::new(Level::Warn);
        manager
            .add_entity_level_filter(r".*copy0", Level::Info)
            .unwrap();
        manager
            .add_entity_level_filter(r".*pipe0.*", Level::Trace)
            .unwrap();

        let expected_levels = [Level::Warn, Level::Trace, Level::Info, Level::Info];

        for (i, p) in entity_paths().iter().enumerate() {
            assert_eq!(manager.log_level_for(p), expected_levels[i]);
        }
    }

    #[test]
    fn enabled_by_id() {
        let mut manager = EntityManager::new(Level::Warn);
        manager.add_entity_level_filter(r"top::pipe1", Level::Debug).unwrap();

        let top = manager.unique_id();
        manager.add_entity(top, "top");
        let pipe1 = manager.unique_id();
        manager.add_entity(pipe1, "top::pipe1");

        assert!(!manager.is_log_enabled_at_level(top, Level::Info));
        assert!(manager.is_log_enabled_at_level(top, Level::Warn));
        assert!(manager.is_log_enabled_at_level(pipe1, Level::Debug));
        assert!(!manager.is_log_enabled_at_level(pipe1, Level::Trace));
    }

    #[test]
    fn bad_regex() {
        let mut manager = EntityManager::new(Level::Warn);
        assert!(manager.add_entity_level_filter(r"pipe(", Level::Debug).is_err());
    }

    #[test]
    fn ids() {
        let manager = EntityManager::new(Level::Error);
        for i in 0..10 {
            assert_eq!(manager.unique_id(), Id(i + ROOT.0 + 1));
        }
    }
}
