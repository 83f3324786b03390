// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing tracking output
//!
//! The aim of this module is to provide commonly-used functions that enable the
//! testing of the output that should appear from the tracking macros, and a
//! standard way of building the tracker used by tests in other crates.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::{env, fs, io};

use regex::Regex;

use crate::tracker::{EntityManager, TextTracker};
use crate::{Id, Track, Tracker};

/// A tracker that keeps track events in memory.
pub struct TestTracker {
    events: RefCell<Vec<String>>,

    unique_id: RefCell<u64>,
}

impl TestTracker {
    /// Create a new [`Tracker`](crate::Tracker) for the tests.
    ///
    /// This keeps the track events in memory for checking later.
    #[must_use]
    pub fn new(initial_id: u64) -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            unique_id: RefCell::new(initial_id),
        }
    }

    fn add_event(&self, event: String) {
        println!("{event}");
        self.events.borrow_mut().push(event);
    }
}

impl Track for TestTracker {
    fn unique_id(&self) -> Id {
        let mut guard = self.unique_id.borrow_mut();
        let id = *guard;
        *guard += 1;
        Id(id)
    }

    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        true
    }

    fn add_entity(&self, _id: Id, _entity_name: &str) {}

    fn enter(&self, id: Id, item: Id) {
        self.add_event(format!("{id}: {item} entered"));
    }

    fn exit(&self, id: Id, item: Id) {
        self.add_event(format!("{id}: {item} exited"));
    }

    fn create(&self, created_by: Id, id: Id, num_bytes: usize, name: &str) {
        self.add_event(format!(
            "{created_by}: created {id}, {name}, {num_bytes} bytes"
        ));
    }

    fn destroy(&self, destroyed_by: Id, id: Id) {
        self.add_event(format!("{destroyed_by}: destroyed {id}"));
    }

    fn connect(&self, connect_from: Id, connect_to: Id) {
        self.add_event(format!("{connect_from}: connect to {connect_to}"));
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.add_event(format!("{id}:{level}: {msg}"));
    }

    fn shutdown(&self) {}
}

/// Create a [`TestTracker`] and the [`Tracker`] that refers to it.
///
/// # Arguments
///
/// * `start_id` - The ID value to be set as the starting value
///
/// *Note*: this is called `test_init` because macros are exported at the root
/// of the crate.
#[macro_export]
macro_rules! test_init {
    ($start_id:expr) => {{
        let test_tracker = std::rc::Rc::new($crate::test_helpers::TestTracker::new($start_id));
        let tracker: $crate::Tracker = test_tracker.clone();
        (test_tracker, tracker)
    }};
}

/// Check and clear the _trace_ and _log_ output
///
/// Asserts that the events seen since the start, or since the last call, match
/// the `expected` regular expressions one-for-one. The events are then cleared.
pub fn check_and_clear(tracker: &TestTracker, expected: &[&str]) {
    let mut events = tracker.events.borrow_mut();

    println!("Checking {:?} matches {:?}", expected, *events);
    assert_eq!(expected.len(), events.len());

    for (log_expect, actual) in expected.iter().zip(events.iter()) {
        let re = Regex::new(log_expect).unwrap();
        println!("Checking {log_expect:?} matches {actual:?}");
        assert!(re.is_match(actual));
    }

    events.clear();
}

/// Create the tracker used by tests in the rest of the workspace.
///
/// Log output is written to a file named after the test source file (pass
/// `file!()`) in the system temporary directory. The level defaults to `Warn`
/// and can be raised with the `PIPEBENCH_TEST_LOG_LEVEL` environment variable.
#[must_use]
pub fn create_tracker(full_filepath: &str) -> Tracker {
    let level = env::var("PIPEBENCH_TEST_LOG_LEVEL")
        .ok()
        .and_then(|lvl| crate::str_to_level(&lvl).ok())
        .unwrap_or(log::Level::Warn);

    let stem = Path::new(full_filepath)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("test");
    let log_path = env::temp_dir().join(format!("pipebench_{stem}.log"));

    let writer: crate::Writer = match fs::File::create(&log_path) {
        Ok(file) => Box::new(io::BufWriter::new(file)),
        Err(_) => Box::new(io::sink()),
    };
    Rc::new(TextTracker::new(EntityManager::new(level), writer))
}
