// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This crate provides combined _track_ capabilities for pipebench.
//!
//! _Track_ means the combination of _log_ and _trace_ where:
//!
//!   - _log_ are text-based human-readable messages emitted at various levels
//!     of verbosity (from `Trace` through to `Error`).
//!   - _trace_ is a standard set of events describing the flowgraph. For
//!     example, stage creation/destruction, port connections or sample blocks
//!     entering/exiting a stage [`Entity`](crate::entity::Entity).
//!
//! All events are routed through a [`Tracker`]. Whether an event is emitted is
//! decided per entity, so a regular expression can be used to turn on
//! verbose output for a single pipe or stage without flooding the output with
//! events from the rest of the flowgraph.
//!
//! Text output is written to `stderr` (or a file), never to `stdout`, which
//! is reserved for the benchmark result record.

// Enable warnings for missing documentation
#![warn(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

pub use log;

pub mod builder;
pub mod entity;
pub mod id;
pub mod test_helpers;

/// Include the trackers.
pub mod tracker;
pub use id::Id;
pub use tracker::{Track, Tracker};

/// A type alias for objects that receive _log_ / _trace_ events.
pub type Writer = Box<dyn std::io::Write>;
type SharedWriter = Rc<RefCell<Writer>>;

/// ID value which indicates where there is no valid ID
pub const NO_ID: Id = Id(0);

/// The root ID from which all other IDs are derived
pub const ROOT: Id = Id(1);

/// Take the command-line string and convert it to a Level
///
/// # Errors
///
/// Returns the unparsed string if it does not name a [`log::Level`].
pub fn str_to_level(lvl: &str) -> Result<log::Level, String> {
    log::Level::from_str(lvl).map_err(|_| format!("Unable to parse level string '{lvl}'"))
}

/// Track an object entering an entity.
#[macro_export]
macro_rules! enter {
    ($entity:expr ; $enter_id:expr) => {
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            $entity.tracker.enter($entity.id, $enter_id);
        }
    };
}

/// Track an object leaving an entity.
#[macro_export]
macro_rules! exit {
    ($entity:expr ; $exit_id:expr) => {
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            $entity.tracker.exit($entity.id, $exit_id);
        }
    };
}

/// Create a unique ID for an object that will be tracked through the graph.
#[macro_export]
macro_rules! create_id {
    ($entity:expr) => {{ $entity.tracker.unique_id() }};
}

/// Add an entity creation event
#[macro_export]
macro_rules! create {
    ($entity:expr) => {{
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            let parent_id = match &$entity.parent {
                Some(parent) => parent.id,
                None => $crate::NO_ID,
            };
            $entity
                .tracker
                .create(parent_id, $entity.id, 0, $entity.full_name().as_str());
        }
    }};
}

/// Add an entity destroy event
#[macro_export]
macro_rules! destroy {
    ($entity:expr) => {{
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            match &$entity.parent {
                Some(parent) => $entity.tracker.destroy(parent.id, $entity.id),
                None => $entity.tracker.destroy($crate::NO_ID, $entity.id),
            };
        }
    }};
}

/// Connect two entities
#[macro_export]
macro_rules! connect {
    ($from_entity:expr ; $to_entity:expr) => {{
        if $from_entity
            .tracker
            .is_entity_enabled($from_entity.id, $crate::log::Level::Trace)
        {
            $from_entity
                .tracker
                .connect($from_entity.id, $to_entity.id);
        }
    }};
}

/// Base macro for log messages of all levels.
///
/// The message is only formatted if the entity is enabled at the given level.
#[macro_export]
macro_rules! log_base {
    ($entity:expr ; $lvl:expr, $($arg:tt)+) => (
        if $entity.tracker.is_entity_enabled($entity.id, $lvl) {
            $entity.tracker.log($entity.id, $lvl, format_args!($($arg)+));
        }
    );
}

/// Log at level `log::Level::Trace`
#[macro_export]
macro_rules! trace {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Trace, $($arg)+);
    );
}

/// Log at level `log::Level::Debug`
#[macro_export]
macro_rules! debug {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Debug, $($arg)+);
    );
}

/// Log at level `log::Level::Info`
#[macro_export]
macro_rules! info {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Info, $($arg)+);
    );
}

/// Log at level `log::Level::Warn`
#[macro_export]
macro_rules! warn {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Warn, $($arg)+);
    );
}

/// Log at level `log::Level::Error`
#[macro_export]
macro_rules! error {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Error, $($arg)+);
    );
}
