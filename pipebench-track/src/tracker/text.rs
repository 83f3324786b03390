// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::tracker::{EntityManager, Track};
use crate::{Id, SharedWriter, Writer};

/// A simple text logger to output messages to a Writer.
///
/// Events are written with the full name of the entity that emitted them, for
/// example `top::pipe0::sink:INFO: 1000 samples sunk`.
pub struct TextTracker {
    entity_manager: EntityManager,

    /// Full names of all entities seen so far.
    names: RefCell<HashMap<Id, String>>,

    /// Writer to which all _log_ events will be written.
    writer: SharedWriter,
}

impl TextTracker {
    /// Create a new [`TextTracker`] with an [`EntityManager`].
    pub fn new(entity_manager: EntityManager, writer: Writer) -> Self {
        Self {
            entity_manager,
            names: RefCell::new(HashMap::new()),
            writer: Rc::new(RefCell::new(writer)),
        }
    }

    fn name_of(&self, id: Id) -> String {
        match self.names.borrow().get(&id) {
            Some(name) => name.clone(),
            None => id.to_string(),
        }
    }

    fn write_line(&self, line: String) {
        // A failure to log must not take the run down with it
        let _ = self.writer.borrow_mut().write_all(line.as_bytes());
    }
}

/// Implementation for each [`Track`] event
impl Track for TextTracker {
    fn unique_id(&self) -> Id {
        self.entity_manager.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.entity_manager.is_log_enabled_at_level(id, level)
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.entity_manager.add_entity(id, entity_name);
        self.names.borrow_mut().insert(id, entity_name.to_owned());
    }

    fn enter(&self, id: Id, object: Id) {
        self.write_line(format!("{}: enter {object}\n", self.name_of(id)));
    }

    fn exit(&self, id: Id, object: Id) {
        self.write_line(format!("{}: exit {object}\n", self.name_of(id)));
    }

    fn create(&self, created_by: Id, id: Id, num_bytes: usize, name: &str) {
        self.write_line(format!(
            "{}: created {id}, {name}, {num_bytes} bytes\n",
            self.name_of(created_by)
        ));
    }

    fn destroy(&self, destroyed_by: Id, id: Id) {
        self.write_line(format!(
            "{}: destroyed {id}\n",
            self.name_of(destroyed_by)
        ));
    }

    fn connect(&self, connect_from: Id, connect_to: Id) {
        self.write_line(format!(
            "{}: connect to {}\n",
            self.name_of(connect_from),
            self.name_of(connect_to)
        ));
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.write_line(format!("{}:{level}: {msg}\n", self.name_of(id)));
    }

    fn shutdown(&self) {
        let _ = self.writer.borrow_mut().flush();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::entity::{Entity, toplevel};
    use crate::tracker::Tracker;
    use crate::{info, trace};

    #[test]
    fn writes_named_messages() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let writer: Writer = Box::new(file.reopen().unwrap());
        let tracker: Tracker = Rc::new(TextTracker::new(
            EntityManager::new(log::Level::Info),
            writer,
        ));

        let top = toplevel(&tracker, "top");
        let sink = Entity::new(&top, "sink");
        info!(sink ; "{} samples sunk", 1000);
        trace!(sink ; "suppressed");
        tracker.shutdown();

        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "top::sink:INFO: 1000 samples sunk\n");
    }
}
