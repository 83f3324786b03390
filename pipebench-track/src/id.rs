// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Unique identifiers.

/// IDs that are unique across a run
///
/// Every entity and every tracked object (such as a block of samples) is given
/// a unique ID. There are two reserved values: [NO_ID](crate::NO_ID) and
/// [ROOT](crate::ROOT).
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Id(pub u64);

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `Identified` trait gives access to the unique [`Id`] of an object
/// so that it can be followed through the flowgraph.
pub trait Identified {
    /// Return the unique ID for an object.
    fn id(&self) -> Id;
}

impl Identified for Id {
    fn id(&self) -> Id {
        *self
    }
}

impl Identified for i32 {
    fn id(&self) -> Id {
        Id(*self as u64)
    }
}

impl Identified for usize {
    fn id(&self) -> Id {
        Id(*self as u64)
    }
}
