//! Stop types.

use super::Coordinates;

/// Stable index of a stop in the catalogue's insertion-ordered arena.
///
/// Ids are dense and assigned in insertion order, so they double as the
/// stop-table indices used by the snapshot format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub u32);

impl StopId {
    /// Returns the id as a usize suitable for slice indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named physical location served by the network.
///
/// Stops are immutable once added to the catalogue and are referenced
/// elsewhere by [`StopId`].
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Unique stop name.
    pub name: String,
    /// Geographic position of the stop.
    pub position: Coordinates,
}

impl Stop {
    /// Creates a stop with the given name and position.
    pub fn new(name: impl Into<String>, position: Coordinates) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}
