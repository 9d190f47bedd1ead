//! The external location a selection is mirrored to
//!
//! A location holds the current route (a browser address, a saved link,
//! ...). Writing to it produces a change notification just like an
//! outside navigation does; the [`Origin`] tag tells the two apart.

use std::collections::VecDeque;

/// Where a location change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The echo of our own write
    Internal,
    /// Navigation by someone else
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChange {
    pub route: String,
    pub origin: Origin,
}

pub trait Location {
    /// Replace the current route.
    fn write(&mut self, route: &str);
}

/// An in-process location with a notification queue.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocation {
    route: String,
    pending: VecDeque<LocationChange>,
}

impl MemoryLocation {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            pending: VecDeque::new(),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// Navigate from outside, as a user following a link would.
    pub fn navigate(&mut self, route: impl Into<String>) {
        self.route = route.into();
        self.pending.push_back(LocationChange {
            route: self.route.clone(),
            origin: Origin::External,
        });
    }

    /// Take the oldest pending notification.
    pub fn poll(&mut self) -> Option<LocationChange> {
        self.pending.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Location for MemoryLocation {
    fn write(&mut self, route: &str) {
        self.route = route.to_string();
        self.pending.push_back(LocationChange {
            route: self.route.clone(),
            origin: Origin::Internal,
        });
    }
}
